//! Hosted Database Repositories
//!
//! 通过 PostgREST 接口实现作品/章节仓储

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::client::{eq, PostgrestClient};
use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, RepositoryError, StoryRecord, StoryRepositoryPort,
};
use crate::domain::chapter::ChapterStatus;

const STORIES: &str = "stories";
const CHAPTERS: &str = "chapters";

#[derive(Debug, Serialize, Deserialize)]
struct StoryRow {
    id: Uuid,
    title: String,
    #[serde(default)]
    description: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<&StoryRecord> for StoryRow {
    fn from(record: &StoryRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            description: Some(record.description.clone()),
            created_at: record.created_at,
        }
    }
}

impl From<StoryRow> for StoryRecord {
    fn from(row: StoryRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description.unwrap_or_default(),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct ChapterRow {
    id: Uuid,
    story_id: Uuid,
    title: String,
    #[serde(default)]
    content: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    /// 只读：远端表不一定有此列，写入时不发送
    #[serde(default, skip_serializing)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<&ChapterRecord> for ChapterRow {
    fn from(record: &ChapterRecord) -> Self {
        Self {
            id: record.id,
            story_id: record.story_id,
            title: record.title.clone(),
            content: Some(record.content.clone()),
            status: record.status.as_str().to_string(),
            created_at: record.created_at,
            updated_at: Some(record.updated_at),
        }
    }
}

impl TryFrom<ChapterRow> for ChapterRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            story_id: row.story_id,
            title: row.title,
            content: row.content.unwrap_or_default(),
            status: ChapterStatus::parse(&row.status)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            updated_at: row.updated_at.unwrap_or(row.created_at),
            created_at: row.created_at,
        })
    }
}

#[derive(Serialize)]
struct ContentPatch<'a> {
    title: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct StatusPatch<'a> {
    status: &'a str,
}

/// 托管数据库作品仓储
pub struct RestStoryRepository {
    client: Arc<PostgrestClient>,
}

impl RestStoryRepository {
    pub fn new(client: Arc<PostgrestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl StoryRepositoryPort for RestStoryRepository {
    async fn insert(&self, story: &StoryRecord) -> Result<(), RepositoryError> {
        self.client.insert(STORIES, &StoryRow::from(story)).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoryRecord>, RepositoryError> {
        let rows: Vec<StoryRow> = self.client.select(STORIES, &[eq("id", id)]).await?;
        Ok(rows.into_iter().next().map(StoryRecord::from))
    }

    async fn find_all(&self) -> Result<Vec<StoryRecord>, RepositoryError> {
        let rows: Vec<StoryRow> = self
            .client
            .select(STORIES, &[("order", "created_at.desc".to_string())])
            .await?;
        Ok(rows.into_iter().map(StoryRecord::from).collect())
    }
}

/// 托管数据库章节仓储
pub struct RestChapterRepository {
    client: Arc<PostgrestClient>,
}

impl RestChapterRepository {
    pub fn new(client: Arc<PostgrestClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ChapterRepositoryPort for RestChapterRepository {
    async fn insert(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        self.client.insert(CHAPTERS, &ChapterRow::from(chapter)).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = self.client.select(CHAPTERS, &[eq("id", id)]).await?;
        rows.into_iter().next().map(ChapterRecord::try_from).transpose()
    }

    async fn find_by_story(&self, story_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = self
            .client
            .select(
                CHAPTERS,
                &[
                    eq("story_id", story_id),
                    ("order", "created_at.asc".to_string()),
                ],
            )
            .await?;
        rows.into_iter().map(ChapterRecord::try_from).collect()
    }

    async fn update_content(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<bool, RepositoryError> {
        let patch = ContentPatch { title, content };
        let affected = self.client.update(CHAPTERS, &[eq("id", id)], &patch).await?;
        Ok(affected > 0)
    }

    async fn set_status(&self, id: Uuid, status: ChapterStatus) -> Result<bool, RepositoryError> {
        let patch = StatusPatch {
            status: status.as_str(),
        };
        let affected = self.client.update(CHAPTERS, &[eq("id", id)], &patch).await?;
        Ok(affected > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let affected = self.client.delete(CHAPTERS, &[eq("id", id)]).await?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::adapters::rest::RestClientConfig;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> Arc<PostgrestClient> {
        Arc::new(PostgrestClient::new(RestClientConfig::new(server.uri(), "anon-key")).unwrap())
    }

    #[tokio::test]
    async fn test_find_by_story_filters_and_orders() {
        let server = MockServer::start().await;
        let story_id = Uuid::new_v4();
        let chapter_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path("/rest/v1/chapters"))
            .and(header("apikey", "anon-key"))
            .and(header("authorization", "Bearer anon-key"))
            .and(query_param("story_id", format!("eq.{}", story_id)))
            .and(query_param("order", "created_at.asc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": chapter_id,
                "story_id": story_id,
                "title": "Chapter 1",
                "content": null,
                "status": "draft",
                "created_at": "2024-05-01T10:00:00Z"
            }])))
            .mount(&server)
            .await;

        let repo = RestChapterRepository::new(client(&server));
        let chapters = repo.find_by_story(story_id).await.unwrap();

        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].id, chapter_id);
        assert_eq!(chapters[0].content, "");
        assert_eq!(chapters[0].status, ChapterStatus::Draft);
        assert_eq!(chapters[0].updated_at, chapters[0].created_at);
    }

    #[tokio::test]
    async fn test_update_missing_row_reports_false() {
        let server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/chapters"))
            .and(header("prefer", "return=representation"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let repo = RestChapterRepository::new(client(&server));
        let touched = repo
            .update_content(Uuid::new_v4(), "t", "<p>x</p>")
            .await
            .unwrap();
        assert!(!touched);
    }

    #[tokio::test]
    async fn test_writes_only_send_known_columns() {
        let server = MockServer::start().await;
        let id = Uuid::new_v4();

        Mock::given(method("PATCH"))
            .and(path("/rest/v1/chapters"))
            .and(query_param("id", format!("eq.{}", id)))
            .and(body_json(json!({"title": "Chapter 1", "content": "<p>x</p>"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": id}])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/rest/v1/chapters"))
            .and(body_json(json!({"status": "published"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": id}])))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/chapters"))
            .respond_with(ResponseTemplate::new(201))
            .mount(&server)
            .await;

        let repo = RestChapterRepository::new(client(&server));
        assert!(repo.update_content(id, "Chapter 1", "<p>x</p>").await.unwrap());
        assert!(repo.set_status(id, ChapterStatus::Published).await.unwrap());

        let record = ChapterRecord {
            id,
            story_id: Uuid::new_v4(),
            title: "Chapter 1".to_string(),
            content: String::new(),
            status: ChapterStatus::Draft,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        repo.insert(&record).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        let inserted: serde_json::Value = requests
            .iter()
            .find(|r| r.method.as_str() == "POST")
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .unwrap();
        assert!(inserted.get("updated_at").is_none());
        assert_eq!(inserted["status"], "draft");
    }

    #[tokio::test]
    async fn test_error_message_is_surfaced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/stories"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({"message": "null value in column \"title\""})),
            )
            .mount(&server)
            .await;

        let repo = RestStoryRepository::new(client(&server));
        let record = StoryRecord {
            id: Uuid::new_v4(),
            title: "x".to_string(),
            description: String::new(),
            created_at: Utc::now(),
        };
        match repo.insert(&record).await {
            Err(RepositoryError::DatabaseError(message)) => {
                assert!(message.contains("null value in column"))
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_conflict_maps_to_duplicate() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/rest/v1/chapters"))
            .respond_with(
                ResponseTemplate::new(409).set_body_json(json!({"message": "duplicate key"})),
            )
            .mount(&server)
            .await;

        let repo = RestChapterRepository::new(client(&server));
        let record = ChapterRecord {
            id: Uuid::new_v4(),
            story_id: Uuid::new_v4(),
            title: "t".to_string(),
            content: String::new(),
            status: ChapterStatus::Draft,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(matches!(
            repo.insert(&record).await,
            Err(RepositoryError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_find_all_stories() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/rest/v1/stories"))
            .and(query_param("order", "created_at.desc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
                "id": Uuid::new_v4(),
                "title": "Test",
                "description": null,
                "created_at": "2024-05-01T10:00:00+00:00"
            }])))
            .mount(&server)
            .await;

        let stories = RestStoryRepository::new(client(&server))
            .find_all()
            .await
            .unwrap();
        assert_eq!(stories.len(), 1);
        assert_eq!(stories[0].description, "");
    }
}
