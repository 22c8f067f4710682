//! SQLite Chapter Repository

use async_trait::async_trait;
use chrono::Utc;
use sqlx::FromRow;
use uuid::Uuid;

use super::{db_error, format_timestamp, parse_timestamp, DbPool};
use crate::application::ports::{ChapterRecord, ChapterRepositoryPort, RepositoryError};
use crate::domain::chapter::ChapterStatus;

/// SQLite Chapter Repository
pub struct SqliteChapterRepository {
    pool: DbPool,
}

impl SqliteChapterRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct ChapterRow {
    id: String,
    story_id: String,
    title: String,
    content: String,
    status: String,
    created_at: String,
    updated_at: String,
}

impl TryFrom<ChapterRow> for ChapterRecord {
    type Error = RepositoryError;

    fn try_from(row: ChapterRow) -> Result<Self, Self::Error> {
        Ok(ChapterRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            story_id: Uuid::parse_str(&row.story_id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            title: row.title,
            content: row.content,
            status: ChapterStatus::parse(&row.status)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        })
    }
}

const SELECT_COLUMNS: &str =
    "SELECT id, story_id, title, content, status, created_at, updated_at FROM chapters";

#[async_trait]
impl ChapterRepositoryPort for SqliteChapterRepository {
    async fn insert(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO chapters (id, story_id, title, content, status, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(chapter.id.to_string())
        .bind(chapter.story_id.to_string())
        .bind(&chapter.title)
        .bind(&chapter.content)
        .bind(chapter.status.as_str())
        .bind(format_timestamp(&chapter.created_at))
        .bind(format_timestamp(&chapter.updated_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(chapter.id.to_string())
            }
            other => db_error(other),
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError> {
        let row: Option<ChapterRow> = sqlx::query_as(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        row.map(ChapterRecord::try_from).transpose()
    }

    async fn find_by_story(&self, story_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let rows: Vec<ChapterRow> = sqlx::query_as(&format!(
            "{} WHERE story_id = ? ORDER BY created_at ASC, rowid ASC",
            SELECT_COLUMNS
        ))
        .bind(story_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(ChapterRecord::try_from).collect()
    }

    async fn update_content(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<bool, RepositoryError> {
        // UPDATE 不会插入：行已被删除时 rows_affected 为 0
        let result = sqlx::query(
            "UPDATE chapters SET title = ?, content = ?, updated_at = ? WHERE id = ?",
        )
        .bind(title)
        .bind(content)
        .bind(format_timestamp(&Utc::now()))
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn set_status(&self, id: Uuid, status: ChapterStatus) -> Result<bool, RepositoryError> {
        let result = sqlx::query("UPDATE chapters SET status = ?, updated_at = ? WHERE id = ?")
            .bind(status.as_str())
            .bind(format_timestamp(&Utc::now()))
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM chapters WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{StoryRecord, StoryRepositoryPort};
    use crate::domain::chapter::Chapter;
    use crate::domain::story::{Description, Story, StoryId, StoryTitle};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteStoryRepository,
    };

    async fn setup() -> (SqliteChapterRepository, StoryId) {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let story = Story::new(StoryTitle::new("Test").unwrap(), Description::new(None));
        SqliteStoryRepository::new(pool.clone())
            .insert(&StoryRecord::from(&story))
            .await
            .unwrap();

        (SqliteChapterRepository::new(pool), story.id())
    }

    #[tokio::test]
    async fn test_chapters_ordered_by_creation() {
        let (repo, story_id) = setup().await;
        let first = ChapterRecord::from(&Chapter::first_of(story_id));
        let second = ChapterRecord::from(&Chapter::untitled(story_id));
        repo.insert(&first).await.unwrap();
        repo.insert(&second).await.unwrap();

        let chapters = repo.find_by_story(*story_id.as_uuid()).await.unwrap();
        let ids: Vec<Uuid> = chapters.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
        assert_eq!(chapters[0].content, "");
        assert_eq!(chapters[1].content, "<p></p>");

        assert!(repo.find_by_story(Uuid::new_v4()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_content_and_status() {
        let (repo, story_id) = setup().await;
        let chapter = ChapterRecord::from(&Chapter::untitled(story_id));
        repo.insert(&chapter).await.unwrap();

        assert!(repo
            .update_content(chapter.id, "Renamed", "<p>Hello world</p>")
            .await
            .unwrap());
        assert!(repo
            .set_status(chapter.id, ChapterStatus::Published)
            .await
            .unwrap());
        // 重复发布仍然成功
        assert!(repo
            .set_status(chapter.id, ChapterStatus::Published)
            .await
            .unwrap());

        let stored = repo.find_by_id(chapter.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Renamed");
        assert_eq!(stored.content, "<p>Hello world</p>");
        assert_eq!(stored.status, ChapterStatus::Published);
        assert!(stored.updated_at >= stored.created_at);
    }

    #[tokio::test]
    async fn test_update_after_delete_does_not_reinsert() {
        let (repo, story_id) = setup().await;
        let chapter = ChapterRecord::from(&Chapter::untitled(story_id));
        repo.insert(&chapter).await.unwrap();

        assert!(repo.delete(chapter.id).await.unwrap());
        assert!(!repo.delete(chapter.id).await.unwrap());
        assert!(!repo
            .update_content(chapter.id, "Ghost", "<p>late</p>")
            .await
            .unwrap());
        assert!(repo.find_by_id(chapter.id).await.unwrap().is_none());
    }
}
