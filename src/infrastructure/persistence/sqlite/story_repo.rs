//! SQLite Story Repository

use async_trait::async_trait;
use sqlx::FromRow;
use uuid::Uuid;

use super::{db_error, format_timestamp, parse_timestamp, DbPool};
use crate::application::ports::{RepositoryError, StoryRecord, StoryRepositoryPort};

/// SQLite Story Repository
pub struct SqliteStoryRepository {
    pool: DbPool,
}

impl SqliteStoryRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct StoryRow {
    id: String,
    title: String,
    description: String,
    created_at: String,
}

impl TryFrom<StoryRow> for StoryRecord {
    type Error = RepositoryError;

    fn try_from(row: StoryRow) -> Result<Self, Self::Error> {
        Ok(StoryRecord {
            id: Uuid::parse_str(&row.id)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?,
            title: row.title,
            description: row.description,
            created_at: parse_timestamp(&row.created_at)?,
        })
    }
}

#[async_trait]
impl StoryRepositoryPort for SqliteStoryRepository {
    async fn insert(&self, story: &StoryRecord) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO stories (id, title, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(story.id.to_string())
        .bind(&story.title)
        .bind(&story.description)
        .bind(format_timestamp(&story.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepositoryError::Duplicate(story.id.to_string())
            }
            other => db_error(other),
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoryRecord>, RepositoryError> {
        let row: Option<StoryRow> = sqlx::query_as(
            "SELECT id, title, description, created_at FROM stories WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error)?;

        row.map(StoryRecord::try_from).transpose()
    }

    async fn find_all(&self) -> Result<Vec<StoryRecord>, RepositoryError> {
        let rows: Vec<StoryRow> = sqlx::query_as(
            "SELECT id, title, description, created_at FROM stories ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        rows.into_iter().map(StoryRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::story::{Description, Story, StoryTitle};
    use crate::infrastructure::persistence::sqlite::{create_pool, run_migrations, DatabaseConfig};

    async fn repo() -> SqliteStoryRepository {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        SqliteStoryRepository::new(pool)
    }

    fn record(title: &str, description: Option<&str>) -> StoryRecord {
        StoryRecord::from(&Story::new(
            StoryTitle::new(title).unwrap(),
            Description::new(description),
        ))
    }

    #[tokio::test]
    async fn test_insert_and_find() {
        let repo = repo().await;
        let story = record("Test", Some("A short tale"));
        repo.insert(&story).await.unwrap();

        let found = repo.find_by_id(story.id).await.unwrap().unwrap();
        assert_eq!(found.title, "Test");
        assert_eq!(found.description, "A short tale");
        assert_eq!(
            found.created_at.timestamp_micros(),
            story.created_at.timestamp_micros()
        );

        assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
        assert!(matches!(
            repo.insert(&story).await,
            Err(RepositoryError::Duplicate(_))
        ));
    }

    #[tokio::test]
    async fn test_find_all_newest_first() {
        let repo = repo().await;
        assert!(repo.find_all().await.unwrap().is_empty());

        let older = record("Older", None);
        let newer = record("Newer", None);
        repo.insert(&older).await.unwrap();
        repo.insert(&newer).await.unwrap();

        let titles: Vec<String> = repo
            .find_all()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Newer", "Older"]);
    }
}
