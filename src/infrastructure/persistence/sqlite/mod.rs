//! SQLite Persistence - SQLite 数据库持久化实现

mod chapter_repo;
mod database;
mod story_repo;

pub use chapter_repo::*;
pub use database::*;
pub use story_repo::*;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::application::ports::RepositoryError;

/// 时间戳统一为固定精度的 RFC3339（UTC），保证字符串顺序即时间顺序
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| RepositoryError::SerializationError(e.to_string()))
}

fn db_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::DatabaseError(e.to_string())
}
