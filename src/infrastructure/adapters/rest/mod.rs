//! Hosted Database Adapter - PostgREST 风格的托管数据库

mod client;
mod repositories;

pub use client::{PostgrestClient, RestClientConfig};
pub use repositories::{RestChapterRepository, RestStoryRepository};
