//! In-Memory Story / Chapter Store
//!
//! 进程内存储，`storage.backend = "memory"` 时使用，也用于测试。
//! 排序依据插入序号，同一时间戳内的顺序保持稳定。

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use crate::application::ports::{
    ChapterRecord, ChapterRepositoryPort, RepositoryError, StoryRecord, StoryRepositoryPort,
};
use crate::domain::chapter::ChapterStatus;

/// 内存作品仓储
#[derive(Default)]
pub struct InMemoryStoryStore {
    stories: DashMap<Uuid, (u64, StoryRecord)>,
    seq: AtomicU64,
}

impl InMemoryStoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl StoryRepositoryPort for InMemoryStoryStore {
    async fn insert(&self, story: &StoryRecord) -> Result<(), RepositoryError> {
        match self.stories.entry(story.id) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(story.id.to_string())),
            Entry::Vacant(slot) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                slot.insert((seq, story.clone()));
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<StoryRecord>, RepositoryError> {
        Ok(self.stories.get(&id).map(|entry| entry.1.clone()))
    }

    async fn find_all(&self) -> Result<Vec<StoryRecord>, RepositoryError> {
        let mut stories: Vec<(u64, StoryRecord)> =
            self.stories.iter().map(|e| e.value().clone()).collect();
        stories.sort_by(|a, b| {
            b.1.created_at
                .cmp(&a.1.created_at)
                .then_with(|| b.0.cmp(&a.0))
        });
        Ok(stories.into_iter().map(|(_, s)| s).collect())
    }
}

/// 内存章节仓储
#[derive(Default)]
pub struct InMemoryChapterStore {
    chapters: DashMap<Uuid, (u64, ChapterRecord)>,
    seq: AtomicU64,
}

impl InMemoryChapterStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn len(&self) -> usize {
        self.chapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chapters.is_empty()
    }
}

#[async_trait]
impl ChapterRepositoryPort for InMemoryChapterStore {
    async fn insert(&self, chapter: &ChapterRecord) -> Result<(), RepositoryError> {
        match self.chapters.entry(chapter.id) {
            Entry::Occupied(_) => Err(RepositoryError::Duplicate(chapter.id.to_string())),
            Entry::Vacant(slot) => {
                let seq = self.seq.fetch_add(1, Ordering::Relaxed);
                slot.insert((seq, chapter.clone()));
                Ok(())
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<ChapterRecord>, RepositoryError> {
        Ok(self.chapters.get(&id).map(|entry| entry.1.clone()))
    }

    async fn find_by_story(&self, story_id: Uuid) -> Result<Vec<ChapterRecord>, RepositoryError> {
        let mut chapters: Vec<(u64, ChapterRecord)> = self
            .chapters
            .iter()
            .filter(|e| e.1.story_id == story_id)
            .map(|e| e.value().clone())
            .collect();
        chapters.sort_by(|a, b| {
            a.1.created_at
                .cmp(&b.1.created_at)
                .then_with(|| a.0.cmp(&b.0))
        });
        Ok(chapters.into_iter().map(|(_, c)| c).collect())
    }

    async fn update_content(
        &self,
        id: Uuid,
        title: &str,
        content: &str,
    ) -> Result<bool, RepositoryError> {
        match self.chapters.get_mut(&id) {
            Some(mut entry) => {
                entry.1.title = title.to_string();
                entry.1.content = content.to_string();
                entry.1.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn set_status(&self, id: Uuid, status: ChapterStatus) -> Result<bool, RepositoryError> {
        match self.chapters.get_mut(&id) {
            Some(mut entry) => {
                entry.1.status = status;
                entry.1.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        Ok(self.chapters.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chapter::Chapter;
    use crate::domain::story::{Description, Story, StoryId, StoryTitle};

    fn story(title: &str) -> StoryRecord {
        StoryRecord::from(&Story::new(
            StoryTitle::new(title).unwrap(),
            Description::new(None),
        ))
    }

    #[tokio::test]
    async fn test_stories_newest_first() {
        let store = InMemoryStoryStore::new();
        let first = story("First");
        let second = story("Second");
        store.insert(&first).await.unwrap();
        store.insert(&second).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all[0].id, second.id);
        assert_eq!(all[1].id, first.id);

        assert!(matches!(
            store.insert(&first).await,
            Err(RepositoryError::Duplicate(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_duplicate_insert_admits_one() {
        let store = InMemoryChapterStore::new().arc();
        let record = ChapterRecord::from(&Chapter::untitled(StoryId::new()));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let store = store.clone();
                let record = record.clone();
                tokio::spawn(async move { store.insert(&record).await })
            })
            .collect();

        let mut inserted = 0;
        for task in tasks {
            match task.await.unwrap() {
                Ok(()) => inserted += 1,
                Err(RepositoryError::Duplicate(_)) => {}
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(inserted, 1);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_chapters_oldest_first_and_scoped() {
        let store = InMemoryChapterStore::new();
        let story_id = StoryId::new();
        let a = ChapterRecord::from(&Chapter::first_of(story_id));
        let b = ChapterRecord::from(&Chapter::untitled(story_id));
        let other = ChapterRecord::from(&Chapter::untitled(StoryId::new()));
        for c in [&a, &b, &other] {
            store.insert(c).await.unwrap();
        }

        let ids: Vec<Uuid> = store
            .find_by_story(*story_id.as_uuid())
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_writes_to_missing_chapter_report_false() {
        let store = InMemoryChapterStore::new();
        let chapter = ChapterRecord::from(&Chapter::untitled(StoryId::new()));
        store.insert(&chapter).await.unwrap();

        assert!(store.delete(chapter.id).await.unwrap());
        assert!(!store.delete(chapter.id).await.unwrap());
        assert!(!store
            .update_content(chapter.id, "t", "<p>x</p>")
            .await
            .unwrap());
        assert!(!store
            .set_status(chapter.id, ChapterStatus::Published)
            .await
            .unwrap());
        assert!(store.find_by_id(chapter.id).await.unwrap().is_none());
    }
}
