//! Per-story exclusive sections.

use fabula_core::StoryId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Held while a story is being mutated; dropping it releases the story.
pub type StoryGuard = OwnedMutexGuard<()>;

/// Registry of per-story mutexes.
///
/// Cloning shares the registry. Every component that mutates a story must
/// acquire through the same registry.
///
/// # Examples
///
/// ```
/// use fabula_core::StoryId;
/// use fabula_narrative::StoryLocks;
///
/// # #[tokio::main]
/// # async fn main() {
/// let locks = StoryLocks::new();
/// let story = StoryId::new();
///
/// let guard = locks.acquire(story).await;
/// assert!(locks.try_acquire(story).await.is_none());
/// drop(guard);
/// assert!(locks.try_acquire(story).await.is_some());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StoryLocks {
    inner: Arc<Mutex<HashMap<StoryId, Arc<Mutex<()>>>>>,
}

impl StoryLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `story_id`.
    pub async fn acquire(&self, story_id: StoryId) -> StoryGuard {
        let lock = self.entry(story_id).await;
        tracing::trace!(story_id = %story_id, "Acquiring story lock");
        lock.lock_owned().await
    }

    /// Take exclusive access to `story_id` if nobody holds it.
    pub async fn try_acquire(&self, story_id: StoryId) -> Option<StoryGuard> {
        self.entry(story_id).await.try_lock_owned().ok()
    }

    async fn entry(&self, story_id: StoryId) -> Arc<Mutex<()>> {
        let mut map = self.inner.lock().await;
        // Entries only the registry references are idle
        map.retain(|id, lock| *id == story_id || Arc::strong_count(lock) > 1);
        map.entry(story_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
