use async_trait::async_trait;
use narration_backend::error::AppResult;
use narration_backend::infrastructure::repositories::NarrationRecordRepository;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Topic narration URLs kept in memory instead of Postgres.
#[derive(Default)]
pub struct InMemoryRecordRepository {
    urls: Mutex<HashMap<i64, String>>,
    attach_calls: AtomicUsize,
}

impl InMemoryRecordRepository {
    pub fn get(&self, topic_id: i64) -> Option<String> {
        self.urls.lock().unwrap().get(&topic_id).cloned()
    }

    pub fn attach_calls(&self) -> usize {
        self.attach_calls.load(Ordering::SeqCst)
    }

    /// Polls until the detached job attaches a URL or the timeout passes.
    pub async fn wait_for(&self, topic_id: i64, timeout: Duration) -> Option<String> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            if let Some(url) = self.get(topic_id) {
                return Some(url);
            }
            if tokio::time::Instant::now() >= deadline {
                return None;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

#[async_trait]
impl NarrationRecordRepository for InMemoryRecordRepository {
    async fn attach_narration(&self, topic_id: i64, audio_url: &str) -> AppResult<()> {
        self.attach_calls.fetch_add(1, Ordering::SeqCst);
        self.urls
            .lock()
            .unwrap()
            .insert(topic_id, audio_url.to_string());
        Ok(())
    }
}
