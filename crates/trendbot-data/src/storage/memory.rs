//! 메모리 저장소. CLI 드라이런과 테스트에서 사용합니다.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use trendbot_core::{ErrorSink, LogEntry, LogSink, PersistenceError, SnapshotSink, TrendSignal};

use super::format_error_line;

#[derive(Debug, Default)]
pub struct MemoryJournal {
    entries: RwLock<Vec<LogEntry>>,
    errors: RwLock<Vec<String>>,
    snapshot: RwLock<Option<TrendSignal>>,
}

impl MemoryJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// 기록된 메시지 로그.
    pub async fn entries(&self) -> Vec<LogEntry> {
        self.entries.read().await.clone()
    }

    /// 기록된 에러 로그 줄.
    pub async fn errors(&self) -> Vec<String> {
        self.errors.read().await.clone()
    }

    /// 마지막 스냅샷.
    pub async fn snapshot(&self) -> Option<TrendSignal> {
        self.snapshot.read().await.clone()
    }
}

#[async_trait]
impl LogSink for MemoryJournal {
    async fn append(&self, entry: &LogEntry) -> Result<(), PersistenceError> {
        self.entries.write().await.push(entry.clone());
        Ok(())
    }
}

#[async_trait]
impl ErrorSink for MemoryJournal {
    async fn append(&self, message: &str, context: &str) -> Result<(), PersistenceError> {
        self.errors
            .write()
            .await
            .push(format_error_line(Utc::now(), context, message));
        Ok(())
    }
}

#[async_trait]
impl SnapshotSink for MemoryJournal {
    async fn record(&self, signal: &TrendSignal) -> Result<(), PersistenceError> {
        *self.snapshot.write().await = Some(signal.clone());
        Ok(())
    }
}
