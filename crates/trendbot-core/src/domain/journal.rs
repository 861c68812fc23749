//! 로그/에러/스냅샷 저장 포트.
//!
//! 모두 best-effort 추가 기록이며, 실패해도 사용자 응답을 막지 않습니다.

use async_trait::async_trait;
use thiserror::Error;

use super::message::LogEntry;
use super::signal::TrendSignal;

/// 저장소 에러.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O 에러: {0}")]
    Io(#[from] std::io::Error),

    #[error("기록 에러: {0}")]
    Write(String),

    /// 저장소를 사용할 수 없음
    #[error("저장소 사용 불가: {0}")]
    Unavailable(String),
}

/// 메시지 로그 저장소.
#[async_trait]
pub trait LogSink: Send + Sync {
    async fn append(&self, entry: &LogEntry) -> Result<(), PersistenceError>;
}

/// 에러 로그 저장소.
#[async_trait]
pub trait ErrorSink: Send + Sync {
    /// `[시각] context: message` 형태로 기록합니다.
    async fn append(&self, message: &str, context: &str) -> Result<(), PersistenceError>;
}

/// 최신 가격 스냅샷 저장소.
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    /// 최신 신호로 스냅샷을 갱신합니다.
    async fn record(&self, signal: &TrendSignal) -> Result<(), PersistenceError>;
}
