//! 알림 에러 및 전송 trait 정의.

use async_trait::async_trait;
use trendbot_core::{BotError, LogEntry};

/// 알림 작업용 Result 타입.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// 알림 에러.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("알림 전송 실패: {0}")]
    SendFailed(String),

    /// 메시징 API가 요청을 거부함
    #[error("API 에러 (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("잘못된 설정: {0}")]
    InvalidConfig(String),

    #[error("요청 한도 초과: {0}초 후 재시도")]
    RateLimited(u64),

    #[error("네트워크 에러: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("직렬화 에러: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// 시세 조회/신호 계산 실패
    #[error("데이터 에러: {0}")]
    Data(#[from] BotError),

    /// 외부 핸들러를 사용할 수 없음
    #[error("핸들러 사용 불가: {0}")]
    Unavailable(String),
}

/// 응답 토큰으로 메시지를 보내는 전송기.
#[async_trait]
pub trait ReplyTransport: Send + Sync {
    /// 한 번의 응답으로 메시지 묶음을 전송합니다.
    async fn reply(&self, reply_token: &str, messages: &[String]) -> NotificationResult<()>;
}

/// 수신자 ID로 메시지를 보내는 전송기. 정기 알림에서 사용합니다.
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn push(&self, to: &str, messages: &[String]) -> NotificationResult<()>;
}

/// 도우미 호출 핸들러 (선택 기능).
#[async_trait]
pub trait AssistantHandler: Send + Sync {
    /// 도우미 응답 메시지를 반환합니다.
    async fn handle(&self, message: &LogEntry) -> NotificationResult<Vec<String>>;
}
