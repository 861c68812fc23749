//! 봇 전반의 에러 타입.
//!
//! 개별 포트 에러(`FetchError`, `SignalError`, `PersistenceError`)는 각 도메인
//! 모듈에 있고, 이 모듈은 이를 묶는 최상위 에러를 정의합니다.

use thiserror::Error;

use crate::domain::{FetchError, PersistenceError, SignalError};

/// 핵심 봇 에러.
#[derive(Debug, Error)]
pub enum BotError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 시세 조회 에러
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// 신호 계산 에러
    #[error(transparent)]
    Signal(#[from] SignalError),

    /// 저장소 에러
    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 봇 작업을 위한 Result 타입.
pub type BotResult<T> = Result<T, BotError>;

impl From<serde_json::Error> for BotError {
    fn from(err: serde_json::Error) -> Self {
        BotError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for BotError {
    fn from(err: config::ConfigError) -> Self {
        BotError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_is_transparent() {
        let err = BotError::from(FetchError::UnknownSymbol("ZZZZ".to_string()));
        assert_eq!(err.to_string(), FetchError::UnknownSymbol("ZZZZ".to_string()).to_string());

        let err = BotError::from(SignalError::InsufficientData {
            required: 200,
            available: 12,
        });
        assert!(matches!(err, BotError::Signal(_)));
    }

    #[test]
    fn test_error_from_config() {
        let err = BotError::from(config::ConfigError::Message("missing".to_string()));
        assert!(matches!(err, BotError::Config(_)));
        assert!(err.to_string().contains("missing"));
    }
}
