//! 시세 조회 포트.
//!
//! 심볼의 과거 종가 시계열을 가져오는 외부 협력자를 추상화합니다.
//! 구현체는 `trendbot-data`에 있습니다.

use async_trait::async_trait;
use thiserror::Error;

use super::price::PriceSeries;

// ==================== 에러 타입 ====================

/// 시세 조회 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// 네트워크 에러 (타임아웃, 연결 실패, 5xx)
    #[error("네트워크 에러: {0}")]
    Network(String),

    /// 존재하지 않는 심볼
    #[error("알 수 없는 심볼: {0}")]
    UnknownSymbol(String),

    /// 응답 형식 오류
    #[error("잘못된 응답: {0}")]
    Malformed(String),
}

// ==================== Provider Trait ====================

/// 과거 종가 시계열 제공자.
#[async_trait]
pub trait PriceSeriesClient: Send + Sync {
    /// 제공자 이름.
    fn name(&self) -> &str;

    /// 심볼의 시간순 종가 시계열을 가져옵니다.
    async fn fetch(&self, symbol: &str) -> Result<PriceSeries, FetchError>;
}
