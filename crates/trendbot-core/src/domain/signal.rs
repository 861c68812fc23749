//! 이동평균 추세 신호.
//!
//! 최근 종가와 단순 이동평균(SMA)을 비교해 "이평선 하회" 여부를 판정합니다.
//! I/O가 없는 순수 계산이며, 수동 조회와 정기 알림이 같은 엔진을 사용합니다.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::price::PriceSeries;

/// 기본 이동평균 윈도우 (주봉 200개).
pub const DEFAULT_SMA_WINDOW: usize = 200;

/// 신호 계산 에러.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// 유효 샘플이 윈도우보다 적음
    #[error("데이터 부족: {required}개 필요, 유효 샘플 {available}개")]
    InsufficientData { required: usize, available: usize },

    /// 윈도우 길이가 0
    #[error("잘못된 이동평균 윈도우: {0}")]
    InvalidWindow(usize),
}

/// 추세 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendStatus {
    /// 종가가 이동평균 아래 (매수 신호)
    Below,
    /// 종가가 이동평균 이상
    Safe,
}

impl TrendStatus {
    /// 짧은 식별자.
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendStatus::Below => "below",
            TrendStatus::Safe => "safe",
        }
    }
}

/// 계산된 추세 신호. 호출마다 새로 생성되며 불변입니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSignal {
    /// 심볼 (대문자)
    pub symbol: String,
    /// 마지막 유효 종가
    pub last_close: f64,
    /// 최근 `window`개 유효 종가의 산술평균 (마지막 종가 포함)
    pub moving_average: f64,
    /// 이동평균 윈도우
    pub window: usize,
    /// `last_close < moving_average`
    pub below_average: bool,
    /// 마지막 유효 샘플 시각
    pub last_close_time: Option<DateTime<Utc>>,
    /// 계산 시각
    pub computed_at: DateTime<Utc>,
}

impl TrendSignal {
    /// 추세 상태.
    pub fn status(&self) -> TrendStatus {
        if self.below_average {
            TrendStatus::Below
        } else {
            TrendStatus::Safe
        }
    }

    /// 모든 수치가 유한한지 확인합니다.
    pub fn is_finite(&self) -> bool {
        self.last_close.is_finite() && self.moving_average.is_finite()
    }
}

/// 이동평균 신호 엔진.
#[derive(Debug, Clone, Copy)]
pub struct SignalEngine {
    window: usize,
}

impl Default for SignalEngine {
    fn default() -> Self {
        Self {
            window: DEFAULT_SMA_WINDOW,
        }
    }
}

impl SignalEngine {
    /// 주어진 윈도우로 엔진을 생성합니다.
    pub fn new(window: usize) -> Self {
        Self { window }
    }

    /// 이동평균 윈도우.
    pub fn window(&self) -> usize {
        self.window
    }

    /// 시계열로부터 신호를 계산합니다.
    pub fn compute(&self, symbol: &str, series: &PriceSeries) -> Result<TrendSignal, SignalError> {
        compute_signal(symbol, series, self.window)
    }
}

/// 시계열로부터 추세 신호를 계산합니다.
///
/// 무효 샘플(누락, NaN, 무한대)을 순서를 유지하며 걸러낸 뒤, 마지막 유효
/// 종가와 최근 `window`개 유효 종가의 평균을 비교합니다. 같으면 하회가
/// 아닙니다.
pub fn compute_signal(
    symbol: &str,
    series: &PriceSeries,
    window: usize,
) -> Result<TrendSignal, SignalError> {
    if window == 0 {
        return Err(SignalError::InvalidWindow(window));
    }

    if !series.is_sufficient(window) {
        return Err(SignalError::InsufficientData {
            required: window,
            available: series.valid_len(),
        });
    }

    let valid: Vec<_> = series.samples.iter().filter(|s| s.is_valid()).collect();

    let recent = &valid[valid.len() - window..];
    let sum: f64 = recent.iter().filter_map(|s| s.valid_close()).sum();
    let moving_average = sum / window as f64;

    let last = recent[recent.len() - 1];
    let last_close = last.valid_close().unwrap_or(f64::NAN);

    Ok(TrendSignal {
        symbol: symbol.trim().to_uppercase(),
        last_close,
        moving_average,
        window,
        below_average: last_close < moving_average,
        last_close_time: last.time,
        computed_at: Utc::now(),
    })
}
