//! 가격 시계열.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 단일 종가 샘플.
///
/// 시세 API는 휴장일 등에 `null` 종가를 돌려주므로 종가는 `Option`입니다.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// 샘플 시각 (알 수 없으면 `None`)
    pub time: Option<DateTime<Utc>>,
    /// 종가 (누락되면 `None`)
    pub close: Option<f64>,
}

impl PriceSample {
    /// 시각과 종가로 샘플을 생성합니다.
    pub fn new(time: Option<DateTime<Utc>>, close: Option<f64>) -> Self {
        Self { time, close }
    }

    /// 시각 없이 종가만으로 샘플을 생성합니다.
    pub fn close(value: f64) -> Self {
        Self {
            time: None,
            close: Some(value),
        }
    }

    /// 누락된 샘플을 생성합니다.
    pub fn missing() -> Self {
        Self {
            time: None,
            close: None,
        }
    }

    /// 유효한 종가를 반환합니다. NaN/무한대는 무효로 취급합니다.
    pub fn valid_close(&self) -> Option<f64> {
        self.close.filter(|v| v.is_finite())
    }

    /// 유효한 샘플인지 확인합니다.
    pub fn is_valid(&self) -> bool {
        self.valid_close().is_some()
    }
}

/// 한 심볼의 시간순(오래된 것 먼저) 종가 시계열.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries {
    /// 심볼 (대문자)
    pub symbol: String,
    /// 샘플 목록
    pub samples: Vec<PriceSample>,
}

impl PriceSeries {
    /// 빈 시계열을 생성합니다.
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            samples: Vec::new(),
        }
    }

    /// 샘플 목록으로 시계열을 생성합니다.
    pub fn with_samples(symbol: impl Into<String>, samples: Vec<PriceSample>) -> Self {
        Self {
            symbol: symbol.into(),
            samples,
        }
    }

    /// 종가 목록으로 시계열을 생성합니다. 테스트와 CLI 드라이런에서 사용합니다.
    pub fn from_closes(symbol: impl Into<String>, closes: impl IntoIterator<Item = f64>) -> Self {
        Self {
            symbol: symbol.into(),
            samples: closes.into_iter().map(PriceSample::close).collect(),
        }
    }

    /// 샘플을 추가합니다.
    pub fn push(&mut self, sample: PriceSample) {
        self.samples.push(sample);
    }

    /// 전체 샘플 수 (무효 샘플 포함).
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// 샘플이 없는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 순서를 유지한 채 유효한 종가만 반환합니다.
    pub fn valid_closes(&self) -> Vec<f64> {
        self.samples.iter().filter_map(PriceSample::valid_close).collect()
    }

    /// 유효한 샘플 수.
    pub fn valid_len(&self) -> usize {
        self.samples.iter().filter(|s| s.is_valid()).count()
    }

    /// 윈도우 길이만큼 유효 샘플이 있는지 확인합니다.
    pub fn is_sufficient(&self, window: usize) -> bool {
        window > 0 && self.valid_len() >= window
    }
}
