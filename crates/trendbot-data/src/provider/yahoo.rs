//! Yahoo Finance chart API v8 종가 시계열 제공자.
//!
//! `GET {chart_url}/{SYMBOL}?interval=1wk&range=5y` 응답의
//! `chart.result[0].indicators.quote[0].close`를 시간순 시계열로 변환합니다.
//! `null` 종가는 누락 샘플로 유지되고 신호 엔진에서 걸러집니다.

use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use trendbot_core::{FetchError, PriceSample, PriceSeries, PriceSeriesClient, StockConfig};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Yahoo chart 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct YahooChartConfig {
    /// chart API 기본 URL (심볼 경로 앞부분)
    pub base_url: String,
    /// 봉 간격
    pub interval: String,
    /// 조회 기간
    pub range: String,
    /// 요청 타임아웃
    pub timeout: Duration,
}

impl Default for YahooChartConfig {
    fn default() -> Self {
        Self::from(&StockConfig::default())
    }
}

impl From<&StockConfig> for YahooChartConfig {
    fn from(config: &StockConfig) -> Self {
        Self {
            base_url: config.chart_url.clone(),
            interval: config.interval.clone(),
            range: config.range.clone(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Yahoo Finance chart API v8 응답 구조
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    timestamp: Option<Vec<i64>>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    close: Option<Vec<Option<f64>>>,
}

/// Yahoo Finance 종가 시계열 클라이언트.
#[derive(Debug, Clone)]
pub struct YahooChartClient {
    client: Client,
    config: YahooChartConfig,
}

impl YahooChartClient {
    /// 새 클라이언트를 생성합니다.
    pub fn new(config: YahooChartConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|e| FetchError::Network(format!("HTTP 클라이언트 생성 실패: {}", e)))?;

        Ok(Self { client, config })
    }

    /// 설정 섹션에서 클라이언트를 생성합니다.
    pub fn from_config(config: &StockConfig) -> Result<Self, FetchError> {
        Self::new(YahooChartConfig::from(config))
    }

    /// 심볼의 chart 요청 URL.
    pub fn chart_url(&self, symbol: &str) -> Result<Url, FetchError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| FetchError::Malformed(format!("잘못된 chart URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| {
                FetchError::Malformed("chart URL에 경로를 붙일 수 없습니다".to_string())
            })?
            .pop_if_empty()
            .push(symbol);
        url.query_pairs_mut()
            .append_pair("interval", &self.config.interval)
            .append_pair("range", &self.config.range);

        Ok(url)
    }
}

#[async_trait]
impl PriceSeriesClient for YahooChartClient {
    fn name(&self) -> &str {
        "yahoo"
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        let symbol = symbol.trim().to_uppercase();
        let url = self.chart_url(&symbol)?;

        debug!(symbol = %symbol, url = %url, "Fetching chart from Yahoo Finance");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        if !status.is_success() {
            warn!(symbol = %symbol, status = %status, "Yahoo Finance API error");
            return Err(status_error(&symbol, status, &body));
        }

        let series = parse_chart(&symbol, &body)?;
        debug!(
            symbol = %symbol,
            samples = series.len(),
            valid = series.valid_len(),
            "Yahoo Finance chart fetched"
        );
        Ok(series)
    }
}

fn status_error(symbol: &str, status: StatusCode, body: &str) -> FetchError {
    match status {
        // 존재하지 않는 심볼은 404와 chart.error로 응답
        StatusCode::NOT_FOUND => FetchError::UnknownSymbol(symbol.to_string()),
        s if s.is_server_error() || s == StatusCode::TOO_MANY_REQUESTS => {
            FetchError::Network(format!("HTTP {}", s))
        }
        s => {
            let snippet: String = body.chars().take(200).collect();
            FetchError::Malformed(format!("HTTP {}: {}", s, snippet))
        }
    }
}

/// chart 응답 본문을 시계열로 변환합니다.
fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries, FetchError> {
    let response: YahooChartResponse = serde_json::from_str(body)
        .map_err(|e| FetchError::Malformed(format!("chart 응답 파싱 실패: {}", e)))?;

    if let Some(error) = response.chart.error {
        if error.code.eq_ignore_ascii_case("Not Found") {
            return Err(FetchError::UnknownSymbol(symbol.to_string()));
        }
        return Err(FetchError::Malformed(format!(
            "{} - {}",
            error.code,
            error.description.unwrap_or_default()
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| FetchError::UnknownSymbol(symbol.to_string()))?;

    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::Malformed("quote 데이터가 없습니다".to_string()))?;

    let closes = quote.close.unwrap_or_default();
    let timestamps = result.timestamp.unwrap_or_default();

    let samples = closes
        .into_iter()
        .enumerate()
        .map(|(i, close)| {
            let time = timestamps
                .get(i)
                .and_then(|ts| DateTime::from_timestamp(*ts, 0));
            PriceSample::new(time, close)
        })
        .collect();

    Ok(PriceSeries::with_samples(symbol, samples))
}
