//! 심볼 추세 점검.
//!
//! 웹훅 없이 시세를 가져와 이동평균 신호를 계산합니다. 응답 전송이나
//! 로그 기록은 하지 않습니다.

use anyhow::{bail, Context, Result};
use tracing::info;

use trendbot_core::{PriceSeriesClient, SignalEngine, TrendSignal};
use trendbot_notification::{is_valid_symbol, ReplyFormatter, MANUAL_QUERY_LABEL};

use super::OutputFormat;

/// 점검 설정.
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// 조회할 심볼
    pub symbol: String,
    /// 이동평균 기간
    pub window: usize,
    /// 봉 간격 (표시용)
    pub interval: String,
    pub format: OutputFormat,
}

/// 시세를 가져와 신호를 계산합니다.
pub async fn check_symbol(
    prices: &dyn PriceSeriesClient,
    config: &CheckConfig,
) -> Result<TrendSignal> {
    let symbol = config.symbol.trim().to_uppercase();
    if !is_valid_symbol(&symbol) {
        bail!("Invalid symbol: {}", config.symbol);
    }

    let series = prices
        .fetch(&symbol)
        .await
        .with_context(|| format!("{} 시세 조회 실패 ({})", symbol, prices.name()))?;
    let signal = SignalEngine::new(config.window)
        .compute(&symbol, &series)
        .with_context(|| format!("{} 신호 계산 실패", symbol))?;

    info!(
        symbol = %signal.symbol,
        close = signal.last_close,
        moving_average = signal.moving_average,
        status = signal.status().as_str(),
        "Signal computed"
    );

    Ok(signal)
}

/// 점검 결과를 출력 문자열로 만듭니다.
pub fn render_check(signal: &TrendSignal, config: &CheckConfig) -> Result<String> {
    match config.format {
        OutputFormat::Text => Ok(ReplyFormatter::default()
            .with_interval(&config.interval)
            .format_signal(signal, MANUAL_QUERY_LABEL)),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(signal)?),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use trendbot_core::{FetchError, PriceSeries};

    struct StepPrices;

    #[async_trait]
    impl PriceSeriesClient for StepPrices {
        fn name(&self) -> &str {
            "step"
        }

        async fn fetch(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
            if symbol == "NOPE" {
                return Err(FetchError::UnknownSymbol(symbol.to_string()));
            }
            let mut closes = vec![50.0; 9];
            closes.push(40.0);
            Ok(PriceSeries::from_closes(symbol, closes))
        }
    }

    fn config(symbol: &str, format: OutputFormat) -> CheckConfig {
        CheckConfig {
            symbol: symbol.to_string(),
            window: 10,
            interval: "1wk".to_string(),
            format,
        }
    }

    #[tokio::test]
    async fn test_check_symbol_below_average() {
        let signal = check_symbol(&StepPrices, &config("qqq", OutputFormat::Text))
            .await
            .unwrap();

        assert_eq!(signal.symbol, "QQQ");
        assert_eq!(signal.last_close, 40.0);
        assert_eq!(signal.moving_average, 49.0);
        assert!(signal.below_average);

        let text = render_check(&signal, &config("qqq", OutputFormat::Text)).unwrap();
        assert!(text.starts_with("📊 QQQ 技術提醒（手動查詢）"));
        assert!(text.contains("10週均線"));
    }

    #[tokio::test]
    async fn test_check_symbol_json_output() {
        let cfg = config("QQQ", OutputFormat::Json);
        let signal = check_symbol(&StepPrices, &cfg).await.unwrap();

        let json: serde_json::Value = serde_json::from_str(&render_check(&signal, &cfg).unwrap())
            .unwrap();
        assert_eq!(json["symbol"], "QQQ");
        assert_eq!(json["below_average"], true);
    }

    #[tokio::test]
    async fn test_check_rejects_invalid_or_unknown_symbol() {
        assert!(check_symbol(&StepPrices, &config("S P Y", OutputFormat::Text))
            .await
            .is_err());
        assert!(check_symbol(&StepPrices, &config("nope", OutputFormat::Text))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_check_insufficient_history() {
        let mut cfg = config("QQQ", OutputFormat::Text);
        cfg.window = 200;
        let err = check_symbol(&StepPrices, &cfg).await.unwrap_err();
        assert!(err.to_string().contains("신호 계산 실패"));
    }
}
