//! 정기 추세 알림.
//!
//! 기본 심볼의 신호를 계산해 고정 수신자에게 푸시합니다. 타이머는
//! `trendbot-api`의 스케줄러가 담당하고, 이 모듈은 한 번의 실행만 다룹니다.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use tracing::{error, info, warn};

use trendbot_core::{
    BotError, ErrorSink, PriceSeriesClient, SignalEngine, SnapshotSink, TrendSignal,
};

use crate::formatter::ReplyFormatter;
use crate::types::{NotificationError, NotificationResult, PushTransport};

const NOTIFY_CONTEXT: &str = "定時推播";

/// 한 번의 알림 결과.
#[derive(Debug, Clone)]
pub struct NotifyOutcome {
    pub signal: TrendSignal,
    /// 생성된 메시지
    pub message: String,
    /// 실제로 전송했는지 여부 (드라이런이면 false)
    pub delivered: bool,
}

/// 정기 추세 알림기.
pub struct TrendNotifier {
    symbol: String,
    engine: SignalEngine,
    formatter: ReplyFormatter,
    timezone: Tz,
    prices: Arc<dyn PriceSeriesClient>,
    push: Arc<dyn PushTransport>,
    recipient: Option<String>,
    error_sink: Arc<dyn ErrorSink>,
    snapshots: Option<Arc<dyn SnapshotSink>>,
}

impl TrendNotifier {
    pub fn new(
        symbol: impl Into<String>,
        prices: Arc<dyn PriceSeriesClient>,
        push: Arc<dyn PushTransport>,
        error_sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            symbol: symbol.into().trim().to_uppercase(),
            engine: SignalEngine::default(),
            formatter: ReplyFormatter::default(),
            timezone: chrono_tz::Asia::Taipei,
            prices,
            push,
            recipient: None,
            error_sink,
            snapshots: None,
        }
    }

    pub fn with_engine(mut self, engine: SignalEngine) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_formatter(mut self, formatter: ReplyFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    /// 날짜 줄에 사용할 시간대.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn with_recipient(mut self, recipient: Option<String>) -> Self {
        self.recipient = recipient.filter(|r| !r.trim().is_empty());
        self
    }

    pub fn with_snapshot_sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.snapshots = Some(sink);
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// 신호를 계산하고 메시지를 만들어 전송합니다.
    pub async fn notify_once(&self) -> NotificationResult<NotifyOutcome> {
        self.run(true).await
    }

    /// 전송 없이 메시지만 만듭니다.
    pub async fn preview(&self) -> NotificationResult<NotifyOutcome> {
        self.run(false).await
    }

    async fn run(&self, deliver: bool) -> NotificationResult<NotifyOutcome> {
        let result = self.build_and_send(deliver).await;
        if let Err(e) = &result {
            error!(symbol = %self.symbol, error = %e, "정기 알림 실패");
            if let Err(sink_err) = self.error_sink.append(&e.to_string(), NOTIFY_CONTEXT).await {
                warn!(error = %sink_err, "에러 로그 기록 실패");
            }
        }
        result
    }

    async fn build_and_send(&self, deliver: bool) -> NotificationResult<NotifyOutcome> {
        let recipient = match (&self.recipient, deliver) {
            (Some(r), _) => Some(r.as_str()),
            (None, false) => None,
            (None, true) => {
                return Err(NotificationError::InvalidConfig(
                    "LINE_USER_ID(푸시 수신자)가 설정되지 않았습니다".to_string(),
                ))
            }
        };

        let series = self
            .prices
            .fetch(&self.symbol)
            .await
            .map_err(BotError::from)?;
        let signal = self
            .engine
            .compute(&self.symbol, &series)
            .map_err(BotError::from)?;

        // 계산 결과가 유한하지 않으면 알림을 보내지 않음
        if !signal.is_finite() {
            return Err(NotificationError::Data(BotError::Internal(format!(
                "{} 신호 값이 유효하지 않습니다",
                self.symbol
            ))));
        }

        if let Some(sink) = &self.snapshots {
            if let Err(e) = sink.record(&signal).await {
                warn!(error = %e, "스냅샷 기록 실패");
            }
        }

        let date = Utc::now().with_timezone(&self.timezone).date_naive();
        let message = self.formatter.format_scheduled(&signal, date);

        let delivered = match (deliver, recipient) {
            (true, Some(to)) => {
                self.push.push(to, std::slice::from_ref(&message)).await?;
                true
            }
            _ => false,
        };

        info!(
            symbol = %signal.symbol,
            below = signal.below_average,
            delivered,
            "Trend notification prepared"
        );

        Ok(NotifyOutcome {
            signal,
            message,
            delivered,
        })
    }
}
