//! 메시지 라우터 통합 테스트.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use trendbot_core::{
    FetchError, InboundMessage, LogEntry, LogSink, MessageSource, PersistenceError, PriceSeries,
    PriceSeriesClient,
};
use trendbot_data::MemoryJournal;
use trendbot_notification::{
    AssistantHandler, Command, MessageRouter, NotificationError, NotificationResult,
    ReplyTransport, RouteStatus,
};

// ==================== 테스트 더블 ====================

struct FakePrices {
    series: Option<PriceSeries>,
    calls: AtomicUsize,
}

impl FakePrices {
    fn with_series(series: PriceSeries) -> Arc<Self> {
        Arc::new(Self {
            series: Some(series),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            series: None,
            calls: AtomicUsize::new(0),
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PriceSeriesClient for FakePrices {
    fn name(&self) -> &str {
        "fake"
    }

    async fn fetch(&self, symbol: &str) -> Result<PriceSeries, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.series {
            Some(series) => Ok(PriceSeries::with_samples(symbol, series.samples.clone())),
            None => Err(FetchError::Network("connection reset".to_string())),
        }
    }
}

struct PanickingPrices;

#[async_trait]
impl PriceSeriesClient for PanickingPrices {
    fn name(&self) -> &str {
        "panicking"
    }

    async fn fetch(&self, _symbol: &str) -> Result<PriceSeries, FetchError> {
        panic!("price client exploded")
    }
}

#[derive(Default)]
struct RecordingTransport {
    sent: Mutex<Vec<(String, Vec<String>)>>,
    fail: bool,
}

impl RecordingTransport {
    fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Default::default()
        })
    }

    async fn sent(&self) -> Vec<(String, Vec<String>)> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl ReplyTransport for RecordingTransport {
    async fn reply(&self, reply_token: &str, messages: &[String]) -> NotificationResult<()> {
        if self.fail {
            return Err(NotificationError::ApiError {
                status: 400,
                message: "Invalid reply token".to_string(),
            });
        }
        self.sent
            .lock()
            .await
            .push((reply_token.to_string(), messages.to_vec()));
        Ok(())
    }
}

struct BrokenLog;

#[async_trait]
impl LogSink for BrokenLog {
    async fn append(&self, _entry: &LogEntry) -> Result<(), PersistenceError> {
        Err(PersistenceError::Unavailable("sheet locked".to_string()))
    }
}

struct ChattyAssistant(usize);

#[async_trait]
impl AssistantHandler for ChattyAssistant {
    async fn handle(&self, _message: &LogEntry) -> NotificationResult<Vec<String>> {
        Ok((0..self.0).map(|i| format!("🍼 {}", i)).collect())
    }
}

struct OfflineAssistant;

#[async_trait]
impl AssistantHandler for OfflineAssistant {
    async fn handle(&self, _message: &LogEntry) -> NotificationResult<Vec<String>> {
        Err(NotificationError::Unavailable("assistant down".to_string()))
    }
}

/// 마지막 종가가 200주 평균보다 낮은 250개 시계열.
fn below_average_series() -> PriceSeries {
    let mut closes = vec![500.0; 249];
    closes.push(100.0);
    PriceSeries::from_closes("SPY", closes)
}

fn router_with(
    prices: Arc<dyn PriceSeriesClient>,
    transport: Arc<RecordingTransport>,
    journal: Arc<MemoryJournal>,
) -> MessageRouter {
    MessageRouter::new(prices, transport, journal.clone(), journal)
}

fn message(text: &str) -> InboundMessage {
    InboundMessage::text(text)
        .with_reply_token("reply-1")
        .with_source(MessageSource::user("U42"))
}

// ==================== 테스트 ====================

#[tokio::test]
async fn test_symbol_query_below_average_end_to_end() {
    let prices = FakePrices::with_series(below_average_series());
    let transport = Arc::new(RecordingTransport::default());
    let journal = Arc::new(MemoryJournal::new());
    let router = router_with(prices.clone(), transport.clone(), journal.clone())
        .with_snapshot_sink(journal.clone());

    let outcome = router.handle(message("查SPY")).await;

    assert_eq!(
        outcome.command,
        Command::SymbolQuery {
            symbol: "SPY".to_string()
        }
    );
    assert_eq!(outcome.status, RouteStatus::Replied);
    assert_eq!(prices.calls(), 1);

    let sent = transport.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "reply-1");
    assert_eq!(sent[0].1.len(), 1);
    assert!(sent[0].1[0].contains("SPY"));
    assert!(sent[0].1[0].contains("✅ 跌破"));
    assert!(sent[0].1[0].contains("$100.00"));
    assert!(sent[0].1[0].contains("$498.00"));

    let entries = journal.entries().await;
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].text, "查SPY");
    assert_eq!(entries[0].source.user_id.as_deref(), Some("U42"));
    assert!(journal.errors().await.is_empty());

    let snapshot = journal.snapshot().await.unwrap();
    assert!(snapshot.below_average);
}

#[tokio::test]
async fn test_fetch_failure_degrades() {
    let transport = Arc::new(RecordingTransport::default());
    let journal = Arc::new(MemoryJournal::new());
    let router = router_with(FakePrices::failing(), transport.clone(), journal.clone());

    let outcome = router.handle(message("查qqq")).await;

    assert_eq!(outcome.status, RouteStatus::Degraded);
    assert_eq!(
        outcome.replies,
        vec!["抱歉，目前無法獲取 QQQ 數據，請稍後再試。".to_string()]
    );
    assert_eq!(transport.sent().await.len(), 1);

    let errors = journal.errors().await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("查詢 QQQ 數據"));
    assert_eq!(journal.entries().await.len(), 1);
}

#[tokio::test]
async fn test_insufficient_data_degrades() {
    let prices = FakePrices::with_series(PriceSeries::from_closes("NEW", vec![10.0; 50]));
    let journal = Arc::new(MemoryJournal::new());
    let router = router_with(prices, Arc::new(RecordingTransport::default()), journal.clone());

    let outcome = router.route("查NEW", true).await;

    assert_eq!(outcome.status, RouteStatus::Degraded);
    assert!(outcome.replies[0].contains("NEW"));
    assert_eq!(journal.errors().await.len(), 1);
    assert!(outcome.signal.is_none());
}

#[tokio::test]
async fn test_overflowing_average_degrades() {
    let prices = FakePrices::with_series(PriceSeries::from_closes("SPY", vec![1e308; 200]));
    let transport = Arc::new(RecordingTransport::default());
    let journal = Arc::new(MemoryJournal::new());
    let router = router_with(prices, transport.clone(), journal.clone())
        .with_snapshot_sink(journal.clone());

    let outcome = router.route("查SPY", true).await;

    assert_eq!(outcome.status, RouteStatus::Degraded);
    assert_eq!(
        outcome.replies,
        vec!["抱歉，目前無法獲取 SPY 數據，請稍後再試。".to_string()]
    );
    assert!(outcome.signal.is_none());
    assert!(journal.snapshot().await.is_none());

    let errors = journal.errors().await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("查詢 SPY 數據"));
}

#[tokio::test]
async fn test_without_reply_capability_only_logs() {
    let prices = FakePrices::with_series(below_average_series());
    let transport = Arc::new(RecordingTransport::default());
    let journal = Arc::new(MemoryJournal::new());
    let router = router_with(prices.clone(), transport.clone(), journal.clone());

    let outcome = router.route("查SPY", false).await;
    assert_eq!(outcome.status, RouteStatus::Silent);
    assert!(outcome.replies.is_empty());
    assert_eq!(outcome.log_entries.len(), 1);
    assert_eq!(prices.calls(), 0);

    let handled = router.handle(InboundMessage::text("查SPY")).await;
    assert_eq!(handled.status, RouteStatus::Silent);
    assert!(transport.sent().await.is_empty());
    assert_eq!(journal.entries().await.len(), 1);
}

#[tokio::test]
async fn test_keywords_and_unknown() {
    let transport = Arc::new(RecordingTransport::default());
    let journal = Arc::new(MemoryJournal::new());
    let router = router_with(FakePrices::failing(), transport.clone(), journal.clone());

    let help = router.route("HELP", true).await;
    assert!(help.replies[0].contains("使用說明"));

    let list = router.route("指令", true).await;
    assert!(list.replies[0].contains("可用指令列表"));

    let unknown = router.route("hello", true).await;
    assert_eq!(unknown.status, RouteStatus::Replied);
    assert_eq!(unknown.replies.len(), 1);
    assert!(matches!(unknown.command, Command::Unknown { .. }));

    // route는 전송/기록을 하지 않음
    assert!(transport.sent().await.is_empty());
    assert!(journal.entries().await.is_empty());
}

#[tokio::test]
async fn test_panic_is_contained() {
    let transport = Arc::new(RecordingTransport::default());
    let journal = Arc::new(MemoryJournal::new());
    let router = router_with(Arc::new(PanickingPrices), transport.clone(), journal.clone());

    let outcome = router.handle(message("查SPY")).await;

    assert_eq!(outcome.status, RouteStatus::Failed);
    assert!(outcome.replies[0].starts_with("⚠️"));
    assert_eq!(transport.sent().await.len(), 1);
    let errors = journal.errors().await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("price client exploded"));
    assert_eq!(journal.entries().await.len(), 1);
}

#[tokio::test]
async fn test_delivery_failure_is_recorded() {
    let journal = Arc::new(MemoryJournal::new());
    let router = router_with(
        FakePrices::failing(),
        RecordingTransport::failing(),
        journal.clone(),
    );

    let outcome = router.handle(message("幫助")).await;

    assert_eq!(outcome.status, RouteStatus::Replied);
    let errors = journal.errors().await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("回覆訊息"));
    assert_eq!(journal.entries().await.len(), 1);
}

#[tokio::test]
async fn test_log_failure_does_not_block_reply() {
    let transport = Arc::new(RecordingTransport::default());
    let journal = Arc::new(MemoryJournal::new());
    let router = MessageRouter::new(
        FakePrices::failing(),
        transport.clone(),
        Arc::new(BrokenLog),
        journal.clone(),
    );

    router.handle(message("功能")).await;

    assert_eq!(transport.sent().await.len(), 1);
    let errors = journal.errors().await;
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("sheet locked"));
}

#[tokio::test]
async fn test_reply_batch_is_capped() {
    let journal = Arc::new(MemoryJournal::new());
    let router = router_with(
        FakePrices::failing(),
        Arc::new(RecordingTransport::default()),
        journal,
    )
    .with_assistant(Arc::new(ChattyAssistant(8)))
    .with_max_messages_per_reply(5);

    let outcome = router.route("呼叫寶比", true).await;
    assert_eq!(outcome.replies.len(), 5);
    assert_eq!(outcome.replies[0], "🍼 0");
}

#[tokio::test]
async fn test_assistant_fallbacks() {
    let journal = Arc::new(MemoryJournal::new());
    let without = router_with(
        FakePrices::failing(),
        Arc::new(RecordingTransport::default()),
        journal.clone(),
    );
    let outcome = without.route("呼叫寶比", true).await;
    assert_eq!(
        outcome.replies,
        vec!["🍼 寶比功能暫時無法使用，請稍後再試。".to_string()]
    );

    let offline = router_with(
        FakePrices::failing(),
        Arc::new(RecordingTransport::default()),
        journal.clone(),
    )
    .with_assistant(Arc::new(OfflineAssistant));
    let outcome = offline.route("呼叫寶比", true).await;
    assert_eq!(outcome.status, RouteStatus::Degraded);
    assert_eq!(
        outcome.replies,
        vec!["🍼 寶比目前不在線上，請稍後再試。".to_string()]
    );
    assert_eq!(journal.errors().await.len(), 1);
}

#[tokio::test]
async fn test_concurrent_messages() {
    let prices = FakePrices::with_series(below_average_series());
    let transport = Arc::new(RecordingTransport::default());
    let journal = Arc::new(MemoryJournal::new());
    let router = Arc::new(router_with(prices.clone(), transport.clone(), journal.clone()));

    let tasks: Vec<_> = ["查SPY", "查QQQ", "幫助", "hello"]
        .into_iter()
        .map(|text| {
            let router = router.clone();
            tokio::spawn(async move { router.handle(message(text)).await })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    assert_eq!(transport.sent().await.len(), 4);
    assert_eq!(journal.entries().await.len(), 4);
    assert_eq!(prices.calls(), 2);
}
