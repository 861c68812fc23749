//! 메시지 라우터.
//!
//! 수신 메시지 하나를 처리하는 상태 흐름:
//!
//! ```text
//! Received → Classified → Replied | Replied(degraded) | Replied(error)
//! ```
//!
//! 협력자(시세 조회, 전송, 저장소)의 실패는 라우터 밖으로 나가지 않습니다.
//! 시세 실패와 데이터 부족은 "데이터 없음" 응답으로, 예기치 못한 실패(패닉
//! 포함)는 일반 오류 응답으로 바뀝니다. 라우터는 공유 가변 상태가 없으므로
//! 여러 이벤트를 동시에 처리할 수 있습니다.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tracing::{debug, error, info, warn, Instrument};

use trendbot_core::{
    bot_span, BotError, ErrorSink, InboundMessage, LogEntry, LogSink, PriceSeriesClient,
    SignalEngine, SnapshotSink, TrendSignal,
};

use crate::command::{Command, CommandParser, Intent};
use crate::formatter::{ReplyFormatter, StaticReply, MANUAL_QUERY_LABEL};
use crate::line::LINE_MAX_MESSAGES;
use crate::types::{AssistantHandler, ReplyTransport};

const ROUTING_CONTEXT: &str = "處理使用者訊息";
const REPLY_CONTEXT: &str = "回覆訊息";
const LOG_CONTEXT: &str = "寫入訊息紀錄";
const SNAPSHOT_CONTEXT: &str = "更新價格快照";
const ASSISTANT_CONTEXT: &str = "呼叫寶比";

/// 처리 결과 상태.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteStatus {
    /// 정상 응답
    Replied,
    /// 데이터를 가져오지 못해 대체 응답
    Degraded,
    /// 예기치 못한 실패로 일반 오류 응답
    Failed,
    /// 응답 토큰이 없어 기록만 함
    Silent,
}

/// 라우팅 결과.
#[derive(Debug, Clone)]
pub struct RouterOutcome {
    /// 분류된 명령어
    pub command: Command,
    pub status: RouteStatus,
    /// 보낼 응답 (최대 개수 이하)
    pub replies: Vec<String>,
    /// 로그 저장소로 보낼 항목
    pub log_entries: Vec<LogEntry>,
    /// 심볼 조회 성공 시 계산된 신호
    pub signal: Option<TrendSignal>,
}

struct Dispatch {
    status: RouteStatus,
    replies: Vec<String>,
    signal: Option<TrendSignal>,
}

impl Dispatch {
    fn replied(replies: Vec<String>) -> Self {
        Self {
            status: RouteStatus::Replied,
            replies,
            signal: None,
        }
    }
}

/// 메시지 라우터.
pub struct MessageRouter {
    parser: CommandParser,
    formatter: ReplyFormatter,
    engine: SignalEngine,
    prices: Arc<dyn PriceSeriesClient>,
    replies: Arc<dyn ReplyTransport>,
    log_sink: Arc<dyn LogSink>,
    error_sink: Arc<dyn ErrorSink>,
    snapshots: Option<Arc<dyn SnapshotSink>>,
    assistant: Option<Arc<dyn AssistantHandler>>,
    max_messages_per_reply: usize,
}

impl MessageRouter {
    /// 기본 파서/포맷터/엔진으로 라우터를 생성합니다.
    pub fn new(
        prices: Arc<dyn PriceSeriesClient>,
        replies: Arc<dyn ReplyTransport>,
        log_sink: Arc<dyn LogSink>,
        error_sink: Arc<dyn ErrorSink>,
    ) -> Self {
        Self {
            parser: CommandParser::default(),
            formatter: ReplyFormatter::default(),
            engine: SignalEngine::default(),
            prices,
            replies,
            log_sink,
            error_sink,
            snapshots: None,
            assistant: None,
            max_messages_per_reply: LINE_MAX_MESSAGES,
        }
    }

    pub fn with_parser(mut self, parser: CommandParser) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_formatter(mut self, formatter: ReplyFormatter) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn with_engine(mut self, engine: SignalEngine) -> Self {
        self.engine = engine;
        self
    }

    /// 신호 계산 성공 시 스냅샷을 기록합니다.
    pub fn with_snapshot_sink(mut self, sink: Arc<dyn SnapshotSink>) -> Self {
        self.snapshots = Some(sink);
        self
    }

    /// 도우미 핸들러를 설정합니다.
    pub fn with_assistant(mut self, assistant: Arc<dyn AssistantHandler>) -> Self {
        self.assistant = Some(assistant);
        self
    }

    /// 응답당 최대 메시지 수 (최소 1).
    pub fn with_max_messages_per_reply(mut self, max: usize) -> Self {
        self.max_messages_per_reply = max.max(1);
        self
    }

    pub fn parser(&self) -> &CommandParser {
        &self.parser
    }

    /// 원문 텍스트를 처리해 응답과 로그 항목을 만듭니다. 전송과 로그 기록은
    /// 하지 않습니다.
    pub async fn route(&self, raw_text: &str, has_reply_capability: bool) -> RouterOutcome {
        self.route_entry(LogEntry::from_text(raw_text), has_reply_capability)
            .await
    }

    /// 수신 메시지를 처리하고 응답 전송과 로그 기록까지 수행합니다.
    ///
    /// 전송/저장 실패는 기록만 하고 삼킵니다.
    pub async fn handle(&self, message: InboundMessage) -> RouterOutcome {
        let span = bot_span!("handle_message", message.text);
        async move {
            let has_reply = message.has_reply_capability();
            let outcome = self
                .route_entry(LogEntry::from(&message), has_reply)
                .await;

            if let Some(token) = message.reply_token.as_deref() {
                if !outcome.replies.is_empty() {
                    if let Err(e) = self.replies.reply(token, &outcome.replies).await {
                        error!(error = %e, "응답 전송 실패");
                        self.record_error(&e.to_string(), REPLY_CONTEXT).await;
                    }
                }
            }

            for entry in &outcome.log_entries {
                if let Err(e) = self.log_sink.append(entry).await {
                    warn!(entry_id = %entry.id, error = %e, "메시지 로그 기록 실패");
                    self.record_error(&e.to_string(), LOG_CONTEXT).await;
                }
            }

            info!(
                command = outcome.command.kind(),
                status = ?outcome.status,
                replies = outcome.replies.len(),
                "Message handled"
            );
            outcome
        }
        .instrument(span)
        .await
    }

    async fn route_entry(&self, entry: LogEntry, has_reply: bool) -> RouterOutcome {
        let command = self.parser.parse(&entry.text);
        debug!(command = ?command, has_reply, "Message classified");

        let dispatched = AssertUnwindSafe(self.dispatch(&command, &entry, has_reply))
            .catch_unwind()
            .await;

        let mut dispatch = match dispatched {
            Ok(dispatch) => dispatch,
            Err(panic) => {
                let reason = panic_message(panic.as_ref());
                error!(reason = %reason, "메시지 처리 중 패닉 발생");
                self.record_error(&reason, ROUTING_CONTEXT).await;
                Dispatch {
                    status: RouteStatus::Failed,
                    replies: if has_reply {
                        self.formatter.format_static(StaticReply::Error)
                    } else {
                        Vec::new()
                    },
                    signal: None,
                }
            }
        };

        if dispatch.replies.len() > self.max_messages_per_reply {
            warn!(
                count = dispatch.replies.len(),
                max = self.max_messages_per_reply,
                "응답 메시지 수 초과, 잘라냅니다"
            );
            dispatch.replies.truncate(self.max_messages_per_reply);
        }

        RouterOutcome {
            command,
            status: dispatch.status,
            replies: dispatch.replies,
            log_entries: vec![entry],
            signal: dispatch.signal,
        }
    }

    async fn dispatch(&self, command: &Command, entry: &LogEntry, has_reply: bool) -> Dispatch {
        if !has_reply {
            // 응답할 수 없으면 시세 조회도 하지 않음
            debug!("응답 토큰 없음, 기록만 수행");
            return Dispatch {
                status: RouteStatus::Silent,
                replies: Vec::new(),
                signal: None,
            };
        }

        match command {
            Command::SymbolQuery { symbol } => {
                self.query_symbol(symbol)
                    .instrument(bot_span!("symbol_query", entry.text, symbol))
                    .await
            }
            Command::Keyword(Intent::Help) => {
                Dispatch::replied(self.formatter.format_static(StaticReply::Help))
            }
            Command::Keyword(Intent::CommandList) => {
                Dispatch::replied(self.formatter.format_static(StaticReply::CommandList))
            }
            Command::Keyword(Intent::CallAssistant) => self.call_assistant(entry).await,
            Command::Unknown { .. } => {
                Dispatch::replied(self.formatter.format_static(StaticReply::Unknown))
            }
        }
    }

    async fn query_symbol(&self, symbol: &str) -> Dispatch {
        let context = format!("查詢 {} 數據", symbol);

        let result = match self.prices.fetch(symbol).await {
            Ok(series) => self
                .engine
                .compute(symbol, &series)
                .map_err(BotError::from),
            Err(e) => Err(BotError::from(e)),
        };

        // 평균 계산이 넘치면 비교 결과를 믿을 수 없음
        let result = result.and_then(|signal| {
            if signal.is_finite() {
                Ok(signal)
            } else {
                Err(BotError::Internal(format!(
                    "{} 신호 값이 유효하지 않습니다",
                    signal.symbol
                )))
            }
        });

        match result {
            Ok(signal) => {
                info!(
                    symbol = %signal.symbol,
                    close = signal.last_close,
                    moving_average = signal.moving_average,
                    below = signal.below_average,
                    "Signal computed"
                );
                self.record_snapshot(&signal).await;
                Dispatch {
                    status: RouteStatus::Replied,
                    replies: vec![self.formatter.format_signal(&signal, MANUAL_QUERY_LABEL)],
                    signal: Some(signal),
                }
            }
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "시세 데이터를 사용할 수 없음");
                self.record_error(&e.to_string(), &context).await;
                Dispatch {
                    status: RouteStatus::Degraded,
                    replies: vec![self.formatter.format_unavailable(symbol)],
                    signal: None,
                }
            }
        }
    }

    async fn call_assistant(&self, entry: &LogEntry) -> Dispatch {
        let Some(assistant) = &self.assistant else {
            return Dispatch::replied(
                self.formatter
                    .format_static(StaticReply::AssistantUnavailable),
            );
        };

        match assistant.handle(entry).await {
            Ok(messages) if !messages.is_empty() => Dispatch::replied(messages),
            Ok(_) => Dispatch::replied(self.formatter.format_static(StaticReply::AssistantOffline)),
            Err(e) => {
                warn!(error = %e, "도우미 호출 실패");
                self.record_error(&e.to_string(), ASSISTANT_CONTEXT).await;
                Dispatch {
                    status: RouteStatus::Degraded,
                    replies: self.formatter.format_static(StaticReply::AssistantOffline),
                    signal: None,
                }
            }
        }
    }

    async fn record_snapshot(&self, signal: &TrendSignal) {
        let Some(sink) = &self.snapshots else {
            return;
        };
        if let Err(e) = sink.record(signal).await {
            warn!(symbol = %signal.symbol, error = %e, "스냅샷 기록 실패");
            self.record_error(&e.to_string(), SNAPSHOT_CONTEXT).await;
        }
    }

    /// 에러 로그에 기록합니다. 기록 실패는 경고만 남깁니다.
    async fn record_error(&self, message: &str, context: &str) {
        if let Err(e) = self.error_sink.append(message, context).await {
            warn!(error = %e, context = context, "에러 로그 기록 실패");
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
