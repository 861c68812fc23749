//! LINE 웹훅 endpoint.
//!
//! POST /webhook
//!
//! 1. 채널 시크릿이 설정되어 있으면 `x-line-signature` 검증 (불일치 시 401)
//! 2. 본문 파싱 (잘못된 JSON은 400)
//! 3. 텍스트 메시지 이벤트마다 [`MessageRouter::handle`] 실행
//!
//! 텍스트가 아닌 이벤트는 무시하고, 처리 결과와 관계없이 200을 반환합니다.
//!
//! [`MessageRouter::handle`]: trendbot_notification::MessageRouter::handle

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use trendbot_core::{InboundMessage, MessageSource, SourceKind};
use trendbot_notification::{verify_signature, RouteStatus, SIGNATURE_HEADER};

use crate::error::ApiErrorResponse;
use crate::state::AppState;

/// 웹훅 본문.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

/// 웹훅 이벤트.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    #[serde(default)]
    pub reply_token: Option<String>,
    #[serde(default)]
    pub source: Option<EventSource>,
    #[serde(default)]
    pub message: Option<EventMessage>,
    /// 이벤트 시각 (밀리초)
    #[serde(default)]
    pub timestamp: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type", default)]
    pub kind: SourceKind,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EventMessage {
    #[serde(rename = "type")]
    pub message_type: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

impl WebhookEvent {
    /// 텍스트 메시지 이벤트면 수신 메시지로 변환합니다.
    pub fn to_inbound(&self) -> Option<InboundMessage> {
        if self.event_type != "message" {
            return None;
        }
        let message = self.message.as_ref()?;
        if message.message_type != "text" {
            return None;
        }
        let text = message.text.clone()?;

        let source = self
            .source
            .as_ref()
            .map(|s| MessageSource {
                kind: s.kind,
                user_id: s.user_id.clone(),
                group_id: s.group_id.clone(),
                room_id: s.room_id.clone(),
            })
            .unwrap_or_default();

        Some(InboundMessage {
            text,
            reply_token: self.reply_token.clone().filter(|t| !t.is_empty()),
            source,
            message_id: message.id.clone(),
            timestamp: self.timestamp.and_then(DateTime::<Utc>::from_timestamp_millis),
            display_name: None,
        })
    }
}

/// 웹훅 처리 요약.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct WebhookSummary {
    /// 수신한 이벤트 수
    pub received: usize,
    /// 라우터로 처리한 텍스트 메시지 수
    pub handled: usize,
    /// 무시한 이벤트 수
    pub ignored: usize,
    pub replied: usize,
    pub degraded: usize,
    pub failed: usize,
}

/// 웹훅 수신 핸들러.
pub async fn receive_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match &state.channel_secret {
        Some(secret) => {
            let signature = headers
                .get(SIGNATURE_HEADER)
                .and_then(|v| v.to_str().ok());
            if let Err(e) = verify_signature(secret, &body, signature) {
                warn!(error = %e, "웹훅 서명 검증 실패");
                return ApiErrorResponse::new("INVALID_SIGNATURE", e.to_string())
                    .with_status(StatusCode::UNAUTHORIZED);
            }
        }
        None => debug!("채널 시크릿 미설정, 서명 검증 생략"),
    }

    let payload: WebhookPayload = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, "웹훅 본문 파싱 실패");
            return ApiErrorResponse::new("INVALID_PAYLOAD", e.to_string())
                .with_status(StatusCode::BAD_REQUEST);
        }
    };

    let messages: Vec<InboundMessage> = payload
        .events
        .iter()
        .filter_map(WebhookEvent::to_inbound)
        .collect();

    let mut summary = WebhookSummary {
        received: payload.events.len(),
        handled: messages.len(),
        ignored: payload.events.len() - messages.len(),
        ..Default::default()
    };

    let outcomes =
        futures::future::join_all(messages.into_iter().map(|m| handle_message(&state, m))).await;

    for status in outcomes {
        match status {
            RouteStatus::Replied => summary.replied += 1,
            RouteStatus::Degraded => summary.degraded += 1,
            RouteStatus::Failed => summary.failed += 1,
            RouteStatus::Silent => {}
        }
    }

    info!(
        received = summary.received,
        handled = summary.handled,
        ignored = summary.ignored,
        "Webhook processed"
    );

    (StatusCode::OK, Json(summary)).into_response()
}

async fn handle_message(state: &AppState, mut message: InboundMessage) -> RouteStatus {
    if let (Some(profiles), Some(user_id)) = (&state.profiles, &message.source.user_id) {
        message.display_name = profiles.display_name(user_id).await;
    }
    state.router.handle(message).await.status
}

/// 웹훅 라우터 생성.
pub fn webhook_router() -> Router<Arc<AppState>> {
    Router::new().route("/", post(receive_webhook))
}
