//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크 (liveness)
//! - `/health/ready` - 상세 헬스 체크 (readiness)
//! - `/webhook` - LINE 웹훅 수신

pub mod health;
pub mod webhook;

pub use health::{health_router, ComponentHealth, ComponentStatus, HealthResponse};
pub use webhook::{webhook_router, WebhookEvent, WebhookPayload, WebhookSummary};

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .nest("/health", health_router())
        .nest("/webhook", webhook_router())
}
