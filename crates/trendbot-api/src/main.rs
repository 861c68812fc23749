//! 추세 알림 봇 API 서버.
//!
//! LINE 웹훅을 받아 명령어에 응답하고, 설정된 일정에 따라 정기 알림을 푸시합니다.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{http::StatusCode, Router};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use trendbot_api::routes::create_api_router;
use trendbot_api::state::AppState;
use trendbot_api::tasks::run_scheduler;
use trendbot_api::Services;
use trendbot_core::{init_logging, AppConfig, LogConfig, DEFAULT_CONFIG_PATH};

/// 라우터 생성 (미들웨어 포함).
fn create_router(state: Arc<AppState>) -> Router {
    create_api_router()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // 전역 타임아웃 (30초) - 408 상태 코드 반환
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(CorsLayer::permissive())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path =
        std::env::var("TRENDBOT_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    // .env 파일과 환경 변수도 함께 로드됨
    let config = AppConfig::load(&config_path)?;

    init_logging(LogConfig::from(&config.logging))?;
    info!(config = %config_path, "Starting trend bot API server...");

    if let Err(problems) = config.validate() {
        for problem in &problems {
            warn!(problem = %problem, "설정 경고");
        }
    }

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| {
            error!(
                host = %config.server.host,
                port = config.server.port,
                error = %e,
                "소켓 주소 설정이 유효하지 않습니다"
            );
            e
        })?;

    let scheduler_enabled = config.scheduler.enabled;
    let services = Services::from_config(config)?;
    let state = Arc::new(services.app_state(scheduler_enabled));

    if state.channel_secret.is_none() {
        warn!("LINE_CHANNEL_SECRET 미설정, 웹훅 서명 검증을 생략합니다");
    }

    info!(
        version = %state.version,
        line_configured = state.line_configured,
        signature_check = state.channel_secret.is_some(),
        profiles = state.profiles.is_some(),
        "Application state initialized"
    );

    // 전역 종료 토큰 (백그라운드 태스크에 종료 전파)
    let shutdown_token = CancellationToken::new();

    let scheduler_handle = if scheduler_enabled {
        let schedule = services.schedule()?;
        Some(tokio::spawn(run_scheduler(
            services.notifier.clone(),
            schedule,
            shutdown_token.clone(),
        )))
    } else {
        info!("정기 알림 스케줄러 비활성화");
        None
    };

    let app = create_router(state);

    info!(%addr, "API server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_token.clone()))
        .await?;

    info!("Server shutdown initiated, cleaning up...");
    shutdown_token.cancel();

    // 스케줄러 종료를 최대 10초 대기
    if let Some(handle) = scheduler_handle {
        if tokio::time::timeout(Duration::from_secs(10), handle)
            .await
            .is_err()
        {
            warn!("Cleanup timeout, forcing shutdown");
        }
    }

    info!("Server stopped gracefully");

    Ok(())
}

/// Graceful shutdown 시그널 대기.
///
/// Ctrl+C 또는 SIGTERM 시그널을 수신하면 종료 토큰을 취소합니다.
async fn shutdown_signal(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            warn!("Received Ctrl+C, initiating graceful shutdown...");
        }
        _ = terminate => {
            warn!("Received SIGTERM, initiating graceful shutdown...");
        }
    }

    shutdown_token.cancel();
    info!("Shutdown signal propagated to background tasks");
}
