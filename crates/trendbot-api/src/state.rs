//! 모든 핸들러에서 공유되는 애플리케이션 상태.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use tracing::warn;

use trendbot_notification::{LineClient, MessageRouter};

/// 발신자 표시 이름 조회.
#[async_trait]
pub trait ProfileLookup: Send + Sync {
    /// 조회에 실패하면 `None`을 반환합니다.
    async fn display_name(&self, user_id: &str) -> Option<String>;
}

#[async_trait]
impl ProfileLookup for LineClient {
    async fn display_name(&self, user_id: &str) -> Option<String> {
        match self.get_profile(user_id).await {
            Ok(profile) => Some(profile.display_name),
            Err(e) => {
                warn!(user_id, error = %e, "프로필 조회 실패");
                None
            }
        }
    }
}

/// 애플리케이션 공유 상태.
///
/// Axum의 State extractor를 통해 `Arc<AppState>`로 핸들러에 주입됩니다.
pub struct AppState {
    /// 메시지 라우터 - 분류, 조회, 응답, 기록
    pub router: Arc<MessageRouter>,

    /// 채널 시크릿. 없으면 웹훅 서명 검증을 생략합니다.
    pub channel_secret: Option<SecretString>,

    /// 프로필 조회기 (설정 시 발신자 이름을 로그에 포함)
    pub profiles: Option<Arc<dyn ProfileLookup>>,

    /// LINE 액세스 토큰 설정 여부
    pub line_configured: bool,

    /// 정기 알림 스케줄러 동작 여부
    pub scheduler_enabled: bool,

    /// 서버 버전
    pub version: String,

    /// 서버 시작 시각
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(router: Arc<MessageRouter>) -> Self {
        Self {
            router,
            channel_secret: None,
            profiles: None,
            line_configured: false,
            scheduler_enabled: false,
            version: env!("CARGO_PKG_VERSION").to_string(),
            started_at: Utc::now(),
        }
    }

    pub fn with_channel_secret(mut self, secret: Option<SecretString>) -> Self {
        self.channel_secret = secret;
        self
    }

    pub fn with_profiles(mut self, profiles: Arc<dyn ProfileLookup>) -> Self {
        self.profiles = Some(profiles);
        self
    }

    pub fn with_line_configured(mut self, configured: bool) -> Self {
        self.line_configured = configured;
        self
    }

    pub fn with_scheduler_enabled(mut self, enabled: bool) -> Self {
        self.scheduler_enabled = enabled;
        self
    }

    /// 서버 업타임(초).
    pub fn uptime_secs(&self) -> i64 {
        (Utc::now() - self.started_at).num_seconds()
    }
}
