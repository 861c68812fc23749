//! LINE Messaging API 클라이언트.
//!
//! - `POST /message/reply`: 응답 토큰으로 응답 (토큰은 1회용)
//! - `POST /message/push`: 수신자 ID로 전송 (정기 알림)
//! - `GET /profile/{userId}`: 발신자 프로필
//! - `GET /info`: 봇 정보 (연결 확인)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use trendbot_core::LineConfig;

use crate::types::{NotificationError, NotificationResult, PushTransport, ReplyTransport};

/// LINE API가 한 요청에 허용하는 최대 메시지 수.
pub const LINE_MAX_MESSAGES: usize = 5;

/// LINE 클라이언트 설정.
#[derive(Debug, Clone)]
pub struct LineClientConfig {
    /// API 기본 URL (예: `https://api.line.me/v2/bot`)
    pub api_url: String,
    /// 채널 액세스 토큰
    pub access_token: Option<SecretString>,
    /// 요청 타임아웃
    pub timeout: Duration,
}

impl LineClientConfig {
    /// 새 LINE 설정을 생성합니다.
    pub fn new(api_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let token: String = access_token.into();
        Self {
            api_url: api_url.into(),
            access_token: (!token.trim().is_empty())
                .then(|| SecretString::new(token.trim().to_string().into())),
            timeout: Duration::from_secs(10),
        }
    }
}

impl From<&LineConfig> for LineClientConfig {
    fn from(config: &LineConfig) -> Self {
        Self {
            api_url: config.api_url.clone(),
            access_token: config.access_token_secret(),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// 사용자 프로필.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineProfile {
    pub user_id: String,
    pub display_name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
    #[serde(default)]
    pub status_message: Option<String>,
}

/// 봇 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotInfo {
    pub user_id: String,
    #[serde(default)]
    pub basic_id: Option<String>,
    pub display_name: String,
    #[serde(default)]
    pub chat_mode: Option<String>,
}

/// LINE Messaging API 클라이언트.
#[derive(Debug, Clone)]
pub struct LineClient {
    config: LineClientConfig,
    client: reqwest::Client,
}

impl LineClient {
    /// 새 클라이언트를 생성합니다.
    pub fn new(config: LineClientConfig) -> NotificationResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { config, client })
    }

    /// 액세스 토큰 설정 여부.
    pub fn is_configured(&self) -> bool {
        self.config.access_token.is_some()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    fn token(&self) -> NotificationResult<&str> {
        self.config
            .access_token
            .as_ref()
            .map(|t| t.expose_secret())
            .ok_or_else(|| {
                NotificationError::InvalidConfig(
                    "LINE_ACCESS_TOKEN이 설정되지 않았습니다".to_string(),
                )
            })
    }

    async fn post(
        &self,
        path: &str,
        body: serde_json::Value,
        context: &str,
    ) -> NotificationResult<()> {
        let token = self.token()?;
        let response = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(NotificationError::NetworkError)?;

        if response.status().is_success() {
            debug!(context = context, "LINE API 요청 성공");
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(status_error(status, &body, context))
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        context: &str,
    ) -> NotificationResult<T> {
        let token = self.token()?;
        let response = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .map_err(NotificationError::NetworkError)?;

        let status = response.status();
        let body = response.text().await.map_err(NotificationError::NetworkError)?;
        if !status.is_success() {
            return Err(status_error(status, &body, context));
        }
        Ok(serde_json::from_str(&body)?)
    }

    /// 응답 토큰으로 메시지를 보냅니다. 최대 개수를 넘는 메시지는 버립니다.
    pub async fn reply_messages(
        &self,
        reply_token: &str,
        messages: &[String],
    ) -> NotificationResult<()> {
        if messages.is_empty() {
            return Ok(());
        }
        if messages.len() > LINE_MAX_MESSAGES {
            warn!(
                count = messages.len(),
                max = LINE_MAX_MESSAGES,
                "응답 메시지 수 초과, 초과분은 버립니다"
            );
        }

        let body = serde_json::json!({
            "replyToken": reply_token,
            "messages": text_messages(&messages[..messages.len().min(LINE_MAX_MESSAGES)]),
        });
        self.post("message/reply", body, "回覆訊息").await?;
        info!(count = messages.len().min(LINE_MAX_MESSAGES), "LINE reply sent");
        Ok(())
    }

    /// 수신자에게 메시지를 보냅니다. 최대 개수 단위로 나눠 전송합니다.
    pub async fn push_messages(&self, to: &str, messages: &[String]) -> NotificationResult<()> {
        if to.trim().is_empty() {
            return Err(NotificationError::InvalidConfig("푸시 수신자가 없습니다".to_string()));
        }

        for chunk in messages.chunks(LINE_MAX_MESSAGES) {
            let body = serde_json::json!({
                "to": to,
                "messages": text_messages(chunk),
            });
            self.post("message/push", body, "推播訊息").await?;
        }
        info!(to = to, count = messages.len(), "LINE push sent");
        Ok(())
    }

    /// 사용자 프로필을 조회합니다.
    pub async fn get_profile(&self, user_id: &str) -> NotificationResult<LineProfile> {
        self.get(&format!("profile/{}", user_id), "取得用戶資料").await
    }

    /// 봇 정보를 조회합니다. 연결 확인용입니다.
    pub async fn bot_info(&self) -> NotificationResult<BotInfo> {
        self.get("info", "LINE API 連線測試").await
    }
}

fn text_messages(messages: &[String]) -> Vec<serde_json::Value> {
    messages
        .iter()
        .map(|text| serde_json::json!({ "type": "text", "text": text }))
        .collect()
}

/// 실패 응답을 상태별 설명이 담긴 에러로 변환합니다.
fn status_error(status: StatusCode, body: &str, context: &str) -> NotificationError {
    if status == StatusCode::TOO_MANY_REQUESTS {
        warn!(context = context, "LINE API rate limited");
        return NotificationError::RateLimited(60);
    }

    let hint = match status {
        StatusCode::BAD_REQUEST => "請求格式錯誤或回覆 Token 已失效",
        StatusCode::UNAUTHORIZED => "存取 Token 無效",
        StatusCode::FORBIDDEN => "權限不足或用戶已封鎖機器人",
        StatusCode::NOT_FOUND => "找不到資源",
        _ => "LINE API 錯誤",
    };
    error!(context = context, status = %status, body = %body, "LINE API 요청 실패");

    NotificationError::ApiError {
        status: status.as_u16(),
        message: format!("{}: {} ({})", context, hint, body),
    }
}

#[async_trait]
impl ReplyTransport for LineClient {
    async fn reply(&self, reply_token: &str, messages: &[String]) -> NotificationResult<()> {
        self.reply_messages(reply_token, messages).await
    }
}

#[async_trait]
impl PushTransport for LineClient {
    async fn push(&self, to: &str, messages: &[String]) -> NotificationResult<()> {
        self.push_messages(to, messages).await
    }
}
