//! 수신 메시지와 메시지 로그 항목.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 메시지 발신 채널 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// 1:1 대화
    User,
    /// 그룹
    Group,
    /// 다인 대화방
    Room,
    /// 알 수 없음
    #[default]
    #[serde(other)]
    Unknown,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::User => "user",
            SourceKind::Group => "group",
            SourceKind::Room => "room",
            SourceKind::Unknown => "unknown",
        }
    }
}

/// 메시지 발신자 정보.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageSource {
    pub kind: SourceKind,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub room_id: Option<String>,
}

impl MessageSource {
    /// 1:1 대화 발신자.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            kind: SourceKind::User,
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }
}

/// 웹훅에서 받은 텍스트 메시지.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    /// 원본 텍스트
    pub text: String,
    /// 응답 토큰. 없으면 응답할 수 없습니다.
    pub reply_token: Option<String>,
    /// 발신자
    pub source: MessageSource,
    /// 플랫폼 메시지 ID
    pub message_id: Option<String>,
    /// 플랫폼 이벤트 시각
    pub timestamp: Option<DateTime<Utc>>,
    /// 발신자 표시 이름 (프로필 조회 시)
    pub display_name: Option<String>,
}

impl InboundMessage {
    /// 텍스트만으로 메시지를 생성합니다.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// 응답 토큰을 설정합니다.
    pub fn with_reply_token(mut self, token: impl Into<String>) -> Self {
        self.reply_token = Some(token.into());
        self
    }

    /// 발신자를 설정합니다.
    pub fn with_source(mut self, source: MessageSource) -> Self {
        self.source = source;
        self
    }

    /// 응답 가능 여부.
    pub fn has_reply_capability(&self) -> bool {
        self.reply_token.as_deref().is_some_and(|t| !t.is_empty())
    }
}

/// 메시지 로그 항목. 모든 수신 메시지마다 하나씩 기록됩니다.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: Uuid,
    /// 기록 시각
    pub recorded_at: DateTime<Utc>,
    /// 원본 텍스트
    pub text: String,
    pub source: MessageSource,
    pub message_id: Option<String>,
    pub reply_token: Option<String>,
    pub event_time: Option<DateTime<Utc>>,
    pub display_name: Option<String>,
}

impl LogEntry {
    /// 원본 텍스트만으로 항목을 생성합니다.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recorded_at: Utc::now(),
            text: text.into(),
            source: MessageSource::default(),
            message_id: None,
            reply_token: None,
            event_time: None,
            display_name: None,
        }
    }

    /// 발신자 정보를 요약한 여러 줄 문자열.
    ///
    /// 없는 필드는 생략하고, 아무 정보도 없으면 `無法取得用戶資訊`을 반환합니다.
    pub fn user_info(&self) -> String {
        let mut lines = Vec::new();
        if let Some(user_id) = &self.source.user_id {
            lines.push(format!("用戶ID: {}", user_id));
        }
        if let Some(name) = &self.display_name {
            lines.push(format!("顯示名稱: {}", name));
        }
        if self.source.kind != SourceKind::Unknown {
            lines.push(format!("來源類型: {}", self.source.kind.as_str()));
        }
        if let Some(group_id) = &self.source.group_id {
            lines.push(format!("群組ID: {}", group_id));
        }
        if let Some(room_id) = &self.source.room_id {
            lines.push(format!("聊天室ID: {}", room_id));
        }
        if let Some(message_id) = &self.message_id {
            lines.push(format!("訊息ID: {}", message_id));
            lines.push("訊息類型: text".to_string());
        }
        if let Some(time) = &self.event_time {
            lines.push(format!("時間戳記: {}", time.to_rfc3339()));
        }
        if let Some(token) = &self.reply_token {
            lines.push(format!("回覆Token: {}", token));
        }

        if lines.is_empty() {
            "無法取得用戶資訊".to_string()
        } else {
            lines.join("\n")
        }
    }
}

impl From<&InboundMessage> for LogEntry {
    fn from(message: &InboundMessage) -> Self {
        Self {
            source: message.source.clone(),
            message_id: message.message_id.clone(),
            reply_token: message.reply_token.clone(),
            event_time: message.timestamp,
            display_name: message.display_name.clone(),
            ..LogEntry::from_text(message.text.clone())
        }
    }
}
