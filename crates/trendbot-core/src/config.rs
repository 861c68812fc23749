//! 설정 관리.
//!
//! 기본값 → 설정 파일(TOML, 선택) → 환경 변수(`TRENDBOT__SECTION__KEY`) 순으로
//! 덮어씁니다. LINE 관련 기존 환경 변수(`LINE_ACCESS_TOKEN`,
//! `LINE_CHANNEL_SECRET`, `LINE_USER_ID`)도 인식합니다.

use chrono::Weekday;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// 기본 설정 파일 경로.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    /// 서버 설정
    pub server: ServerConfig,
    /// LINE 메시징 설정
    pub line: LineConfig,
    /// 시세/신호 설정
    pub stock: StockConfig,
    /// 명령어 설정
    pub commands: CommandConfig,
    /// 저장소 설정
    pub storage: StorageConfig,
    /// 정기 알림 설정
    pub scheduler: SchedulerConfig,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// LINE 메시징 설정.
#[derive(Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LineConfig {
    /// Messaging API 기본 URL
    pub api_url: String,
    /// 채널 액세스 토큰
    pub access_token: String,
    /// 채널 시크릿 (비어 있으면 서명 검증 생략)
    pub channel_secret: String,
    /// 정기 알림 수신자 (사용자/그룹 ID)
    pub push_recipient: String,
    /// 한 번의 응답에 보낼 수 있는 최대 메시지 수
    pub max_messages_per_reply: usize,
    /// 발신자 프로필 조회 여부
    pub fetch_profiles: bool,
    /// HTTP 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.line.me/v2/bot".to_string(),
            access_token: String::new(),
            channel_secret: String::new(),
            push_recipient: String::new(),
            max_messages_per_reply: 5,
            fetch_profiles: false,
            request_timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for LineConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LineConfig")
            .field("api_url", &self.api_url)
            .field("access_token", &mask(&self.access_token))
            .field("channel_secret", &mask(&self.channel_secret))
            .field("push_recipient", &self.push_recipient)
            .field("max_messages_per_reply", &self.max_messages_per_reply)
            .field("fetch_profiles", &self.fetch_profiles)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

impl LineConfig {
    /// 액세스 토큰 설정 여부.
    pub fn has_access_token(&self) -> bool {
        !self.access_token.trim().is_empty()
    }

    /// 액세스 토큰을 `SecretString`으로 반환합니다.
    pub fn access_token_secret(&self) -> Option<SecretString> {
        non_empty_secret(&self.access_token)
    }

    /// 채널 시크릿을 `SecretString`으로 반환합니다.
    pub fn channel_secret_secret(&self) -> Option<SecretString> {
        non_empty_secret(&self.channel_secret)
    }

    /// 정기 알림 수신자.
    pub fn push_recipient(&self) -> Option<&str> {
        let recipient = self.push_recipient.trim();
        (!recipient.is_empty()).then_some(recipient)
    }
}

/// 시세/신호 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StockConfig {
    /// Yahoo Finance chart API URL
    pub chart_url: String,
    /// 정기 알림 기본 심볼
    pub default_symbol: String,
    /// 봉 간격 (1d, 1wk, 1mo)
    pub interval: String,
    /// 조회 기간 (5y 등)
    pub range: String,
    /// 이동평균 윈도우
    pub sma_length: usize,
    /// HTTP 요청 타임아웃 (초)
    pub request_timeout_secs: u64,
}

impl Default for StockConfig {
    fn default() -> Self {
        Self {
            chart_url: "https://query1.finance.yahoo.com/v8/finance/chart".to_string(),
            default_symbol: "SPY".to_string(),
            interval: "1wk".to_string(),
            range: "5y".to_string(),
            sma_length: crate::domain::DEFAULT_SMA_WINDOW,
            request_timeout_secs: 10,
        }
    }
}

/// 명령어 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CommandConfig {
    /// 심볼 조회 접두어
    pub query_prefix: String,
    /// 도움말 별칭
    pub help_aliases: Vec<String>,
    /// 명령어 목록 별칭
    pub command_list_aliases: Vec<String>,
    /// 도우미 호출 별칭
    pub assistant_aliases: Vec<String>,
}

impl Default for CommandConfig {
    fn default() -> Self {
        Self {
            query_prefix: "查".to_string(),
            help_aliases: vec!["幫助".to_string(), "help".to_string()],
            command_list_aliases: vec!["功能".to_string(), "指令".to_string()],
            assistant_aliases: vec!["呼叫寶比".to_string()],
        }
    }
}

/// 저장소 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// CSV 파일 디렉토리
    pub dir: String,
    pub message_log_file: String,
    pub error_log_file: String,
    pub snapshot_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: "data".to_string(),
            message_log_file: "messages.csv".to_string(),
            error_log_file: "errors.csv".to_string(),
            snapshot_file: "snapshot.csv".to_string(),
        }
    }
}

/// 정기 알림 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// 활성화 여부
    pub enabled: bool,
    /// 기준 시간대 (IANA 이름)
    pub timezone: String,
    /// 매일 알림 사용 여부
    pub daily_enabled: bool,
    /// 매일 알림 시각 (시)
    pub daily_hour: u32,
    /// 매주 알림 사용 여부
    pub weekly_enabled: bool,
    /// 매주 알림 요일
    pub weekly_weekday: Weekday,
    /// 매주 알림 시각 (시)
    pub weekly_hour: u32,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timezone: "Asia/Taipei".to_string(),
            daily_enabled: true,
            daily_hour: 9,
            weekly_enabled: true,
            weekly_weekday: Weekday::Mon,
            weekly_hour: 8,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다. 파일이 없으면 기본값을 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let _ = dotenvy::dotenv();

        let builder = config::Config::builder()
            // 파일에서 로드
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("TRENDBOT")
                    .separator("__")
                    .try_parsing(true),
            );

        let mut config: AppConfig = builder.build()?.try_deserialize()?;
        config.apply_legacy_env();
        Ok(config)
    }

    /// LINE 기존 환경 변수를 반영합니다.
    fn apply_legacy_env(&mut self) {
        if let Some(token) = env_non_empty("LINE_ACCESS_TOKEN") {
            self.line.access_token = token;
        }
        if let Some(secret) = env_non_empty("LINE_CHANNEL_SECRET") {
            self.line.channel_secret = secret;
        }
        if let Some(user_id) = env_non_empty("LINE_USER_ID") {
            self.line.push_recipient = user_id;
        }
    }

    /// 필수 설정을 검증하고 문제 목록을 반환합니다.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut problems = Vec::new();

        if !self.line.has_access_token() {
            problems.push("LINE_ACCESS_TOKEN이 설정되지 않았습니다".to_string());
        }
        if self.line.max_messages_per_reply == 0 {
            problems.push("line.max_messages_per_reply는 1 이상이어야 합니다".to_string());
        }
        if self.stock.sma_length == 0 {
            problems.push("stock.sma_length는 1 이상이어야 합니다".to_string());
        }
        if self.stock.default_symbol.trim().is_empty() {
            problems.push("stock.default_symbol이 비어 있습니다".to_string());
        }
        if self.scheduler.daily_hour > 23 || self.scheduler.weekly_hour > 23 {
            problems.push("scheduler 시각은 0-23 범위여야 합니다".to_string());
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(problems)
        }
    }

    /// 비밀 값을 가린 사본을 반환합니다. 설정 출력용입니다.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        copy.line.access_token = mask(&self.line.access_token);
        copy.line.channel_secret = mask(&self.line.channel_secret);
        copy
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn non_empty_secret(value: &str) -> Option<SecretString> {
    let value = value.trim();
    (!value.is_empty()).then(|| SecretString::new(value.to_string().into()))
}

/// 비밀 값을 `abcd****` 형태로 가립니다.
fn mask(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    let visible: String = value.chars().take(4).collect();
    format!("{}****", visible)
}
