//! CLI 명령어 구현 모듈.

pub mod check;
pub mod line_info;
pub mod notify;
pub mod route;
pub mod show_config;

use anyhow::Result;

/// 출력 형식.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// 사람이 읽기 쉬운 텍스트
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" | "table" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(anyhow::anyhow!("Invalid format: {}. Use: text, json", s)),
        }
    }
}
