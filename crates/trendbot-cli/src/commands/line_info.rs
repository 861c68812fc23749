//! LINE 채널 연결 점검.

use anyhow::{bail, Context, Result};

use trendbot_notification::{BotInfo, LineClient};

/// 봇 정보를 조회해 토큰이 유효한지 확인합니다.
pub async fn fetch_line_info(line: &LineClient) -> Result<BotInfo> {
    if !line.is_configured() {
        bail!("LINE_ACCESS_TOKEN이 설정되지 않았습니다");
    }
    line.bot_info().await.context("봇 정보 조회 실패")
}

pub fn render_bot_info(info: &BotInfo) -> String {
    format!(
        "봇 이름: {}\n사용자 ID: {}\nBasic ID: {}\n채팅 모드: {}",
        info.display_name,
        info.user_id,
        info.basic_id.as_deref().unwrap_or("-"),
        info.chat_mode.as_deref().unwrap_or("-"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use trendbot_notification::LineClientConfig;

    #[test]
    fn test_render_bot_info() {
        let info = BotInfo {
            user_id: "Ubot".to_string(),
            basic_id: Some("@123abc".to_string()),
            display_name: "Trend Bot".to_string(),
            chat_mode: None,
        };

        let text = render_bot_info(&info);
        assert!(text.contains("봇 이름: Trend Bot"));
        assert!(text.contains("Basic ID: @123abc"));
        assert!(text.ends_with("채팅 모드: -"));
    }

    #[tokio::test]
    async fn test_unconfigured_client_fails_fast() {
        let line = LineClient::new(LineClientConfig::new("http://127.0.0.1:9/v2/bot", "")).unwrap();
        let err = fetch_line_info(&line).await.unwrap_err();
        assert!(err.to_string().contains("LINE_ACCESS_TOKEN"));
    }
}
