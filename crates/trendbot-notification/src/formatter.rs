//! 응답 메시지 포맷터.
//!
//! 신호를 사람이 읽을 수 있는 LINE 텍스트로 변환하고, 키워드/에러용 고정
//! 문구를 제공합니다. 어떤 입력에도 패닉하지 않으며 누락되거나 유한하지 않은
//! 값은 `unknown`으로 표시합니다.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use trendbot_core::{TrendSignal, TrendStatus};

use crate::random::{RandomSource, ThreadRandom};

/// 수동 조회 응답의 출처 표시.
pub const MANUAL_QUERY_LABEL: &str = "手動查詢";

const UNKNOWN_VALUE: &str = "unknown";

/// 고정 응답 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StaticReply {
    Help,
    CommandList,
    /// 알 수 없는 명령어 (여러 문구 중 무작위)
    Unknown,
    /// 일반 시스템 오류
    Error,
    /// 도우미 기능 미설정
    AssistantUnavailable,
    /// 도우미 호출 실패
    AssistantOffline,
}

/// 응답 문구 테이블.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplyTemplates {
    pub help: String,
    pub command_list: String,
    pub unknown: Vec<String>,
    pub error: String,
    pub assistant_unavailable: String,
    pub assistant_offline: String,
    /// `{symbol}` 자리표시자를 심볼로 치환
    pub data_unavailable: String,
}

impl Default for ReplyTemplates {
    fn default() -> Self {
        Self {
            help: "🤖 LINE Bot 使用說明\n\n\
                   📈 查<代號> - 查詢股票收盤價與長期均線（例：查SPY、查NVDA）\n\
                   🍼 呼叫寶比 - 呼叫寶比助手\n\
                   ❓ 幫助 - 顯示此說明訊息\n\
                   📋 功能 - 顯示所有可用指令\n\n\
                   如需更多協助，請聯繫管理員。"
                .to_string(),
            command_list: "📋 可用指令列表：\n\n\
                           • 查<代號>（例：查SPY）\n\
                           • 呼叫寶比\n\
                           • 幫助 / help\n\
                           • 功能 / 指令\n\n\
                           💡 提示：指令不區分大小寫"
                .to_string(),
            unknown: vec![
                "🤔 我不太理解您的意思，請輸入「幫助」查看可用指令。".to_string(),
                "❓ 抱歉，我無法識別這個指令。輸入「功能」查看所有可用功能。".to_string(),
                "💭 似乎是我不認識的指令呢！試試輸入「幫助」獲取使用說明。".to_string(),
            ],
            error: "⚠️ 系統暫時遇到問題，請稍後再試。\n如問題持續，請聯繫管理員。".to_string(),
            assistant_unavailable: "🍼 寶比功能暫時無法使用，請稍後再試。".to_string(),
            assistant_offline: "🍼 寶比目前不在線上，請稍後再試。".to_string(),
            data_unavailable: "抱歉，目前無法獲取 {symbol} 數據，請稍後再試。".to_string(),
        }
    }
}

/// 봉 간격에 해당하는 이동평균 단위 (`1wk` → `週`).
pub fn period_unit(interval: &str) -> &'static str {
    match interval.trim().to_ascii_lowercase().as_str() {
        "1d" | "5d" => "日",
        "1wk" => "週",
        "1mo" | "3mo" => "月",
        "1h" | "60m" | "90m" => "小時",
        _ => "期",
    }
}

/// 응답 포맷터.
#[derive(Clone)]
pub struct ReplyFormatter {
    templates: ReplyTemplates,
    random: Arc<dyn RandomSource>,
    period_unit: &'static str,
}

impl Default for ReplyFormatter {
    fn default() -> Self {
        Self::new(ReplyTemplates::default(), Arc::new(ThreadRandom))
    }
}

impl std::fmt::Debug for ReplyFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReplyFormatter")
            .field("templates", &self.templates)
            .field("period_unit", &self.period_unit)
            .finish()
    }
}

impl ReplyFormatter {
    pub fn new(templates: ReplyTemplates, random: Arc<dyn RandomSource>) -> Self {
        Self {
            templates,
            random,
            period_unit: "週",
        }
    }

    /// 봉 간격으로 이동평균 단위를 설정합니다.
    pub fn with_interval(mut self, interval: &str) -> Self {
        self.period_unit = period_unit(interval);
        self
    }

    /// 수동 조회 응답.
    ///
    /// ```text
    /// 📊 SPY 技術提醒（手動查詢）
    /// 📈 收盤價：$512.34
    /// 📉 200週均線：$450.12
    /// 📌 狀態：⭕ 安全
    /// ```
    pub fn format_signal(&self, signal: &TrendSignal, source_label: &str) -> String {
        let header = if source_label.trim().is_empty() {
            format!("📊 {} 技術提醒", display_symbol(&signal.symbol))
        } else {
            format!(
                "📊 {} 技術提醒（{}）",
                display_symbol(&signal.symbol),
                source_label.trim()
            )
        };
        format!("{}\n{}", header, self.signal_body(signal))
    }

    /// 정기 알림 메시지. 출처 대신 날짜 줄이 들어갑니다.
    pub fn format_scheduled(&self, signal: &TrendSignal, date: NaiveDate) -> String {
        format!(
            "📊 {} 技術提醒\n📅 日期：{}\n{}",
            display_symbol(&signal.symbol),
            date.format("%Y-%m-%d"),
            self.signal_body(signal)
        )
    }

    /// 시세를 가져오지 못했을 때의 응답.
    pub fn format_unavailable(&self, symbol: &str) -> String {
        self.templates
            .data_unavailable
            .replace("{symbol}", display_symbol(symbol))
    }

    /// 고정 응답.
    pub fn format_static(&self, reply: StaticReply) -> Vec<String> {
        let text = match reply {
            StaticReply::Help => self.templates.help.clone(),
            StaticReply::CommandList => self.templates.command_list.clone(),
            StaticReply::Unknown => self.pick_unknown(),
            StaticReply::Error => self.templates.error.clone(),
            StaticReply::AssistantUnavailable => self.templates.assistant_unavailable.clone(),
            StaticReply::AssistantOffline => self.templates.assistant_offline.clone(),
        };
        vec![text]
    }

    fn pick_unknown(&self) -> String {
        let choices = &self.templates.unknown;
        if choices.is_empty() {
            return self.templates.help.clone();
        }
        let index = self.random.pick(choices.len()).min(choices.len() - 1);
        choices[index].clone()
    }

    fn signal_body(&self, signal: &TrendSignal) -> String {
        let window = if signal.window > 0 {
            signal.window.to_string()
        } else {
            UNKNOWN_VALUE.to_string()
        };

        format!(
            "📈 收盤價：{}\n📉 {}{}均線：{}\n📌 狀態：{}",
            price(signal.last_close),
            window,
            self.period_unit,
            price(signal.moving_average),
            status_label(signal),
        )
    }
}

fn display_symbol(symbol: &str) -> &str {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        UNKNOWN_VALUE
    } else {
        symbol
    }
}

fn price(value: f64) -> String {
    if value.is_finite() {
        format!("${:.2}", value)
    } else {
        UNKNOWN_VALUE.to_string()
    }
}

fn status_label(signal: &TrendSignal) -> &'static str {
    if !signal.is_finite() {
        return UNKNOWN_VALUE;
    }
    match signal.status() {
        TrendStatus::Below => "✅ 跌破！可以買進",
        TrendStatus::Safe => "⭕ 安全",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::SeededRandom;
    use chrono::Utc;

    fn signal(symbol: &str, close: f64, average: f64) -> TrendSignal {
        TrendSignal {
            symbol: symbol.to_string(),
            last_close: close,
            moving_average: average,
            window: 200,
            below_average: close < average,
            last_close_time: None,
            computed_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_signal_below() {
        let formatter = ReplyFormatter::default();
        let message = formatter.format_signal(&signal("SPY", 400.0, 450.126), MANUAL_QUERY_LABEL);

        assert!(message.starts_with("📊 SPY 技術提醒（手動查詢）"));
        assert!(message.contains("收盤價：$400.00"));
        assert!(message.contains("200週均線：$450.13"));
        assert!(message.contains("✅ 跌破！可以買進"));
    }

    #[test]
    fn test_format_signal_safe() {
        let formatter = ReplyFormatter::default().with_interval("1d");
        let message = formatter.format_signal(&signal("NVDA", 120.5, 100.0), MANUAL_QUERY_LABEL);

        assert!(message.contains("NVDA"));
        assert!(message.contains("$120.50"));
        assert!(message.contains("200日均線：$100.00"));
        assert!(message.contains("⭕ 安全"));
    }

    #[test]
    fn test_format_signal_invalid_values() {
        let formatter = ReplyFormatter::default();
        let mut sig = signal("", f64::NAN, f64::INFINITY);
        sig.window = 0;
        let message = formatter.format_signal(&sig, "");

        assert!(message.starts_with("📊 unknown 技術提醒\n"));
        assert!(message.contains("收盤價：unknown"));
        assert!(message.contains("unknown週均線：unknown"));
        assert!(message.contains("狀態：unknown"));
    }

    #[test]
    fn test_format_scheduled() {
        let formatter = ReplyFormatter::default();
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let message = formatter.format_scheduled(&signal("SPY", 400.0, 450.0), date);

        assert!(message.starts_with("📊 SPY 技術提醒\n📅 日期：2025-03-10\n"));
        assert!(!message.contains("手動查詢"));
        assert!(message.contains("✅ 跌破！可以買進"));
    }

    #[test]
    fn test_format_unavailable() {
        let formatter = ReplyFormatter::default();
        assert_eq!(
            formatter.format_unavailable("QQQ"),
            "抱歉，目前無法獲取 QQQ 數據，請稍後再試。"
        );
    }

    #[test]
    fn test_format_static() {
        let formatter = ReplyFormatter::default();
        let help = formatter.format_static(StaticReply::Help);
        assert_eq!(help.len(), 1);
        assert!(help[0].contains("使用說明"));
        assert!(formatter.format_static(StaticReply::CommandList)[0].contains("可用指令列表"));
        assert!(formatter.format_static(StaticReply::Error)[0].starts_with("⚠️"));
    }

    #[test]
    fn test_unknown_reply_from_table() {
        let templates = ReplyTemplates::default();
        let formatter = ReplyFormatter::new(templates.clone(), Arc::new(SeededRandom::new(42)));

        for _ in 0..10 {
            let reply = formatter.format_static(StaticReply::Unknown);
            assert!(templates.unknown.contains(&reply[0]));
        }
    }

    #[test]
    fn test_unknown_reply_empty_table_falls_back_to_help() {
        let templates = ReplyTemplates {
            unknown: Vec::new(),
            ..ReplyTemplates::default()
        };
        let formatter = ReplyFormatter::new(templates.clone(), Arc::new(ThreadRandom));
        assert_eq!(formatter.format_static(StaticReply::Unknown), vec![templates.help]);
    }

    #[test]
    fn test_period_unit() {
        assert_eq!(period_unit("1wk"), "週");
        assert_eq!(period_unit("1d"), "日");
        assert_eq!(period_unit("1mo"), "月");
        assert_eq!(period_unit("15m"), "期");
    }
}
