//! 표 형식 로그 저장소.

pub mod csv_journal;
pub mod memory;

use chrono::{DateTime, Utc};

/// 에러 로그 한 줄: `[시각] context: message`.
pub fn format_error_line(at: DateTime<Utc>, context: &str, message: &str) -> String {
    format!("[{}] {}: {}", at.format("%Y-%m-%d %H:%M:%S"), context, message)
}
