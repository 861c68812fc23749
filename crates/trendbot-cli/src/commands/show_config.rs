//! 현재 설정 출력 (비밀 값은 가림).

use anyhow::Result;

use trendbot_core::AppConfig;

use super::OutputFormat;

pub fn render_config(config: &AppConfig, format: OutputFormat) -> Result<String> {
    let redacted = config.redacted();
    let mut out = match format {
        OutputFormat::Json => serde_json::to_string_pretty(&redacted)?,
        OutputFormat::Text => format!("{:#?}", redacted),
    };

    if let Err(problems) = config.validate() {
        out.push_str("\n\n⚠️ 설정 경고:");
        for problem in problems {
            out.push_str("\n- ");
            out.push_str(&problem);
        }
    }
    Ok(out)
}
