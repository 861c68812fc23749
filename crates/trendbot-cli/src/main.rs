//! 추세 알림 봇 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # 기본 심볼(SPY) 200주 이동평균 점검
//! trendbot check
//!
//! # 다른 심볼을 JSON으로 출력
//! trendbot check -s QQQ --format json
//!
//! # 채팅 메시지 라우팅 시뮬레이션 (전송/기록 없음)
//! trendbot route "查AAPL"
//!
//! # 정기 알림 미리보기 / 즉시 전송
//! trendbot notify --dry-run
//! trendbot notify
//!
//! # LINE 채널 점검과 설정 출력
//! trendbot line-info
//! trendbot config
//! ```

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::error;

use trendbot_api::Services;
use trendbot_cli::commands::{
    check::{check_symbol, render_check, CheckConfig},
    line_info::{fetch_line_info, render_bot_info},
    notify::run_notify,
    route::{render_outcome, simulate_route},
    show_config::render_config,
    OutputFormat,
};
use trendbot_core::{init_logging, AppConfig, LogConfig, DEFAULT_CONFIG_PATH};
use trendbot_data::MemoryJournal;

#[derive(Parser)]
#[command(name = "trendbot")]
#[command(about = "Trend bot CLI - 200주 이동평균 추세 알림 봇", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일
    #[arg(short, long, global = true, env = "TRENDBOT_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 심볼의 종가와 이동평균 점검
    Check {
        /// 종목 심볼 (기본: 설정의 default_symbol)
        #[arg(short, long)]
        symbol: Option<String>,

        /// 출력 형식 (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// 채팅 메시지 라우팅 시뮬레이션
    Route {
        /// 사용자 입력 텍스트
        text: String,
    },

    /// 정기 알림 즉시 실행
    Notify {
        /// 드라이런 모드 (전송하지 않고 메시지만 출력)
        #[arg(long, default_value = "false")]
        dry_run: bool,
    },

    /// LINE 봇 정보 조회
    LineInfo,

    /// 현재 설정 출력 (비밀 값은 가림)
    Config {
        /// 출력 형식 (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = AppConfig::load(&cli.config)?;
    init_logging(LogConfig::from(&config.logging))?;

    if let Err(e) = run(cli.command, config).await {
        error!("Command failed: {:#}", e);
        return Err(e.into());
    }
    Ok(())
}

async fn run(command: Commands, config: AppConfig) -> anyhow::Result<()> {
    match command {
        Commands::Config { format } => {
            println!("{}", render_config(&config, OutputFormat::parse(&format)?)?);
        }

        Commands::Check { symbol, format } => {
            let services = Services::from_config(config)?;
            let check = CheckConfig {
                symbol: symbol.unwrap_or_else(|| services.config.stock.default_symbol.clone()),
                window: services.config.stock.sma_length,
                interval: services.config.stock.interval.clone(),
                format: OutputFormat::parse(&format)?,
            };

            let signal = check_symbol(services.prices.as_ref(), &check).await?;
            println!("{}", render_check(&signal, &check)?);
        }

        Commands::Route { text } => {
            let services = Services::from_config(config)?;
            let journal = Arc::new(MemoryJournal::new());
            let router = services.dry_run_router(journal.clone());

            let outcome = simulate_route(&router, &text).await;
            print!("{}", render_outcome(&outcome));
            for line in journal.errors().await {
                println!("⚠️ {}", line);
            }
        }

        Commands::Notify { dry_run } => {
            let services = Services::from_config(config)?;
            let outcome = run_notify(&services.notifier, dry_run).await?;

            println!("{}", outcome.message);
            if outcome.delivered {
                println!("\n✅ 알림 전송 완료");
            } else {
                println!("\n(드라이런: 전송하지 않음)");
            }
        }

        Commands::LineInfo => {
            let services = Services::from_config(config)?;
            let info = fetch_line_info(&services.line).await?;
            println!("{}", render_bot_info(&info));
        }
    }

    Ok(())
}
