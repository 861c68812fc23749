//! 설정에서 서비스 그래프를 조립합니다.
//!
//! 서버와 CLI가 같은 조립 과정을 공유합니다.

use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono_tz::Tz;
use tracing::{info, warn};

use trendbot_core::{AppConfig, ErrorSink, LogSink, SignalEngine, SnapshotSink};
use trendbot_data::{CsvJournal, MemoryJournal, YahooChartClient};
use trendbot_notification::{
    CommandParser, LineClient, LineClientConfig, MessageRouter, ReplyFormatter, TrendNotifier,
};

use crate::state::AppState;
use crate::tasks::Schedule;

/// 조립된 서비스 묶음.
pub struct Services {
    pub config: AppConfig,
    pub line: Arc<LineClient>,
    pub prices: Arc<YahooChartClient>,
    pub journal: Arc<CsvJournal>,
    pub router: Arc<MessageRouter>,
    pub notifier: Arc<TrendNotifier>,
}

impl Services {
    /// 설정으로 모든 협력자를 생성합니다.
    pub fn from_config(config: AppConfig) -> anyhow::Result<Self> {
        let timezone: Tz = config
            .scheduler
            .timezone
            .parse()
            .map_err(|e| anyhow!("잘못된 시간대 '{}': {}", config.scheduler.timezone, e))?;

        let line = Arc::new(
            LineClient::new(LineClientConfig::from(&config.line))
                .context("LINE 클라이언트 생성 실패")?,
        );
        if !line.is_configured() {
            warn!("LINE 액세스 토큰이 없습니다. 응답과 푸시가 실패합니다");
        }

        let prices = YahooChartClient::from_config(&config.stock)
            .context("시세 클라이언트 생성 실패")?;
        let prices = Arc::new(prices);
        let journal = CsvJournal::open(&config.storage).context("저장소 초기화 실패")?;
        let journal = Arc::new(journal);

        let router = build_router(&config, prices.clone(), line.clone(), journal.clone());

        let notifier = TrendNotifier::new(
            config.stock.default_symbol.clone(),
            prices.clone(),
            line.clone(),
            journal.clone(),
        )
        .with_engine(SignalEngine::new(config.stock.sma_length))
        .with_formatter(formatter_for(&config))
        .with_timezone(timezone)
        .with_recipient(config.line.push_recipient().map(str::to_string))
        .with_snapshot_sink(journal.clone());

        info!(
            symbol = %config.stock.default_symbol,
            window = config.stock.sma_length,
            storage = %config.storage.dir,
            "Services initialized"
        );

        Ok(Self {
            config,
            line,
            prices,
            journal,
            router: Arc::new(router),
            notifier: Arc::new(notifier),
        })
    }

    /// 웹훅 서버 상태를 만듭니다.
    pub fn app_state(&self, scheduler_enabled: bool) -> AppState {
        let mut state = AppState::new(self.router.clone())
            .with_channel_secret(self.config.line.channel_secret_secret())
            .with_line_configured(self.line.is_configured())
            .with_scheduler_enabled(scheduler_enabled);
        if self.config.line.fetch_profiles {
            state = state.with_profiles(self.line.clone());
        }
        state
    }

    /// 파일에 기록하지 않는 라우터. 기록은 `journal`에 남습니다.
    pub fn dry_run_router(&self, journal: Arc<MemoryJournal>) -> MessageRouter {
        build_router(&self.config, self.prices.clone(), self.line.clone(), journal)
    }

    /// 설정된 정기 알림 일정.
    pub fn schedule(&self) -> anyhow::Result<Schedule> {
        Schedule::from_config(&self.config.scheduler).map_err(Into::into)
    }
}

fn formatter_for(config: &AppConfig) -> ReplyFormatter {
    ReplyFormatter::default().with_interval(&config.stock.interval)
}

fn build_router<J>(
    config: &AppConfig,
    prices: Arc<YahooChartClient>,
    line: Arc<LineClient>,
    journal: Arc<J>,
) -> MessageRouter
where
    J: LogSink + ErrorSink + SnapshotSink + 'static,
{
    MessageRouter::new(prices, line, journal.clone(), journal.clone())
        .with_parser(CommandParser::from_config(&config.commands))
        .with_formatter(formatter_for(config))
        .with_engine(SignalEngine::new(config.stock.sma_length))
        .with_snapshot_sink(journal)
        .with_max_messages_per_reply(config.line.max_messages_per_reply)
}
