//! 정기 알림 수동 실행.

use anyhow::Result;
use tracing::info;

use trendbot_notification::{NotifyOutcome, TrendNotifier};

/// 알림을 한 번 실행합니다. `dry_run`이면 전송하지 않습니다.
pub async fn run_notify(notifier: &TrendNotifier, dry_run: bool) -> Result<NotifyOutcome> {
    let outcome = if dry_run {
        notifier.preview().await?
    } else {
        notifier.notify_once().await?
    };

    info!(
        symbol = notifier.symbol(),
        delivered = outcome.delivered,
        dry_run,
        "Notification run finished"
    );
    Ok(outcome)
}
