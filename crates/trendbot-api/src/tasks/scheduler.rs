//! 정기 알림 스케줄러.
//!
//! 설정된 시간대 기준의 벽시계 시각(매일 N시, 매주 X요일 N시)에
//! [`TrendNotifier`]를 실행합니다. 실행 실패는 기록만 하고 다음 일정을
//! 계속 기다리며, `CancellationToken`으로 종료합니다.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Days, TimeZone, Utc, Weekday};
use chrono_tz::Tz;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use trendbot_core::SchedulerConfig;
use trendbot_notification::TrendNotifier;

/// 일정 설정 오류.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("알 수 없는 시간대: {0}")]
    InvalidTimezone(String),

    #[error("시각은 0~23 사이여야 합니다: {0}")]
    InvalidHour(u32),
}

/// 알림 시점.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// 매일 정해진 시각
    Daily { hour: u32 },
    /// 매주 정해진 요일과 시각
    Weekly { weekday: Weekday, hour: u32 },
}

impl Trigger {
    fn hour(&self) -> u32 {
        match self {
            Trigger::Daily { hour } | Trigger::Weekly { hour, .. } => *hour,
        }
    }

    fn matches_day(&self, weekday: Weekday) -> bool {
        match self {
            Trigger::Daily { .. } => true,
            Trigger::Weekly { weekday: w, .. } => *w == weekday,
        }
    }

    /// `after` 이후(초과) 첫 실행 시각.
    fn next_after(&self, after: DateTime<Utc>, timezone: Tz) -> Option<DateTime<Utc>> {
        let local_today = after.with_timezone(&timezone).date_naive();

        // 주간 트리거도 8일 안에는 반드시 한 번 걸림
        (0..=7u64).find_map(|offset| {
            let date = local_today.checked_add_days(Days::new(offset))?;
            if !self.matches_day(date.weekday()) {
                return None;
            }
            let naive = date.and_hms_opt(self.hour(), 0, 0)?;
            let candidate = timezone
                .from_local_datetime(&naive)
                .earliest()?
                .with_timezone(&Utc);
            (candidate > after).then_some(candidate)
        })
    }
}

/// 알림 일정.
#[derive(Debug, Clone)]
pub struct Schedule {
    timezone: Tz,
    triggers: Vec<Trigger>,
}

impl Schedule {
    pub fn new(timezone: Tz) -> Self {
        Self {
            timezone,
            triggers: Vec::new(),
        }
    }

    pub fn with_trigger(mut self, trigger: Trigger) -> Self {
        self.triggers.push(trigger);
        self
    }

    /// 설정에서 일정을 만듭니다. 비활성화된 트리거는 제외합니다.
    pub fn from_config(config: &SchedulerConfig) -> Result<Self, ScheduleError> {
        let timezone: Tz = config
            .timezone
            .parse()
            .map_err(|_| ScheduleError::InvalidTimezone(config.timezone.clone()))?;

        let mut schedule = Self::new(timezone);
        if config.daily_enabled {
            schedule = schedule.with_trigger(Trigger::Daily {
                hour: valid_hour(config.daily_hour)?,
            });
        }
        if config.weekly_enabled {
            schedule = schedule.with_trigger(Trigger::Weekly {
                weekday: config.weekly_weekday,
                hour: valid_hour(config.weekly_hour)?,
            });
        }
        Ok(schedule)
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn triggers(&self) -> &[Trigger] {
        &self.triggers
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }

    /// `after` 이후 가장 가까운 실행 시각. 같은 시각의 트리거는 한 번만 실행됩니다.
    pub fn next_fire(&self, after: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.triggers
            .iter()
            .filter_map(|t| t.next_after(after, self.timezone))
            .min()
    }
}

fn valid_hour(hour: u32) -> Result<u32, ScheduleError> {
    if hour < 24 {
        Ok(hour)
    } else {
        Err(ScheduleError::InvalidHour(hour))
    }
}

/// 스케줄러 메인 루프.
pub async fn run_scheduler(
    notifier: Arc<TrendNotifier>,
    schedule: Schedule,
    shutdown: CancellationToken,
) {
    if schedule.is_empty() {
        warn!("활성화된 알림 일정이 없어 스케줄러를 시작하지 않습니다");
        return;
    }

    let mut last_fired: Option<DateTime<Utc>> = None;

    loop {
        let now = Utc::now();
        let after = last_fired.map_or(now, |last| last.max(now));
        let Some(next) = schedule.next_fire(after) else {
            warn!("다음 알림 시각을 계산할 수 없습니다");
            break;
        };
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);

        info!(
            symbol = notifier.symbol(),
            next = %next.with_timezone(&schedule.timezone()),
            wait_secs = wait.as_secs(),
            "다음 정기 알림 예약"
        );

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                last_fired = Some(next);
                match notifier.notify_once().await {
                    Ok(outcome) => info!(
                        symbol = %outcome.signal.symbol,
                        status = outcome.signal.status().as_str(),
                        "정기 알림 전송 완료"
                    ),
                    Err(e) => error!(error = %e, "정기 알림 실패"),
                }
            }

            _ = shutdown.cancelled() => {
                info!("스케줄러 종료");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Asia::Taipei;

    fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_daily_next_fire_same_day() {
        let schedule = Schedule::new(Taipei).with_trigger(Trigger::Daily { hour: 9 });

        // 2024-03-04 00:30 UTC = 08:30 Taipei
        let next = schedule.next_fire(utc(2024, 3, 4, 0, 30)).unwrap();
        assert_eq!(next, utc(2024, 3, 4, 1, 0));
    }

    #[test]
    fn test_daily_next_fire_rolls_to_tomorrow() {
        let schedule = Schedule::new(Taipei).with_trigger(Trigger::Daily { hour: 9 });

        // 정확히 09:00 Taipei면 다음 날
        let next = schedule.next_fire(utc(2024, 3, 4, 1, 0)).unwrap();
        assert_eq!(next, utc(2024, 3, 5, 1, 0));
    }

    #[test]
    fn test_weekly_next_fire() {
        let schedule = Schedule::new(Taipei).with_trigger(Trigger::Weekly {
            weekday: Weekday::Mon,
            hour: 8,
        });

        // 2024-03-05 (화) → 다음 월요일 2024-03-11 08:00 Taipei
        let next = schedule.next_fire(utc(2024, 3, 5, 12, 0)).unwrap();
        assert_eq!(next, utc(2024, 3, 11, 0, 0));

        // 월요일 07:59 Taipei → 당일
        let next = schedule.next_fire(utc(2024, 3, 10, 23, 59)).unwrap();
        assert_eq!(next, utc(2024, 3, 11, 0, 0));
    }

    #[test]
    fn test_earliest_trigger_wins() {
        let schedule = Schedule::new(Taipei)
            .with_trigger(Trigger::Daily { hour: 9 })
            .with_trigger(Trigger::Weekly {
                weekday: Weekday::Mon,
                hour: 8,
            });

        // 일요일 밤 → 월요일 08:00 주간 알림이 먼저
        let next = schedule.next_fire(utc(2024, 3, 10, 15, 0)).unwrap();
        assert_eq!(next, utc(2024, 3, 11, 0, 0));

        // 월요일 08:00 이후 → 09:00 일간 알림
        let next = schedule.next_fire(next).unwrap();
        assert_eq!(next, utc(2024, 3, 11, 1, 0));
    }

    #[test]
    fn test_from_config() {
        let schedule = Schedule::from_config(&SchedulerConfig::default()).unwrap();
        assert_eq!(schedule.timezone(), Taipei);
        assert_eq!(schedule.triggers().len(), 2);

        let config = SchedulerConfig {
            daily_enabled: false,
            ..Default::default()
        };
        let schedule = Schedule::from_config(&config).unwrap();
        assert_eq!(
            schedule.triggers(),
            &[Trigger::Weekly {
                weekday: Weekday::Mon,
                hour: 8
            }]
        );
    }

    #[test]
    fn test_from_config_rejects_invalid_values() {
        let config = SchedulerConfig {
            timezone: "Mars/Olympus".to_string(),
            ..Default::default()
        };
        assert_eq!(
            Schedule::from_config(&config).unwrap_err(),
            ScheduleError::InvalidTimezone("Mars/Olympus".to_string())
        );

        let config = SchedulerConfig {
            daily_hour: 24,
            ..Default::default()
        };
        assert_eq!(
            Schedule::from_config(&config).unwrap_err(),
            ScheduleError::InvalidHour(24)
        );
    }

    #[test]
    fn test_empty_schedule_has_no_fire_time() {
        let schedule = Schedule::new(Taipei);
        assert!(schedule.is_empty());
        assert!(schedule.next_fire(Utc::now()).is_none());
    }
}
