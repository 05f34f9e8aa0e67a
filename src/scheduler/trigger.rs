//! Recurring trigger timing

use crate::config::{ScheduleConfig, ScheduleMode};
use crate::error::{BotError, Result};
use chrono::{DateTime, Duration, NaiveTime, Utc};
use std::fmt;

/// When the recurring cycle fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fixed period after the previous cycle
    Interval(Duration),
    /// Every day at this UTC time
    DailyAt(NaiveTime),
}

impl Trigger {
    pub fn from_config(config: &ScheduleConfig) -> Result<Self> {
        Ok(match config.mode {
            ScheduleMode::Interval => {
                let period = i64::try_from(config.interval_hours)
                    .ok()
                    .and_then(Duration::try_hours)
                    .filter(|period| *period > Duration::zero())
                    .ok_or_else(|| {
                        BotError::InvalidConfig(format!(
                            "schedule.interval_hours out of range: {}",
                            config.interval_hours
                        ))
                    })?;
                Trigger::Interval(period)
            }
            ScheduleMode::Daily => Trigger::DailyAt(config.daily_time()?),
        })
    }

    /// Next firing strictly after `now`
    pub fn next_fire(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match *self {
            Trigger::Interval(period) => now + period,
            Trigger::DailyAt(time) => {
                let today = now.date_naive().and_time(time).and_utc();
                if today > now {
                    today
                } else {
                    today + Duration::days(1)
                }
            }
        }
    }

    /// Time to wait from `now` until the next firing
    pub fn wait_from(&self, now: DateTime<Utc>) -> std::time::Duration {
        (self.next_fire(now) - now).to_std().unwrap_or_default()
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trigger::Interval(period) => write!(f, "every {}h", period.num_hours()),
            Trigger::DailyAt(time) => write!(f, "daily at {} UTC", time.format("%H:%M")),
        }
    }
}
