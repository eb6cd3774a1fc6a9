//! Pure transitions over fetch configurations.

use std::cmp::Ordering;

use chrono::{DateTime, Duration, Utc};

use crate::catalog::{FetchConfig, FetchStatus};

/// Scheduling rules for fetch configurations.
pub struct ScheduleService;

impl ScheduleService {
    /// Records a successful fetch and schedules the next one.
    pub fn record_success(config: &mut FetchConfig, now: DateTime<Utc>) {
        config.last_fetch_status = FetchStatus::Success;
        config.last_fetch_at = Some(now);
        config.fetch_count += 1;
        config.last_error_message = None;
        Self::reschedule(config, now);
    }

    /// Records a failed fetch and schedules the next attempt.
    ///
    /// The successful fetch count and last fetch time are left unchanged.
    pub fn record_failure(config: &mut FetchConfig, now: DateTime<Utc>, message: impl Into<String>) {
        config.last_fetch_status = FetchStatus::Failed;
        config.last_error_message = Some(message.into());
        Self::reschedule(config, now);
    }

    fn reschedule(config: &mut FetchConfig, now: DateTime<Utc>) {
        let next = now
            .checked_add_signed(Self::interval(config))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        config.next_fetch_at = Some(next);
        config.updated_at = now;
    }

    /// The configured interval as a duration.
    #[must_use]
    pub fn interval(config: &FetchConfig) -> Duration {
        Duration::hours(i64::from(config.fetch_interval_hours))
    }

    /// Returns true if the configuration should be fetched now.
    ///
    /// Inactive configurations are never due. Forced runs ignore the schedule.
    #[must_use]
    pub fn is_due(config: &FetchConfig, now: DateTime<Utc>, force: bool) -> bool {
        config.is_active && (force || config.next_fetch_at.is_none_or(|next| next <= now))
    }

    /// Due configurations in run order: priority descending, then next fetch time
    /// ascending with never-scheduled configurations first.
    #[must_use]
    pub fn due_configs(configs: &[FetchConfig], now: DateTime<Utc>, force: bool) -> Vec<FetchConfig> {
        let mut due: Vec<FetchConfig> = configs
            .iter()
            .filter(|c| Self::is_due(c, now, force))
            .cloned()
            .collect();
        due.sort_by(Self::run_order);
        due
    }

    fn run_order(a: &FetchConfig, b: &FetchConfig) -> Ordering {
        b.priority
            .cmp(&a.priority)
            .then_with(|| match (a.next_fetch_at, b.next_fetch_at) {
                (None, None) => Ordering::Equal,
                (None, Some(_)) => Ordering::Less,
                (Some(_), None) => Ordering::Greater,
                (Some(x), Some(y)) => x.cmp(&y),
            })
            .then_with(|| a.id.cmp(&b.id))
    }
}
