use chrono::{DateTime, Datelike, Duration, Local, Utc, Weekday};
use serde::Serialize;
use tracing::info;

use crate::history::HistoryStore;
use crate::timestamp::{local_date, local_midnight};

/// What a sweep removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SweepStats {
    pub jobs_removed: usize,
    pub daily_counts_removed: usize,
}

impl SweepStats {
    pub fn total(&self) -> usize {
        self.jobs_removed + self.daily_counts_removed
    }
}

/// Drop history older than `max_age_days` and stamp the cleanup time.
///
/// A horizon reaching past the earliest representable time removes nothing.
pub fn sweep(store: &mut HistoryStore, max_age_days: u32) -> SweepStats {
    sweep_at(store, max_age_days, Utc::now())
}

pub fn sweep_at(store: &mut HistoryStore, max_age_days: u32, now: DateTime<Utc>) -> SweepStats {
    let jobs_before = store.seen_jobs.len();
    let counts_before = store.daily_counts.len();

    if let Some(cutoff) = now.checked_sub_signed(Duration::days(max_age_days.into())) {
        let local_cutoff = cutoff.with_timezone(&Local).naive_local();
        store.seen_jobs.retain(|_, seen| *seen >= cutoff);
        store
            .daily_counts
            .retain(|date, _| local_midnight(*date) >= local_cutoff);
    }

    store.last_cleanup = now;

    let stats = SweepStats {
        jobs_removed: jobs_before - store.seen_jobs.len(),
        daily_counts_removed: counts_before - store.daily_counts.len(),
    };

    info!(
        jobs_removed = stats.jobs_removed,
        daily_counts_removed = stats.daily_counts_removed,
        max_age_days,
        "Swept job history"
    );

    stats
}

/// True on `weekday` unless a sweep already ran that day.
pub fn sweep_due(store: &HistoryStore, weekday: Weekday, now: DateTime<Utc>) -> bool {
    let today = local_date(now);
    today.weekday() == weekday && local_date(store.last_cleanup) != today
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Fingerprint;

    #[test]
    fn test_daily_counts_past_horizon_removed() {
        let now = Utc::now();
        let mut store = HistoryStore::new_at(now);
        store.record_daily_count_at(5, now - Duration::days(45));
        store.record_daily_count_at(2, now - Duration::days(5));

        let stats = sweep_at(&mut store, 30, now);

        assert_eq!(stats.daily_counts_removed, 1);
        assert_eq!(store.daily_counts().count(), 1);
    }

    #[test]
    fn test_sweep_stamps_last_cleanup() {
        let then = Utc::now() - Duration::days(9);
        let now = Utc::now();
        let mut store = HistoryStore::new_at(then);

        let stats = sweep_at(&mut store, 30, now);

        assert_eq!(stats.total(), 0);
        assert_eq!(store.last_cleanup(), now);
    }

    #[test]
    fn test_sweep_keeps_entry_on_the_cutoff() {
        let now = Utc::now();
        let mut store = HistoryStore::new_at(now);
        let fp = Fingerprint::from_hex("edge");
        store.mark_seen(fp.clone(), now - Duration::days(30));

        sweep_at(&mut store, 30, now);
        assert!(store.contains(&fp));
    }

    #[test]
    fn test_sweep_due_only_on_weekday_once() {
        let now = Utc::now();
        let today = local_date(now).weekday();
        let other = today.succ();

        let stale = HistoryStore::new_at(now - Duration::days(7));
        assert!(sweep_due(&stale, today, now));
        assert!(!sweep_due(&stale, other, now));

        let fresh = HistoryStore::new_at(now);
        assert!(!sweep_due(&fresh, today, now));
    }

    #[test]
    fn test_horizon_past_calendar_start_removes_nothing() {
        let now = Utc::now();
        let mut store = HistoryStore::new_at(now - Duration::days(3));
        let fp = Fingerprint::from_hex("ancient");
        store.mark_seen(fp.clone(), now - Duration::days(5000));
        store.record_daily_count_at(1, now - Duration::days(5000));

        let stats = sweep_at(&mut store, 100_000_000, now);

        assert_eq!(stats.total(), 0);
        assert!(store.contains(&fp));
        assert_eq!(store.daily_counts().count(), 1);
        assert_eq!(store.last_cleanup(), now);
    }
}
