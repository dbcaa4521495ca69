use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::timestamp::{self, local_date};
use crate::types::Fingerprint;

/// Seen-job state carried between search cycles.
///
/// Serialized layout:
///
/// ```json
/// {
///   "seen_jobs":    { "<fingerprint-hex>": "<RFC 3339 timestamp>" },
///   "daily_counts": { "<YYYY-MM-DD>": 12 },
///   "last_cleanup": "<RFC 3339 timestamp>"
/// }
/// ```
///
/// The timestamp stored per fingerprint is the last time the posting was
/// emitted as new, not the first time it was ever seen: it is overwritten
/// when a posting re-enters the "new" state after its window expires, and
/// left alone while the posting is suppressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStore {
    #[serde(default, deserialize_with = "timestamp::deserialize_seen")]
    pub(crate) seen_jobs: BTreeMap<Fingerprint, DateTime<Utc>>,

    #[serde(default)]
    pub(crate) daily_counts: BTreeMap<NaiveDate, u32>,

    #[serde(default = "Utc::now", deserialize_with = "timestamp::deserialize")]
    pub(crate) last_cleanup: DateTime<Utc>,
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::new_at(Utc::now())
    }

    pub fn new_at(now: DateTime<Utc>) -> Self {
        Self {
            seen_jobs: BTreeMap::new(),
            daily_counts: BTreeMap::new(),
            last_cleanup: now,
        }
    }

    /// Number of tracked fingerprints
    pub fn len(&self) -> usize {
        self.seen_jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen_jobs.is_empty()
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.seen_jobs.contains_key(fingerprint)
    }

    /// When the posting was last emitted as new
    pub fn first_seen(&self, fingerprint: &Fingerprint) -> Option<DateTime<Utc>> {
        self.seen_jobs.get(fingerprint).copied()
    }

    /// Record (or overwrite) the emission time of a posting.
    pub fn mark_seen(&mut self, fingerprint: Fingerprint, at: DateTime<Utc>) {
        self.seen_jobs.insert(fingerprint, at);
    }

    pub fn seen_jobs(&self) -> impl Iterator<Item = (&Fingerprint, &DateTime<Utc>)> {
        self.seen_jobs.iter()
    }

    pub fn daily_counts(&self) -> impl Iterator<Item = (&NaiveDate, &u32)> {
        self.daily_counts.iter()
    }

    pub fn daily_count(&self, date: NaiveDate) -> u32 {
        self.daily_counts.get(&date).copied().unwrap_or(0)
    }

    pub fn last_cleanup(&self) -> DateTime<Utc> {
        self.last_cleanup
    }

    /// Add `count` new jobs to today's tally.
    ///
    /// Runs on the same day accumulate; this is not a last-run-wins tally.
    pub fn record_daily_count(&mut self, count: u32) {
        self.record_daily_count_at(count, Utc::now());
    }

    pub fn record_daily_count_at(&mut self, count: u32, now: DateTime<Utc>) {
        *self.daily_counts.entry(local_date(now)).or_insert(0) += count;
    }

    /// Counts for the last `days` days, today first, zero-filled.
    pub fn recent_daily_counts(&self, days: u32) -> Vec<(NaiveDate, u32)> {
        self.recent_daily_counts_at(days, Utc::now())
    }

    pub fn recent_daily_counts_at(&self, days: u32, now: DateTime<Utc>) -> Vec<(NaiveDate, u32)> {
        let today = local_date(now);
        (0..u64::from(days))
            .map_while(|offset| today.checked_sub_days(Days::new(offset)))
            .map(|date| (date, self.daily_count(date)))
            .collect()
    }

    pub fn stats(&self) -> HistoryStats {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> HistoryStats {
        let recent = self.recent_daily_counts_at(STATS_WINDOW_DAYS, now);
        let total: u32 = recent.iter().map(|(_, count)| count).sum();
        let avg_daily_jobs = if recent.is_empty() {
            0.0
        } else {
            total as f64 / recent.len() as f64
        };

        HistoryStats {
            total_jobs_tracked: self.seen_jobs.len(),
            recent_daily_counts: recent.into_iter().collect(),
            avg_daily_jobs,
            last_cleanup: self.last_cleanup,
        }
    }
}

const STATS_WINDOW_DAYS: u32 = 7;

/// Summary of the history for status reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_jobs_tracked: usize,
    pub recent_daily_counts: BTreeMap<NaiveDate, u32>,
    pub avg_daily_jobs: f64,
    pub last_cleanup: DateTime<Utc>,
}
