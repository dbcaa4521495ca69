use chrono::{DateTime, Days, Utc};
use tracing::info;

use crate::fingerprint::fingerprint;
use crate::history::HistoryStore;
use crate::timestamp::local_date;
use crate::types::JobRecord;

/// Keep the records that have not been emitted within the last
/// `retention_days` days, marking each emitted record as seen.
///
/// Comparison is by calendar day in local time: a posting last emitted on or
/// before `today - retention_days` is emitted again and its timestamp is
/// overwritten. Suppressed postings keep their stored timestamp. A window
/// reaching past the earliest representable date suppresses every seen posting.
pub fn select_new(
    records: Vec<JobRecord>,
    retention_days: u32,
    store: &mut HistoryStore,
) -> Vec<JobRecord> {
    select_new_at(records, retention_days, store, Utc::now())
}

pub fn select_new_at(
    records: Vec<JobRecord>,
    retention_days: u32,
    store: &mut HistoryStore,
    now: DateTime<Utc>,
) -> Vec<JobRecord> {
    let threshold = local_date(now).checked_sub_days(Days::new(retention_days.into()));
    let total = records.len();

    let fresh: Vec<JobRecord> = records
        .into_iter()
        .filter(|record| {
            let fp = fingerprint(record);
            if let Some(seen) = store.first_seen(&fp) {
                let expired = threshold.is_some_and(|threshold| local_date(seen) <= threshold);
                if !expired {
                    return false;
                }
            }
            store.mark_seen(fp, now);
            true
        })
        .collect();

    info!(
        total,
        new = fresh.len(),
        suppressed = total - fresh.len(),
        retention_days,
        "Selected new jobs"
    );

    fresh
}
