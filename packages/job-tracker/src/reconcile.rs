use std::collections::HashSet;
use tracing::debug;

use crate::fingerprint::fingerprint;
use crate::types::JobRecord;

/// Collapse postings seen on several boards within one run.
///
/// Uses the same identity as the history store. The first occurrence in
/// input order wins; nothing is merged from the dropped duplicates.
pub fn reconcile(records: Vec<JobRecord>) -> Vec<JobRecord> {
    let total = records.len();
    let mut seen = HashSet::with_capacity(total);

    let unique: Vec<JobRecord> = records
        .into_iter()
        .filter(|record| seen.insert(fingerprint(record)))
        .collect();

    debug!(
        total,
        unique = unique.len(),
        duplicates = total - unique.len(),
        "Reconciled cross-source duplicates"
    );

    unique
}
