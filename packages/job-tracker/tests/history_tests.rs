//! Behaviour of the seen-job history across cycles: selection, expiry,
//! persistence and sweeping.

use chrono::{Duration, Utc};
use job_tracker::{
    fingerprint, normalize_batch, select_new, select_new_at, sweep_at, HistoryStorage,
    HistoryStore, JobRecord, JsonFileStorage, RawBatch, RawJobRecord, SourceKind, SourceName,
};

fn job(title: &str) -> JobRecord {
    JobRecord::new(title, "Acme", "Gurugram", SourceName::Indeed)
}

#[test]
fn same_identity_same_fingerprint_across_sources() {
    let mut a = JobRecord::new("Operations Coordinator", "Acme", "Gurugram", SourceName::Indeed);
    a.salary = "9-12 LPA".into();
    a.source_url = "https://in.indeed.com/viewjob?jk=1&from=serp".into();

    let mut b = JobRecord::new("operations coordinator ", " ACME", "gurugram", SourceName::Naukri);
    b.experience_hint = "0-2 Yrs".into();
    b.source_url = "https://www.naukri.com/job-listings-1".into();

    assert_eq!(fingerprint(&a), fingerprint(&b));
}

#[test]
fn rerun_within_window_is_suppressed() {
    let mut store = HistoryStore::new();

    let first = select_new(vec![job("Operations Coordinator")], 3, &mut store);
    assert_eq!(first.len(), 1);
    assert_eq!(store.len(), 1);

    let second = select_new(vec![job("Operations Coordinator")], 3, &mut store);
    assert!(second.is_empty());
    assert_eq!(store.len(), 1);
}

#[test]
fn expired_entry_is_reemitted_and_restamped() {
    let now = Utc::now();
    let record = job("Operations Coordinator");
    let mut store = HistoryStore::new_at(now);
    store.mark_seen(fingerprint(&record), now - Duration::days(4));

    let out = select_new_at(vec![record.clone()], 3, &mut store, now);

    assert_eq!(out, vec![record.clone()]);
    assert_eq!(store.first_seen(&fingerprint(&record)), Some(now));
}

#[test]
fn emission_order_matches_input_order() {
    let mut store = HistoryStore::new();
    let input = vec![job("A"), job("B"), job("C")];

    let out = select_new(input.clone(), 3, &mut store);

    assert_eq!(out, input);
}

#[test]
fn mixed_batch_only_emits_unsuppressed() {
    let now = Utc::now();
    let mut store = HistoryStore::new_at(now);
    store.mark_seen(fingerprint(&job("B")), now - Duration::days(1));

    let out = select_new_at(vec![job("A"), job("B"), job("C")], 3, &mut store, now);
    let titles: Vec<&str> = out.iter().map(|j| j.title.as_str()).collect();

    assert_eq!(titles, vec!["A", "C"]);
}

#[test]
fn store_round_trips_through_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let storage = JsonFileStorage::in_dir(dir.path());

    let now = Utc::now();
    let mut store = HistoryStore::new_at(now - Duration::days(2));
    select_new_at(vec![job("A"), job("B")], 3, &mut store, now);
    store.record_daily_count_at(2, now);
    store.record_daily_count_at(5, now - Duration::days(1));

    storage.save(&store).unwrap();
    let loaded = storage.load().unwrap();

    assert_eq!(loaded, store);
}

#[test]
fn sweep_removes_old_and_keeps_recent() {
    let now = Utc::now();
    let old = job("Old");
    let recent = job("Recent");
    let mut store = HistoryStore::new_at(now);
    store.mark_seen(fingerprint(&old), now - Duration::days(40));
    store.mark_seen(fingerprint(&recent), now - Duration::days(10));

    let stats = sweep_at(&mut store, 30, now);

    assert!(stats.total() >= 1);
    assert!(!store.contains(&fingerprint(&old)));
    assert!(store.contains(&fingerprint(&recent)));
    assert_eq!(store.last_cleanup(), now);
}

#[test]
fn end_to_end_two_runs_same_day() {
    let raw = || {
        RawBatch::new(
            SourceName::Indeed,
            SourceKind::Raw,
            vec![
                RawJobRecord::new("Operations Coordinator", "Acme").with_location("Gurugram"),
                RawJobRecord::new("", "Beta"),
            ],
        )
    };
    let mut store = HistoryStore::new();

    let records = normalize_batch(raw());
    assert_eq!(records.len(), 1);

    let fresh = select_new(records, 3, &mut store);
    assert_eq!(fresh.len(), 1);
    store.record_daily_count(fresh.len() as u32);
    assert_eq!(store.stats().recent_daily_counts.values().sum::<u32>(), 1);

    let again = select_new(normalize_batch(raw()), 3, &mut store);
    assert!(again.is_empty());
}
