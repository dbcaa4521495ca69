//! Lenient timestamp parsing for history files.
//!
//! New files carry RFC 3339 timestamps. Older files were written with naive
//! ISO-8601 local times (no offset); those are read as local time.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use serde::{de, Deserialize, Deserializer};
use std::collections::BTreeMap;

use crate::types::Fingerprint;

pub(crate) fn parse(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let naive = value.parse::<NaiveDateTime>().ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Calendar day of a timestamp in process-local time.
pub(crate) fn local_date(at: DateTime<Utc>) -> NaiveDate {
    at.with_timezone(&Local).date_naive()
}

/// Local midnight at the start of `date`, as a naive local datetime.
pub(crate) fn local_midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {raw}")))
}

pub(crate) fn deserialize_seen<'de, D>(
    deserializer: D,
) -> Result<BTreeMap<Fingerprint, DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    BTreeMap::<Fingerprint, String>::deserialize(deserializer)?
        .into_iter()
        .map(|(fp, raw)| match parse(&raw) {
            Some(at) => Ok((fp, at)),
            None => Err(de::Error::custom(format!(
                "invalid timestamp for {fp}: {raw}"
            ))),
        })
        .collect()
}
