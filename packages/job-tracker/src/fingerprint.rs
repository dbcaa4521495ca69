use crate::types::{Fingerprint, JobRecord};

/// Joins the identity fields before hashing. Not expected in natural text.
const FIELD_SEPARATOR: &str = "||";

/// Compute the identity of a normalized job record
///
/// MD5 over the case-folded, trimmed (title, company, location) triple.
/// Salary, URL, source and description are deliberately left out: they vary
/// between boards and scrape times for the same real-world posting.
pub fn fingerprint(record: &JobRecord) -> Fingerprint {
    fingerprint_fields(&record.title, &record.company, &record.location)
}

/// Same digest as [`fingerprint`], from the raw identity fields.
pub fn fingerprint_fields(title: &str, company: &str, location: &str) -> Fingerprint {
    let key = [title, company, location]
        .iter()
        .map(|field| field.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(FIELD_SEPARATOR);

    Fingerprint::from_hex(format!("{:x}", md5::compute(key.as_bytes())))
}
