use job_tracker::RawBatch;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::sources::JobSource;

const MAX_LOCATION_VARIATIONS: usize = 2;

/// Locations searched for a configured location.
///
/// A country-wide search is paired with the capital region, where most
/// preferred locations sit.
pub fn location_variations(location: &str) -> Vec<String> {
    let location = location.trim();
    let mut variations = vec![location.to_string()];
    if location.eq_ignore_ascii_case("india") {
        variations.push("Delhi NCR".to_string());
    }
    variations.truncate(MAX_LOCATION_VARIATIONS);
    variations
}

/// Search every source for every (keyword, location) pair.
///
/// Failing sources are logged and skipped. Records are tagged with the
/// keyword that found them.
pub async fn collect_jobs(
    sources: &[Arc<dyn JobSource>],
    keywords: &[String],
    location: &str,
    max_keywords: usize,
    delay: Duration,
) -> Vec<RawBatch> {
    let keywords: Vec<&String> = keywords.iter().take(max_keywords).collect();
    let locations = location_variations(location);
    let mut batches = Vec::new();
    let mut failures = 0usize;

    for keyword in &keywords {
        for loc in &locations {
            for source in sources {
                match source.fetch(keyword, loc).await {
                    Ok(mut records) => {
                        for record in &mut records {
                            record.search_term.get_or_insert_with(|| keyword.to_string());
                        }
                        batches.push(RawBatch::new(source.name().clone(), source.kind(), records));
                    }
                    Err(e) => {
                        failures += 1;
                        warn!(
                            source = %source.name(),
                            keyword = %keyword,
                            location = %loc,
                            error = %e,
                            "Job source failed, skipping"
                        );
                    }
                }

                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }

    info!(
        keywords = keywords.len(),
        locations = locations.len(),
        sources = sources.len(),
        batches = batches.len(),
        records = batches.iter().map(|b| b.records.len()).sum::<usize>(),
        failures,
        "Collected raw job records"
    );

    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockJobSource;
    use job_tracker::{RawJobRecord, SourceName};

    #[test]
    fn test_india_expands_to_capital_region() {
        assert_eq!(location_variations("India"), vec!["India", "Delhi NCR"]);
        assert_eq!(location_variations("Bengaluru"), vec!["Bengaluru"]);
    }

    #[tokio::test]
    async fn test_failing_source_is_skipped() {
        let good = Arc::new(
            MockJobSource::new(SourceName::Naukri)
                .with_records(vec![RawJobRecord::new("Operations Executive", "Acme")]),
        );
        let bad = Arc::new(MockJobSource::failing(SourceName::Indeed));
        let sources: Vec<Arc<dyn JobSource>> = vec![good.clone(), bad.clone()];

        let batches = collect_jobs(
            &sources,
            &["operations".to_string()],
            "Gurugram",
            8,
            Duration::ZERO,
        )
        .await;

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].source, SourceName::Naukri);
        assert_eq!(batches[0].records[0].search_term.as_deref(), Some("operations"));
        assert_eq!(bad.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_keyword_cap_and_location_variations() {
        let source = Arc::new(MockJobSource::new(SourceName::Shine));
        let sources: Vec<Arc<dyn JobSource>> = vec![source.clone()];
        let keywords: Vec<String> = (0..5).map(|i| format!("kw{i}")).collect();

        collect_jobs(&sources, &keywords, "India", 3, Duration::ZERO).await;

        let calls = source.calls();
        assert_eq!(calls.len(), 6);
        assert_eq!(calls[0], ("kw0".to_string(), "India".to_string()));
        assert_eq!(calls[1], ("kw0".to_string(), "Delhi NCR".to_string()));
    }
}
