//! Usage batch normalization
//!
//! Raw platform samples become the upload batch here: lowercased packages,
//! fallback display names, zero-minute and self entries dropped, duplicate
//! packages merged, sorted by minutes descending.

use snapcheck_api::AppUsageRecord;
use snapcheck_host_api::RawUsageSample;
use snapcheck_util::PackageId;
use std::collections::HashMap;

/// Normalize raw usage samples into an upload-ready batch.
///
/// Invariant on the output: unique package per batch, every record has
/// nonzero minutes, ordered by `usage_minutes` descending (package name as
/// a deterministic tie-break).
pub fn normalize_usage(samples: Vec<RawUsageSample>, own_package: &str) -> Vec<AppUsageRecord> {
    let own = own_package.to_lowercase();
    let mut by_package: HashMap<PackageId, AppUsageRecord> = HashMap::new();

    for sample in samples {
        if sample.package_name.is_empty() {
            continue;
        }

        let package = PackageId::new(&sample.package_name);
        if package.as_str() == own {
            continue;
        }

        let minutes = sample.total_time_ms / 60_000;
        if minutes == 0 {
            continue;
        }

        let app_name = match sample.app_name {
            Some(name) if !name.is_empty() && name != "Unknown" => name,
            _ => package.fallback_app_name(),
        };

        by_package
            .entry(package.clone())
            .and_modify(|record| record.usage_minutes += minutes)
            .or_insert(AppUsageRecord {
                app_name,
                package,
                usage_minutes: minutes,
            });
    }

    let mut records: Vec<AppUsageRecord> = by_package.into_values().collect();
    records.sort_by(|a, b| {
        b.usage_minutes
            .cmp(&a.usage_minutes)
            .then_with(|| a.package.as_str().cmp(b.package.as_str()))
    });
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(package: &str, name: Option<&str>, ms: u64) -> RawUsageSample {
        RawUsageSample {
            package_name: package.into(),
            app_name: name.map(|n| n.to_string()),
            total_time_ms: ms,
        }
    }

    const OWN: &str = "com.parental.snapcheck";

    #[test]
    fn sorts_descending_by_minutes() {
        let records = normalize_usage(
            vec![
                sample("com.whatsapp", Some("WhatsApp"), 10 * 60_000),
                sample("com.youtube", Some("YouTube"), 90 * 60_000),
                sample("com.spotify", Some("Spotify"), 30 * 60_000),
            ],
            OWN,
        );

        let minutes: Vec<u64> = records.iter().map(|r| r.usage_minutes).collect();
        assert_eq!(minutes, vec![90, 30, 10]);
    }

    #[test]
    fn drops_zero_minute_and_own_package() {
        let records = normalize_usage(
            vec![
                sample("com.whatsapp", Some("WhatsApp"), 59_999),
                sample(OWN, Some("SnapCheck"), 120 * 60_000),
                sample("com.youtube", Some("YouTube"), 5 * 60_000),
            ],
            OWN,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].package.as_str(), "com.youtube");
    }

    #[test]
    fn fallback_name_from_package() {
        let records = normalize_usage(
            vec![
                sample("com.whatsapp", None, 5 * 60_000),
                sample("org.mozilla.firefox", Some("Unknown"), 5 * 60_000),
                sample("com.spotify", Some(""), 5 * 60_000),
            ],
            OWN,
        );

        let names: HashMap<&str, &str> = records
            .iter()
            .map(|r| (r.package.as_str(), r.app_name.as_str()))
            .collect();
        assert_eq!(names["com.whatsapp"], "Whatsapp");
        assert_eq!(names["org.mozilla.firefox"], "Firefox");
        assert_eq!(names["com.spotify"], "Spotify");
    }

    #[test]
    fn merges_duplicate_packages() {
        let records = normalize_usage(
            vec![
                sample("com.WhatsApp", Some("WhatsApp"), 10 * 60_000),
                sample("com.whatsapp", Some("WhatsApp"), 15 * 60_000),
            ],
            OWN,
        );

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].usage_minutes, 25);
        assert_eq!(records[0].package.as_str(), "com.whatsapp");
    }

    #[test]
    fn empty_input_produces_empty_batch() {
        assert!(normalize_usage(Vec::new(), OWN).is_empty());
    }
}
