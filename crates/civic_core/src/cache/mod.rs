//! Memoized rollups for published corpus snapshots
//!
//! Provides:
//! - Category/city/overview rollups cached per snapshot version
//! - Automatic miss once a newer snapshot is published
//! - Content fingerprints for identifying a snapshot outside the process

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use crate::catalog::CityReference;
use crate::domain::{Category, Issue};
use crate::stats::{category_stats, city_stats, overview, CategoryStats, CityStats, Overview};

/// Rollups computed together from one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct StatsBundle {
    pub version: u64,
    pub categories: BTreeMap<Category, CategoryStats>,
    pub cities: Vec<CityStats>,
    pub overview: Overview,
}

impl StatsBundle {
    pub fn compute(version: u64, issues: &[Issue], cities: &[CityReference]) -> Self {
        Self {
            version,
            categories: category_stats(issues),
            cities: city_stats(issues, cities),
            overview: overview(issues, None),
        }
    }
}

/// Single-entry cache keyed by snapshot version.
#[derive(Debug, Default)]
pub struct StatsCache {
    slot: Mutex<Option<StatsBundle>>,
}

impl StatsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached bundle for `version`, if that is the version last stored.
    pub fn get(&self, version: u64) -> Option<StatsBundle> {
        let slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        slot.as_ref().filter(|b| b.version == version).cloned()
    }

    pub fn set(&self, bundle: StatsBundle) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        // Never let a slow reader overwrite a newer entry with an older one.
        if slot.as_ref().is_some_and(|b| b.version > bundle.version) {
            return;
        }
        *slot = Some(bundle);
    }

    /// Return the cached bundle for `version`, computing and storing it on a miss.
    pub fn get_or_compute(
        &self,
        version: u64,
        issues: &[Issue],
        cities: &[CityReference],
    ) -> StatsBundle {
        if let Some(hit) = self.get(version) {
            return hit;
        }
        tracing::debug!(version, issues = issues.len(), "stats cache miss");
        let bundle = StatsBundle::compute(version, issues, cities);
        self.set(bundle.clone());
        bundle
    }

    pub fn invalidate(&self) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
    }

    pub fn cached_version(&self) -> Option<u64> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|b| b.version)
    }
}

/// SHA-256 (hex) of the canonical JSON of `issues`, in order.
pub fn corpus_fingerprint(issues: &[Issue]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    for issue in issues {
        // In-memory serialization of plain data does not fail.
        let bytes = serde_json::to_vec(issue).unwrap_or_default();
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
    }
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::generate::{generate_uniform_corpus, CityCount, GeneratorOptions};
    use time::macros::date;

    fn corpus() -> Vec<Issue> {
        generate_uniform_corpus(
            &Catalog::maharashtra(),
            &[CityCount::new("Pune", 3), CityCount::new("Mumbai", 1)],
            &GeneratorOptions {
                seed: Some(5),
                anchor_date: date!(2026 - 01 - 15),
                window_days: 30,
            },
            1,
        )
        .issues
    }

    #[test]
    fn cache_hits_same_version_and_misses_newer() {
        let issues = corpus();
        let cities = Catalog::maharashtra().reference_cities();
        let cache = StatsCache::new();

        let first = cache.get_or_compute(1, &issues, &cities);
        assert_eq!(cache.get(1), Some(first.clone()));
        assert_eq!(cache.get(2), None);

        let second = cache.get_or_compute(2, &issues, &cities);
        assert_eq!(second.version, 2);
        assert_eq!(cache.cached_version(), Some(2));
    }

    #[test]
    fn stale_bundle_does_not_replace_newer() {
        let issues = corpus();
        let cities = Catalog::maharashtra().reference_cities();
        let cache = StatsCache::new();
        cache.set(StatsBundle::compute(5, &issues, &cities));
        cache.set(StatsBundle::compute(4, &issues, &cities));
        assert_eq!(cache.cached_version(), Some(5));

        cache.invalidate();
        assert_eq!(cache.cached_version(), None);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let issues = corpus();
        assert_eq!(corpus_fingerprint(&issues), corpus_fingerprint(&issues));

        let mut changed = issues.clone();
        changed[0].photo.push('x');
        assert_ne!(corpus_fingerprint(&issues), corpus_fingerprint(&changed));
        assert_eq!(corpus_fingerprint(&[]).len(), 64);
    }
}
