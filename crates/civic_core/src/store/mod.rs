use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::cache::{corpus_fingerprint, StatsBundle, StatsCache};
use crate::catalog::{Catalog, CityReference};
use crate::domain::{Issue, IssueId, Status};
use crate::error::AppError;
use crate::lifecycle::update_status;

/// Immutable view of the corpus at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct CorpusSnapshot {
    /// Starts at 1 and increases by one on every publish.
    pub version: u64,
    pub issues: Arc<[Issue]>,
}

impl CorpusSnapshot {
    pub fn get(&self, id: IssueId) -> Option<&Issue> {
        self.issues.iter().find(|i| i.id == id)
    }

    pub fn fingerprint(&self) -> String {
        corpus_fingerprint(&self.issues)
    }
}

/// Holder of the current corpus and the one place status updates are serialized.
///
/// Readers take a cheap `Arc` snapshot and never see a half-applied update. Writers hold
/// `write_gate` across read-current, transform, publish, so at most one update is in flight.
#[derive(Debug)]
pub struct IssueStore {
    current: RwLock<Arc<CorpusSnapshot>>,
    write_gate: Mutex<()>,
    cities: Vec<CityReference>,
    stats: StatsCache,
}

impl IssueStore {
    pub fn new(issues: Vec<Issue>, catalog: &Catalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(CorpusSnapshot {
                version: 1,
                issues: issues.into(),
            })),
            write_gate: Mutex::new(()),
            cities: catalog.reference_cities(),
            stats: StatsCache::new(),
        }
    }

    pub fn snapshot(&self) -> Arc<CorpusSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    pub fn cities(&self) -> &[CityReference] {
        &self.cities
    }

    /// Category/city/overview rollups for the current snapshot, memoized per version.
    pub fn stats(&self) -> StatsBundle {
        let snap = self.snapshot();
        self.stats
            .get_or_compute(snap.version, &snap.issues, &self.cities)
    }

    /// Apply a status change to issue `id` and publish the resulting corpus.
    ///
    /// On error (unknown ID, missing proof) nothing is published and the version is unchanged.
    pub fn update_status(
        &self,
        id: IssueId,
        new_status: Status,
        proof_photo: Option<&str>,
    ) -> Result<Issue, AppError> {
        let _gate = self.write_gate.lock().unwrap_or_else(PoisonError::into_inner);

        let current = self.snapshot();
        let idx = current
            .issues
            .iter()
            .position(|i| i.id == id)
            .ok_or_else(|| AppError::issue_not_found(id))?;

        let updated = update_status(&current.issues[idx], new_status, proof_photo)?;

        let mut next: Vec<Issue> = current.issues.to_vec();
        next[idx] = updated.clone();
        let published = Arc::new(CorpusSnapshot {
            version: current.version + 1,
            issues: next.into(),
        });

        *self.current.write().unwrap_or_else(PoisonError::into_inner) = published;

        tracing::debug!(
            issue_id = id,
            from = %current.issues[idx].status,
            to = %updated.status,
            version = current.version + 1,
            "published status update"
        );

        Ok(updated)
    }
}
