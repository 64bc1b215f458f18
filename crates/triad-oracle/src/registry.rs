//! Role/eligibility registry seam.
//!
//! The engine never decides who is privileged or who may join the committee.
//! It asks a [`Registry`]: whether a caller holds a capability, which
//! candidate should fill a rotated seat, and it reports status changes back.

use std::collections::{HashMap, HashSet, VecDeque};

use triad_types::{Capability, ReporterId, ReporterStatus};

/// External role and reputation registry.
pub trait Registry {
    /// Whether `caller` holds `capability`.
    fn is_privileged(&self, caller: &ReporterId, capability: Capability) -> bool;

    /// Hand out the next eligible reporter not in `excluding`.
    ///
    /// A returned candidate is considered consumed from the pool. Returning
    /// `None` leaves the pool as it was.
    fn next_eligible_reporter(&mut self, excluding: &[ReporterId]) -> Option<ReporterId>;

    /// Record a status change for `reporter`.
    fn mark_status(&mut self, reporter: ReporterId, status: ReporterStatus);
}

/// Registry kept entirely in memory.
///
/// Candidates are handed out first-in first-out. Addresses that were ever
/// marked [`ReporterStatus::Active`] or [`ReporterStatus::Retired`] are
/// skipped. Only the handed-out candidate leaves the pool.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    privileges: HashMap<Capability, HashSet<ReporterId>>,
    pool: VecDeque<ReporterId>,
    statuses: HashMap<ReporterId, ReporterStatus>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `capability` to `holder`.
    pub fn grant(&mut self, holder: ReporterId, capability: Capability) {
        self.privileges.entry(capability).or_default().insert(holder);
    }

    /// Revoke `capability` from `holder`.
    pub fn revoke(&mut self, holder: &ReporterId, capability: Capability) {
        if let Some(holders) = self.privileges.get_mut(&capability) {
            holders.remove(holder);
        }
    }

    /// Append a candidate to the eligibility pool.
    pub fn add_candidate(&mut self, candidate: ReporterId) {
        self.statuses
            .entry(candidate)
            .or_insert(ReporterStatus::Available);
        self.pool.push_back(candidate);
    }

    /// Status recorded for `reporter`, if it was ever seen.
    pub fn status(&self, reporter: &ReporterId) -> Option<ReporterStatus> {
        self.statuses.get(reporter).copied()
    }

    /// Candidates still waiting in the pool.
    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }
}

impl Registry for InMemoryRegistry {
    fn is_privileged(&self, caller: &ReporterId, capability: Capability) -> bool {
        self.privileges
            .get(&capability)
            .is_some_and(|holders| holders.contains(caller))
    }

    fn next_eligible_reporter(&mut self, excluding: &[ReporterId]) -> Option<ReporterId> {
        let position = self.pool.iter().position(|candidate| {
            let available = matches!(
                self.statuses.get(candidate),
                None | Some(ReporterStatus::Available)
            );
            if !available || excluding.contains(candidate) {
                tracing::debug!(%candidate, "registry: skipping ineligible candidate");
                return false;
            }
            true
        })?;
        self.pool.remove(position)
    }

    fn mark_status(&mut self, reporter: ReporterId, status: ReporterStatus) {
        self.statuses.insert(reporter, status);
    }
}
