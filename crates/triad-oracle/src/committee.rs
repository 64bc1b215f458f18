//! Committee slots.
//!
//! The committee has a fixed number of slots ([`COMMITTEE_SIZE`]). Rotation
//! changes the identity in a slot, never the number of slots. Each slot
//! carries the cooldown timestamps that belong to it: the last accepted
//! submission of its reporter and the last time the slot was rotated.

use serde::{Deserialize, Serialize};
use triad_types::{ReporterId, COMMITTEE_SIZE};

use crate::{OracleError, Result};

/// One committee seat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitteeSlot {
    /// Reporter currently holding the seat.
    pub reporter: ReporterId,
    /// Engine time of this reporter's last accepted submission.
    pub last_submission: Option<u64>,
    /// Engine time of the last rotation of this seat.
    pub last_rotation: Option<u64>,
}

impl CommitteeSlot {
    fn new(reporter: ReporterId) -> Self {
        Self {
            reporter,
            last_submission: None,
            last_rotation: None,
        }
    }
}

/// The fixed-size reporter committee.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Committee {
    slots: [CommitteeSlot; COMMITTEE_SIZE],
}

impl Committee {
    /// Build a committee from distinct reporter identities.
    ///
    /// # Errors
    ///
    /// - [`OracleError::DuplicateReporter`] if an identity appears twice
    pub fn new(reporters: [ReporterId; COMMITTEE_SIZE]) -> Result<Self> {
        for (i, reporter) in reporters.iter().enumerate() {
            if reporters[..i].contains(reporter) {
                return Err(OracleError::DuplicateReporter(*reporter));
            }
        }
        Ok(Self {
            slots: reporters.map(CommitteeSlot::new),
        })
    }

    /// Number of seats.
    pub fn size(&self) -> usize {
        self.slots.len()
    }

    /// Seat index held by `reporter`, if any.
    pub fn position(&self, reporter: &ReporterId) -> Option<usize> {
        self.slots.iter().position(|s| &s.reporter == reporter)
    }

    pub fn is_member(&self, reporter: &ReporterId) -> bool {
        self.position(reporter).is_some()
    }

    /// Seat at `index`.
    ///
    /// # Errors
    ///
    /// - [`OracleError::InvalidSlot`] if `index` is out of range
    pub fn slot(&self, index: usize) -> Result<&CommitteeSlot> {
        self.slots.get(index).ok_or(OracleError::InvalidSlot(index))
    }

    /// All seats in order.
    pub fn slots(&self) -> &[CommitteeSlot] {
        &self.slots
    }

    /// Current identities in seat order.
    pub fn members(&self) -> Vec<ReporterId> {
        self.slots.iter().map(|s| s.reporter).collect()
    }

    /// Stamp an accepted submission on seat `index`.
    pub(crate) fn record_submission(&mut self, index: usize, now: u64) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.last_submission = Some(now);
        }
    }

    /// Seat `new` at `index`, returning the outgoing identity.
    ///
    /// The incoming reporter starts with a clean submission cooldown.
    pub(crate) fn replace(
        &mut self,
        index: usize,
        new: ReporterId,
        now: u64,
    ) -> Result<ReporterId> {
        let slot = self
            .slots
            .get_mut(index)
            .ok_or(OracleError::InvalidSlot(index))?;
        let old = std::mem::replace(&mut slot.reporter, new);
        slot.last_submission = None;
        slot.last_rotation = Some(now);
        Ok(old)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(b: u8) -> ReporterId {
        ReporterId::new([b; 20])
    }

    #[test]
    fn test_new_committee() {
        let committee = Committee::new([id(1), id(2), id(3)]).expect("committee");
        assert_eq!(committee.size(), COMMITTEE_SIZE);
        assert_eq!(committee.position(&id(2)), Some(1));
        assert!(!committee.is_member(&id(4)));
        assert!(committee.slots().iter().all(|s| s.last_submission.is_none()));
    }

    #[test]
    fn test_duplicate_rejected() {
        let err = Committee::new([id(1), id(2), id(1)]).expect_err("duplicate");
        assert_eq!(err, OracleError::DuplicateReporter(id(1)));
    }

    #[test]
    fn test_replace_preserves_order_and_size() {
        let mut committee = Committee::new([id(1), id(2), id(3)]).expect("committee");
        committee.record_submission(1, 500);

        let old = committee.replace(1, id(9), 1_000).expect("replace");
        assert_eq!(old, id(2));
        assert_eq!(committee.members(), vec![id(1), id(9), id(3)]);

        let slot = committee.slot(1).expect("slot");
        assert_eq!(slot.last_submission, None);
        assert_eq!(slot.last_rotation, Some(1_000));
    }

    #[test]
    fn test_slot_out_of_range() {
        let committee = Committee::new([id(1), id(2), id(3)]).expect("committee");
        assert_eq!(committee.slot(3).expect_err("range"), OracleError::InvalidSlot(3));
    }
}
