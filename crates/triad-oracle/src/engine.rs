//! The consensus engine state machine.
//!
//! [`OracleEngine`] owns the committee, the pending slots, the accepted price
//! and the parameter store. Every public operation takes the current engine
//! time explicitly and either applies completely or returns an
//! [`OracleError`] leaving the state untouched. The engine itself is not
//! synchronized: callers must serialize mutating calls (the daemon keeps it
//! behind a single mutex).

use triad_types::{
    Capability, OracleEvent, OracleParameters, Price, PricePoint, ReporterId, ReporterStatus,
    COMMITTEE_SIZE,
};

use crate::committee::Committee;
use crate::math::deviation_bps;
use crate::params::ParameterStore;
use crate::pending::PendingSlots;
use crate::registry::Registry;
use crate::resolver::{self, Outcome};
use crate::{cooldown, OracleError, Result};

/// Result of an accepted commit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommitReceipt {
    /// Which resolution path fired.
    pub outcome: Outcome,
    /// The single event emitted.
    pub event: OracleEvent,
}

/// Price-oracle consensus engine.
#[derive(Debug)]
pub struct OracleEngine<R> {
    committee: Committee,
    pending: PendingSlots,
    /// `None` until bootstrapped.
    accepted: Option<PricePoint>,
    params: ParameterStore,
    registry: R,
}

impl<R: Registry> OracleEngine<R> {
    /// Build an unstarted engine.
    ///
    /// # Errors
    ///
    /// - [`OracleError::DuplicateReporter`] if the committee repeats an identity
    pub fn new(
        reporters: [ReporterId; COMMITTEE_SIZE],
        registry: R,
        params: OracleParameters,
    ) -> Result<Self> {
        Ok(Self {
            committee: Committee::new(reporters)?,
            pending: PendingSlots::Empty,
            accepted: None,
            params: ParameterStore::new(params),
            registry,
        })
    }

    /// Bootstrap the oracle with its first accepted price.
    ///
    /// # Errors
    ///
    /// - [`OracleError::AlreadyStarted`] on any call after the first success
    /// - [`OracleError::UnauthorizedReporter`] if `caller` is not a committee member
    /// - [`OracleError::InvalidTimestamp`] if `observed_at` is after `now`
    /// - [`OracleError::InvalidPrice`] for a zero price
    pub fn start_oracle(
        &mut self,
        caller: ReporterId,
        value: Price,
        observed_at: u64,
        now: u64,
    ) -> Result<OracleEvent> {
        if self.accepted.is_some() {
            return Err(OracleError::AlreadyStarted);
        }
        if !self.committee.is_member(&caller) {
            return Err(OracleError::UnauthorizedReporter(caller));
        }
        if observed_at > now {
            return Err(OracleError::InvalidTimestamp { observed_at, now });
        }
        if value.is_zero() {
            return Err(OracleError::InvalidPrice);
        }

        let point = PricePoint::new(value, observed_at, caller);
        self.accepted = Some(point);
        tracing::info!(%value, observed_at, reporter = %caller, "oracle started");
        Ok(OracleEvent::accepted(point))
    }

    /// Submit a price observation from a committee reporter.
    ///
    /// Preconditions are checked in order and the first failure wins.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NotStarted`] before bootstrap
    /// - [`OracleError::UnauthorizedReporter`] if `reporter` is not a committee member
    /// - [`OracleError::CooldownViolation`] if the reporter's minimum interval has not elapsed
    /// - [`OracleError::InvalidTimestamp`] if `observed_at` is after `now`, or not
    ///   newer than the accepted price's `observed_at` (backdated or replayed)
    /// - [`OracleError::InvalidPrice`] for a zero price
    pub fn commit_price(
        &mut self,
        reporter: ReporterId,
        value: Price,
        observed_at: u64,
        now: u64,
    ) -> Result<CommitReceipt> {
        let accepted = self.accepted.ok_or(OracleError::NotStarted)?;
        let seat = self
            .committee
            .position(&reporter)
            .ok_or(OracleError::UnauthorizedReporter(reporter))?;
        let params = self.params.current();
        cooldown::check(
            self.committee.slot(seat)?.last_submission,
            now,
            params.reporter_min_interval_secs,
        )?;
        if observed_at > now || observed_at <= accepted.observed_at {
            return Err(OracleError::InvalidTimestamp { observed_at, now });
        }
        if value.is_zero() {
            return Err(OracleError::InvalidPrice);
        }

        let incoming = PricePoint::new(value, observed_at, reporter);
        let resolution = resolver::resolve(&accepted, &self.pending, incoming, params, now);

        self.committee.record_submission(seat, now);
        self.pending = resolution.pending;
        if let Some(point) = resolution.accepted {
            self.accepted = Some(point);
        }

        match resolution.outcome {
            Outcome::Buffered { slot_index } => tracing::debug!(
                %value,
                %reporter,
                slot_index,
                deviation_bps = ?deviation_bps(value, accepted.value),
                "observation buffered"
            ),
            outcome => tracing::info!(
                ?outcome,
                value = %self.current_value(),
                %reporter,
                "price accepted"
            ),
        }

        Ok(CommitReceipt {
            outcome: resolution.outcome,
            event: resolution.event,
        })
    }

    /// Retune one governance parameter by its public index.
    ///
    /// # Errors
    ///
    /// - [`OracleError::UnauthorizedOperator`] if `caller` lacks [`Capability::Operator`]
    /// - [`OracleError::CooldownViolation`] if the shared change cooldown is running
    /// - [`OracleError::InvalidParameter`] for an unknown index
    pub fn set_value(
        &mut self,
        caller: ReporterId,
        index: u8,
        value: u64,
        now: u64,
    ) -> Result<OracleEvent> {
        self.require_capability(&caller, Capability::Operator)?;
        let change = self.params.set_value(index, value, now)?;

        tracing::info!(
            param = ?change.param,
            old = change.old_value,
            new = change.new_value,
            %caller,
            "parameter changed"
        );
        Ok(OracleEvent::ParameterChanged {
            index,
            param: change.param,
            old_value: change.old_value,
            new_value: change.new_value,
        })
    }

    /// Replace the reporter in committee seat `slot` with the registry's next
    /// eligible candidate.
    ///
    /// Pending observations of the outgoing reporter are left in place and
    /// resolve through the normal staleness path.
    ///
    /// # Errors
    ///
    /// - [`OracleError::UnauthorizedOperator`] if `caller` lacks [`Capability::Rotation`]
    /// - [`OracleError::InvalidSlot`] if `slot` is out of range
    /// - [`OracleError::CooldownViolation`] if the seat was rotated too recently
    /// - [`OracleError::NoEligibleReporter`] if the registry pool is exhausted
    pub fn rotate_reporter(
        &mut self,
        caller: ReporterId,
        slot: usize,
        now: u64,
    ) -> Result<OracleEvent> {
        self.require_capability(&caller, Capability::Rotation)?;
        let seat = self.committee.slot(slot)?;
        let slot_index = u8::try_from(slot).map_err(|_| OracleError::InvalidSlot(slot))?;
        cooldown::check(
            seat.last_rotation,
            now,
            self.params.current().rotation_cooldown_secs,
        )?;

        let members = self.committee.members();
        let candidate = self
            .registry
            .next_eligible_reporter(&members)
            .filter(|c| !members.contains(c))
            .ok_or(OracleError::NoEligibleReporter)?;

        let old = self.committee.replace(slot, candidate, now)?;
        self.registry.mark_status(old, ReporterStatus::Retired);
        self.registry.mark_status(candidate, ReporterStatus::Active);

        tracing::info!(slot, old = %old, new = %candidate, %caller, "reporter rotated");
        Ok(OracleEvent::ReporterRotated {
            slot: slot_index,
            old_reporter: old,
            new_reporter: candidate,
            rotated_by: caller,
        })
    }

    /// The canonical accepted price.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NotStarted`] before bootstrap
    pub fn current_accepted_price(&self) -> Result<PricePoint> {
        self.accepted.ok_or(OracleError::NotStarted)
    }

    pub fn is_started(&self) -> bool {
        self.accepted.is_some()
    }

    /// Pending-observation slots.
    pub fn pending(&self) -> &PendingSlots {
        &self.pending
    }

    /// Committee seats with their cooldown timestamps.
    pub fn committee(&self) -> &Committee {
        &self.committee
    }

    /// Current parameter snapshot.
    pub fn parameters(&self) -> &OracleParameters {
        self.params.current()
    }

    /// Seconds until the next parameter change is allowed.
    pub fn param_cooldown_remaining(&self, now: u64) -> u64 {
        self.params.cooldown_remaining(now)
    }

    pub fn registry(&self) -> &R {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut R {
        &mut self.registry
    }

    fn current_value(&self) -> Price {
        self.accepted.map(|p| p.value).unwrap_or_default()
    }

    fn require_capability(&self, caller: &ReporterId, capability: Capability) -> Result<()> {
        if self.registry.is_privileged(caller, capability) {
            Ok(())
        } else {
            Err(OracleError::UnauthorizedOperator {
                caller: *caller,
                capability,
            })
        }
    }
}
