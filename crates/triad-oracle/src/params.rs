//! Cooldown-gated parameter store.
//!
//! A single "last changed" timestamp guards all tunables collectively:
//! changing one tunable blocks changing any other until the shared cooldown
//! has elapsed. New values apply to the very next resolution call.

use triad_types::{OracleParameters, ParamId};

use crate::{cooldown, OracleError, Result};

/// A successful parameter change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParamChange {
    pub param: ParamId,
    pub old_value: u64,
    pub new_value: u64,
}

/// Holds the oracle parameters and the shared change cooldown.
#[derive(Clone, Debug)]
pub struct ParameterStore {
    params: OracleParameters,
    last_change: Option<u64>,
}

impl ParameterStore {
    pub fn new(params: OracleParameters) -> Self {
        Self {
            params,
            last_change: None,
        }
    }

    /// Current parameter snapshot.
    pub fn current(&self) -> &OracleParameters {
        &self.params
    }

    /// Engine time of the last successful change.
    pub fn last_change(&self) -> Option<u64> {
        self.last_change
    }

    /// Seconds until the next change is allowed.
    pub fn cooldown_remaining(&self, now: u64) -> u64 {
        cooldown::remaining(self.last_change, now, self.params.param_change_cooldown_secs)
    }

    /// Set the tunable with public index `index` to `value`.
    ///
    /// The caller's privilege is checked by the engine before this runs.
    ///
    /// # Errors
    ///
    /// - [`OracleError::CooldownViolation`] if the shared cooldown is running
    /// - [`OracleError::InvalidParameter`] if no tunable has this index
    pub fn set_value(&mut self, index: u8, value: u64, now: u64) -> Result<ParamChange> {
        cooldown::check(self.last_change, now, self.params.param_change_cooldown_secs)?;
        let param = ParamId::try_from(index).map_err(|_| OracleError::InvalidParameter(index))?;

        let old_value = self.params.set(param, value);
        self.last_change = Some(now);

        Ok(ParamChange {
            param,
            old_value,
            new_value: value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ParameterStore {
        ParameterStore::new(OracleParameters {
            param_change_cooldown_secs: 100,
            ..OracleParameters::default()
        })
    }

    #[test]
    fn test_first_change_not_blocked() {
        let mut store = store();
        let change = store.set_value(0, 100, 5).expect("set");
        assert_eq!(change.param, ParamId::PriceTolerance);
        assert_eq!(change.old_value, 500);
        assert_eq!(change.new_value, 100);
        assert_eq!(store.current().price_tolerance_bps, 100);
        assert_eq!(store.last_change(), Some(5));
    }

    #[test]
    fn test_cooldown_is_shared_across_tunables() {
        let mut store = store();
        store.set_value(0, 100, 1_000).expect("set");

        let err = store.set_value(3, 30, 1_050).expect_err("cooldown");
        assert_eq!(err, OracleError::CooldownViolation { remaining_secs: 50 });
        assert_eq!(store.current().reporter_min_interval_secs, 60);

        store.set_value(3, 30, 1_100).expect("after cooldown");
        assert_eq!(store.current().reporter_min_interval_secs, 30);
    }

    #[test]
    fn test_unknown_index_changes_nothing() {
        let mut store = store();
        let before = store.current().clone();
        assert_eq!(
            store.set_value(4, 1, 1_000).expect_err("unknown"),
            OracleError::InvalidParameter(4)
        );
        assert_eq!(store.current(), &before);
        assert_eq!(store.last_change(), None);
    }

    #[test]
    fn test_cooldown_remaining() {
        let mut store = store();
        assert_eq!(store.cooldown_remaining(0), 0);
        store.set_value(2, 120, 1_000).expect("set");
        assert_eq!(store.cooldown_remaining(1_030), 70);
    }
}
