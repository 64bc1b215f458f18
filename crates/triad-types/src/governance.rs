//! Governance-tunable oracle parameters.

use serde::{Deserialize, Serialize};

use crate::TypesError;

/// Identifies one governance-tunable parameter.
///
/// The numeric index is the public identifier used by `set_value` calls and
/// recorded in `ParameterChanged` events.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamId {
    /// Max deviation (bps) from the accepted price for a fast accept.
    PriceTolerance,
    /// Max deviation (bps) between two pending observations that corroborate.
    FeedDisagreementTolerance,
    /// Seconds after buffering at which a pending observation is stale.
    FeedStalenessThreshold,
    /// Minimum seconds between two submissions of the same reporter.
    ReporterMinInterval,
}

impl ParamId {
    /// Every tunable, in index order.
    pub const ALL: [ParamId; 4] = [
        ParamId::PriceTolerance,
        ParamId::FeedDisagreementTolerance,
        ParamId::FeedStalenessThreshold,
        ParamId::ReporterMinInterval,
    ];

    /// The public numeric index.
    pub fn index(self) -> u8 {
        match self {
            ParamId::PriceTolerance => 0,
            ParamId::FeedDisagreementTolerance => 1,
            ParamId::FeedStalenessThreshold => 2,
            ParamId::ReporterMinInterval => 3,
        }
    }
}

impl TryFrom<u8> for ParamId {
    type Error = TypesError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        ParamId::ALL
            .into_iter()
            .find(|id| id.index() == index)
            .ok_or(TypesError::UnknownParameter(index))
    }
}

/// Complete parameter set of the consensus engine.
///
/// The first four fields are tunable at runtime through [`ParamId`]. The two
/// cooldowns are fixed when the engine is built.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleParameters {
    /// Fast-accept tolerance, in basis points of the accepted price.
    #[serde(default = "default_price_tolerance_bps")]
    pub price_tolerance_bps: u64,
    /// Corroboration tolerance, in basis points of the first pending price.
    #[serde(default = "default_feed_disagreement_tolerance_bps")]
    pub feed_disagreement_tolerance_bps: u64,
    /// Pending observation staleness threshold in seconds.
    #[serde(default = "default_feed_staleness_threshold_secs")]
    pub feed_staleness_threshold_secs: u64,
    /// Per-reporter minimum submission interval in seconds.
    #[serde(default = "default_reporter_min_interval_secs")]
    pub reporter_min_interval_secs: u64,
    /// Global cooldown between two parameter changes.
    #[serde(default = "default_param_change_cooldown_secs")]
    pub param_change_cooldown_secs: u64,
    /// Per-slot cooldown between two reporter rotations.
    #[serde(default = "default_rotation_cooldown_secs")]
    pub rotation_cooldown_secs: u64,
}

fn default_price_tolerance_bps() -> u64 {
    500
}

fn default_feed_disagreement_tolerance_bps() -> u64 {
    100
}

fn default_feed_staleness_threshold_secs() -> u64 {
    300
}

fn default_reporter_min_interval_secs() -> u64 {
    60
}

fn default_param_change_cooldown_secs() -> u64 {
    3600
}

fn default_rotation_cooldown_secs() -> u64 {
    3600
}

impl Default for OracleParameters {
    fn default() -> Self {
        Self {
            price_tolerance_bps: default_price_tolerance_bps(),
            feed_disagreement_tolerance_bps: default_feed_disagreement_tolerance_bps(),
            feed_staleness_threshold_secs: default_feed_staleness_threshold_secs(),
            reporter_min_interval_secs: default_reporter_min_interval_secs(),
            param_change_cooldown_secs: default_param_change_cooldown_secs(),
            rotation_cooldown_secs: default_rotation_cooldown_secs(),
        }
    }
}

impl OracleParameters {
    /// Current value of a tunable.
    pub fn get(&self, id: ParamId) -> u64 {
        match id {
            ParamId::PriceTolerance => self.price_tolerance_bps,
            ParamId::FeedDisagreementTolerance => self.feed_disagreement_tolerance_bps,
            ParamId::FeedStalenessThreshold => self.feed_staleness_threshold_secs,
            ParamId::ReporterMinInterval => self.reporter_min_interval_secs,
        }
    }

    /// Overwrite a tunable, returning the previous value.
    pub fn set(&mut self, id: ParamId, value: u64) -> u64 {
        let slot = match id {
            ParamId::PriceTolerance => &mut self.price_tolerance_bps,
            ParamId::FeedDisagreementTolerance => &mut self.feed_disagreement_tolerance_bps,
            ParamId::FeedStalenessThreshold => &mut self.feed_staleness_threshold_secs,
            ParamId::ReporterMinInterval => &mut self.reporter_min_interval_secs,
        };
        std::mem::replace(slot, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_index_roundtrip() {
        for id in ParamId::ALL {
            assert_eq!(ParamId::try_from(id.index()).expect("known index"), id);
        }
    }

    #[test]
    fn test_unknown_param_index() {
        assert_eq!(ParamId::try_from(4), Err(TypesError::UnknownParameter(4)));
        assert_eq!(ParamId::try_from(255), Err(TypesError::UnknownParameter(255)));
    }

    #[test]
    fn test_set_returns_old_value() {
        let mut params = OracleParameters::default();
        let old = params.set(ParamId::FeedStalenessThreshold, 120);
        assert_eq!(old, 300);
        assert_eq!(params.get(ParamId::FeedStalenessThreshold), 120);
        // Others untouched
        assert_eq!(params.get(ParamId::PriceTolerance), 500);
    }

    #[test]
    fn test_partial_input_uses_defaults() {
        let params: OracleParameters =
            serde_json::from_str(r#"{"price_tolerance_bps": 50}"#).expect("parse");
        assert_eq!(params.price_tolerance_bps, 50);
        assert_eq!(params.reporter_min_interval_secs, 60);
    }
}
