//! Integration test crate for the Triad price oracle.
//!
//! The library part only holds fixtures shared by the scenario files under
//! `tests/`, which exercise the engine and the daemon end to end.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p triad-integration-tests
//! ```

use triad_daemon::config::DaemonConfig;
use triad_oracle::{InMemoryRegistry, OracleEngine};
use triad_types::{Capability, OracleParameters, Price, ReporterId};

/// Simulated engine start time.
pub const T0: u64 = 1_000_000;

/// Committee reporters.
pub const A: ReporterId = ReporterId::new([0xa1; 20]);
pub const B: ReporterId = ReporterId::new([0xb2; 20]);
pub const C: ReporterId = ReporterId::new([0xc3; 20]);

/// Governance identities.
pub const OPERATOR: ReporterId = ReporterId::new([0x01; 20]);
pub const ROTATOR: ReporterId = ReporterId::new([0x02; 20]);

/// Registry candidates, in pool order.
pub const CANDIDATES: [ReporterId; 2] = [ReporterId::new([0xd4; 20]), ReporterId::new([0xe5; 20])];

/// Whole-unit price.
pub fn price(units: u64) -> Price {
    Price::from_units(units)
}

/// Parameters used across scenarios: default tolerances, a 10 second
/// reporter interval and 100 second governance cooldowns.
pub fn scenario_params() -> OracleParameters {
    OracleParameters {
        price_tolerance_bps: 500,
        feed_disagreement_tolerance_bps: 100,
        feed_staleness_threshold_secs: 300,
        reporter_min_interval_secs: 10,
        param_change_cooldown_secs: 100,
        rotation_cooldown_secs: 100,
    }
}

/// Registry with one operator, one rotator and the candidate pool.
pub fn scenario_registry() -> InMemoryRegistry {
    let mut registry = InMemoryRegistry::new();
    registry.grant(OPERATOR, Capability::Operator);
    registry.grant(ROTATOR, Capability::Rotation);
    for candidate in CANDIDATES {
        registry.add_candidate(candidate);
    }
    registry
}

/// Unstarted engine with committee `[A, B, C]`.
pub fn scenario_engine() -> OracleEngine<InMemoryRegistry> {
    OracleEngine::new([A, B, C], scenario_registry(), scenario_params())
        .expect("committee is distinct")
}

/// Daemon configuration equivalent to [`scenario_engine`].
pub fn scenario_config() -> DaemonConfig {
    let mut config = DaemonConfig::default();
    config.oracle = scenario_params();
    config.committee.reporters = vec![A, B, C];
    config.registry.operators = vec![OPERATOR];
    config.registry.rotators = vec![ROTATOR];
    config.registry.candidates = CANDIDATES.to_vec();
    config
}
