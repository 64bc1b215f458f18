//! Integration test: price consensus lifecycle.
//!
//! Drives one engine through every resolution path:
//! 1. Bootstrap at 582
//! 2. Fast accept within price tolerance
//! 3. Buffer a far price
//! 4. Finalize the stale pending price and reseed
//! 5. Buffer a disagreeing second price
//! 6. Resolve three observations by median

use rand::Rng;
use triad_integration_tests::{price, scenario_engine, A, B, C, T0};
use triad_oracle::pending::PendingSlots;
use triad_oracle::{OracleError, Outcome};
use triad_types::{OracleEvent, PricePoint};

#[test]
fn consensus_walkthrough() {
    let mut engine = scenario_engine();

    // =========================================================
    // Step 1: Bootstrap
    // =========================================================
    let event = engine
        .start_oracle(A, price(582), T0, T0)
        .expect("bootstrap");
    assert_eq!(event, OracleEvent::accepted(PricePoint::new(price(582), T0, A)));

    // =========================================================
    // Step 2: 580 is within 5% of 582, accepted immediately
    // =========================================================
    let receipt = engine
        .commit_price(A, price(580), T0 + 10, T0 + 10)
        .expect("fast accept");
    assert_eq!(receipt.outcome, Outcome::FastAccept);
    assert_eq!(
        engine.current_accepted_price().expect("started"),
        PricePoint::new(price(580), T0 + 10, A)
    );

    // =========================================================
    // Step 3: 500 deviates ~13.8%, parked in slot 0
    // =========================================================
    let receipt = engine
        .commit_price(A, price(500), T0 + 20, T0 + 20)
        .expect("buffer");
    assert_eq!(receipt.outcome, Outcome::Buffered { slot_index: 0 });
    assert_eq!(
        receipt.event,
        OracleEvent::buffered(PricePoint::new(price(500), T0 + 20, A), 0)
    );
    assert_eq!(
        engine.current_accepted_price().expect("started").value,
        price(580)
    );

    // =========================================================
    // Step 4: 300s later the pending 500 is stale
    // =========================================================
    let receipt = engine
        .commit_price(B, price(700), T0 + 320, T0 + 320)
        .expect("stale finalize");
    assert_eq!(receipt.outcome, Outcome::StaleFinalized);
    assert_eq!(
        engine.current_accepted_price().expect("started"),
        PricePoint::new(price(500), T0 + 320, A)
    );
    let first = engine.pending().first().expect("reseeded");
    assert_eq!(first.point, PricePoint::new(price(700), T0 + 320, B));
    assert_eq!(engine.pending().len(), 1);

    // =========================================================
    // Step 5: 540 disagrees with 700, parked in slot 1
    // =========================================================
    let receipt = engine
        .commit_price(C, price(540), T0 + 340, T0 + 340)
        .expect("second buffer");
    assert_eq!(receipt.outcome, Outcome::Buffered { slot_index: 1 });
    assert_eq!(engine.pending().len(), 2);

    // =========================================================
    // Step 6: Third observation resolves by median
    // =========================================================
    let receipt = engine
        .commit_price(A, price(400), T0 + 350, T0 + 350)
        .expect("median");
    assert_eq!(receipt.outcome, Outcome::Median);
    // Median value, metadata of the oldest pending observation.
    assert_eq!(
        engine.current_accepted_price().expect("started"),
        PricePoint::new(price(540), T0 + 320, B)
    );
    assert_eq!(engine.pending(), &PendingSlots::Empty);
}

#[test]
fn corroboration_accepts_first_pending_verbatim() {
    let mut engine = scenario_engine();
    engine
        .start_oracle(A, price(1000), T0, T0)
        .expect("bootstrap");

    engine
        .commit_price(A, price(900), T0 + 1, T0 + 1)
        .expect("buffer");
    // 904 is within 1% of 900
    let receipt = engine
        .commit_price(B, price(904), T0 + 2, T0 + 2)
        .expect("corroborate");

    assert_eq!(receipt.outcome, Outcome::Corroborated);
    assert_eq!(
        engine.current_accepted_price().expect("started"),
        PricePoint::new(price(900), T0 + 1, A)
    );
    assert!(engine.pending().is_empty());
}

#[test]
fn rejected_commits_leave_state_untouched() {
    let mut engine = scenario_engine();
    assert_eq!(
        engine
            .commit_price(A, price(1), T0, T0)
            .expect_err("not started"),
        OracleError::NotStarted
    );

    engine
        .start_oracle(A, price(1000), T0, T0)
        .expect("bootstrap");
    engine
        .commit_price(A, price(700), T0 + 1, T0 + 1)
        .expect("buffer");
    let pending_before = *engine.pending();
    let accepted_before = engine.current_accepted_price().expect("started");

    // Within A's 10s interval
    let err = engine
        .commit_price(A, price(1000), T0 + 5, T0 + 5)
        .expect_err("cooldown");
    assert_eq!(err, OracleError::CooldownViolation { remaining_secs: 6 });

    // Not newer than the accepted price
    let err = engine
        .commit_price(B, price(1000), T0, T0 + 3)
        .expect_err("backdated");
    assert_eq!(err, OracleError::InvalidTimestamp { observed_at: T0, now: T0 + 3 });

    // Future timestamp
    let err = engine
        .commit_price(B, price(1000), T0 + 50, T0 + 5)
        .expect_err("future");
    assert!(matches!(err, OracleError::InvalidTimestamp { .. }));

    assert_eq!(engine.pending(), &pending_before);
    assert_eq!(
        engine.current_accepted_price().expect("started"),
        accepted_before
    );
    // A rejected call does not consume B's interval
    engine
        .commit_price(B, price(1000), T0 + 5, T0 + 5)
        .expect("B still free to submit");
}

#[test]
fn every_commit_emits_one_event() {
    let mut engine = scenario_engine();
    let mut rng = rand::thread_rng();
    engine
        .start_oracle(A, price(1000), T0, T0)
        .expect("bootstrap");

    let reporters = [A, B, C];
    let mut now = T0;
    for round in 0..200 {
        now += 11;
        let reporter = reporters[round % reporters.len()];
        let value = price(rng.gen_range(800..1200));
        let receipt = engine
            .commit_price(reporter, value, now, now)
            .expect("commit");

        match receipt.outcome {
            Outcome::Buffered { slot_index } => {
                assert!(matches!(
                    receipt.event,
                    OracleEvent::BufferedObservation { slot_index: s, .. } if s == slot_index
                ));
                assert_eq!(engine.pending().len(), usize::from(slot_index) + 1);
            }
            _ => {
                let accepted = receipt.event.accepted_point().expect("accept event");
                assert_eq!(engine.current_accepted_price().expect("started"), accepted);
            }
        }
        assert!(engine.pending().len() <= 2);
    }
}
