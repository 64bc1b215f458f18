//! Cooldown arithmetic shared by reporters, parameters and rotations.
//!
//! A cooldown is satisfied when `now - last >= interval`. An empty `last`
//! (nothing recorded yet) never blocks. A clock that moved backwards counts
//! as zero elapsed time.

use crate::{OracleError, Result};

/// Seconds still to wait before the cooldown elapses, or zero.
pub fn remaining(last: Option<u64>, now: u64, interval: u64) -> u64 {
    match last {
        Some(last) => interval.saturating_sub(now.saturating_sub(last)),
        None => 0,
    }
}

/// Check a cooldown.
///
/// # Errors
///
/// - [`OracleError::CooldownViolation`] if the interval has not elapsed
pub fn check(last: Option<u64>, now: u64, interval: u64) -> Result<()> {
    match remaining(last, now, interval) {
        0 => Ok(()),
        remaining_secs => Err(OracleError::CooldownViolation { remaining_secs }),
    }
}
