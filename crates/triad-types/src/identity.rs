//! Reporter identities and registry roles.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::TypesError;

/// Byte length of a reporter identity.
pub const REPORTER_ID_LEN: usize = 20;

/// A 20-byte account identity, rendered as `0x`-prefixed lowercase hex.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct ReporterId([u8; REPORTER_ID_LEN]);

impl ReporterId {
    /// Wrap raw identity bytes.
    pub const fn new(bytes: [u8; REPORTER_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw identity bytes.
    pub fn as_bytes(&self) -> &[u8; REPORTER_ID_LEN] {
        &self.0
    }
}

impl fmt::Display for ReporterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for ReporterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ReporterId({self})")
    }
}

impl FromStr for ReporterId {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let mut bytes = [0u8; REPORTER_ID_LEN];
        hex::decode_to_slice(digits, &mut bytes)
            .map_err(|_| TypesError::InvalidReporterId(s.to_string()))?;
        Ok(Self(bytes))
    }
}

/// Privilege classes checked against the role registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// May retune oracle parameters.
    Operator,
    /// May rotate a committee slot.
    Rotation,
}

/// Registry status of a candidate reporter address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReporterStatus {
    /// In the eligibility pool, not yet used.
    Available,
    /// Currently sitting in a committee slot.
    Active,
    /// Rotated out; never handed out again.
    Retired,
}
