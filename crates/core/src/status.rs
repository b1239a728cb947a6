// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job lifecycle status codes
//!
//! A job's status is persisted as a bare number: `0` at creation, positive
//! codes while a stage is processing it, `-1` once it has permanently failed
//! and `10` once it has succeeded. The two terminal codes are absorbing:
//! no status notification is dispatched past them.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wire code for a permanently failed job
pub const FAILED_CODE: i64 = -1;
/// Wire code for a successfully completed job
pub const SUCCEEDED_CODE: i64 = 10;

/// Lifecycle status of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WfStatus {
    /// Job created, no stage has claimed it yet
    Created,
    /// A stage is processing the job; the code identifies the stage
    Progress(i8),
    /// Terminal: the job failed and will not be retried
    Failed,
    /// Terminal: the job completed every stage
    Succeeded,
}

impl WfStatus {
    /// The numeric wire code for this status
    pub fn code(self) -> i64 {
        match self {
            WfStatus::Created => 0,
            WfStatus::Progress(n) => i64::from(n),
            WfStatus::Failed => FAILED_CODE,
            WfStatus::Succeeded => SUCCEEDED_CODE,
        }
    }

    /// Decode a wire code. Codes outside the known range collapse to
    /// `Failed`, so a corrupt store value can never decode as a
    /// non-terminal status.
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => WfStatus::Created,
            SUCCEEDED_CODE => WfStatus::Succeeded,
            n if n > 0 => i8::try_from(n)
                .map(WfStatus::Progress)
                .unwrap_or(WfStatus::Failed),
            _ => WfStatus::Failed,
        }
    }

    /// Whether this status is absorbing
    pub fn is_terminal(self) -> bool {
        matches!(self, WfStatus::Failed | WfStatus::Succeeded)
    }
}

impl std::fmt::Display for WfStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl Serialize for WfStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.code())
    }
}

impl<'de> Deserialize<'de> for WfStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = i64::deserialize(deserializer)?;
        Ok(WfStatus::from_code(code))
    }
}
