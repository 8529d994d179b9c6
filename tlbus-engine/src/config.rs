//! Engine configuration.

use tlbus::constants::TL_TYPE_DATA;

/// Runtime knobs of [`TransactionEngine`](crate::TransactionEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Instruction type tag driven in the request user bits and covered by the command integrity code.
    pub tl_type: u8,

    /// Recompute the data integrity code of every accepted response and count disagreements with the peer's.
    ///
    /// Disagreements are reported only; they do not fail verification.
    pub check_response_integrity: bool,

    /// Number of consecutive mismatches of the same expected response after which a warning is logged.
    pub poll_warn_threshold: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { tl_type: TL_TYPE_DATA, check_response_integrity: false, poll_warn_threshold: Some(1024) }
    }
}

impl EngineConfig {
    /// Sets the instruction type tag.
    pub fn with_tl_type(self, tl_type: u8) -> Self { Self { tl_type, ..self } }

    /// Enables or disables response integrity checking.
    pub fn with_response_integrity(self, check_response_integrity: bool) -> Self {
        Self { check_response_integrity, ..self }
    }

    /// Sets the polling warning threshold.
    pub fn with_poll_warn_threshold(self, poll_warn_threshold: Option<u64>) -> Self {
        Self { poll_warn_threshold, ..self }
    }
}
