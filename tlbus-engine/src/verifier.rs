//! Response checking.

use tlbus::{Response, Transaction};

use crate::queue::{ExpectedResponse, TransactionQueue};

/// Outcome of checking the response channel on one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// `d_ready` is not asserted, nothing to check.
    NotExpected,
    /// `d_ready` is asserted but the peer has not answered yet.
    Waiting,
    /// A response was accepted but carries no checked data: the request was a write, or every expected response
    /// was already consumed.
    Unchecked,
    /// The response data matched the expected response, which is consumed.
    Match {
        /// Observed response data.
        observed: u32,
    },
    /// The response data did not match the expected response.
    Mismatch {
        /// Observed response data.
        observed: u32,
        /// The expected response, left in place.
        expected: ExpectedResponse,
    },
}

impl Verdict {
    /// Returns `true` unless the cycle leaves a response unverified.
    pub fn passed(&self) -> bool { !matches!(self, Self::Waiting | Self::Mismatch { .. }) }

    /// Returns `true` if a response mismatched.
    pub fn is_mismatch(&self) -> bool { matches!(self, Self::Mismatch { .. }) }
}

/// Checks accepted read responses against the expected responses in order.
#[derive(Debug, Default, Clone)]
pub struct ResponseVerifier {
    mismatches: u64,
    consecutive_mismatches: u64,
}

impl ResponseVerifier {
    /// Creates a verifier.
    pub fn new() -> Self { Self::default() }

    /// Checks the response channel.
    ///
    /// `latched` is the transaction that asserted `d_ready`, and `response_pending` tells whether `d_ready` was
    /// asserted on this cycle. The response cursor of `queue` advances only on a match.
    pub fn check(
        &mut self, queue: &mut TransactionQueue, latched: &Transaction, response_pending: bool, observed: &Response,
    ) -> Verdict {
        if !response_pending {
            return Verdict::NotExpected;
        }
        if !observed.valid {
            return Verdict::Waiting;
        }
        if !latched.opcode.is_read() || queue.responses_drained() {
            return Verdict::Unchecked;
        }

        let expected = queue.current_expected();
        if expected.matches(observed.data) {
            queue.advance_response();
            self.consecutive_mismatches = 0;
            Verdict::Match { observed: observed.data }
        } else {
            self.mismatches += 1;
            self.consecutive_mismatches += 1;
            Verdict::Mismatch { observed: observed.data, expected }
        }
    }

    /// Returns the number of mismatches so far.
    pub fn mismatches(&self) -> u64 { self.mismatches }

    /// Returns the number of mismatches since the last match.
    pub fn consecutive_mismatches(&self) -> u64 { self.consecutive_mismatches }
}
