//! Cycle-stepped transaction engine.
//!
//! Each call to [`TransactionEngine::step_words`] is one clock cycle:
//!
//! 1. decode the peer's response words;
//! 2. check the response channel against the expected response;
//! 3. complete the handshakes the peer answered;
//! 4. if both channels are idle, latch the next transaction, or the same one again if its response mismatched,
//!    or the idle transaction once the queue is drained;
//! 5. generate the integrity bits and pack the request words.
//!
//! Nothing on this path fails: mismatches, peer errors and integrity disagreements are reported in the
//! [`StepReport`] and in the [`EngineStats`].

use tlbus::codec::{pack_request_into, unpack_response, RequestWords, ResponseWords};
use tlbus::{format_words, RequestUser, Response, Transaction, DATA_CODE};
use tracing::{debug, info, trace, warn};

use crate::config::EngineConfig;
use crate::handshake::{HandshakeController, Handshakes};
use crate::queue::{ExpectedResponse, TransactionQueue};
use crate::sequence::{Sequence, SequenceError};
use crate::verifier::{ResponseVerifier, Verdict};

/// The simulated peer, seen as word arrays.
pub trait SignalPort {
    /// Returns the peer's current output words.
    fn peer_words(&self) -> ResponseWords;

    /// Drives the engine's output words to the peer.
    fn drive(&mut self, words: &RequestWords);
}

/// What the engine latched on a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Latch {
    /// A handshake is still pending; the latched transaction keeps being driven.
    Hold,
    /// The transaction at this cursor was latched for the first time.
    Next(usize),
    /// The transaction at this cursor was latched again after a mismatching response.
    Replay(usize),
    /// The queue is drained; the idle transaction was latched.
    Idle,
}

/// Outcome of one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepReport {
    /// Cycle number, starting at 1.
    pub cycle: u64,
    /// Response check outcome.
    pub verdict: Verdict,
    /// Handshakes completed on this cycle.
    pub handshakes: Handshakes,
    /// What was latched.
    pub latch: Latch,
    /// The request as driven at the end of the cycle.
    pub driven: Transaction,
}

/// Counters of a session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EngineStats {
    /// Cycles stepped.
    pub cycles: u64,
    /// Response mismatches.
    pub mismatches: u64,
    /// Response mismatches since the last match.
    pub consecutive_mismatches: u64,
    /// Transactions latched again after a mismatch.
    pub replays: u64,
    /// Completed request handshakes.
    pub request_handshakes: u64,
    /// Completed response handshakes.
    pub response_handshakes: u64,
    /// Accepted responses with `d_error` set.
    pub peer_errors: u64,
    /// Accepted responses whose data integrity bits disagree with their data.
    pub integrity_errors: u64,
}

/// Drives a transaction queue over the bus and verifies the responses.
#[derive(Debug)]
pub struct TransactionEngine {
    config: EngineConfig,
    queue: TransactionQueue,
    handshake: HandshakeController,
    verifier: ResponseVerifier,
    latched: Transaction,
    started: bool,
    done_reported: bool,
    stats: EngineStats,
}

impl TransactionEngine {
    /// Creates an engine with the default configuration.
    ///
    /// The lists are taken as they are; see [`Sequence`] for validated construction.
    pub fn new(requests: Vec<Transaction>, responses: Vec<ExpectedResponse>) -> Self {
        Self::from_queue(TransactionQueue::new(requests, responses), EngineConfig::default())
    }

    /// Creates an engine over `queue`.
    pub fn from_queue(queue: TransactionQueue, config: EngineConfig) -> Self {
        Self {
            config,
            queue,
            handshake: HandshakeController::new(),
            verifier: ResponseVerifier::new(),
            latched: Transaction::idle(),
            started: false,
            done_reported: false,
            stats: EngineStats::default(),
        }
    }

    /// Validates `sequence` and creates an engine over it.
    pub fn from_sequence(sequence: &Sequence, config: EngineConfig) -> Result<Self, SequenceError> {
        Ok(Self::from_queue(sequence.build()?, config))
    }

    /// Runs one cycle against `port`.
    pub fn step<P: SignalPort + ?Sized>(&mut self, port: &mut P) -> StepReport {
        let inbound = port.peer_words();
        let mut outbound = RequestWords::default();
        let report = self.step_words(&inbound, &mut outbound);
        port.drive(&outbound);
        report
    }

    /// Runs one cycle: reads the peer's `inbound` words and overwrites `outbound`.
    pub fn step_words(&mut self, inbound: &ResponseWords, outbound: &mut RequestWords) -> StepReport {
        self.stats.cycles += 1;
        let cycle = self.stats.cycles;

        let observed = unpack_response(inbound);
        let response_pending = self.handshake.response_pending();
        let verdict = self.verifier.check(&mut self.queue, &self.latched, response_pending, &observed);
        self.account_verdict(cycle, &verdict);

        let handshakes = self.handshake.observe(observed.a_ready, observed.valid);
        self.account_handshakes(cycle, handshakes, &observed);

        let latch = if self.handshake.ready_for_next() { self.latch_next(verdict.passed()) } else { Latch::Hold };

        let driven = self.handshake.drive(&self.latched);
        let user = RequestUser::generate(&driven, self.config.tl_type);
        pack_request_into(&driven, &user, outbound);
        trace!(cycle, words = %format_words(&outbound[..]), "drive");

        if !self.done_reported && self.is_done() {
            self.done_reported = true;
            info!(
                cycle,
                issued = self.issued_count(),
                verified = self.verified_count(),
                replays = self.stats.replays,
                "sequence done"
            );
        }

        StepReport { cycle, verdict, handshakes, latch, driven }
    }

    fn latch_next(&mut self, passed: bool) -> Latch {
        let latch = if !self.started {
            self.started = true;
            Latch::Next(self.queue.request_cursor())
        } else if passed {
            self.queue.advance_request();
            Latch::Next(self.queue.request_cursor())
        } else {
            self.stats.replays += 1;
            Latch::Replay(self.queue.request_cursor())
        };

        let latch = if self.queue.requests_drained() { Latch::Idle } else { latch };
        self.latched = self.queue.current_request();
        self.handshake.latch(&self.latched);

        match latch {
            Latch::Next(cursor) => debug!(cursor, transaction = %self.latched, "latch"),
            Latch::Replay(cursor) => debug!(cursor, transaction = %self.latched, "replay"),
            Latch::Hold | Latch::Idle => {}
        }
        latch
    }

    fn account_verdict(&mut self, cycle: u64, verdict: &Verdict) {
        self.stats.mismatches = self.verifier.mismatches();
        self.stats.consecutive_mismatches = self.verifier.consecutive_mismatches();

        match verdict {
            Verdict::Match { observed } => {
                debug!(cycle, verified = self.verified_count(), observed, "match")
            }
            Verdict::Mismatch { observed, expected } => {
                let consecutive = self.verifier.consecutive_mismatches();
                trace!(cycle, observed, mask = expected.mask, expected = expected.expected_value, "mismatch");
                if self.config.poll_warn_threshold == Some(consecutive) {
                    warn!(
                        cycle,
                        cursor = self.queue.request_cursor(),
                        consecutive,
                        "response still mismatching, polling may not terminate"
                    );
                }
            }
            Verdict::NotExpected | Verdict::Waiting | Verdict::Unchecked => {}
        }
    }

    fn account_handshakes(&mut self, cycle: u64, handshakes: Handshakes, observed: &Response) {
        if handshakes.request {
            self.stats.request_handshakes += 1;
            debug!(cycle, cursor = self.queue.request_cursor(), "request accepted");
        }
        if !handshakes.response {
            return;
        }

        self.stats.response_handshakes += 1;
        debug!(cycle, opcode = observed.opcode, data = observed.data, "response accepted");
        if observed.error {
            self.stats.peer_errors += 1;
            warn!(cycle, transaction = %self.latched, "peer responded with an error");
        }
        if self.config.check_response_integrity && !DATA_CODE.matches(u64::from(observed.data), observed.data_intg()) {
            self.stats.integrity_errors += 1;
            warn!(
                cycle,
                data = observed.data,
                data_intg = observed.data_intg(),
                "response data integrity mismatch"
            );
        }
    }

    /// Returns the number of transactions latched onto the request channel, replays excluded.
    pub fn issued_count(&self) -> usize {
        if self.started {
            (self.queue.request_cursor() + 1).min(self.queue.request_total())
        } else {
            0
        }
    }

    /// Returns the number of verified responses.
    pub fn verified_count(&self) -> usize { self.queue.response_cursor() }

    /// Returns `true` once every request completed and every expected response was verified.
    pub fn is_done(&self) -> bool {
        self.queue.requests_drained()
            && self.issued_count() >= self.queue.request_total()
            && self.verified_count() >= self.queue.response_total()
    }

    /// Returns the session counters.
    pub fn stats(&self) -> &EngineStats { &self.stats }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Returns the queue.
    pub fn queue(&self) -> &TransactionQueue { &self.queue }

    /// Returns the handshake state.
    pub fn handshake(&self) -> &HandshakeController { &self.handshake }

    /// Returns the latched transaction.
    pub fn latched(&self) -> &Transaction { &self.latched }
}

#[cfg(test)]
mod tests {
    use tlbus::codec::{pack_response, unpack_request};
    use tlbus::constants::d_opcode;
    use tlbus::Opcode;

    use super::*;

    fn peer(a_ready: bool, d_valid: bool, data: u32) -> ResponseWords {
        pack_response(&Response {
            valid: d_valid,
            opcode: d_opcode::ACCESS_ACK_DATA,
            size: 2,
            data,
            a_ready,
            ..Default::default()
        })
    }

    #[test]
    fn first_step_latches_first_write() {
        let mut engine = TransactionEngine::new(vec![Transaction::put_full(0x74, 0x2)], vec![]);
        let mut outbound = RequestWords::default();
        let report = engine.step_words(&[0; 3], &mut outbound);

        assert_eq!(report.latch, Latch::Next(0));
        assert_eq!(engine.issued_count(), 1);
        assert_eq!(outbound, [0x0202_cafd, 0x4f00_0000, 0x0000_0007, 0x0000_1020]);

        let decoded = unpack_request(&outbound).unwrap();
        assert_eq!((decoded.opcode, decoded.address, decoded.data), (Opcode::PutFullData, 0x74, 0x2));
        assert!(!engine.is_done());
    }

    #[test]
    fn status_read_verifies() {
        let mut engine = TransactionEngine::new(vec![Transaction::get(0x7c)], vec![ExpectedResponse::new(0x1, 0x1)]);
        let mut outbound = RequestWords::default();

        engine.step_words(&peer(true, false, 0), &mut outbound);
        assert!(engine.handshake().request_pending() && engine.handshake().response_pending());

        let report = engine.step_words(&peer(true, false, 0), &mut outbound);
        assert_eq!((report.verdict, report.latch), (Verdict::Waiting, Latch::Hold));
        assert!(!report.driven.valid && report.driven.wants_response);

        let report = engine.step_words(&peer(false, true, 0x1), &mut outbound);
        assert_eq!(report.verdict, Verdict::Match { observed: 0x1 });
        assert_eq!(report.latch, Latch::Idle);
        assert_eq!(engine.verified_count(), 1);
        assert!(engine.is_done());
        assert_eq!(unpack_request(&outbound).unwrap(), Transaction::idle());
    }

    #[test]
    fn mismatch_replays_same_cursor() {
        let mut engine = TransactionEngine::new(vec![Transaction::get(0x7c)], vec![ExpectedResponse::new(0x1, 0x1)]);
        let mut outbound = RequestWords::default();
        engine.step_words(&peer(false, false, 0), &mut outbound);

        for replay in 1..=4 {
            let report = engine.step_words(&peer(true, true, 0x0), &mut outbound);
            assert!(report.verdict.is_mismatch());
            assert_eq!(report.latch, Latch::Replay(0));
            assert_eq!(report.driven, Transaction::get(0x7c));
            assert_eq!(engine.stats().replays, replay);
            assert_eq!(engine.issued_count(), 1);
        }

        let report = engine.step_words(&peer(true, true, 0x1), &mut outbound);
        assert_eq!(report.latch, Latch::Idle);
        assert!(engine.is_done());
        assert_eq!(engine.stats().mismatches, 4);
        assert_eq!(engine.stats().consecutive_mismatches, 0);
    }

    #[test]
    fn empty_queue_is_done_and_idle() {
        let mut engine = TransactionEngine::new(vec![], vec![]);
        assert!(engine.is_done());
        let mut outbound = [u32::MAX; 4];
        let report = engine.step_words(&peer(true, true, 0), &mut outbound);
        assert_eq!(report.latch, Latch::Idle);
        assert_eq!(engine.issued_count(), 0);
        assert!(!unpack_request(&outbound).unwrap().valid);
    }

    #[test]
    fn idle_after_drain_does_not_reissue() {
        let write = Transaction { wants_response: false, ..Transaction::put_full(0x0, 0x0) };
        let mut engine = TransactionEngine::new(vec![write], vec![]);
        let mut outbound = RequestWords::default();
        engine.step_words(&peer(false, false, 0), &mut outbound);
        engine.step_words(&peer(true, false, 0), &mut outbound);
        assert!(engine.is_done());

        for _ in 0..8 {
            let report = engine.step_words(&peer(true, true, 0), &mut outbound);
            assert_eq!(report.latch, Latch::Idle);
            assert_eq!(report.handshakes, Handshakes::default());
        }
        assert_eq!(engine.issued_count(), 1);
        assert_eq!(engine.stats().request_handshakes, 1);
    }

    #[test]
    fn error_and_integrity_are_reported_only() {
        let config = EngineConfig::default().with_response_integrity(true);
        let queue = TransactionQueue::new(vec![Transaction::get(0x7c)], vec![ExpectedResponse::exact(0x1)]);
        let mut engine = TransactionEngine::from_queue(queue, config);
        let mut outbound = RequestWords::default();
        engine.step_words(&peer(true, false, 0), &mut outbound);

        let mut words = peer(true, true, 0x1);
        words[0] |= 0x2;
        let report = engine.step_words(&words, &mut outbound);
        assert_eq!(report.verdict, Verdict::Match { observed: 0x1 });
        assert_eq!(engine.stats().peer_errors, 1);
        assert_eq!(engine.stats().integrity_errors, 1);
        assert!(engine.is_done());
    }

    struct Loopback {
        inbound: ResponseWords,
        driven: Vec<RequestWords>,
    }

    impl SignalPort for Loopback {
        fn peer_words(&self) -> ResponseWords { self.inbound }

        fn drive(&mut self, words: &RequestWords) { self.driven.push(*words) }
    }

    #[test]
    fn step_drives_port() {
        let mut engine = TransactionEngine::new(vec![Transaction::get(0x7c)], vec![ExpectedResponse::any()]);
        let mut port = Loopback { inbound: peer(false, false, 0), driven: vec![] };
        engine.step(&mut port);
        engine.step(&mut port);

        assert_eq!(port.driven.len(), 2);
        assert_eq!(port.driven[0], port.driven[1]);
        assert_eq!(port.driven[0], [0x0002_f655, 0xcf00_0000, 0x0000_0007, 0x0000_1820]);
    }
}
