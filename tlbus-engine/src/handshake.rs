//! Valid/ready handshake tracking of the request and response channels.
//!
//! The two channels are independent two-state machines. A channel becomes pending when the engine asserts its
//! side of the handshake (`a_valid` on the request channel, `d_ready` on the response channel) and returns to
//! idle once the peer asserts the other side on the same cycle. A new transaction may only be latched when both
//! channels are idle, so at most one request/response pair is in flight.

use tlbus::Transaction;

/// State of one channel.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
    /// Not driving the handshake.
    #[default]
    Idle,
    /// Driving the handshake, waiting for the peer.
    Pending,
}

impl ChannelState {
    fn driving(driving: bool) -> Self {
        if driving {
            Self::Pending
        } else {
            Self::Idle
        }
    }
}

/// Handshakes completed on one cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Handshakes {
    /// The peer accepted the request.
    pub request: bool,
    /// The engine accepted a response.
    pub response: bool,
}

/// Handshake state of both channels.
#[derive(Debug, Default, Clone)]
pub struct HandshakeController {
    request: ChannelState,
    response: ChannelState,
}

impl HandshakeController {
    /// Creates a controller with both channels idle.
    pub fn new() -> Self { Self::default() }

    /// Returns `true` if `a_valid` is asserted and not yet accepted.
    pub fn request_pending(&self) -> bool { self.request == ChannelState::Pending }

    /// Returns `true` if `d_ready` is asserted and no response was accepted yet.
    pub fn response_pending(&self) -> bool { self.response == ChannelState::Pending }

    /// Returns the states of the request and response channels.
    pub fn states(&self) -> (ChannelState, ChannelState) { (self.request, self.response) }

    /// Returns `true` if both channels are idle, so the next transaction may be latched.
    pub fn ready_for_next(&self) -> bool { self.request == ChannelState::Idle && self.response == ChannelState::Idle }

    /// Starts the handshakes requested by `transaction`.
    pub fn latch(&mut self, transaction: &Transaction) {
        self.request = ChannelState::driving(transaction.valid);
        self.response = ChannelState::driving(transaction.wants_response);
    }

    /// Observes the peer's side of both handshakes and completes those that happen on this cycle.
    pub fn observe(&mut self, a_ready: bool, d_valid: bool) -> Handshakes {
        let handshakes =
            Handshakes { request: self.request_pending() && a_ready, response: self.response_pending() && d_valid };

        if handshakes.request {
            self.request = ChannelState::Idle;
        }
        if handshakes.response {
            self.response = ChannelState::Idle;
        }

        handshakes
    }

    /// Returns `transaction` with `a_valid` and `d_ready` as currently driven.
    pub fn drive(&self, transaction: &Transaction) -> Transaction {
        Transaction { valid: self.request_pending(), wants_response: self.response_pending(), ..*transaction }
    }
}
