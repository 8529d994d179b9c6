//! Replayable transaction queue.
//!
//! Entries are never removed: the queue only moves cursors over two immutable lists. A cursor that does not
//! advance re-reads the same entry, which is how a request is replayed.

use tlbus::Transaction;

/// Expected value of a read response.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExpectedResponse {
    /// Bits of the response data that are compared.
    pub mask: u32,
    /// Expected response data.
    pub expected_value: u32,
}

impl ExpectedResponse {
    /// Creates an expectation on the bits selected by `mask`.
    pub const fn new(mask: u32, expected_value: u32) -> Self { Self { mask, expected_value } }

    /// Creates an expectation on every bit.
    pub const fn exact(expected_value: u32) -> Self { Self::new(u32::MAX, expected_value) }

    /// Creates an expectation matching any data.
    pub const fn any() -> Self { Self::new(0, 0) }

    /// Returns `true` if `observed` agrees with the expected value on the masked bits.
    pub const fn matches(&self, observed: u32) -> bool { (observed & self.mask) == (self.expected_value & self.mask) }
}

/// Ordered requests and expected responses, each with its own cursor.
#[derive(Debug, Default, Clone)]
pub struct TransactionQueue {
    requests: Vec<Transaction>,
    responses: Vec<ExpectedResponse>,
    request_cursor: usize,
    response_cursor: usize,
}

impl TransactionQueue {
    /// Creates a queue with both cursors at the first entry.
    pub fn new(requests: Vec<Transaction>, responses: Vec<ExpectedResponse>) -> Self {
        Self { requests, responses, request_cursor: 0, response_cursor: 0 }
    }

    /// Returns the number of requests.
    pub fn request_total(&self) -> usize { self.requests.len() }

    /// Returns the number of expected responses.
    pub fn response_total(&self) -> usize { self.responses.len() }

    /// Returns the request cursor.
    pub fn request_cursor(&self) -> usize { self.request_cursor }

    /// Returns the response cursor, i.e. the number of verified responses.
    pub fn response_cursor(&self) -> usize { self.response_cursor }

    /// Returns the request at `cursor`, or the idle transaction past the end.
    pub fn request_at(&self, cursor: usize) -> Transaction {
        self.requests.get(cursor).copied().unwrap_or_else(Transaction::idle)
    }

    /// Returns the expected response at `cursor`, or an expectation matching anything past the end.
    pub fn expected_at(&self, cursor: usize) -> ExpectedResponse {
        self.responses.get(cursor).copied().unwrap_or_else(ExpectedResponse::any)
    }

    /// Returns the request under the request cursor.
    pub fn current_request(&self) -> Transaction { self.request_at(self.request_cursor) }

    /// Returns the expected response under the response cursor.
    pub fn current_expected(&self) -> ExpectedResponse { self.expected_at(self.response_cursor) }

    /// Moves the request cursor to the next entry, saturating at the end.
    pub fn advance_request(&mut self) { self.request_cursor = (self.request_cursor + 1).min(self.requests.len()) }

    /// Moves the response cursor to the next entry, saturating at the end.
    pub fn advance_response(&mut self) {
        self.response_cursor = (self.response_cursor + 1).min(self.responses.len())
    }

    /// Returns `true` if the request cursor moved past every request.
    pub fn requests_drained(&self) -> bool { self.request_cursor >= self.requests.len() }

    /// Returns `true` if the response cursor moved past every expected response.
    pub fn responses_drained(&self) -> bool { self.response_cursor >= self.responses.len() }

    /// Returns all requests.
    pub fn requests(&self) -> &[Transaction] { &self.requests }

    /// Returns all expected responses.
    pub fn responses(&self) -> &[ExpectedResponse] { &self.responses }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> TransactionQueue {
        TransactionQueue::new(
            vec![Transaction::put_full(0x74, 0x2), Transaction::get(0x7c)],
            vec![ExpectedResponse::new(0x1, 0x1)],
        )
    }

    #[test]
    fn masked_match() {
        let expected = ExpectedResponse::new(0x1, 0x1);
        assert!(expected.matches(0x1));
        assert!(expected.matches(0xFFFF_FFF1));
        assert!(!expected.matches(0x10));
        assert!(ExpectedResponse::any().matches(0xDEAD_BEEF));
        assert!(ExpectedResponse::exact(0x2).matches(0x2));
        assert!(!ExpectedResponse::exact(0x2).matches(0x3));
    }

    #[test]
    fn cursors_saturate() {
        let mut queue = queue();
        assert_eq!(queue.current_request(), Transaction::put_full(0x74, 0x2));
        queue.advance_request();
        assert_eq!(queue.current_request(), Transaction::get(0x7c));
        queue.advance_request();
        queue.advance_request();
        assert_eq!(queue.request_cursor(), 2);
        assert!(queue.requests_drained());
        assert_eq!(queue.current_request(), Transaction::idle());

        assert!(!queue.responses_drained());
        queue.advance_response();
        queue.advance_response();
        assert_eq!(queue.response_cursor(), 1);
        assert_eq!(queue.current_expected(), ExpectedResponse::any());
    }

    #[test]
    fn reads_do_not_consume() {
        let queue = queue();
        assert_eq!(queue.current_request(), queue.current_request());
        assert_eq!(queue.request_at(1), Transaction::get(0x7c));
        assert_eq!(queue.request_at(usize::MAX), Transaction::idle());
        assert_eq!(queue.expected_at(7), ExpectedResponse::any());
        assert_eq!(queue.request_cursor(), 0);
    }

    #[test]
    fn empty_queue_is_drained() {
        let queue = TransactionQueue::default();
        assert!(queue.requests_drained() && queue.responses_drained());
        assert_eq!((queue.request_total(), queue.response_total()), (0, 0));
    }
}
