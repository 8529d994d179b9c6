//! Building transaction lists.
//!
//! A [`Sequence`] keeps requests and expected responses aligned: every read added through the builder methods
//! carries its expectation, so the response cursor stays in step with the reads.

use thiserror::Error;
use tlbus::{CodecError, Transaction};

use crate::queue::{ExpectedResponse, TransactionQueue};

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("transaction {index} is malformed: {error}")]
    Transaction { index: usize, error: CodecError },
    #[error("{reads} reads expect data but {expectations} expected responses were given")]
    ExpectationCount { reads: usize, expectations: usize },
}

/// Ordered requests with their expected responses.
#[derive(Debug, Default, Clone)]
pub struct Sequence {
    requests: Vec<Transaction>,
    responses: Vec<ExpectedResponse>,
}

impl Sequence {
    /// Creates an empty sequence.
    pub fn new() -> Self { Self::default() }

    /// Appends a full-word write.
    pub fn write(&mut self, address: u32, data: u32) -> &mut Self { self.push(Transaction::put_full(address, data)) }

    /// Appends a write of the byte lanes selected by `byte_mask`.
    pub fn write_partial(&mut self, address: u32, data: u32, byte_mask: u8) -> &mut Self {
        self.push(Transaction::put_partial(address, data, byte_mask))
    }

    /// Appends a read whose data is not checked.
    pub fn read(&mut self, address: u32) -> &mut Self { self.read_masked(address, 0, 0) }

    /// Appends a read expecting exactly `value`.
    pub fn read_expect(&mut self, address: u32, value: u32) -> &mut Self {
        self.push(Transaction::get(address)).expect(ExpectedResponse::exact(value))
    }

    /// Appends a read expecting `value` on the bits selected by `mask`.
    ///
    /// On a mismatch the engine replays the read, so this polls until the masked bits match.
    pub fn read_masked(&mut self, address: u32, mask: u32, value: u32) -> &mut Self {
        self.push(Transaction::get(address)).expect(ExpectedResponse::new(mask, value))
    }

    /// Appends a read polling until the bit at `offset` is set.
    pub fn poll_bit(&mut self, address: u32, offset: u32) -> &mut Self {
        self.read_masked(address, 1 << offset, 1 << offset)
    }

    /// Appends a raw request.
    pub fn push(&mut self, transaction: Transaction) -> &mut Self {
        self.requests.push(transaction);
        self
    }

    /// Appends a raw expected response.
    pub fn expect(&mut self, response: ExpectedResponse) -> &mut Self {
        self.responses.push(response);
        self
    }

    /// Appends all requests and expected responses of `other`.
    pub fn extend(&mut self, other: &Sequence) -> &mut Self {
        self.requests.extend_from_slice(&other.requests);
        self.responses.extend_from_slice(&other.responses);
        self
    }

    /// Returns the requests.
    pub fn requests(&self) -> &[Transaction] { &self.requests }

    /// Returns the expected responses.
    pub fn responses(&self) -> &[ExpectedResponse] { &self.responses }

    /// Returns the number of requests whose response data is checked.
    pub fn reads(&self) -> usize { self.requests.iter().filter(|t| t.expects_data()).count() }

    /// Validates every request and builds the queue.
    pub fn build(&self) -> Result<TransactionQueue, SequenceError> {
        for (index, transaction) in self.requests.iter().enumerate() {
            transaction.validate().map_err(|error| SequenceError::Transaction { index, error })?;
        }
        Ok(TransactionQueue::new(self.requests.clone(), self.responses.clone()))
    }

    /// Like [`Sequence::build`], and also requires one expected response per checked read.
    pub fn build_strict(&self) -> Result<TransactionQueue, SequenceError> {
        let (reads, expectations) = (self.reads(), self.responses.len());
        if reads != expectations {
            return Err(SequenceError::ExpectationCount { reads, expectations });
        }
        self.build()
    }
}
