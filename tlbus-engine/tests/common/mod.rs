#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};

use tlbus::codec::{pack_response, unpack_request, unpack_request_user, RequestWords, ResponseWords};
use tlbus::constants::{d_opcode, SIZE_WORD};
use tlbus::{cmd_intg, data_intg, Opcode, RequestUser, Response, Transaction};
use tlbus_engine::{SignalPort, TransactionEngine};

/// Register-file device on the far side of the bus.
///
/// The device commits the handshakes of a cycle when the engine drives its next words, then computes the outputs
/// the engine sees on the following cycle.
#[derive(Debug, Default)]
pub struct RegisterFile {
    pub registers: BTreeMap<u32, u32>,
    /// Values returned by successive reads of an address, the last one sticking.
    pub scripted: BTreeMap<u32, VecDeque<u32>>,
    /// Cycles `a_ready` stays low before each request is accepted.
    pub stall: u32,
    pub error_address: Option<u32>,
    pub corrupt_data_intg: bool,

    pub accepted: Vec<(Transaction, RequestUser)>,
    pub integrity_violations: usize,

    stall_left: u32,
    previous: RequestWords,
    pending: Option<Response>,
    outputs: Response,
}

impl RegisterFile {
    pub fn new() -> Self { Self::default() }

    pub fn with_stall(stall: u32) -> Self { Self { stall, stall_left: stall, ..Self::default() } }

    pub fn script(&mut self, address: u32, values: impl IntoIterator<Item = u32>) -> &mut Self {
        self.scripted.insert(address, values.into_iter().collect());
        self
    }

    pub fn register(&self, address: u32) -> u32 { self.registers.get(&address).copied().unwrap_or(0) }

    fn read(&mut self, address: u32) -> u32 {
        if let Some(values) = self.scripted.get_mut(&address) {
            let value = values.front().copied().unwrap_or(0);
            if values.len() > 1 {
                values.pop_front();
            }
            return value;
        }
        self.register(address)
    }

    fn accept(&mut self, transaction: Transaction, user: RequestUser) {
        if user.cmd_intg != cmd_intg(&transaction, user.tl_type) || user.data_intg != data_intg(transaction.data) {
            self.integrity_violations += 1;
        }
        self.accepted.push((transaction, user));

        let (opcode, data) = match transaction.opcode {
            Opcode::Get => (d_opcode::ACCESS_ACK_DATA, self.read(transaction.address)),
            Opcode::PutFullData | Opcode::PutPartialData => {
                let lanes = (0..4)
                    .filter(|lane| transaction.byte_mask & (1 << lane) != 0)
                    .fold(0u32, |mask, lane| mask | (0xFF << (8 * lane)));
                let old = self.register(transaction.address);
                self.registers.insert(transaction.address, (old & !lanes) | (transaction.data & lanes));
                (d_opcode::ACCESS_ACK, 0)
            }
        };

        if !transaction.wants_response {
            return;
        }
        let intg = data_intg(data) ^ u8::from(self.corrupt_data_intg);
        self.pending = Some(Response {
            valid: true,
            opcode,
            size: SIZE_WORD,
            data,
            user: Response::user_from(intg, 0),
            error: self.error_address == Some(transaction.address),
            ..Response::default()
        });
    }
}

impl SignalPort for RegisterFile {
    fn peer_words(&self) -> ResponseWords { pack_response(&self.outputs) }

    fn drive(&mut self, words: &RequestWords) {
        let previous = unpack_request(&self.previous).unwrap();
        if previous.wants_response && self.outputs.valid {
            self.pending = None;
        }
        if previous.valid && self.outputs.a_ready {
            self.accept(previous, unpack_request_user(&self.previous));
            self.stall_left = self.stall;
        }

        let current = unpack_request(words).unwrap();
        if current.valid && self.stall_left > 0 && self.pending.is_none() {
            self.stall_left -= 1;
        }

        self.outputs = self.pending.unwrap_or_default();
        self.outputs.a_ready = self.pending.is_none() && self.stall_left == 0;
        self.previous = *words;
    }
}

/// Steps `engine` against `peer` until it is done, returning the number of cycles.
pub fn run(engine: &mut TransactionEngine, peer: &mut RegisterFile, max_cycles: u64) -> u64 {
    for cycle in 1..=max_cycles {
        engine.step(peer);
        if engine.is_done() {
            return cycle;
        }
    }
    panic!("not done after {max_cycles} cycles: {:?}", engine.stats());
}
