//! Command and data integrity codes.
//!
//! Both codes are inverted SEC-DED codes: a systematic codeword is the payload followed by 7 check bits,
//! and check bit `i` is the parity of the in-progress codeword under generator row `i`, XOR-ed with the row's
//! invert flag. The command code is a (64, 57) code over the command payload, the data code a (39, 32) code over
//! the request or response data.
//!
//! The generator rows are protocol constants. The peer recomputes the same code on every request and rejects
//! the request on a mismatch, so they must not be altered.

use crate::constants::*;
use crate::layout::Field;
use crate::signal::{RequestUser, Transaction};
use crate::utils::{low_mask, parity};

/// One row of a generator matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Generator {
    /// Codeword bits XOR-reduced into the check bit.
    pub mask: u64,
    /// Whether the check bit is complemented.
    pub invert: bool,
}

impl Generator {
    const fn new(mask: u64, invert: bool) -> Self { Self { mask, invert } }
}

/// A systematic linear code of `payload_width` payload bits followed by one check bit per generator row.
#[derive(Debug, Clone, Copy)]
pub struct LinearCode {
    /// Number of payload bits.
    pub payload_width: usize,
    /// Generator rows, by check bit position.
    pub generators: &'static [Generator],
}

/// Generator rows of the (64, 57) command code.
pub const CMD_GENERATORS: [Generator; INTG_WIDTH] = [
    Generator::new(0x0103_FFF8_0000_7FFF, false),
    Generator::new(0x017C_1FF8_01FF_801F, true),
    Generator::new(0x01BD_E1F8_7E07_81E1, false),
    Generator::new(0x01DE_EE3B_8E38_8E22, true),
    Generator::new(0x01EF_76CD_B2C9_3244, false),
    Generator::new(0x01F7_BB56_D552_5488, true),
    Generator::new(0x01FB_DDA7_69A4_6910, false),
];

/// Generator rows of the (39, 32) data code.
pub const DATA_GENERATORS: [Generator; INTG_WIDTH] = [
    Generator::new(0x01_2606_BD25, false),
    Generator::new(0x02_DEBA_8050, true),
    Generator::new(0x04_413D_89AA, false),
    Generator::new(0x08_3123_4ED1, true),
    Generator::new(0x10_C2C1_323B, false),
    Generator::new(0x20_2DCC_624C, true),
    Generator::new(0x40_9850_5586, false),
];

/// Command integrity code.
pub const CMD_CODE: LinearCode = LinearCode { payload_width: 57, generators: &CMD_GENERATORS };

/// Data integrity code.
pub const DATA_CODE: LinearCode = LinearCode { payload_width: DATA_WIDTH, generators: &DATA_GENERATORS };

/// Fields of the command payload.
pub mod cmd_payload {
    use super::*;

    /// Byte lane mask.
    pub const MASK: Field = Field::new("mask", 0, MASK_WIDTH);
    /// Opcode.
    pub const OPCODE: Field = Field::above(MASK, "opcode", OPCODE_WIDTH);
    /// Address.
    pub const ADDRESS: Field = Field::above(OPCODE, "addr", ADDR_WIDTH);
    /// Instruction type tag.
    pub const TL_TYPE: Field = Field::above(ADDRESS, "instr_type", TL_TYPE_WIDTH);
}

impl LinearCode {
    /// Returns the number of check bits.
    pub fn check_width(&self) -> usize { self.generators.len() }

    /// Returns the full codeword of `payload`.
    ///
    /// Rows are applied to the accumulated codeword, so a row covering a lower check bit sees the value already
    /// computed for it.
    pub fn encode(&self, payload: u64) -> u64 {
        self.generators.iter().enumerate().fold(payload & low_mask(self.payload_width), |codeword, (i, row)| {
            let bit = parity(codeword & row.mask) ^ row.invert;
            codeword | (u64::from(bit) << (self.payload_width + i))
        })
    }

    /// Returns the check bits of `payload`.
    pub fn check_bits(&self, payload: u64) -> u8 {
        ((self.encode(payload) >> self.payload_width) & low_mask(self.check_width())) as u8
    }

    /// Returns `true` if `check_bits` are the check bits of `payload`.
    pub fn matches(&self, payload: u64, check_bits: u8) -> bool { self.check_bits(payload) == check_bits }
}

/// Assembles the command payload of `transaction`.
pub fn command_payload(transaction: &Transaction, tl_type: u8) -> u64 {
    cmd_payload::MASK.place(u64::from(transaction.byte_mask))
        | cmd_payload::OPCODE.place(u64::from(transaction.opcode.value()))
        | cmd_payload::ADDRESS.place(u64::from(transaction.address))
        | cmd_payload::TL_TYPE.place(u64::from(tl_type))
}

/// Returns the command integrity bits of `transaction`.
pub fn cmd_intg(transaction: &Transaction, tl_type: u8) -> u8 {
    CMD_CODE.check_bits(command_payload(transaction, tl_type))
}

/// Returns the data integrity bits of `data`.
pub fn data_intg(data: u32) -> u8 { DATA_CODE.check_bits(u64::from(data)) }

impl RequestUser {
    /// Generates the user bits of `transaction`.
    pub fn generate(transaction: &Transaction, tl_type: u8) -> Self {
        Self {
            data_intg: data_intg(transaction.data),
            cmd_intg: cmd_intg(transaction, tl_type),
            tl_type: tl_type & low_mask(TL_TYPE_WIDTH) as u8,
        }
    }
}
