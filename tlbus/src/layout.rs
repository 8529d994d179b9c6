//! Bit-position tables of the flattened buses.
//!
//! Each bus is a single little-endian bit vector split over 32-bit words: bit `i` of the bus lives in bit
//! `i % 32` of word `i / 32`. Field boundaries do not follow word boundaries, so a field may straddle two words.

use static_assertions::const_assert_eq;

use crate::constants::*;
use crate::utils::low_mask;

/// A contiguous bit range of a flattened bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Field {
    /// Field name, as it appears in the bus struct.
    pub name: &'static str,
    /// Position of the least significant bit.
    pub lsb: usize,
    /// Number of bits.
    pub width: usize,
}

impl Field {
    /// Creates a field at `lsb`.
    pub const fn new(name: &'static str, lsb: usize, width: usize) -> Self { Self { name, lsb, width } }

    /// Creates a field placed right above `prev`.
    pub const fn above(prev: Field, name: &'static str, width: usize) -> Self { Self::new(name, prev.end(), width) }

    /// Position of the most significant bit.
    pub const fn msb(&self) -> usize { self.lsb + self.width - 1 }

    /// Position right above the most significant bit.
    pub const fn end(&self) -> usize { self.lsb + self.width }

    /// Writes `value` into the field of `words`.
    ///
    /// Bits of `value` above the field width are dropped. The field is OR-ed in, so `words` must be cleared
    /// beforehand.
    pub fn insert(&self, words: &mut [u32], value: u64) {
        let value = value & low_mask(self.width);
        let mut done = 0;
        while done < self.width {
            let pos = self.lsb + done;
            let (index, offset) = (pos / WORD_WIDTH, pos % WORD_WIDTH);
            let len = (WORD_WIDTH - offset).min(self.width - done);
            let chunk = (value >> done) & low_mask(len);
            words[index] |= (chunk as u32) << offset;
            done += len;
        }
    }

    /// Reads the field out of `words`.
    pub fn extract(&self, words: &[u32]) -> u64 {
        let mut value = 0;
        let mut done = 0;
        while done < self.width {
            let pos = self.lsb + done;
            let (index, offset) = (pos / WORD_WIDTH, pos % WORD_WIDTH);
            let len = (WORD_WIDTH - offset).min(self.width - done);
            let chunk = (u64::from(words[index]) >> offset) & low_mask(len);
            value |= chunk << done;
            done += len;
        }
        value
    }

    /// Places `value` at the field position of a single 64-bit vector.
    pub const fn place(&self, value: u64) -> u64 { (value & low_mask(self.width)) << self.lsb }

    /// Takes the field out of a single 64-bit vector.
    pub const fn take(&self, vector: u64) -> u64 { (vector >> self.lsb) & low_mask(self.width) }
}

/// Fields of the request bus (`tl_h2d`), from the least significant bit up.
pub mod request {
    use super::*;

    /// Response channel ready.
    pub const D_READY: Field = Field::new("d_ready", 0, 1);
    /// User bits.
    pub const A_USER: Field = Field::above(D_READY, "a_user", A_USER_WIDTH);
    /// Request data.
    pub const A_DATA: Field = Field::above(A_USER, "a_data", DATA_WIDTH);
    /// Byte lane mask.
    pub const A_MASK: Field = Field::above(A_DATA, "a_mask", MASK_WIDTH);
    /// Address.
    pub const A_ADDRESS: Field = Field::above(A_MASK, "a_address", ADDR_WIDTH);
    /// Source identifier.
    pub const A_SOURCE: Field = Field::above(A_ADDRESS, "a_source", SOURCE_WIDTH);
    /// Size.
    pub const A_SIZE: Field = Field::above(A_SOURCE, "a_size", SIZE_WIDTH);
    /// Param.
    pub const A_PARAM: Field = Field::above(A_SIZE, "a_param", PARAM_WIDTH);
    /// Opcode.
    pub const A_OPCODE: Field = Field::above(A_PARAM, "a_opcode", OPCODE_WIDTH);
    /// Request channel valid.
    pub const A_VALID: Field = Field::above(A_OPCODE, "a_valid", 1);

    /// Data integrity bits of the user field.
    pub const A_USER_DATA_INTG: Field = Field::new("a_user.data_intg", A_USER.lsb, INTG_WIDTH);
    /// Command integrity bits of the user field.
    pub const A_USER_CMD_INTG: Field = Field::above(A_USER_DATA_INTG, "a_user.cmd_intg", INTG_WIDTH);
    /// Instruction type tag of the user field.
    pub const A_USER_TL_TYPE: Field = Field::above(A_USER_CMD_INTG, "a_user.instr_type", TL_TYPE_WIDTH);
    /// Reserved bits of the user field.
    pub const A_USER_RSVD: Field = Field::above(A_USER_TL_TYPE, "a_user.rsvd", A_USER_RSVD_WIDTH);

    /// All top-level fields.
    pub const FIELDS: [Field; 10] =
        [D_READY, A_USER, A_DATA, A_MASK, A_ADDRESS, A_SOURCE, A_SIZE, A_PARAM, A_OPCODE, A_VALID];

    /// All user sub-fields.
    pub const USER_FIELDS: [Field; 4] = [A_USER_DATA_INTG, A_USER_CMD_INTG, A_USER_TL_TYPE, A_USER_RSVD];

    const_assert_eq!(A_VALID.end(), REQUEST_WIDTH);
    const_assert_eq!(A_USER_RSVD.end(), A_USER.end());
}

/// Fields of the response bus (`tl_d2h`), from the least significant bit up.
pub mod response {
    use super::*;

    /// Request channel ready.
    pub const A_READY: Field = Field::new("a_ready", 0, 1);
    /// Error flag.
    pub const D_ERROR: Field = Field::above(A_READY, "d_error", 1);
    /// User bits.
    pub const D_USER: Field = Field::above(D_ERROR, "d_user", D_USER_WIDTH);
    /// Response data.
    pub const D_DATA: Field = Field::above(D_USER, "d_data", DATA_WIDTH);
    /// Sink identifier.
    pub const D_SINK: Field = Field::above(D_DATA, "d_sink", SINK_WIDTH);
    /// Source identifier.
    pub const D_SOURCE: Field = Field::above(D_SINK, "d_source", SOURCE_WIDTH);
    /// Size.
    pub const D_SIZE: Field = Field::above(D_SOURCE, "d_size", SIZE_WIDTH);
    /// Param.
    pub const D_PARAM: Field = Field::above(D_SIZE, "d_param", PARAM_WIDTH);
    /// Opcode.
    pub const D_OPCODE: Field = Field::above(D_PARAM, "d_opcode", OPCODE_WIDTH);
    /// Response channel valid.
    pub const D_VALID: Field = Field::above(D_OPCODE, "d_valid", 1);

    /// Data integrity bits of the user field.
    pub const D_USER_DATA_INTG: Field = Field::new("d_user.data_intg", D_USER.lsb, INTG_WIDTH);
    /// Response integrity bits of the user field.
    pub const D_USER_RSP_INTG: Field = Field::above(D_USER_DATA_INTG, "d_user.rsp_intg", INTG_WIDTH);

    /// All top-level fields.
    pub const FIELDS: [Field; 10] =
        [A_READY, D_ERROR, D_USER, D_DATA, D_SINK, D_SOURCE, D_SIZE, D_PARAM, D_OPCODE, D_VALID];

    /// All user sub-fields.
    pub const USER_FIELDS: [Field; 2] = [D_USER_DATA_INTG, D_USER_RSP_INTG];

    const_assert_eq!(D_VALID.end(), RESPONSE_WIDTH);
    const_assert_eq!(D_USER_RSP_INTG.end(), D_USER.end());
}

/// Returns `true` if `fields` tile `[0, width)` without gaps or overlaps, in order.
pub fn is_tiling(fields: &[Field], width: usize) -> bool {
    use itertools::Itertools;

    let starts_at_zero = fields.first().map_or(width == 0, |f| f.lsb == 0);
    let ends_at_width = fields.last().map_or(width == 0, |f| f.end() == width);
    starts_at_zero && ends_at_width && fields.iter().tuple_windows().all(|(lo, hi)| lo.end() == hi.lsb)
}
