//! Bus parameters.
//!
//! Widths follow the TL-UL profile used by the device: 32-bit address and data, 4 byte lanes, 8-bit source
//! identifiers and a single sink bit.

/// Width of a signal word.
pub const WORD_WIDTH: usize = 32;

/// Address width.
pub const ADDR_WIDTH: usize = 32;

/// Data width.
pub const DATA_WIDTH: usize = 32;

/// Byte mask width, one bit per data byte lane.
pub const MASK_WIDTH: usize = DATA_WIDTH / 8;

/// Size field width.
pub const SIZE_WIDTH: usize = 2;

/// Opcode field width.
pub const OPCODE_WIDTH: usize = 3;

/// Param field width.
pub const PARAM_WIDTH: usize = 3;

/// Source identifier width.
pub const SOURCE_WIDTH: usize = 8;

/// Sink identifier width.
pub const SINK_WIDTH: usize = 1;

/// Number of integrity bits per code.
pub const INTG_WIDTH: usize = 7;

/// Instruction type tag width.
pub const TL_TYPE_WIDTH: usize = 4;

/// Reserved bits at the top of the request user field.
pub const A_USER_RSVD_WIDTH: usize = 5;

/// Request user field width: data integrity, command integrity, instruction type and reserved bits.
pub const A_USER_WIDTH: usize = INTG_WIDTH + INTG_WIDTH + TL_TYPE_WIDTH + A_USER_RSVD_WIDTH;

/// Response user field width: data integrity and response integrity.
pub const D_USER_WIDTH: usize = INTG_WIDTH + INTG_WIDTH;

/// Width of the flattened request bus (`tl_h2d`).
pub const REQUEST_WIDTH: usize = (1 + OPCODE_WIDTH + PARAM_WIDTH + SIZE_WIDTH + SOURCE_WIDTH)
    + (ADDR_WIDTH + MASK_WIDTH + DATA_WIDTH + A_USER_WIDTH + 1);

/// Width of the flattened response bus (`tl_d2h`).
pub const RESPONSE_WIDTH: usize =
    1 + OPCODE_WIDTH + PARAM_WIDTH + SIZE_WIDTH + SOURCE_WIDTH + SINK_WIDTH + DATA_WIDTH + D_USER_WIDTH + 1 + 1;

/// Number of words carrying the request bus.
pub const REQUEST_WORDS: usize = (REQUEST_WIDTH + WORD_WIDTH - 1) / WORD_WIDTH;

/// Number of words carrying the response bus.
pub const RESPONSE_WORDS: usize = (RESPONSE_WIDTH + WORD_WIDTH - 1) / WORD_WIDTH;

/// Instruction type tag for data accesses.
pub const TL_TYPE_DATA: u8 = 0x5;

/// Size of a full-word access (log2 of the byte count).
pub const SIZE_WORD: u8 = 2;

/// Byte mask enabling every lane.
pub const MASK_FULL: u8 = 0xF;

/// Request opcode values.
pub mod a_opcode {
    /// Write of all lanes.
    pub const PUT_FULL_DATA: u8 = 0;
    /// Write of the lanes selected by the byte mask.
    pub const PUT_PARTIAL_DATA: u8 = 1;
    /// Read.
    pub const GET: u8 = 4;
}

/// Response opcode values.
pub mod d_opcode {
    /// Acknowledgement without data.
    pub const ACCESS_ACK: u8 = 0;
    /// Acknowledgement carrying read data.
    pub const ACCESS_ACK_DATA: u8 = 1;
}
