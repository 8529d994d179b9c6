//! Logical records carried by the buses.

use std::fmt;

use crate::codec::CodecError;
use crate::constants::*;
use crate::layout::{request, response, Field};
use crate::utils::low_mask;

/// Request opcode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    /// Write of all byte lanes.
    #[default]
    PutFullData,
    /// Write of the byte lanes selected by the mask.
    PutPartialData,
    /// Read.
    Get,
}

impl Opcode {
    /// Returns the wire value.
    pub const fn value(self) -> u8 {
        match self {
            Self::PutFullData => a_opcode::PUT_FULL_DATA,
            Self::PutPartialData => a_opcode::PUT_PARTIAL_DATA,
            Self::Get => a_opcode::GET,
        }
    }

    /// Returns `true` for opcodes answered with data.
    pub const fn is_read(self) -> bool { matches!(self, Self::Get) }
}

impl TryFrom<u8> for Opcode {
    type Error = CodecError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            a_opcode::PUT_FULL_DATA => Ok(Self::PutFullData),
            a_opcode::PUT_PARTIAL_DATA => Ok(Self::PutPartialData),
            a_opcode::GET => Ok(Self::Get),
            _ => Err(CodecError::UnknownOpcode(value)),
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PutFullData => write!(f, "PutFullData"),
            Self::PutPartialData => write!(f, "PutPartialData"),
            Self::Get => write!(f, "Get"),
        }
    }
}

/// Outbound request descriptor.
///
/// The default value is the idle transaction: nothing valid, nothing expected back.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Transaction {
    /// Request channel valid.
    pub valid: bool,
    /// Opcode.
    pub opcode: Opcode,
    /// Log2 of the access byte count.
    pub size: u8,
    /// Address.
    pub address: u32,
    /// Byte lane mask.
    pub byte_mask: u8,
    /// Write data, zero for reads.
    pub data: u32,
    /// Whether the response channel should be made ready for this request.
    pub wants_response: bool,
}

impl Transaction {
    /// Creates the idle transaction.
    pub const fn idle() -> Self {
        Self {
            valid: false,
            opcode: Opcode::PutFullData,
            size: 0,
            address: 0,
            byte_mask: 0,
            data: 0,
            wants_response: false,
        }
    }

    /// Creates a full-word write.
    pub const fn put_full(address: u32, data: u32) -> Self {
        Self {
            valid: true,
            opcode: Opcode::PutFullData,
            size: SIZE_WORD,
            address,
            byte_mask: MASK_FULL,
            data,
            wants_response: true,
        }
    }

    /// Creates a write of the lanes selected by `byte_mask`.
    pub const fn put_partial(address: u32, data: u32, byte_mask: u8) -> Self {
        Self { opcode: Opcode::PutPartialData, byte_mask, ..Self::put_full(address, data) }
    }

    /// Creates a full-word read.
    pub const fn get(address: u32) -> Self { Self { opcode: Opcode::Get, data: 0, ..Self::put_full(address, 0) } }

    /// Returns `true` if a data response is expected and checked for this transaction.
    pub const fn expects_data(&self) -> bool { self.valid && self.wants_response && self.opcode.is_read() }

    /// Checks that every field fits its bit-field on the bus.
    pub fn validate(&self) -> Result<(), CodecError> {
        check_width(request::A_SIZE.name, u64::from(self.size), SIZE_WIDTH)?;
        check_width(request::A_MASK.name, u64::from(self.byte_mask), MASK_WIDTH)?;
        Ok(())
    }
}

impl fmt::Display for Transaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.valid {
            return write!(f, "idle");
        }
        write!(f, "{} @{:#010x}", self.opcode, self.address)?;
        if !self.opcode.is_read() {
            write!(f, " <- {:#010x} mask {:#x}", self.data, self.byte_mask)?;
        }
        Ok(())
    }
}

fn check_width(field: &'static str, value: u64, width: usize) -> Result<(), CodecError> {
    if value > low_mask(width) {
        return Err(CodecError::FieldOverflow { field, value, width });
    }
    Ok(())
}

/// User bits of a request.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestUser {
    /// Integrity bits over the data payload.
    pub data_intg: u8,
    /// Integrity bits over the command payload.
    pub cmd_intg: u8,
    /// Instruction type tag.
    pub tl_type: u8,
}

/// Inbound response, as driven by the peer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Response {
    /// Response channel valid.
    pub valid: bool,
    /// Response opcode.
    pub opcode: u8,
    /// Param.
    pub param: u8,
    /// Size.
    pub size: u8,
    /// Source identifier.
    pub source: u8,
    /// Sink identifier.
    pub sink: bool,
    /// Response data.
    pub data: u32,
    /// User bits.
    pub user: u16,
    /// Error flag.
    pub error: bool,
    /// Peer's readiness to accept a request.
    pub a_ready: bool,
}

impl Response {
    /// Returns the data integrity bits of the user field.
    pub fn data_intg(&self) -> u8 { self.user_field(response::D_USER_DATA_INTG) }

    /// Returns the response integrity bits of the user field.
    pub fn rsp_intg(&self) -> u8 { self.user_field(response::D_USER_RSP_INTG) }

    /// Composes the user field from integrity bits.
    pub fn user_from(data_intg: u8, rsp_intg: u8) -> u16 {
        let data = response::D_USER_DATA_INTG.width;
        ((u16::from(rsp_intg) & 0x7F) << data) | (u16::from(data_intg) & 0x7F)
    }

    fn user_field(&self, field: Field) -> u8 {
        let shifted = u64::from(self.user) >> (field.lsb - response::D_USER.lsb);
        (shifted & low_mask(field.width)) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_values() {
        assert_eq!(Opcode::PutFullData.value(), 0);
        assert_eq!(Opcode::PutPartialData.value(), 1);
        assert_eq!(Opcode::Get.value(), 4);
        assert_eq!(Opcode::try_from(4).unwrap(), Opcode::Get);
        assert!(matches!(Opcode::try_from(2), Err(CodecError::UnknownOpcode(2))));
        assert!(Opcode::Get.is_read() && !Opcode::PutPartialData.is_read());
    }

    #[test]
    fn constructors() {
        let write = Transaction::put_full(0x74, 0x2);
        assert!(write.valid && write.wants_response);
        assert_eq!((write.size, write.byte_mask), (2, 0xF));
        assert!(!write.expects_data());

        let read = Transaction::get(0x7c);
        assert_eq!((read.opcode, read.data, read.address), (Opcode::Get, 0, 0x7c));
        assert!(read.expects_data());

        let partial = Transaction::put_partial(0x10, 0xAB, 0x1);
        assert_eq!((partial.opcode, partial.byte_mask), (Opcode::PutPartialData, 0x1));

        assert_eq!(Transaction::idle(), Transaction::default());
        assert!(!Transaction::idle().expects_data());
    }

    #[test]
    fn validation() {
        assert!(Transaction::put_full(0, 0).validate().is_ok());
        let err = Transaction { size: 4, ..Transaction::get(0) }.validate().unwrap_err();
        assert!(matches!(err, CodecError::FieldOverflow { field: "a_size", value: 4, width: 2 }));
        assert!(Transaction::put_partial(0, 0, 0x10).validate().is_err());
    }

    #[test]
    fn response_user_split() {
        let response = Response { user: Response::user_from(0x5E, 0x21), ..Default::default() };
        assert_eq!(response.user, 0x21 << 7 | 0x5E);
        assert_eq!(response.data_intg(), 0x5E);
        assert_eq!(response.rsp_intg(), 0x21);
    }

    #[test]
    fn display() {
        assert_eq!(Transaction::idle().to_string(), "idle");
        assert_eq!(Transaction::get(0x7c).to_string(), "Get @0x0000007c");
        assert_eq!(Transaction::put_full(0x74, 2).to_string(), "PutFullData @0x00000074 <- 0x00000002 mask 0xf");
    }
}
