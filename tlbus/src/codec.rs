//! Packing of logical records into bus words and back.
//!
//! Param and source are driven as zeros. They are decoded from the response so peers can be observed, but they
//! are not carried by [`Transaction`].

use thiserror::Error;

use crate::constants::*;
use crate::layout::{request, response};
use crate::signal::{Opcode, RequestUser, Response, Transaction};

/// Words carrying the request bus.
pub type RequestWords = [u32; REQUEST_WORDS];

/// Words carrying the response bus.
pub type ResponseWords = [u32; RESPONSE_WORDS];

#[allow(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("unknown request opcode: {0}")]
    UnknownOpcode(u8),
    #[error("value {value:#x} does not fit the {width}-bit `{field}` field")]
    FieldOverflow { field: &'static str, value: u64, width: usize },
}

/// Packs a request into `words`, clearing them first.
pub fn pack_request_into(transaction: &Transaction, user: &RequestUser, words: &mut RequestWords) {
    words.fill(0);

    request::A_VALID.insert(words, u64::from(transaction.valid));
    request::A_OPCODE.insert(words, u64::from(transaction.opcode.value()));
    request::A_SIZE.insert(words, u64::from(transaction.size));
    request::A_ADDRESS.insert(words, u64::from(transaction.address));
    request::A_MASK.insert(words, u64::from(transaction.byte_mask));
    request::A_DATA.insert(words, u64::from(transaction.data));
    request::A_USER_DATA_INTG.insert(words, u64::from(user.data_intg));
    request::A_USER_CMD_INTG.insert(words, u64::from(user.cmd_intg));
    request::A_USER_TL_TYPE.insert(words, u64::from(user.tl_type));
    request::D_READY.insert(words, u64::from(transaction.wants_response));
}

/// Packs a request.
pub fn pack_request(transaction: &Transaction, user: &RequestUser) -> RequestWords {
    let mut words = RequestWords::default();
    pack_request_into(transaction, user, &mut words);
    words
}

/// Unpacks a request.
pub fn unpack_request(words: &RequestWords) -> Result<Transaction, CodecError> {
    Ok(Transaction {
        valid: request::A_VALID.extract(words) != 0,
        opcode: Opcode::try_from(request::A_OPCODE.extract(words) as u8)?,
        size: request::A_SIZE.extract(words) as u8,
        address: request::A_ADDRESS.extract(words) as u32,
        byte_mask: request::A_MASK.extract(words) as u8,
        data: request::A_DATA.extract(words) as u32,
        wants_response: request::D_READY.extract(words) != 0,
    })
}

/// Unpacks the user bits of a request.
pub fn unpack_request_user(words: &RequestWords) -> RequestUser {
    RequestUser {
        data_intg: request::A_USER_DATA_INTG.extract(words) as u8,
        cmd_intg: request::A_USER_CMD_INTG.extract(words) as u8,
        tl_type: request::A_USER_TL_TYPE.extract(words) as u8,
    }
}

/// Packs a response into `words`, clearing them first.
pub fn pack_response_into(rsp: &Response, words: &mut ResponseWords) {
    words.fill(0);

    response::D_VALID.insert(words, u64::from(rsp.valid));
    response::D_OPCODE.insert(words, u64::from(rsp.opcode));
    response::D_PARAM.insert(words, u64::from(rsp.param));
    response::D_SIZE.insert(words, u64::from(rsp.size));
    response::D_SOURCE.insert(words, u64::from(rsp.source));
    response::D_SINK.insert(words, u64::from(rsp.sink));
    response::D_DATA.insert(words, u64::from(rsp.data));
    response::D_USER.insert(words, u64::from(rsp.user));
    response::D_ERROR.insert(words, u64::from(rsp.error));
    response::A_READY.insert(words, u64::from(rsp.a_ready));
}

/// Packs a response.
pub fn pack_response(rsp: &Response) -> ResponseWords {
    let mut words = ResponseWords::default();
    pack_response_into(rsp, &mut words);
    words
}

/// Unpacks a response.
pub fn unpack_response(words: &ResponseWords) -> Response {
    Response {
        valid: response::D_VALID.extract(words) != 0,
        opcode: response::D_OPCODE.extract(words) as u8,
        param: response::D_PARAM.extract(words) as u8,
        size: response::D_SIZE.extract(words) as u8,
        source: response::D_SOURCE.extract(words) as u8,
        sink: response::D_SINK.extract(words) != 0,
        data: response::D_DATA.extract(words) as u32,
        user: response::D_USER.extract(words) as u16,
        error: response::D_ERROR.extract(words) != 0,
        a_ready: response::A_READY.extract(words) != 0,
    }
}
