//! Request and response values
//!
//! Both are transient: a request is dropped once encoded, a response once
//! its payload has been interpreted.

use bytes::Bytes;

use crate::error::{CncError, Result, ReturnCode};
use super::header::PacketHeader;

/// An outgoing request, minus its correlation id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Remote operation selector
    pub function_code: u16,

    /// Session handle (0 for the session-open request)
    pub handle: u16,

    /// Function-specific payload, sent verbatim
    pub payload: Bytes,
}

impl Request {
    pub fn new(function_code: u16, handle: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            function_code,
            handle,
            payload: payload.into(),
        }
    }

    /// Encode with the given request id
    pub fn encode(&self, request_id: u16) -> Result<Vec<u8>> {
        super::codec::encode_request(request_id, self.function_code, self.handle, &self.payload)
    }
}

/// A decoded response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    /// Header fields as received
    pub header: PacketHeader,

    /// Exactly `total_length - 14` bytes
    pub payload: Bytes,
}

impl Response {
    pub fn request_id(&self) -> u16 {
        self.header.request_id
    }

    pub fn function_code(&self) -> u16 {
        self.header.function_code
    }

    pub fn handle(&self) -> u16 {
        self.header.handle
    }

    pub fn return_code(&self) -> ReturnCode {
        ReturnCode(self.header.return_code)
    }

    /// True when the controller reported success
    pub fn is_ok(&self) -> bool {
        self.return_code().is_ok()
    }

    /// Yield the payload on success, or the return code as an error
    pub fn check(self) -> Result<Bytes> {
        if self.is_ok() {
            Ok(self.payload)
        } else {
            Err(CncError::ReturnCode {
                function_code: self.header.function_code,
                return_code: self.return_code(),
            })
        }
    }
}
