//! Packet header
//!
//! The fixed 14-byte header shared by requests and responses.

use bytes::{Buf, BufMut};

use crate::error::{CncError, Result};

/// Header size: total_length (4) + request_id (2) + function_code (2)
/// + handle (2) + return_code (2)
pub const HEADER_SIZE: usize = 14;

/// Decoded header fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PacketHeader {
    /// Header + payload byte count
    pub total_length: u32,

    /// Caller-assigned correlation tag, echoed by the controller
    pub request_id: u16,

    /// Remote operation selector
    pub function_code: u16,

    /// Session handle (0 before the session is opened)
    pub handle: u16,

    /// Return code in responses; always 0 in requests
    pub return_code: u16,
}

impl PacketHeader {
    /// Append the header to `buf` in wire order
    pub fn encode_into<B: BufMut>(&self, buf: &mut B) {
        buf.put_u32_le(self.total_length);
        buf.put_u16_le(self.request_id);
        buf.put_u16_le(self.function_code);
        buf.put_u16_le(self.handle);
        buf.put_u16_le(self.return_code);
    }

    /// Parse a header from the first 14 bytes of `bytes`
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(CncError::Framing(format!(
                "Incomplete header: expected {} bytes, got {}",
                HEADER_SIZE,
                bytes.len()
            )));
        }

        let mut buf = &bytes[..HEADER_SIZE];
        Ok(Self {
            total_length: buf.get_u32_le(),
            request_id: buf.get_u16_le(),
            function_code: buf.get_u16_le(),
            handle: buf.get_u16_le(),
            return_code: buf.get_u16_le(),
        })
    }

    /// Payload byte count implied by `total_length`
    pub fn payload_len(&self) -> usize {
        (self.total_length as usize).saturating_sub(HEADER_SIZE)
    }
}
