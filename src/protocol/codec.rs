//! Protocol codec
//!
//! Encoding and decoding functions for the wire protocol.
//!
//! ## Wire Format
//!
//! ### Request Format
//! ```text
//! ┌──────────────┬──────────┬──────────┬──────────┬──────────┬───────────┐
//! │ TotalLen (4) │ ReqId(2) │ Func (2) │Handle (2)│ 0x0000(2)│  Payload  │
//! └──────────────┴──────────┴──────────┴──────────┴──────────┴───────────┘
//! ```
//!
//! ### Response Format
//! ```text
//! ┌──────────────┬──────────┬──────────┬──────────┬──────────┬───────────┐
//! │ TotalLen (4) │ ReqId(2) │ Func (2) │Handle (2)│ RetCode  │  Payload  │
//! └──────────────┴──────────┴──────────┴──────────┴──────────┴───────────┘
//! ```
//!
//! Stream reassembly is not done here: `decode_response` reads one packet
//! from the front of a slice and ignores anything after `total_length`.

use std::io::Write;

use bytes::Bytes;

use crate::error::{CncError, Result};
use super::header::{PacketHeader, HEADER_SIZE};
use super::packet::{Request, Response};

// =============================================================================
// Encoding
// =============================================================================

/// `total_length` for a payload of `payload_len` bytes, if it fits in a u32
pub fn checked_total_length(payload_len: usize) -> Result<u32> {
    HEADER_SIZE
        .checked_add(payload_len)
        .and_then(|total| u32::try_from(total).ok())
        .ok_or_else(|| {
            CncError::Encoding(format!(
                "Payload too large: {} bytes does not fit a 32-bit total length",
                payload_len
            ))
        })
}

/// Encode a request to bytes
///
/// Format: header (14, reserved field zeroed) + payload
pub fn encode_request(
    request_id: u16,
    function_code: u16,
    handle: u16,
    payload: &[u8],
) -> Result<Vec<u8>> {
    encode_packet(request_id, function_code, handle, 0, payload)
}

/// Encode a response to bytes
///
/// Used by controller simulators and test fixtures.
pub fn encode_response(
    request_id: u16,
    function_code: u16,
    handle: u16,
    return_code: u16,
    payload: &[u8],
) -> Result<Vec<u8>> {
    encode_packet(request_id, function_code, handle, return_code, payload)
}

fn encode_packet(
    request_id: u16,
    function_code: u16,
    handle: u16,
    return_code: u16,
    payload: &[u8],
) -> Result<Vec<u8>> {
    let header = PacketHeader {
        total_length: checked_total_length(payload.len())?,
        request_id,
        function_code,
        handle,
        return_code,
    };

    let mut message = Vec::with_capacity(HEADER_SIZE + payload.len());
    header.encode_into(&mut message);
    message.extend_from_slice(payload);

    Ok(message)
}

// =============================================================================
// Decoding
// =============================================================================

/// Peek the declared length of the packet at the front of `bytes`
///
/// Returns `None` until a full header is available. A declared length
/// smaller than the header itself means the stream is desynchronized.
pub fn frame_length(bytes: &[u8]) -> Result<Option<usize>> {
    if bytes.len() < HEADER_SIZE {
        return Ok(None);
    }

    let total_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
    if total_len < HEADER_SIZE {
        return Err(CncError::Framing(format!(
            "Declared length {} is shorter than the {}-byte header",
            total_len, HEADER_SIZE
        )));
    }

    Ok(Some(total_len))
}

/// Decode a response from bytes
///
/// Bytes past `total_length` belong to the next packet and are left alone.
pub fn decode_response(bytes: &[u8]) -> Result<Response> {
    let header = PacketHeader::decode(bytes)?;

    let total_len = header.total_length as usize;
    if total_len < HEADER_SIZE {
        return Err(CncError::Framing(format!(
            "Declared length {} is shorter than the {}-byte header",
            total_len, HEADER_SIZE
        )));
    }

    if bytes.len() < total_len {
        return Err(CncError::Framing(format!(
            "Incomplete payload: expected {} bytes, got {}",
            total_len,
            bytes.len()
        )));
    }

    let payload = Bytes::copy_from_slice(&bytes[HEADER_SIZE..total_len]);

    Ok(Response { header, payload })
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Write a request to a stream
pub fn write_request<W: Write>(writer: &mut W, request_id: u16, request: &Request) -> Result<()> {
    let bytes = request.encode(request_id)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}
