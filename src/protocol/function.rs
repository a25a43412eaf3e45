//! Function codes and typed queries
//!
//! A [`Query`] ties a function code to the shape of its request payload and
//! to the location of the domain value inside a successful response. The
//! codec never looks inside payloads; this is the only place that does.

use bytes::Bytes;

use crate::error::{CncError, Result};

/// Open a session and obtain a handle
pub const OPEN_SESSION: u16 = 0x0101;

/// Read the load meter of one spindle
pub const READ_SPINDLE_METER: u16 = 0x0124;

/// Offset of the session handle in the OPEN_SESSION response payload
pub const HANDLE_OFFSET: usize = 0;

/// Offset of the load percentage in the READ_SPINDLE_METER response payload
pub const SPINDLE_LOAD_OFFSET: usize = 0;

/// A typed request/response pair for one function code
pub trait Query {
    /// Decoded domain value
    type Output;

    /// Function code this query is sent with
    fn function_code(&self) -> u16;

    /// Request payload
    fn payload(&self) -> Bytes;

    /// Extract the domain value from a successful response payload
    fn decode(&self, payload: &[u8]) -> Result<Self::Output>;
}

/// Read a little-endian u16 at `offset`, failing if the payload is too short
pub fn read_u16_le(payload: &[u8], offset: usize, function_code: u16) -> Result<u16> {
    let end = offset.saturating_add(2);
    match payload.get(offset..end) {
        Some(bytes) => Ok(u16::from_le_bytes([bytes[0], bytes[1]])),
        None => Err(CncError::ShortPayload {
            function_code,
            needed: end,
            actual: payload.len(),
        }),
    }
}

// =============================================================================
// Queries
// =============================================================================

/// Session-open handshake
///
/// The request payload is opaque; the response carries the new handle.
#[derive(Debug, Clone)]
pub struct OpenSession {
    payload: Bytes,
}

impl OpenSession {
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

impl Query for OpenSession {
    type Output = u16;

    fn function_code(&self) -> u16 {
        OPEN_SESSION
    }

    fn payload(&self) -> Bytes {
        self.payload.clone()
    }

    fn decode(&self, payload: &[u8]) -> Result<u16> {
        let handle = read_u16_le(payload, HANDLE_OFFSET, OPEN_SESSION)?;
        if handle == 0 {
            return Err(CncError::InvalidHandle);
        }
        Ok(handle)
    }
}

/// Spindle load meter, in percent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpindleLoad {
    /// Spindle index, 0 is the main spindle
    pub spindle: u16,
}

impl SpindleLoad {
    pub fn new(spindle: u16) -> Self {
        Self { spindle }
    }
}

impl Query for SpindleLoad {
    type Output = u16;

    fn function_code(&self) -> u16 {
        READ_SPINDLE_METER
    }

    fn payload(&self) -> Bytes {
        Bytes::copy_from_slice(&self.spindle.to_le_bytes())
    }

    fn decode(&self, payload: &[u8]) -> Result<u16> {
        read_u16_le(payload, SPINDLE_LOAD_OFFSET, READ_SPINDLE_METER)
    }
}

/// Any function code with a caller-shaped payload; yields the raw payload
#[derive(Debug, Clone)]
pub struct RawQuery {
    pub function_code: u16,
    pub payload: Bytes,
}

impl RawQuery {
    pub fn new(function_code: u16, payload: impl Into<Bytes>) -> Self {
        Self {
            function_code,
            payload: payload.into(),
        }
    }
}

impl Query for RawQuery {
    type Output = Bytes;

    fn function_code(&self) -> u16 {
        self.function_code
    }

    fn payload(&self) -> Bytes {
        self.payload.clone()
    }

    fn decode(&self, payload: &[u8]) -> Result<Bytes> {
        Ok(Bytes::copy_from_slice(payload))
    }
}
