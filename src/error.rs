//! Error types for cnclink
//!
//! Provides a unified error type for all operations.

use std::fmt;

use thiserror::Error;

use crate::network::SessionState;

/// Result type alias using CncError
pub type Result<T> = std::result::Result<T, CncError>;

/// Unified error type for cnclink operations
#[derive(Debug, Error)]
pub enum CncError {
    // -------------------------------------------------------------------------
    // Codec Errors
    // -------------------------------------------------------------------------
    #[error("Encoding error: {0}")]
    Encoding(String),

    #[error("Framing error: {0}")]
    Framing(String),

    // -------------------------------------------------------------------------
    // Transport Errors
    // -------------------------------------------------------------------------
    #[error("Connection error: {0}")]
    Connection(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Protocol Errors (reported by, or inconsistent with, the controller)
    // -------------------------------------------------------------------------
    #[error("Protocol error: function 0x{function_code:04x} failed with {return_code}")]
    ReturnCode {
        function_code: u16,
        return_code: ReturnCode,
    },

    #[error("Protocol error: response id {actual} does not match request id {expected}")]
    MismatchedId { expected: u16, actual: u16 },

    #[error(
        "Protocol error: function 0x{function_code:04x} payload too short \
         (need {needed} bytes, got {actual})"
    )]
    ShortPayload {
        function_code: u16,
        needed: usize,
        actual: usize,
    },

    #[error("Protocol error: controller issued an invalid session handle")]
    InvalidHandle,

    // -------------------------------------------------------------------------
    // Session Errors
    // -------------------------------------------------------------------------
    #[error("Session is closed")]
    SessionClosed,

    #[error("Cannot {operation} while session is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    #[error("Fallback chain has no attempts")]
    EmptyFallbackChain,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl CncError {
    /// True for errors the controller reported or caused at the protocol level.
    /// The session stays usable after these.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            CncError::ReturnCode { .. }
                | CncError::MismatchedId { .. }
                | CncError::ShortPayload { .. }
                | CncError::InvalidHandle
        )
    }

    /// True for TCP-level failures. The session is closed after these.
    pub fn is_connection(&self) -> bool {
        matches!(self, CncError::Connection(_))
    }

    /// True for local caller mistakes: a session in the wrong state, or an
    /// empty fallback chain.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            CncError::SessionClosed | CncError::InvalidState { .. } | CncError::EmptyFallbackChain
        )
    }

    /// The controller's return code, if this error carries one
    pub fn return_code(&self) -> Option<ReturnCode> {
        match self {
            CncError::ReturnCode { return_code, .. } => Some(*return_code),
            _ => None,
        }
    }
}

// =============================================================================
// Return Codes
// =============================================================================

/// Status value carried in the last header field of every response.
///
/// `0` is success. The controller reports its negative status values as
/// two's complement, so `0xFFFF` is "busy" and `0xFFF8` is "bad handle".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReturnCode(pub u16);

impl ReturnCode {
    pub const OK: ReturnCode = ReturnCode(0);

    pub fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Short description of well-known status values
    pub fn describe(self) -> &'static str {
        match self.0 as i16 {
            0 => "ok",
            -1 => "controller busy",
            -2 => "reset or stop requested",
            -8 => "invalid session handle",
            -16 => "socket error",
            -17 => "protocol error",
            1 => "function not executable",
            2 => "invalid data length",
            3 => "invalid data number",
            4 => "invalid data attribute",
            5 => "invalid data",
            6 => "option not installed",
            7 => "write protected",
            8 => "memory overflow",
            9 => "invalid parameter",
            10 => "buffer empty or full",
            11 => "invalid path",
            12 => "wrong mode",
            13 => "execution rejected",
            15 => "alarm state",
            16 => "controller stopped",
            17 => "data protected by password",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "return code {} ({})", self.0 as i16, self.describe())
    }
}

impl From<u16> for ReturnCode {
    fn from(value: u16) -> Self {
        ReturnCode(value)
    }
}
