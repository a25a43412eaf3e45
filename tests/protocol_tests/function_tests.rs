//! Function Tests
//!
//! Tests for typed queries, payload decoding and return codes.

use cnclink::protocol::function::{
    read_u16_le, OpenSession, Query, RawQuery, SpindleLoad, OPEN_SESSION, READ_SPINDLE_METER,
};
use cnclink::{CncError, ReturnCode, SessionState};

// =============================================================================
// Payload Field Tests
// =============================================================================

#[test]
fn test_read_u16_le() {
    let payload = [0x2A, 0x00, 0x34, 0x12];
    assert_eq!(read_u16_le(&payload, 0, READ_SPINDLE_METER).unwrap(), 42);
    assert_eq!(read_u16_le(&payload, 2, READ_SPINDLE_METER).unwrap(), 0x1234);
}

#[test]
fn test_read_u16_le_short_payload() {
    match read_u16_le(&[0x2A], 0, READ_SPINDLE_METER) {
        Err(CncError::ShortPayload {
            function_code,
            needed,
            actual,
        }) => {
            assert_eq!(function_code, READ_SPINDLE_METER);
            assert_eq!(needed, 2);
            assert_eq!(actual, 1);
        }
        other => panic!("Expected short payload error, got {:?}", other),
    }

    assert!(read_u16_le(&[1, 2, 3], 2, READ_SPINDLE_METER).is_err());
    assert!(read_u16_le(&[1, 2], usize::MAX, READ_SPINDLE_METER).is_err());
}

// =============================================================================
// Query Tests
// =============================================================================

#[test]
fn test_spindle_load_query() {
    let query = SpindleLoad::new(0);
    assert_eq!(query.function_code(), 0x0124);
    assert_eq!(&query.payload()[..], &[0x00, 0x00]);
    assert_eq!(query.decode(&[0x2A, 0x00]).unwrap(), 42);

    let sub = SpindleLoad::new(0x0102);
    assert_eq!(&sub.payload()[..], &[0x02, 0x01]);
}

#[test]
fn test_spindle_load_ignores_extra_payload() {
    let query = SpindleLoad::new(1);
    assert_eq!(query.decode(&[0x64, 0x00, 0xFF, 0xFF]).unwrap(), 100);
}

#[test]
fn test_spindle_load_empty_payload() {
    let err = SpindleLoad::new(0).decode(&[]).unwrap_err();
    assert!(err.is_protocol());
}

#[test]
fn test_open_session_query() {
    let query = OpenSession::new(vec![0u8; 16]);
    assert_eq!(query.function_code(), OPEN_SESSION);
    assert_eq!(query.payload().len(), 16);
    assert_eq!(query.decode(&[0x07, 0x00]).unwrap(), 7);
    assert_eq!(query.decode(&[0x01, 0x80, 0x00, 0x00]).unwrap(), 0x8001);
}

#[test]
fn test_open_session_rejects_missing_handle() {
    let query = OpenSession::new(Vec::<u8>::new());
    assert!(matches!(
        query.decode(&[0x07]),
        Err(CncError::ShortPayload { function_code: OPEN_SESSION, .. })
    ));
}

#[test]
fn test_open_session_rejects_zero_handle() {
    let query = OpenSession::new(Vec::<u8>::new());
    assert!(matches!(
        query.decode(&[0x00, 0x00]),
        Err(CncError::InvalidHandle)
    ));
}

#[test]
fn test_raw_query_returns_payload() {
    let query = RawQuery::new(0x0042, vec![0x01u8, 0x02]);
    assert_eq!(query.function_code(), 0x0042);
    assert_eq!(&query.payload()[..], &[0x01, 0x02]);
    assert_eq!(&query.decode(&[9, 8, 7]).unwrap()[..], &[9, 8, 7]);
}

// =============================================================================
// Return Code Tests
// =============================================================================

#[test]
fn test_return_code_describe() {
    assert!(ReturnCode::OK.is_ok());
    assert_eq!(ReturnCode(0).describe(), "ok");
    assert_eq!(ReturnCode(1).describe(), "function not executable");
    assert_eq!(ReturnCode(0xFFFF).describe(), "controller busy");
    assert_eq!(ReturnCode(0xFFF8).describe(), "invalid session handle");
    assert_eq!(ReturnCode(999).describe(), "unknown");
}

#[test]
fn test_return_code_display() {
    assert_eq!(
        ReturnCode(6).to_string(),
        "return code 6 (option not installed)"
    );
    assert_eq!(ReturnCode(0xFFFF).to_string(), "return code -1 (controller busy)");
}

// =============================================================================
// Error Classification Tests
// =============================================================================

#[test]
fn test_error_classification() {
    let protocol = CncError::ReturnCode {
        function_code: READ_SPINDLE_METER,
        return_code: ReturnCode(3),
    };
    assert!(protocol.is_protocol());
    assert!(!protocol.is_connection());
    assert_eq!(protocol.return_code(), Some(ReturnCode(3)));

    let mismatch = CncError::MismatchedId {
        expected: 2,
        actual: 3,
    };
    assert!(mismatch.is_protocol());
    assert_eq!(mismatch.return_code(), None);

    let io = CncError::from(std::io::Error::new(std::io::ErrorKind::TimedOut, "timeout"));
    assert!(io.is_connection());
    assert!(!io.is_protocol());

    assert!(CncError::SessionClosed.is_precondition());
    let state = CncError::InvalidState {
        operation: "send request",
        state: SessionState::Unbound,
    };
    assert!(state.is_precondition());
    assert_eq!(state.to_string(), "Cannot send request while session is unbound");

    assert!(!CncError::Framing("bad".to_string()).is_precondition());
    assert!(!CncError::Encoding("bad".to_string()).is_protocol());
}

#[test]
fn test_return_code_error_message() {
    let err = CncError::ReturnCode {
        function_code: 0x0124,
        return_code: ReturnCode(5),
    };
    assert_eq!(
        err.to_string(),
        "Protocol error: function 0x0124 failed with return code 5 (invalid data)"
    );
}
