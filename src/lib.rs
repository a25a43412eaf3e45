//! # cnclink
//!
//! A client for the binary request/response protocol spoken by CNC machine
//! tool controllers over TCP:
//! - Fixed 14-byte little-endian header with length-prefixed framing
//! - Session handshake yielding a handle used by every later request
//! - Typed queries decoding domain values (e.g. spindle load)
//! - Numeric return codes surfaced as errors, never swallowed
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                         Caller                              │
//! │              (optional FallbackChain policy)                │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ query / request
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Session                              │
//! │        (state machine, handle, request ids, mutex)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  Protocol   │          │ Connection  │
//!   │   (codec)   │          │ (TcpStream) │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use cnclink::{Config, Session};
//!
//! let config = Config::builder().host("192.168.2.110").build();
//! let session = Session::open(config)?;
//! let load = session.read_spindle_load(0)?;
//! println!("Spindle load: {}%", load);
//! session.close();
//! # Ok::<(), cnclink::CncError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod fallback;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CncError, Result, ReturnCode};
pub use config::Config;
pub use network::{Session, SessionState};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of cnclink
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
