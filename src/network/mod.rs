//! Network Module
//!
//! TCP transport and the controller session.
//!
//! ## Architecture
//! - One `Connection` per session, exclusively owned
//! - Strictly half-duplex: one outstanding request at a time
//! - `Session` serializes callers behind a mutex

mod connection;
mod session;

pub use connection::Connection;
pub use session::{Session, SessionState};
