//! Controller Session
//!
//! Binds one TCP connection to one session handle and sequences requests
//! against it.
//!
//! ## State Machine
//!
//! ```text
//!   Unbound ──connect──▶ Connected ──handshake──▶ Bound ──request──▶ Bound
//!      │                     │                      │
//!      └─────────────────────┴────────close─────────┴──────────▶ Closed
//! ```
//!
//! - A nonzero return code never changes state.
//! - A transport or framing failure always moves to `Closed`.
//! - There is no way back from `Closed`; open a new session instead.

use std::fmt;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::config::Config;
use crate::error::{CncError, Result};
use crate::protocol::function::{OpenSession, Query, RawQuery, SpindleLoad};
use crate::protocol::{Request, Response};
use super::connection::Connection;

/// Lifecycle state of a [`Session`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No connection yet
    Unbound,

    /// TCP established, no handle yet
    Connected,

    /// Handshake succeeded
    Bound { handle: u16 },

    /// Connection torn down, handle invalid
    Closed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Unbound => f.write_str("unbound"),
            SessionState::Connected => f.write_str("connected"),
            SessionState::Bound { handle } => write!(f, "bound (handle {})", handle),
            SessionState::Closed => f.write_str("closed"),
        }
    }
}

/// A session with one controller
///
/// ## Concurrency Model
///
/// The protocol does not pipeline, so each send-then-receive runs under a
/// single mutex. A `Session` can be shared between threads through an `Arc`;
/// callers simply take turns on the wire.
#[derive(Debug)]
pub struct Session {
    /// Session configuration
    config: Config,

    /// State, connection and id counter, guarded together
    inner: Mutex<Inner>,
}

#[derive(Debug)]
struct Inner {
    state: SessionState,

    /// Present in `Connected` and `Bound` only
    connection: Option<Connection>,

    /// Next request id to hand out (never 0)
    next_request_id: u16,
}

impl Inner {
    fn take_request_id(&mut self) -> u16 {
        let id = self.next_request_id;
        self.next_request_id = self.next_request_id.checked_add(1).unwrap_or(1);
        id
    }

    /// Drop the connection and move to `Closed`
    ///
    /// Returns false if there was nothing to tear down.
    fn teardown(&mut self) -> bool {
        self.state = SessionState::Closed;
        match self.connection.take() {
            Some(connection) => {
                connection.shutdown();
                true
            }
            None => false,
        }
    }
}

impl Session {
    /// Create an unbound session
    pub fn new(config: Config) -> Self {
        Self {
            config,
            inner: Mutex::new(Inner {
                state: SessionState::Unbound,
                connection: None,
                next_request_id: 1,
            }),
        }
    }

    /// Connect and handshake in one step
    ///
    /// The connection is released if the handshake fails.
    pub fn open(config: Config) -> Result<Self> {
        let session = Self::new(config);
        session.connect()?;
        if let Err(e) = session.handshake() {
            session.close();
            return Err(e);
        }
        Ok(session)
    }

    /// Open the TCP connection (`Unbound` → `Connected`)
    ///
    /// On failure the session stays `Unbound` and may be retried.
    pub fn connect(&self) -> Result<()> {
        let mut inner = self.inner.lock();
        match inner.state {
            SessionState::Unbound => {}
            SessionState::Closed => return Err(CncError::SessionClosed),
            state => {
                return Err(CncError::InvalidState {
                    operation: "connect",
                    state,
                })
            }
        }

        tracing::debug!("Connecting to controller at {}", self.config.addr());
        let connection = Connection::open(&self.config)?;
        tracing::debug!("Connected to {}", connection.peer_addr());

        inner.connection = Some(connection);
        inner.state = SessionState::Connected;
        Ok(())
    }

    /// Open the session with the configured handshake payload
    pub fn handshake(&self) -> Result<u16> {
        self.handshake_with(self.config.handshake_payload.clone())
    }

    /// Open the session (`Connected` → `Bound`) and return the new handle
    ///
    /// A nonzero return code, or a payload that does not carry a valid
    /// handle, leaves the session `Connected`.
    pub fn handshake_with(&self, payload: impl Into<Bytes>) -> Result<u16> {
        let mut inner = self.inner.lock();
        match inner.state {
            SessionState::Connected => {}
            SessionState::Closed => return Err(CncError::SessionClosed),
            state => {
                return Err(CncError::InvalidState {
                    operation: "handshake",
                    state,
                })
            }
        }

        let query = OpenSession::new(payload);
        let request = Request::new(query.function_code(), 0, query.payload());
        let request_id = inner.take_request_id();

        let response = self.exchange(&mut inner, request_id, &request)?;
        let handle = query.decode(&response.check()?)?;

        tracing::debug!("Session opened with handle {}", handle);
        inner.state = SessionState::Bound { handle };
        Ok(handle)
    }

    /// Send `function_code` with a raw payload; returns the response payload
    pub fn request(&self, function_code: u16, payload: impl Into<Bytes>) -> Result<Bytes> {
        self.query(&RawQuery::new(function_code, payload))
    }

    /// Like [`Session::request`], with a caller-chosen request id
    pub fn request_with_id(
        &self,
        request_id: u16,
        function_code: u16,
        payload: impl Into<Bytes>,
    ) -> Result<Bytes> {
        let query = RawQuery::new(function_code, payload);
        let mut inner = self.inner.lock();
        self.run_query(&mut inner, request_id, &query)
    }

    /// Send a typed query and decode its domain value
    ///
    /// A nonzero return code fails with `ReturnCode` and keeps the session
    /// `Bound`.
    pub fn query<Q: Query>(&self, query: &Q) -> Result<Q::Output> {
        let mut inner = self.inner.lock();
        let request_id = inner.take_request_id();
        self.run_query(&mut inner, request_id, query)
    }

    /// Read the load meter of `spindle`, in percent
    pub fn read_spindle_load(&self, spindle: u16) -> Result<u16> {
        self.query(&SpindleLoad::new(spindle))
    }

    /// Close the connection; safe to call any number of times
    ///
    /// Returns true only for the call that actually tore the socket down.
    pub fn close(&self) -> bool {
        let mut inner = self.inner.lock();
        let closed = inner.teardown();
        if closed {
            tracing::debug!("Session closed");
        }
        closed
    }

    /// Current lifecycle state
    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Session handle, while bound
    pub fn handle(&self) -> Option<u16> {
        match self.inner.lock().state {
            SessionState::Bound { handle } => Some(handle),
            _ => None,
        }
    }

    /// Get the session configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    fn run_query<Q: Query>(&self, inner: &mut Inner, request_id: u16, query: &Q) -> Result<Q::Output> {
        let handle = match inner.state {
            SessionState::Bound { handle } => handle,
            SessionState::Closed => return Err(CncError::SessionClosed),
            state => {
                return Err(CncError::InvalidState {
                    operation: "send request",
                    state,
                })
            }
        };

        let request = Request::new(query.function_code(), handle, query.payload());
        let response = self.exchange(inner, request_id, &request)?;
        query.decode(&response.check()?)
    }

    /// One send-then-receive on the wire, with correlation checking
    fn exchange(&self, inner: &mut Inner, request_id: u16, request: &Request) -> Result<Response> {
        let connection = inner.connection.as_mut().ok_or(CncError::SessionClosed)?;

        let response = match connection.round_trip(request_id, request) {
            Ok(response) => response,
            Err(e @ (CncError::Connection(_) | CncError::Framing(_))) => {
                tracing::warn!("Closing session after transport failure: {}", e);
                inner.teardown();
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        if self.config.strict_request_id && response.request_id() != request_id {
            return Err(CncError::MismatchedId {
                expected: request_id,
                actual: response.request_id(),
            });
        }

        Ok(response)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.inner.get_mut().teardown();
    }
}
