//! Caller-side fallback between alternate reads
//!
//! The session never retries on its own. When a value can be read more than
//! one way (another function code, another spindle, another controller), the
//! caller composes the attempts here.
//!
//! Only protocol and connection failures fall through to the next attempt.
//! Precondition, encoding and framing errors point at a bug or a broken
//! stream and are returned immediately.

use crate::error::{CncError, Result};

/// Whether a failed attempt should hand over to the next one
pub fn should_fall_back(error: &CncError) -> bool {
    error.is_protocol() || error.is_connection()
}

/// Run `primary`; on a recoverable failure run `secondary` with that error
pub fn with_fallback<T, P, S>(primary: P, secondary: S) -> Result<T>
where
    P: FnOnce() -> Result<T>,
    S: FnOnce(&CncError) -> Result<T>,
{
    match primary() {
        Ok(value) => Ok(value),
        Err(e) if should_fall_back(&e) => {
            tracing::info!("Primary read failed ({}), trying fallback", e);
            secondary(&e)
        }
        Err(e) => Err(e),
    }
}

type Attempt<'a, T> = Box<dyn FnOnce() -> Result<T> + 'a>;

/// An ordered list of labelled attempts, tried until one succeeds
///
/// ```no_run
/// use cnclink::fallback::FallbackChain;
/// use cnclink::{Config, Session};
///
/// let session = Session::open(Config::default())?;
/// let load = FallbackChain::new()
///     .then("main spindle", || session.read_spindle_load(0))
///     .then("sub spindle", || session.read_spindle_load(1))
///     .run()?;
/// # Ok::<(), cnclink::CncError>(())
/// ```
pub struct FallbackChain<'a, T> {
    attempts: Vec<(&'static str, Attempt<'a, T>)>,
}

impl<'a, T> FallbackChain<'a, T> {
    pub fn new() -> Self {
        Self {
            attempts: Vec::new(),
        }
    }

    /// Append an attempt
    pub fn then<F>(mut self, label: &'static str, attempt: F) -> Self
    where
        F: FnOnce() -> Result<T> + 'a,
    {
        self.attempts.push((label, Box::new(attempt)));
        self
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    /// Try each attempt in order
    ///
    /// Returns the first success, the first non-recoverable error, or the
    /// last recoverable error if every attempt failed. An empty chain fails
    /// with `EmptyFallbackChain`.
    pub fn run(self) -> Result<T> {
        let mut last_err = None;

        for (label, attempt) in self.attempts {
            match attempt() {
                Ok(value) => {
                    tracing::debug!("Read succeeded via {}", label);
                    return Ok(value);
                }
                Err(e) if should_fall_back(&e) => {
                    tracing::info!("Read via {} failed: {}", label, e);
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or(CncError::EmptyFallbackChain))
    }
}

impl<'a, T> Default for FallbackChain<'a, T> {
    fn default() -> Self {
        Self::new()
    }
}
