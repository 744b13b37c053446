//! Result and error types for Reunir.

use crate::fixture::Role;
use thiserror::Error;

/// Result type for Reunir operations
pub type ReunirResult<T> = Result<T, ReunirError>;

/// Errors that can occur in Reunir
///
/// Every variant propagates straight to the running scenario. The harness
/// never retries on its own; flakiness mitigation lives entirely inside the
/// bounded polling loop in [`crate::wait`].
#[derive(Debug, Error)]
pub enum ReunirError {
    /// Session creation or initial navigation failed
    #[error("failed to start session for {role}: {message} (url: {url})")]
    SessionStart {
        /// Participant role that failed to start
        role: Role,
        /// Meeting URL the session was navigating to
        url: String,
        /// Underlying driver message
        message: String,
    },

    /// No active session for the requested role
    #[error("no active session for {role}")]
    SessionNotFound {
        /// Participant role that was requested
        role: Role,
    },

    /// Action target missing from the DOM
    #[error("element not found: {selector}")]
    ElementNotFound {
        /// Selector that matched nothing
        selector: String,
    },

    /// A polled condition was not met within its bound
    #[error(
        "condition on `{selector}` not met within {timeout_ms}ms \
         (last observed displayed: {last_displayed})"
    )]
    WaitTimeout {
        /// Selector the wait was polling
        selector: String,
        /// Timeout bound in milliseconds
        timeout_ms: u64,
        /// Displayed state seen on the final poll
        last_displayed: bool,
    },

    /// Transport-level driver fault (CDP connection, JS evaluation, ...)
    #[error("driver error: {message}")]
    Driver {
        /// Underlying error message
        message: String,
    },
}
