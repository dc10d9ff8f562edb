//! Client-facing error type.

use skate_ffi::{DecodeError, ErrorKind, FfiError};
use thiserror::Error;

/// Failures surfaced to callers.
///
/// The four engine-side kinds map to distinct variants so calling code can
/// discriminate connection failures from logical command errors. Argument
/// validation fails locally with [`Error::InvalidArgument`] before anything
/// crosses the FFI boundary.
#[derive(Debug, Error)]
pub enum Error {
    /// The server rejected a command.
    #[error("server error: {0}")]
    Command(String),
    /// A transaction was aborted.
    #[error("transaction aborted: {0}")]
    ExecAbort(String),
    /// The request timed out inside the engine.
    #[error("request timed out: {0}")]
    Timeout(String),
    /// The connection to the server was lost.
    #[error("connection lost: {0}")]
    Disconnect(String),
    /// A locally detected argument problem.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A locally detected configuration problem.
    #[error("invalid configuration: {0}")]
    Config(String),
    /// The client handle was already released.
    #[error("client is closed")]
    ClosedClient,
    /// The server answered with a value kind the command never produces.
    #[error("unexpected response: expected {expected}, got {actual}")]
    UnexpectedResponse {
        expected: &'static str,
        actual: &'static str,
    },
    /// The engine reply was structurally invalid (ABI mismatch).
    #[error("malformed engine response: {0}")]
    Decode(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<FfiError> for Error {
    fn from(err: FfiError) -> Self {
        match err {
            FfiError::Engine { kind, message } => match kind {
                ErrorKind::ExecAbort => Error::ExecAbort(message),
                ErrorKind::Timeout => Error::Timeout(message),
                ErrorKind::Disconnect => Error::Disconnect(message),
                ErrorKind::Unspecified => Error::Command(message),
            },
            FfiError::Decode(err) => Error::Decode(err),
            FfiError::EmptyResult => Error::Command("engine returned an empty result".to_string()),
            FfiError::UnexpectedReply { expected, actual } => {
                Error::UnexpectedResponse { expected, actual }
            }
        }
    }
}

impl Error {
    /// True for failures of the connection itself rather than of a command.
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            Error::Timeout(_) | Error::Disconnect(_) | Error::ClosedClient
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_kinds_map_to_distinct_variants() {
        let cases = [
            (ErrorKind::Unspecified, "server error"),
            (ErrorKind::ExecAbort, "transaction aborted"),
            (ErrorKind::Timeout, "request timed out"),
            (ErrorKind::Disconnect, "connection lost"),
        ];
        for (kind, prefix) in cases {
            let err = Error::from(FfiError::Engine {
                kind,
                message: "boom".to_string(),
            });
            assert!(
                err.to_string().starts_with(prefix),
                "{kind:?} -> {err}, expected prefix {prefix:?}"
            );
        }
    }

    #[test]
    fn connection_errors_are_classified() {
        assert!(Error::Disconnect("gone".into()).is_connection_error());
        assert!(Error::ClosedClient.is_connection_error());
        assert!(!Error::Command("WRONGTYPE".into()).is_connection_error());
    }
}
