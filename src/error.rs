// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Error types for kurl
//!
//! Every failure maps onto one process exit status. Diagnostics are rendered
//! as `Error: {message}[: {cause}].` on the configured error sink.

use std::error::Error as StdError;
use std::path::Path;

use thiserror::Error;

/// Result type alias for kurl operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed cause carried by transport failures
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Main error type for kurl
#[derive(Error, Debug)]
pub enum Error {
    /// Conflicting or malformed command-line input
    #[error("{0}")]
    InvalidArguments(String),

    /// Target URL could not be parsed
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// An `@file` reference (or any other input file) could not be read
    #[error("cannot read file '{path}'")]
    CannotReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// An output file or the cookie jar could not be written
    #[error("cannot write file '{path}'")]
    CannotWriteFile {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Transport failure: DNS, connect, handshake, or a broken redirect chain
    #[error("no response from {url}")]
    NoResponse {
        url: String,
        #[source]
        source: BoxError,
    },

    /// Final response status was 400 or above
    #[error("the requested URL {url} returned error: {status}")]
    StatusCodeFailure { url: String, status: u16 },

    /// Certificate or TLS client setup failure
    #[error("SSL system failure: {0}")]
    SslSystemFailure(String),

    /// Writing to standard output failed
    #[error("cannot write to stdout")]
    CannotWriteToStdout(#[source] std::io::Error),
}

/// Process exit status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    InvalidArguments,
    InvalidUrl,
    CannotReadFile,
    CannotWriteFile,
    NoResponse,
    StatusCodeFailure,
    SslSystemFailure,
    CannotWriteToStdout,
}

impl ExitStatus {
    /// Numeric process exit code, following the reference client
    pub fn code(self) -> u8 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::InvalidArguments => 2,
            ExitStatus::InvalidUrl => 3,
            ExitStatus::NoResponse => 7,
            ExitStatus::StatusCodeFailure => 22,
            ExitStatus::CannotWriteFile => 23,
            ExitStatus::CannotWriteToStdout => 23,
            ExitStatus::CannotReadFile => 26,
            ExitStatus::SslSystemFailure => 77,
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitStatus::Success
    }
}

impl Error {
    /// Create an invalid-arguments error
    pub fn invalid_args<S: Into<String>>(msg: S) -> Self {
        Error::InvalidArguments(msg.into())
    }

    /// Create an invalid-URL error
    pub fn invalid_url(url: impl Into<String>, reason: impl ToString) -> Self {
        Error::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a transport error
    pub fn no_response(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Error::NoResponse {
            url: url.into(),
            source: source.into(),
        }
    }

    /// Create an SSL setup error
    pub fn ssl<S: Into<String>>(msg: S) -> Self {
        Error::SslSystemFailure(msg.into())
    }

    /// Exit status this error maps to
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Error::InvalidArguments(_) => ExitStatus::InvalidArguments,
            Error::InvalidUrl { .. } => ExitStatus::InvalidUrl,
            Error::CannotReadFile { .. } => ExitStatus::CannotReadFile,
            Error::CannotWriteFile { .. } => ExitStatus::CannotWriteFile,
            Error::NoResponse { .. } => ExitStatus::NoResponse,
            Error::StatusCodeFailure { .. } => ExitStatus::StatusCodeFailure,
            Error::SslSystemFailure(_) => ExitStatus::SslSystemFailure,
            Error::CannotWriteToStdout(_) => ExitStatus::CannotWriteToStdout,
        }
    }

    /// Check if this is a soft (HTTP status) failure
    pub fn is_soft(&self) -> bool {
        matches!(self, Error::StatusCodeFailure { .. })
    }

    /// Check if this error must abort the run without going through the
    /// error reporter
    pub fn is_fatal_output(&self) -> bool {
        matches!(self, Error::CannotWriteToStdout(_))
    }

    /// Render the diagnostic line written to the error sink
    pub fn diagnostic(&self) -> String {
        match self.source() {
            Some(cause) => format!("Error: {}: {}.", self, cause),
            None => format!("Error: {}.", self),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        let url = e.url().map(|u| u.to_string()).unwrap_or_default();
        Error::no_response(url, e)
    }
}

impl From<url::ParseError> for Error {
    fn from(e: url::ParseError) -> Self {
        Error::invalid_url("", e)
    }
}

/// Helper trait for attaching file paths to I/O errors
pub trait IoContext<T> {
    /// Map a read failure to `CannotReadFile`
    fn reading(self, path: impl AsRef<Path>) -> Result<T>;

    /// Map a write failure to `CannotWriteFile`
    fn writing(self, path: impl AsRef<Path>) -> Result<T>;
}

impl<T> IoContext<T> for std::io::Result<T> {
    fn reading(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::CannotReadFile {
            path: path.as_ref().display().to_string(),
            source,
        })
    }

    fn writing(self, path: impl AsRef<Path>) -> Result<T> {
        self.map_err(|source| Error::CannotWriteFile {
            path: path.as_ref().display().to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_diagnostic_without_cause() {
        let err = Error::invalid_args("only one of --data, --form, --upload-file, --head may be used");
        assert_eq!(
            err.diagnostic(),
            "Error: only one of --data, --form, --upload-file, --head may be used."
        );
        assert_eq!(err.exit_status(), ExitStatus::InvalidArguments);
    }

    #[test]
    fn test_diagnostic_with_cause() {
        let err: Result<()> = Err(io::Error::new(io::ErrorKind::NotFound, "no such file"))
            .reading("/tmp/missing.txt");
        let err = err.unwrap_err();

        assert_eq!(
            err.diagnostic(),
            "Error: cannot read file '/tmp/missing.txt': no such file."
        );
        assert_eq!(err.exit_status().code(), 26);
    }

    #[test]
    fn test_no_response_carries_cause() {
        let err = Error::no_response("http://example.invalid/", "dns lookup failed");
        assert_eq!(err.exit_status(), ExitStatus::NoResponse);
        assert!(err.diagnostic().ends_with(": dns lookup failed."));
    }

    #[test]
    fn test_status_failure_is_soft() {
        let err = Error::StatusCodeFailure {
            url: "http://example.com/".into(),
            status: 404,
        };
        assert!(err.is_soft());
        assert_eq!(err.exit_status().code(), 22);
        assert!(!Error::ssl("bad pem").is_soft());
    }

    #[test]
    fn test_stdout_failure_is_fatal() {
        let err = Error::CannotWriteToStdout(io::Error::new(io::ErrorKind::BrokenPipe, "pipe"));
        assert!(err.is_fatal_output());
        assert_eq!(err.exit_status(), ExitStatus::CannotWriteToStdout);
    }
}
