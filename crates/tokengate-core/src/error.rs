//! Shared error type across tokengate crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Invalid input / malformed configuration.
    BadRequest,
    /// Missing or unknown token.
    Unauthorized,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::Unauthorized => "UNAUTHORIZED",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, TokenGateError>;

/// Unified error type used by core and gateway.
///
/// The backing-file and watch variants never cross the authorization
/// boundary; the store resolves them locally and keeps serving.
#[derive(Debug, Error)]
pub enum TokenGateError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("unauthorized")]
    Unauthorized,
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("token list io: {0}")]
    BackingFileIo(String),
    #[error("token list parse: {0}")]
    BackingFileParse(String),
    #[error("watch provider: {0}")]
    WatchProvider(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl TokenGateError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            TokenGateError::BadRequest(_) => ClientCode::BadRequest,
            TokenGateError::Unauthorized => ClientCode::Unauthorized,
            TokenGateError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            TokenGateError::BackingFileIo(_)
            | TokenGateError::BackingFileParse(_)
            | TokenGateError::WatchProvider(_)
            | TokenGateError::Internal(_) => ClientCode::Internal,
        }
    }
}
