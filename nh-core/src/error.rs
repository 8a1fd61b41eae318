//! Global error types for the NoteHub backend.
//!
//! All error categories are unified into a single `NhError` enum with
//! conversions from underlying library errors. `ErrorKind` groups variants
//! so callers can decide between "fatal for this channel" and "degrade and
//! continue" without matching on message strings.

use thiserror::Error;

/// Convenience type alias for Results using NhError.
pub type NhResult<T> = Result<T, NhError>;

/// Unified error type covering all error categories in NoteHub.
#[derive(Error, Debug)]
pub enum NhError {
    // -- Configuration errors --
    /// Failed to load or parse the baked configuration file.
    #[error("configuration error: {0}")]
    Config(String),

    /// A required configuration value is missing.
    #[error("missing configuration: {0}")]
    MissingConfig(String),

    // -- Store errors --
    /// SQLite database error.
    #[error("database error: {0}")]
    Database(String),

    /// Database migration failed.
    #[error("migration error: {0}")]
    Migration(String),

    /// Database connection pool error.
    #[error("connection pool error: {0}")]
    Pool(String),

    /// A named sheet does not exist in the row store.
    #[error("sheet \"{0}\" not found")]
    SheetNotFound(String),

    /// A stored row could not be interpreted.
    #[error("malformed row in sheet {sheet}: {reason}")]
    MalformedRow {
        /// Sheet the row was read from.
        sheet: String,
        /// What was wrong with it.
        reason: String,
    },

    // -- Remote API errors --
    /// HTTP request failed.
    #[error("http error: {0}")]
    Http(String),

    /// HTTP request timed out.
    #[error("request timeout: {0}")]
    Timeout(String),

    /// The remote API answered with `ok: false`.
    #[error("{method} rejected: {error}")]
    ApiRejected {
        /// API method name, e.g. `conversations.history`.
        method: String,
        /// Error code reported by the API.
        error: String,
    },

    /// Authentication failed.
    #[error("authentication failed: {0}")]
    AuthFailed(String),

    // -- Domain errors --
    /// Article not found, or the caller is not its author.
    #[error("article not found or not permitted: {0}")]
    ArticleNotFound(String),

    /// Input rejected before touching any collaborator.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// File storage operation failed.
    #[error("file store error: {0}")]
    FileStore(String),

    // -- File/IO errors --
    /// File system operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    // -- Service errors --
    /// A service operation failed.
    #[error("service error: {0}")]
    Service(String),

    // -- Generic --
    /// An unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),

    /// Wrapping anyhow errors for interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Coarse classification of an [`NhError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Configuration was missing or unreadable.
    ConfigAbsent,
    /// The remote API answered but refused the request.
    ApiRejected,
    /// Network, timeout, or response decoding failure.
    Transport,
    /// The row store or file store failed.
    Store,
    /// Caller supplied bad input or lacks permission.
    Rejected,
    /// Anything else.
    Internal,
}

impl NhError {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) | Self::MissingConfig(_) => ErrorKind::ConfigAbsent,
            Self::ApiRejected { .. } | Self::AuthFailed(_) => ErrorKind::ApiRejected,
            Self::Http(_) | Self::Timeout(_) | Self::Serialization(_) => ErrorKind::Transport,
            Self::Database(_)
            | Self::Migration(_)
            | Self::Pool(_)
            | Self::SheetNotFound(_)
            | Self::MalformedRow { .. }
            | Self::FileStore(_)
            | Self::Io(_) => ErrorKind::Store,
            Self::ArticleNotFound(_) | Self::InvalidInput(_) => ErrorKind::Rejected,
            Self::Service(_) | Self::Internal(_) | Self::Other(_) => ErrorKind::Internal,
        }
    }

    /// Whether this error came from the remote API side (rejection or transport).
    pub fn is_remote(&self) -> bool {
        matches!(self.kind(), ErrorKind::ApiRejected | ErrorKind::Transport)
    }
}

impl From<serde_json::Error> for NhError {
    fn from(e: serde_json::Error) -> Self {
        NhError::Serialization(e.to_string())
    }
}

impl From<toml::de::Error> for NhError {
    fn from(e: toml::de::Error) -> Self {
        NhError::Config(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nh_error_display() {
        let err = NhError::Config("bad value".to_string());
        assert_eq!(err.to_string(), "configuration error: bad value");

        let err = NhError::ApiRejected {
            method: "conversations.history".into(),
            error: "channel_not_found".into(),
        };
        assert_eq!(err.to_string(), "conversations.history rejected: channel_not_found");
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(NhError::Timeout("slow".into()).kind(), ErrorKind::Transport);
        assert_eq!(NhError::Database("locked".into()).kind(), ErrorKind::Store);
        assert_eq!(
            NhError::ArticleNotFound("a-1".into()).kind(),
            ErrorKind::Rejected
        );
        assert!(NhError::Http("reset".into()).is_remote());
        assert!(!NhError::SheetNotFound("Articles".into()).is_remote());
    }

    #[test]
    fn test_serde_json_conversion() {
        let err: NhError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }
}
