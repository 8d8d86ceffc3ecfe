//! Error types for Weft.

use crate::types::ClientError;
use thiserror::Error;

/// Result type alias for Weft operations.
pub type Result<T> = core::result::Result<T, Error>;

/// Error types for lifecycle, store and configuration operations.
///
/// Errors reported by the GraphQL client are carried as [`ClientError`] and
/// normally end up inside a published result. They only surface here when
/// nothing else is able to handle them.
#[derive(Debug, Error)]
pub enum Error {
    /// No client has been installed in the store.
    #[error("Could not find \"client\" in the state")]
    MissingClient,
    /// No module entry exists for the given instance key.
    #[error("Unknown instance: {key}")]
    UnknownInstance { key: String },
    /// An instance key could not be parsed or built.
    #[error("Invalid instance key: {message}")]
    InvalidKey { message: String },
    /// The client rejected a request synchronously.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// A mutation failed and no `on_error` handler was registered.
    #[error("Unhandled mutation error for {key}: {source}")]
    UnhandledMutation { key: String, source: ClientError },
    /// A query subscription failed with a non-GraphQL (network) error.
    #[error("Unhandled query error for {key}: {source}")]
    UnhandledQuery { key: String, source: ClientError },
    /// Invalid configuration value.
    #[error("Invalid configuration: {message}")]
    Config { message: String },
    /// Malformed JSON input.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Creates an unknown instance error.
    pub fn unknown_instance(key: impl Into<String>) -> Self {
        Error::UnknownInstance { key: key.into() }
    }

    /// Creates an invalid key error.
    pub fn invalid_key(message: impl Into<String>) -> Self {
        Error::InvalidKey {
            message: message.into(),
        }
    }

    /// Creates an unhandled mutation error.
    pub fn unhandled_mutation(key: impl Into<String>, source: ClientError) -> Self {
        Error::UnhandledMutation {
            key: key.into(),
            source,
        }
    }

    /// Creates an unhandled query error.
    pub fn unhandled_query(key: impl Into<String>, source: ClientError) -> Self {
        Error::UnhandledQuery {
            key: key.into(),
            source,
        }
    }

    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Returns the client error carried by this error, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Error::Client(err) => Some(err),
            Error::UnhandledMutation { source, .. } | Error::UnhandledQuery { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphQlError;

    #[test]
    fn test_error_display() {
        let err = Error::MissingClient;
        assert!(err.to_string().contains("client"));

        let err = Error::unknown_instance("q1");
        assert!(err.to_string().contains("q1"));

        let err = Error::config("empty prefix");
        assert!(err.to_string().contains("empty prefix"));
    }

    #[test]
    fn test_error_client_error() {
        let source = ClientError::network("connection reset");
        let err = Error::unhandled_mutation("m0", source.clone());
        assert_eq!(err.client_error(), Some(&source));

        let err = Error::from(ClientError::graphql(vec![GraphQlError::new("boom")]));
        assert!(err.client_error().unwrap().is_graphql());

        assert!(Error::MissingClient.client_error().is_none());
    }

    #[test]
    fn test_error_from_json() {
        let parse = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::from(parse);
        assert!(matches!(err, Error::Json(_)));
    }
}
