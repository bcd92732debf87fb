use thiserror::Error;

/// Application-level errors using thiserror for structured error handling.
///
/// Every failure here is local to a single record, sink call, or startup
/// step. Nothing in the dispatch path is fatal; the router degrades
/// gracefully on a live feed where malformed or stale messages are expected.

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("empty record")]
    EmptyRecord,

    #[error("unrecognized action: {0}")]
    UnrecognizedAction(String),

    #[error("record has no sound identifier")]
    MissingSoundId,

    #[error("expected 5 spatial fields, found {found}")]
    MissingSpatialFields { found: usize },

    #[error("invalid value for {field}: '{value}'")]
    InvalidNumber { field: &'static str, value: String },
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to load registry tables from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid registry tables: {0}")]
    Invalid(String),
}

#[derive(Error, Debug)]
pub enum SinkError {
    #[error("failed to bind UDP socket")]
    BindFailed(#[source] std::io::Error),

    #[error("could not resolve sink address: {0}")]
    InvalidAddress(String),

    #[error("failed to encode OSC message for {address}")]
    EncodeFailed {
        address: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to send OSC message to {address}")]
    SendFailed {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ListenerError {
    #[error("failed to bind OSC listener on {addr}")]
    BindFailed {
        addr: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration from {path}")]
    LoadFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("failed to save configuration to {path}")]
    SaveFailed {
        path: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to create config directory: {path}")]
    DirectoryCreationFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for application Results using anyhow for context chaining
pub type AppResult<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ParseError::UnrecognizedAction("/sound/bogus".to_string());
        assert_eq!(err.to_string(), "unrecognized action: /sound/bogus");

        let err = ParseError::MissingSpatialFields { found: 3 };
        assert_eq!(err.to_string(), "expected 5 spatial fields, found 3");

        let err = SinkError::InvalidAddress("nowhere:xyz".to_string());
        assert_eq!(err.to_string(), "could not resolve sink address: nowhere:xyz");
    }

    #[test]
    fn test_error_source_chain() {
        use std::error::Error;
        use std::io;

        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let config_err = ConfigError::LoadFailed {
            path: "/test/config.json".to_string(),
            source: Box::new(io_err),
        };

        assert!(config_err.source().is_some());
        assert_eq!(
            config_err.to_string(),
            "failed to load configuration from /test/config.json"
        );
    }
}
