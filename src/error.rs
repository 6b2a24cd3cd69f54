//! Error types for the relay.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum RelayError {
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("{message}")]
    Credential { message: String },

    #[error("{message}")]
    Upstream { message: String },

    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

impl RelayError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn credential(msg: impl Into<String>) -> Self {
        Self::Credential {
            message: msg.into(),
        }
    }

    pub fn upstream(msg: impl Into<String>) -> Self {
        Self::Upstream {
            message: msg.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RelayError>;
