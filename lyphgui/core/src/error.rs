//! Client Error Taxonomy
//!
//! Every failure is terminal for the request that produced it: nothing is
//! retried, queued or backed off, and none of them touches the palette or the
//! layer assembly.

use thiserror::Error;

use crate::backend::TransportError;
use crate::messages::NotifyLevel;
use crate::query::ValidationError;

/// Message shown for any transport failure
pub const CONNECTIVITY_MESSAGE: &str = "Problem connecting to server";

/// Errors surfaced to the user for a single operation
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before sending
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Structured reply carried an `Error` field
    #[error("{message}")]
    Server {
        /// Server-provided message, verbatim
        message: String,
    },

    /// Non-success status or network failure
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Reply was not the structure the operation expects
    #[error("Malformed response from server: {0}")]
    Decode(String),
}

impl ClientError {
    /// Text to show the user
    ///
    /// Transport details go to the log; the user gets a generic connectivity
    /// message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Transport(_) => CONNECTIVITY_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// How loudly to surface the error
    ///
    /// A malformed reply is a warning: the request reached the server and
    /// the session is unchanged.
    #[must_use]
    pub fn notify_level(&self) -> NotifyLevel {
        match self {
            Self::Validation(_) | Self::Decode(_) => NotifyLevel::Warning,
            Self::Server { .. } | Self::Transport(_) => NotifyLevel::Error,
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
