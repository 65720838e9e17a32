//! Response Routing
//!
//! Decides how a completed request is interpreted and which handler applies
//! it. The mapping from [`OperationKind`] to [`Handler`] is an exhaustive
//! match, so adding an operation without deciding how its reply is handled
//! does not compile.
//!
//! # Flow
//!
//! ```text
//! transport outcome ──► route() ──► Reply::Parsed(json) ──► handler
//!                          │     └► Reply::Raw(text)   ──► handler
//!                          └──────► ClientError (server / transport / decode)
//! ```

use serde_json::Value;

use crate::backend::TransportError;
use crate::error::ClientError;
use crate::messages::StatusRegion;
use crate::query::{OperationKind, Query, ResponseMode};

/// What a handler does with a reply
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handler {
    /// Add the returned material to the palette
    MaterialToPalette,
    /// Add the layer's material to the palette and append the layer
    AppendLayer,
    /// Replace the assembly with the returned lyph
    DisplayLyph,
    /// Show "OK" (or the server's response text) in a status region
    EdgeStatus(StatusRegion),
    /// Show the raw body, preformatted, in a status region
    RawStatus(StatusRegion),
}

impl Handler {
    /// The handler registered for an operation
    #[must_use]
    pub fn for_kind(kind: OperationKind) -> Self {
        match kind {
            OperationKind::MaterialLookup => Self::MaterialToPalette,
            OperationKind::LayerAdder => Self::AppendLayer,
            OperationKind::LyphAdder | OperationKind::DisplayLyphById => Self::DisplayLyph,
            OperationKind::EdgeConstrain => Self::EdgeStatus(StatusRegion::EdgeConstrain),
            OperationKind::AssignLyph => Self::EdgeStatus(StatusRegion::AssignLyph),
            OperationKind::ShortestPath => Self::RawStatus(StatusRegion::ShortestPath),
            OperationKind::NewEdge => Self::RawStatus(StatusRegion::NewEdge),
            OperationKind::ViewAllLyphs => Self::RawStatus(StatusRegion::AllLyphs),
        }
    }

    /// Region that also receives this operation's server errors
    #[must_use]
    pub fn error_region(&self) -> Option<StatusRegion> {
        match self {
            Self::EdgeStatus(region) => Some(*region),
            _ => None,
        }
    }
}

/// A successful reply, interpreted per the query's response mode
#[derive(Clone, Debug, PartialEq)]
pub enum Reply {
    /// Decoded JSON without an `Error` field
    Parsed(Value),
    /// Body text, untouched
    Raw(String),
}

/// Interpret a transport outcome for a query
///
/// # Errors
///
/// - [`ClientError::Transport`] when the request itself failed
/// - [`ClientError::Decode`] when a parsed-mode body is not valid JSON
/// - [`ClientError::Server`] when a parsed-mode body carries an `Error` field
pub fn route(query: &Query, outcome: Result<String, TransportError>) -> Result<Reply, ClientError> {
    let body = outcome?;

    match query.response_mode() {
        ResponseMode::Raw => Ok(Reply::Raw(body)),
        ResponseMode::Parsed => {
            let value: Value = serde_json::from_str(&body)?;
            if let Some(message) = server_error(&value) {
                return Err(ClientError::Server { message });
            }
            Ok(Reply::Parsed(value))
        }
    }
}

/// The `Error` field of a structured reply, if set
///
/// `null`, `false`, `0` and `""` mean no error.
fn server_error(value: &Value) -> Option<String> {
    match value.as_object()?.get("Error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(message) if message.is_empty() => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(message) => Some(message.clone()),
        other => Some(other.to_string()),
    }
}
