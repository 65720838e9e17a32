//! Lyph Service Integration
//!
//! Abstracted access to the remote lyph graph server through a common trait.
//!
//! # Available Services
//!
//! - **HTTP**: the lyph server's GET-with-query-parameters API (default)
//!
//! # Usage
//!
//! ```ignore
//! use lyphgui_core::backend::{HttpService, LyphService, ServiceConfig};
//!
//! let service = HttpService::from_config(&ServiceConfig::default())?;
//! let body = service.fetch("/lyph/FMA_7163").await?;
//! ```

mod http;
mod traits;

pub use http::HttpService;
pub use traits::{LyphService, ServiceConfig, TransportError, DEFAULT_PORT};
