//! Lyphgui Core - Headless Lyph Composition and Query Client
//!
//! This crate holds everything a lyph graph client needs except the screen:
//! the material palette, the layer stack being composed, the translation of
//! user intents into lyph service requests, and the routing of the service's
//! replies back into state changes and view updates.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          Surfaces                                 │
//! │        ┌────────────────┐          ┌──────────────────────┐       │
//! │        │  lyph-console  │          │  browser page / test │       │
//! │        └───────┬────────┘          └──────────┬───────────┘       │
//! │                └──────────────┬───────────────┘                   │
//! │                        UserAction (up)                            │
//! │                       ViewMessage (down)                          │
//! └───────────────────────────────┼───────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┼───────────────────────────────────┐
//! │                         LYPHGUI CORE                              │
//! │  ┌────────────────────────────┴────────────────────────────────┐  │
//! │  │                         Composer                            │  │
//! │  │  ┌──────────┐  ┌──────────┐  ┌──────────┐  ┌─────────────┐  │  │
//! │  │  │ Palette  │  │  Layer   │  │  Query   │  │  Response   │  │  │
//! │  │  │  Store   │  │ Assembly │  │ Builder  │  │   Router    │  │  │
//! │  │  └──────────┘  └──────────┘  └──────────┘  └─────────────┘  │  │
//! │  └──────────────────────────────┬──────────────────────────────┘  │
//! │                          LyphService (HTTP)                       │
//! └─────────────────────────────────┼─────────────────────────────────┘
//!                                   ▼
//!                          lyph graph server
//! ```
//!
//! # Key Types
//!
//! - [`Composer`]: owns the session state and the service, applies replies
//! - [`UserAction`]: actions sent from a surface to the Composer
//! - [`ViewMessage`]: messages sent from the Composer to a surface
//! - [`PaletteStore`]: deduplicated materials seen this session
//! - [`LayerAssembly`]: the position-indexed layer stack
//! - [`Intent`] / [`Query`]: user requests and their encoded form
//!
//! # Quick Start
//!
//! ```ignore
//! use lyphgui_core::{
//!     backend::HttpService, config::load_config, Composer, Intent, UserAction,
//! };
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let service = HttpService::from_config(&config.service)?;
//!     let (tx, mut rx) = mpsc::channel(config.channel_capacity);
//!     let mut composer = Composer::new(service, config, tx);
//!
//!     composer
//!         .handle_action(UserAction::Submit(Intent::MaterialLookup {
//!             material_id: "FMA_7163".to_string(),
//!         }))
//!         .await;
//!     composer.run_until_idle().await;
//!
//!     loop {
//!         let held = composer.flush_view();
//!         while let Ok(msg) = rx.try_recv() {
//!             // Render message
//!         }
//!         if held == 0 {
//!             break;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`model`]: materials, layers, lyphs and their wire bodies
//! - [`palette`]: the material palette
//! - [`assembly`]: the layer stack
//! - [`query`]: intent validation and request path encoding
//! - [`router`]: reply interpretation and handler selection
//! - [`backend`]: the lyph service trait and its HTTP implementation
//! - [`composer`]: the orchestrator
//! - [`view`]: HTML fragments for palette, layers, header and status text
//! - [`events`] / [`messages`]: the surface protocol
//! - [`config`]: TOML, environment and CLI configuration
//! - [`error`]: the per-operation error taxonomy

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assembly;
pub mod backend;
pub mod composer;
pub mod config;
pub mod error;
pub mod events;
pub mod messages;
pub mod model;
pub mod palette;
pub mod query;
pub mod router;
pub mod view;

pub use assembly::{LayerAssembly, PositionedLayer};
pub use composer::Composer;
pub use config::{ClientConfig, ConfigOverrides};
pub use error::ClientError;
pub use events::UserAction;
pub use messages::{FormField, NotifyLevel, StatusRegion, ViewMessage};
pub use model::{Identifier, Layer, LyphHeader, LyphView, Material};
pub use palette::{PaletteEntry, PaletteStore};
pub use query::{Intent, OperationKind, Query, ValidationError};
