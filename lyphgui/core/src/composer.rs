//! Composer - The Orchestration Core
//!
//! The Composer owns the session state (palette, layer assembly, lyph header)
//! and the lyph service. It is the only place that mutates the stores.
//!
//! # Flow
//!
//! ```text
//! UserAction ──► handle_action ──► query::build ──► dispatch ──► tokio::spawn(fetch)
//!                                                                     │
//! ViewMessage ◄── apply_reply ◄── router::route ◄── poll_completions ◄┘
//! ```
//!
//! Requests never block the caller. Completions come back over an internal
//! channel and are applied only from [`Composer::poll_completions`] or
//! [`Composer::run_until_idle`], so every store mutation happens on the
//! Composer's own task.
//!
//! With `serialize_per_kind` enabled, a second request of a kind that is
//! already in flight waits in a FIFO queue until the first one completes.
//! Different kinds still run concurrently.
//!
//! # View backpressure
//!
//! View messages are never awaited on. When the surface's channel is full
//! they wait in an outbox, in order, until [`Composer::flush_view`] finds
//! room again. A surface that drains only after `run_until_idle` returns
//! should alternate draining and flushing until nothing is held back.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use crate::assembly::LayerAssembly;
use crate::backend::{LyphService, TransportError};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::events::UserAction;
use crate::messages::{FormField, RequestId, StatusRegion, ViewMessage};
use crate::model::{Layer, LayerBody, LyphBody, LyphHeader, LyphView, Material, MaterialBody};
use crate::palette::PaletteStore;
use crate::query::{self, Intent, OperationKind, Query};
use crate::router::{self, Handler, Reply};

/// Default text for a successful edge operation without a `Response` field
const EDGE_OK: &str = "OK";

/// Capacity of the internal completion channel
///
/// Spawned requests wait for room here; it never limits how many run.
pub const COMPLETION_CHANNEL_CAPACITY: usize = 64;

/// A finished request, as delivered by the spawned task
struct Completion {
    request_id: RequestId,
    query: Query,
    outcome: Result<String, TransportError>,
}

/// The Composer - headless lyph composition core
pub struct Composer<S: LyphService> {
    /// Configuration
    config: ClientConfig,
    /// Lyph service
    service: Arc<S>,
    /// Materials seen this session
    palette: PaletteStore,
    /// Layers being composed
    assembly: LayerAssembly,
    /// Id/name/type line
    header: LyphHeader,
    /// Channel to the surface
    tx: mpsc::Sender<ViewMessage>,
    /// View messages the surface had no room for yet
    outbox: VecDeque<ViewMessage>,
    /// Completions from spawned requests
    completion_tx: mpsc::Sender<Completion>,
    completion_rx: mpsc::Receiver<Completion>,
    /// Requests sent and not yet applied, per kind
    in_flight: HashMap<OperationKind, usize>,
    /// Queries waiting for their kind to go idle
    pending: HashMap<OperationKind, VecDeque<Query>>,
}

impl<S: LyphService + 'static> Composer<S> {
    /// Create a new Composer
    pub fn new(service: S, config: ClientConfig, tx: mpsc::Sender<ViewMessage>) -> Self {
        let (completion_tx, completion_rx) = mpsc::channel(COMPLETION_CHANNEL_CAPACITY);

        Self {
            config,
            service: Arc::new(service),
            palette: PaletteStore::new(),
            assembly: LayerAssembly::new(),
            header: LyphHeader::Unsaved,
            tx,
            outbox: VecDeque::new(),
            completion_tx,
            completion_rx,
            in_flight: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The lyph service
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Material palette
    pub fn palette(&self) -> &PaletteStore {
        &self.palette
    }

    /// Layer assembly
    pub fn assembly(&self) -> &LayerAssembly {
        &self.assembly
    }

    /// Current lyph header
    pub fn header(&self) -> &LyphHeader {
        &self.header
    }

    /// Requests sent but not yet applied
    pub fn in_flight(&self) -> usize {
        self.in_flight.values().sum()
    }

    /// Queries held back by per-kind serialization
    pub fn queued(&self) -> usize {
        self.pending.values().map(VecDeque::len).sum()
    }

    /// Whether nothing is in flight or queued
    pub fn is_idle(&self) -> bool {
        self.in_flight() == 0 && self.queued() == 0
    }

    /// View messages waiting for room in the surface's channel
    pub fn held_messages(&self) -> usize {
        self.outbox.len()
    }

    /// Move held view messages into the surface's channel while it has room
    ///
    /// Returns how many are still held. Messages for a closed channel are
    /// dropped.
    pub fn flush_view(&mut self) -> usize {
        while let Some(msg) = self.outbox.pop_front() {
            match self.tx.try_send(msg) {
                Ok(()) => {}
                Err(TrySendError::Full(msg)) => {
                    self.outbox.push_front(msg);
                    break;
                }
                Err(TrySendError::Closed(_)) => {
                    tracing::debug!(dropped = self.outbox.len() + 1, "View channel closed");
                    self.outbox.clear();
                }
            }
        }
        self.outbox.len()
    }

    /// Handle an action from the surface
    pub async fn handle_action(&mut self, action: UserAction) {
        match action {
            UserAction::Submit(intent) => self.submit(intent).await,

            UserAction::PickPaletteEntry { position } => {
                let Some(entry) = self.palette.get(position) else {
                    tracing::debug!(position, "Pick for unknown palette position");
                    return;
                };
                let value = entry.material.id.to_string();
                self.send(ViewMessage::FieldValue {
                    field: FormField::LayerMaterial,
                    value,
                });
            }

            UserAction::ViewPaletteEntry { position } => {
                let Some(entry) = self.palette.get(position) else {
                    tracing::debug!(position, "View for unknown palette position");
                    return;
                };
                let lyph_id = entry.material.id.to_string();
                self.submit(Intent::DisplayLyph { lyph_id }).await;
            }

            UserAction::ClearDisplay => self.clear_display().await,
        }
    }

    /// Validate an intent and send its query
    pub async fn submit(&mut self, intent: Intent) {
        let kind = intent.kind();
        match query::build(&intent, &self.assembly) {
            Ok(Some(query)) => self.dispatch(query),
            Ok(None) => tracing::debug!(kind = %kind, "Nothing to send"),
            Err(e) => self.report(kind, None, ClientError::Validation(e)),
        }
    }

    /// Send a query now, or queue it behind an in-flight one of the same kind
    fn dispatch(&mut self, query: Query) {
        let kind = query.kind();
        let busy = self.in_flight.get(&kind).copied().unwrap_or(0) > 0;

        if self.config.serialize_per_kind && busy {
            let queue = self.pending.entry(kind).or_default();
            queue.push_back(query);
            tracing::debug!(kind = %kind, depth = queue.len(), "Request queued");
            return;
        }

        self.spawn_request(query);
    }

    fn spawn_request(&mut self, query: Query) {
        let request_id = RequestId::new();
        *self.in_flight.entry(query.kind()).or_insert(0) += 1;

        tracing::info!(
            request_id = %request_id,
            kind = %query.kind(),
            path = query.path(),
            "Sending request"
        );

        let service = Arc::clone(&self.service);
        let tx = self.completion_tx.clone();
        tokio::spawn(async move {
            let outcome = service.fetch(query.path()).await;
            let completion = Completion {
                request_id,
                query,
                outcome,
            };
            if tx.send(completion).await.is_err() {
                tracing::debug!("Composer dropped before request completed");
            }
        });
    }

    /// Apply every completion that has already arrived
    ///
    /// Returns true if there was activity.
    pub async fn poll_completions(&mut self) -> bool {
        let mut collected = Vec::new();
        while let Ok(completion) = self.completion_rx.try_recv() {
            collected.push(completion);
        }

        if collected.is_empty() {
            return false;
        }

        for completion in collected {
            self.apply_completion(completion);
        }
        true
    }

    /// Wait until every sent and queued request has been applied
    ///
    /// Never waits on the surface: view messages that do not fit are held
    /// for [`Composer::flush_view`].
    pub async fn run_until_idle(&mut self) {
        while self.in_flight() > 0 {
            match self.completion_rx.recv().await {
                Some(completion) => self.apply_completion(completion),
                None => break,
            }
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        let Completion {
            request_id,
            query,
            outcome,
        } = completion;
        let kind = query.kind();

        if let Some(count) = self.in_flight.get_mut(&kind) {
            *count = count.saturating_sub(1);
        }

        match &outcome {
            Ok(body) => tracing::debug!(
                request_id = %request_id,
                kind = %kind,
                bytes = body.len(),
                "Request completed"
            ),
            Err(e) => tracing::warn!(
                request_id = %request_id,
                kind = %kind,
                path = query.path(),
                error = %e,
                "Request failed"
            ),
        }

        let result = router::route(&query, outcome).and_then(|reply| self.apply_reply(kind, reply));
        if let Err(e) = result {
            self.report(kind, Some(&request_id), e);
        }

        if let Some(next) = self.pending.get_mut(&kind).and_then(VecDeque::pop_front) {
            self.spawn_request(next);
        }
    }

    /// Run the handler registered for `kind`
    ///
    /// Bodies are fully decoded before any store is touched, so a decode
    /// failure leaves the session unchanged.
    fn apply_reply(&mut self, kind: OperationKind, reply: Reply) -> Result<(), ClientError> {
        match Handler::for_kind(kind) {
            Handler::MaterialToPalette => {
                let body: MaterialBody = decode(reply)?;
                match body.into_material() {
                    Some(material) => {
                        self.palette.add(material);
                        self.send_palette();
                    }
                    None => tracing::debug!(kind = %kind, "Ignoring material without id"),
                }
            }

            Handler::AppendLayer => {
                let layer = Layer::from(decode::<LayerBody>(reply)?);
                self.append_layer(layer);
            }

            Handler::DisplayLyph => {
                let lyph = LyphView::from(decode::<LyphBody>(reply)?);
                self.show_lyph(lyph);
            }

            Handler::EdgeStatus(region) => {
                let value = parsed(reply)?;
                let text = value
                    .get("Response")
                    .and_then(Value::as_str)
                    .unwrap_or(EDGE_OK)
                    .to_string();
                self.send_status(region, text, false);
            }

            Handler::RawStatus(region) => {
                let text = match reply {
                    Reply::Raw(text) => text,
                    Reply::Parsed(value) => value.to_string(),
                };
                self.send_status(region, text, true);
            }
        }
        Ok(())
    }

    fn append_layer(&mut self, layer: Layer) {
        self.palette.add(layer.material.clone());
        let position = self.assembly.append(layer);
        self.header = LyphHeader::Unsaved;

        tracing::debug!(position, "Layer appended");

        self.send_palette();
        self.send_layers();
        self.send_header();
        self.send(ViewMessage::FormReset {
            fields: FormField::LYPH_IDENTITY.to_vec(),
        });
    }

    /// Replace the display with a server-returned lyph
    fn show_lyph(&mut self, lyph: LyphView) {
        // A lyph can itself be used as a layer material
        self.palette
            .add(Material::new(lyph.id.clone(), lyph.name.clone()));

        self.reset_display();

        let header = LyphHeader::for_lyph(&lyph);
        for (index, layer) in lyph.layers.into_iter().enumerate() {
            self.palette.add(layer.material.clone());
            self.assembly.insert_at(index + 1, layer);
        }
        self.header = header;

        tracing::info!(lyph = self.header.id(), layers = self.assembly.len(), "Lyph displayed");

        self.send_palette();
        self.send_layers();
        self.send_header();
    }

    /// Reset the layer stack, header and composition fields
    ///
    /// The palette is kept.
    pub async fn clear_display(&mut self) {
        self.reset_display();
    }

    fn reset_display(&mut self) {
        self.assembly.reset();
        self.header = LyphHeader::Unsaved;

        self.send_header();
        self.send(ViewMessage::FormReset {
            fields: FormField::COMPOSITION.to_vec(),
        });
        self.send_layers();
    }

    fn report(&mut self, kind: OperationKind, request_id: Option<&RequestId>, err: ClientError) {
        if let ClientError::Validation(ref e) = err {
            tracing::debug!(kind = %kind, reason = %e, "Input rejected");
            self.send(ViewMessage::ValidationError {
                message: e.to_string(),
            });
            return;
        }

        let request_id = request_id.map(ToString::to_string).unwrap_or_default();
        tracing::error!(request_id = %request_id, kind = %kind, error = %err, "Operation failed");

        if let ClientError::Server { ref message } = err {
            if let Some(region) = Handler::for_kind(kind).error_region() {
                self.send_status(region, message.clone(), false);
            }
        }

        self.send(ViewMessage::Notify {
            level: err.notify_level(),
            message: err.user_message(),
        });
    }

    fn send_palette(&mut self) {
        let entries = self.palette.entries().to_vec();
        self.send(ViewMessage::PaletteChanged { entries });
    }

    fn send_layers(&mut self) {
        let layers = self.assembly.positioned();
        self.send(ViewMessage::LayersChanged { layers });
    }

    fn send_header(&mut self) {
        let header = self.header.clone();
        self.send(ViewMessage::LyphHeaderChanged { header });
    }

    fn send_status(&mut self, region: StatusRegion, text: String, preformatted: bool) {
        self.send(ViewMessage::Status {
            region,
            text,
            preformatted,
        });
    }

    /// Queue a message for the surface and deliver what fits
    fn send(&mut self, msg: ViewMessage) {
        self.outbox.push_back(msg);
        let held = self.flush_view();
        if held > 0 {
            tracing::debug!(held, "View channel full, holding messages");
        }
    }
}

/// The JSON value of a parsed reply
fn parsed(reply: Reply) -> Result<Value, ClientError> {
    match reply {
        Reply::Parsed(value) => Ok(value),
        Reply::Raw(_) => Err(ClientError::Decode(
            "expected a structured reply, got raw text".to_string(),
        )),
    }
}

/// Decode a parsed reply into a wire body
fn decode<T: DeserializeOwned>(reply: Reply) -> Result<T, ClientError> {
    Ok(serde_json::from_value(parsed(reply)?)?)
}
