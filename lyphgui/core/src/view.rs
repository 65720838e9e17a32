//! Markup Projection
//!
//! Renders palette, layers, header and status text into HTML fragments.
//! Every value that came from the server or the user is escaped.
//!
//! Interactive elements carry `data-action` and `data-palette-position`
//! attributes holding only integers. The surface binds click handlers to them
//! and sends [`UserAction`](crate::events::UserAction)s back; no markup here
//! contains an inline script handler.

use serde::{Deserialize, Serialize};

use crate::assembly::PositionedLayer;
use crate::messages::ViewMessage;
use crate::model::LyphHeader;
use crate::palette::PaletteEntry;

/// Element id of the palette list
pub const PALETTE_LIST: &str = "palette_list";
/// Element id of the layer list
pub const LAYERS_LIST: &str = "layers_list";
/// Element id of the lyph header line
pub const LYPH_HEADER: &str = "lyph_id";

/// `data-action` value for choosing a palette material as layer material
pub const ACTION_PICK_MATERIAL: &str = "pick-material";
/// `data-action` value for displaying a palette entry as a lyph
pub const ACTION_VIEW_LYPH: &str = "view-lyph";

/// Escape `& " ' < >` for use in element content and attribute values
#[must_use]
pub fn html_escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Palette list items, most recently added first
#[must_use]
pub fn render_palette(entries: &[PaletteEntry]) -> String {
    entries
        .iter()
        .rev()
        .map(|entry| {
            format!(
                "<li>&raquo; \
                 <span data-action=\"{ACTION_PICK_MATERIAL}\" data-palette-position=\"{pos}\">{id} ({name})</span> \
                 <a href=\"#\" data-action=\"{ACTION_VIEW_LYPH}\" data-palette-position=\"{pos}\">View</a>\
                 </li>",
                pos = entry.position,
                id = html_escape(entry.material.id.as_str()),
                name = html_escape(&entry.material.name),
            )
        })
        .collect()
}

/// Layer list items in ascending position order
#[must_use]
pub fn render_layers(layers: &[PositionedLayer]) -> String {
    layers
        .iter()
        .map(|PositionedLayer { position, layer }| {
            format!(
                "<li>Layer #{position} (Layer id: <span data-layer-position=\"{position}\">{id}</span>)\
                 <ul><li>Material: {mtlid} ({mtlname}); Thickness: {thickness}; Color: {color}</li></ul>\
                 </li>",
                id = html_escape(layer.id.as_str()),
                mtlid = html_escape(layer.material.id.as_str()),
                mtlname = html_escape(&layer.material.name),
                thickness = html_escape(&layer.thickness),
                color = html_escape(&layer.color),
            )
        })
        .collect()
}

/// Header line text (unescaped)
#[must_use]
pub fn header_text(header: &LyphHeader) -> String {
    match header {
        LyphHeader::Unsaved => "Lyph ID: N/A (\"Create Lyph\" to assign ID)".to_string(),
        LyphHeader::Saved {
            id,
            name,
            lyph_type,
        } => format!("Lyph ID: {id} ({name}), type: {lyph_type}"),
    }
}

/// Header line markup
#[must_use]
pub fn render_header(header: &LyphHeader) -> String {
    html_escape(&header_text(header))
}

/// Status region markup
#[must_use]
pub fn render_status(text: &str, preformatted: bool) -> String {
    if preformatted {
        format!("<pre>{}</pre>", html_escape(text))
    } else {
        html_escape(text)
    }
}

/// Markup destined for one element of the page
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    /// Element id to replace the contents of
    pub target: String,
    /// Replacement HTML
    pub html: String,
}

/// Turn a view message into the fragment that renders it
///
/// Messages that are not element replacements (notifications, form field
/// updates) yield `None`; surfaces present those natively.
#[must_use]
pub fn project(message: &ViewMessage) -> Option<Fragment> {
    let (target, html) = match message {
        ViewMessage::PaletteChanged { entries } => (PALETTE_LIST, render_palette(entries)),
        ViewMessage::LayersChanged { layers } => (LAYERS_LIST, render_layers(layers)),
        ViewMessage::LyphHeaderChanged { header } => (LYPH_HEADER, render_header(header)),
        ViewMessage::Status {
            region,
            text,
            preformatted,
        } => (region.element_id(), render_status(text, *preformatted)),
        ViewMessage::ValidationError { .. }
        | ViewMessage::Notify { .. }
        | ViewMessage::FieldValue { .. }
        | ViewMessage::FormReset { .. } => return None,
    };

    Some(Fragment {
        target: target.to_string(),
        html,
    })
}
