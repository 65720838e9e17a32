//! Rendering view messages for the console

use clap::ValueEnum;

use lyphgui_core::messages::FormField;
use lyphgui_core::view;
use lyphgui_core::{NotifyLevel, ViewMessage};

/// How view messages are printed
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Readable plain text
    #[default]
    Text,
    /// The HTML fragment for each page element
    Html,
}

/// Render a view message, or `None` if it has nothing to show
pub fn render(message: &ViewMessage, format: OutputFormat) -> Option<String> {
    match format {
        OutputFormat::Html => match view::project(message) {
            Some(fragment) => Some(format!("#{}\n{}", fragment.target, fragment.html)),
            None => render_text(message),
        },
        OutputFormat::Text => render_text(message),
    }
}

fn render_text(message: &ViewMessage) -> Option<String> {
    let text = match message {
        ViewMessage::PaletteChanged { entries } => {
            let mut out = String::from("Palette:");
            for entry in entries.iter().rev() {
                out.push_str(&format!(
                    "\n  [{}] {} ({})",
                    entry.position, entry.material.id, entry.material.name
                ));
            }
            out
        }

        ViewMessage::LayersChanged { layers } => {
            if layers.is_empty() {
                "Layers: (none)".to_string()
            } else {
                let mut out = String::from("Layers:");
                for positioned in layers {
                    let layer = &positioned.layer;
                    out.push_str(&format!(
                        "\n  #{} {}: {} ({}); thickness {}; color {}",
                        positioned.position,
                        layer.id,
                        layer.material.id,
                        layer.material.name,
                        layer.thickness,
                        layer.color
                    ));
                }
                out
            }
        }

        ViewMessage::LyphHeaderChanged { header } => view::header_text(header),

        ViewMessage::Status {
            region,
            text,
            preformatted: _,
        } => format!("[{}]\n{}", region.element_id(), text),

        ViewMessage::ValidationError { message } => format!("! {message}"),

        ViewMessage::Notify { level, message } => {
            let label = match level {
                NotifyLevel::Warning => "warning",
                NotifyLevel::Error => "error",
            };
            format!("{label}: {message}")
        }

        ViewMessage::FieldValue { field, value } => format!("{} = {}", field.element_id(), value),

        ViewMessage::FormReset { fields } => {
            if fields.is_empty() {
                return None;
            }
            let names: Vec<&str> = fields.iter().map(FormField::element_id).collect();
            format!("(cleared {})", names.join(", "))
        }
    };
    Some(text)
}
