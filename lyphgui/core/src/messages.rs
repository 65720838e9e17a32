//! View Messages
//!
//! Messages sent from the Composer to a surface. A surface is a pure renderer:
//! it draws what these messages describe and forwards user input back as
//! [`UserAction`](crate::events::UserAction)s. It never mutates the model.

use serde::{Deserialize, Serialize};

use crate::assembly::PositionedLayer;
use crate::model::LyphHeader;
use crate::palette::PaletteEntry;

/// Messages from Composer to surface
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMessage {
    /// Palette contents changed (entries in insertion order)
    PaletteChanged {
        /// All palette entries
        entries: Vec<PaletteEntry>,
    },

    /// Layer assembly changed (ascending positions)
    LayersChanged {
        /// All populated positions
        layers: Vec<PositionedLayer>,
    },

    /// The lyph id/name/type line changed
    LyphHeaderChanged {
        /// New header
        header: LyphHeader,
    },

    /// Text for one of the result regions
    Status {
        /// Target region
        region: StatusRegion,
        /// Text to show (unescaped)
        text: String,
        /// Whether to keep whitespace and line breaks
        preformatted: bool,
    },

    /// Input was rejected before sending; show as a blocking notice
    ValidationError {
        /// Why the input was rejected
        message: String,
    },

    /// Server, transport or decode failure
    Notify {
        /// Severity
        level: NotifyLevel,
        /// Message content
        message: String,
    },

    /// Put a value into a form field
    FieldValue {
        /// Target field
        field: FormField,
        /// New value
        value: String,
    },

    /// Clear form fields
    FormReset {
        /// Fields to clear
        fields: Vec<FormField>,
    },
}

/// Result regions that receive status text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusRegion {
    /// Shortest path output
    ShortestPath,
    /// New edge output
    NewEdge,
    /// Edge constraint outcome
    EdgeConstrain,
    /// Lyph assignment outcome
    AssignLyph,
    /// Listing of every lyph
    AllLyphs,
}

impl StatusRegion {
    /// Element id of the region in the page
    #[must_use]
    pub fn element_id(&self) -> &'static str {
        match self {
            Self::ShortestPath => "shortest_path_results",
            Self::NewEdge => "new_edge_results",
            Self::EdgeConstrain => "edge_constrain_results",
            Self::AssignLyph => "assign_lyph_results",
            Self::AllLyphs => "view_all_lyphs_result",
        }
    }
}

/// Form fields the Composer can fill or clear
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormField {
    /// Material id used for new layers
    LayerMaterial,
    /// Thickness for new layers
    Thickness,
    /// Color for new layers
    Color,
    /// Name of the lyph being composed
    LyphName,
    /// Type of the lyph being composed
    LyphType,
}

impl FormField {
    /// Fields cleared by a display reset
    pub const COMPOSITION: [Self; 5] = [
        Self::LyphName,
        Self::LyphType,
        Self::LayerMaterial,
        Self::Thickness,
        Self::Color,
    ];

    /// Fields cleared when a new layer is appended
    pub const LYPH_IDENTITY: [Self; 2] = [Self::LyphName, Self::LyphType];

    /// Element id of the field in the page
    #[must_use]
    pub fn element_id(&self) -> &'static str {
        match self {
            Self::LayerMaterial => "layer_material",
            Self::Thickness => "thickness",
            Self::Color => "color",
            Self::LyphName => "lyphname",
            Self::LyphType => "lyphtype",
        }
    }
}

/// Notification levels
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyLevel {
    /// The server answered, but not in a form the client understands
    Warning,
    /// The request failed or the server refused it
    Error,
}

/// Request identifier (log correlation only)
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl RequestId {
    /// Generate a new process-unique request ID
    pub fn new() -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        let id = COUNTER.fetch_add(1, Ordering::SeqCst);
        Self(format!("req_{id}"))
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_unique() {
        let id1 = RequestId::new();
        let id2 = RequestId::new();
        assert_ne!(id1, id2);
        assert!(id1.0.starts_with("req_"));
    }

    #[test]
    fn test_element_ids_distinct() {
        let regions = [
            StatusRegion::ShortestPath,
            StatusRegion::NewEdge,
            StatusRegion::EdgeConstrain,
            StatusRegion::AssignLyph,
            StatusRegion::AllLyphs,
        ];
        let ids: std::collections::HashSet<_> =
            regions.iter().map(StatusRegion::element_id).collect();
        assert_eq!(ids.len(), regions.len());
    }

    #[test]
    fn test_identity_fields_are_part_of_composition() {
        for field in FormField::LYPH_IDENTITY {
            assert!(FormField::COMPOSITION.contains(&field));
        }
        assert!(!FormField::LYPH_IDENTITY.contains(&FormField::LayerMaterial));
    }
}
