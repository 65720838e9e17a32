//! Lyph Data Model
//!
//! Materials, layers and lyphs as the client sees them, plus the JSON bodies
//! the lyph service returns for them.
//!
//! The wire bodies (`MaterialBody`, `LayerBody`, `LyphBody`) mirror the
//! server's field names (`mtlid`, `mtlname`, `type`) and are converted into
//! the domain types before anything touches the stores. Thickness and color
//! are opaque display strings: the client never interprets their magnitude.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Display value used when the server leaves thickness or color unset
pub const UNSPECIFIED: &str = "Unspecified";

/// Placeholder id for a lyph that has not been created server-side yet
pub const UNSAVED_LYPH_ID: &str = "N/A";

/// Identifier of a material, layer, lyph, node or edge on the lyph service
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identifier(pub String);

impl Identifier {
    /// Create an identifier from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the string value
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Identifier {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for Identifier {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A reusable substance reference
///
/// Identity is `id`; names are not unique.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
    /// Stable identifier
    pub id: Identifier,
    /// Display name
    pub name: String,
}

impl Material {
    /// Create a new material
    pub fn new(id: impl Into<Identifier>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One position in a lyph's stack
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// Server-assigned layer id
    pub id: Identifier,
    /// Material backing this layer
    pub material: Material,
    /// Thickness display string, or [`UNSPECIFIED`]
    pub thickness: String,
    /// Color display string, or [`UNSPECIFIED`]
    pub color: String,
}

impl Layer {
    /// Create a layer with unspecified thickness and color
    pub fn new(id: impl Into<Identifier>, material: Material) -> Self {
        Self {
            id: id.into(),
            material,
            thickness: UNSPECIFIED.to_string(),
            color: UNSPECIFIED.to_string(),
        }
    }

    /// Set the thickness display string
    #[must_use]
    pub fn with_thickness(mut self, thickness: impl Into<String>) -> Self {
        self.thickness = thickness.into();
        self
    }

    /// Set the color display string
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}

/// Read projection of a server-returned lyph
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyphView {
    /// Lyph id
    pub id: Identifier,
    /// Lyph name
    pub name: String,
    /// Lyph type ("mix", "shell", "basic", ...)
    pub lyph_type: String,
    /// Layers, innermost first
    pub layers: Vec<Layer>,
}

/// The id/name/type line shown above the layer list
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LyphHeader {
    /// Layers are being composed but no lyph has been created yet
    Unsaved,
    /// A persisted lyph is on display
    Saved {
        /// Lyph id
        id: Identifier,
        /// Lyph name
        name: String,
        /// Lyph type
        lyph_type: String,
    },
}

impl Default for LyphHeader {
    fn default() -> Self {
        Self::Unsaved
    }
}

impl LyphHeader {
    /// Header for a lyph returned by the server
    #[must_use]
    pub fn for_lyph(lyph: &LyphView) -> Self {
        Self::Saved {
            id: lyph.id.clone(),
            name: lyph.name.clone(),
            lyph_type: lyph.lyph_type.clone(),
        }
    }

    /// The displayed id, [`UNSAVED_LYPH_ID`] for an unsaved draft
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Unsaved => UNSAVED_LYPH_ID,
            Self::Saved { id, .. } => id.as_str(),
        }
    }
}

// ============================================================================
// Wire bodies
// ============================================================================

/// Material as returned by `/lyph/<id>`
///
/// Bodies without an `id` are accepted and ignored by the palette.
#[derive(Clone, Debug, Deserialize)]
pub struct MaterialBody {
    /// Material id (absent on unexpected bodies)
    #[serde(default)]
    pub id: Option<Identifier>,
    /// Material name
    #[serde(default)]
    pub name: String,
}

impl MaterialBody {
    /// Convert into a material, if the body carried an id
    #[must_use]
    pub fn into_material(self) -> Option<Material> {
        let name = self.name;
        self.id.map(|id| Material { id, name })
    }
}

/// Layer as returned by `/makelayer/` and inside lyph bodies
#[derive(Clone, Debug, Deserialize)]
pub struct LayerBody {
    /// Layer id
    pub id: Identifier,
    /// Material id
    pub mtlid: Identifier,
    /// Material name
    #[serde(default)]
    pub mtlname: String,
    /// Thickness: an integer, "unspecified", or absent
    #[serde(default, deserialize_with = "display_string")]
    pub thickness: Option<String>,
    /// Color, possibly empty or absent
    #[serde(default, deserialize_with = "display_string")]
    pub color: Option<String>,
}

impl From<LayerBody> for Layer {
    fn from(body: LayerBody) -> Self {
        let thickness = body
            .thickness
            .filter(|t| !t.eq_ignore_ascii_case("unspecified"))
            .unwrap_or_else(|| UNSPECIFIED.to_string());
        let color = body
            .color
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| UNSPECIFIED.to_string());

        Self {
            id: body.id,
            material: Material {
                id: body.mtlid,
                name: body.mtlname,
            },
            thickness,
            color,
        }
    }
}

/// Lyph as returned by `/lyph/<id>` and `/makelyph/`
#[derive(Clone, Debug, Deserialize)]
pub struct LyphBody {
    /// Lyph id
    pub id: Identifier,
    /// Lyph name
    #[serde(default)]
    pub name: String,
    /// Lyph type
    #[serde(rename = "type", default)]
    pub lyph_type: String,
    /// Layers in stack order
    #[serde(default)]
    pub layers: Vec<LayerBody>,
}

impl From<LyphBody> for LyphView {
    fn from(body: LyphBody) -> Self {
        Self {
            id: body.id,
            name: body.name,
            lyph_type: body.lyph_type,
            layers: body.layers.into_iter().map(Layer::from).collect(),
        }
    }
}

/// Accept a string, number or null where the server is loose about types
fn display_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => None,
        Some(serde_json::Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_layer_body_numeric_thickness() {
        let body: LayerBody = serde_json::from_value(json!({
            "id": "L1",
            "mtlid": "M1",
            "mtlname": "Epithelium",
            "thickness": 3
        }))
        .unwrap();

        let layer = Layer::from(body);
        assert_eq!(layer.thickness, "3");
        assert_eq!(layer.color, UNSPECIFIED);
        assert_eq!(layer.material, Material::new("M1", "Epithelium"));
    }

    #[test]
    fn test_layer_body_unspecified_thickness_and_empty_color() {
        let body: LayerBody = serde_json::from_value(json!({
            "id": "L2",
            "mtlid": "M2",
            "mtlname": "Muscle",
            "thickness": "unspecified",
            "color": ""
        }))
        .unwrap();

        let layer = Layer::from(body);
        assert_eq!(layer.thickness, UNSPECIFIED);
        assert_eq!(layer.color, UNSPECIFIED);
    }

    #[test]
    fn test_layer_body_keeps_color() {
        let body: LayerBody = serde_json::from_value(json!({
            "id": "L3",
            "mtlid": "M3",
            "mtlname": "Blood",
            "color": "red"
        }))
        .unwrap();

        assert_eq!(Layer::from(body).color, "red");
    }

    #[test]
    fn test_material_body_without_id() {
        let body: MaterialBody = serde_json::from_value(json!({ "name": "orphan" })).unwrap();
        assert!(body.into_material().is_none());

        let body: MaterialBody =
            serde_json::from_value(json!({ "id": "M9", "name": "Bone" })).unwrap();
        assert_eq!(body.into_material(), Some(Material::new("M9", "Bone")));
    }

    #[test]
    fn test_lyph_body_conversion() {
        let body: LyphBody = serde_json::from_value(json!({
            "id": "LYPH7",
            "name": "Skin",
            "type": "shell",
            "ont_term": null,
            "layers": [
                { "id": "A", "mtlid": "M1", "mtlname": "Mat1", "thickness": "unspecified" },
                { "id": "B", "mtlid": "M2", "mtlname": "Mat2", "thickness": 2 }
            ]
        }))
        .unwrap();

        let lyph = LyphView::from(body);
        assert_eq!(lyph.lyph_type, "shell");
        assert_eq!(lyph.layers.len(), 2);
        assert_eq!(lyph.layers[1].thickness, "2");
        assert_eq!(LyphHeader::for_lyph(&lyph).id(), "LYPH7");
    }

    #[test]
    fn test_unsaved_header_id() {
        assert_eq!(LyphHeader::default().id(), UNSAVED_LYPH_ID);
    }
}
