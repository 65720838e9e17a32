//! Query Construction
//!
//! Turns a user [`Intent`] into a fully encoded [`Query`] for one of the lyph
//! service's operations, or into a [`ValidationError`] that is shown to the
//! user without anything being sent.
//!
//! # Operations
//!
//! | Kind | Path | Mode |
//! |---|---|---|
//! | `material_lookup` | `/lyph/<id>` | parsed |
//! | `layer_adder` | `/makelayer/?material=..[&thickness=..][&color=..]` | parsed |
//! | `lyph_adder` | `/makelyph/?name=..&type=..&layer1=..&layer2=..` | parsed |
//! | `display_lyph_by_id` | `/lyph/<id>` | parsed |
//! | `shortest_path` | `/lyphpath/`, `/lyph_along_path/`, `/constrain_along_path/` | raw |
//! | `new_edge` | `/makelyphedge/?from=..&to=..&name=..&type=..&fma=..[&lyph=..]` | raw |
//! | `edge_constrain` | `/edgeconstrain/?edge=..&lyph=..` | parsed |
//! | `assign_lyph` | `/assignlyph/?edge=..&lyph=..` | parsed |
//! | `view_all_lyphs` | `/all_lyphs/` | raw |
//!
//! Every user-supplied value is percent-encoded with the same character set
//! browsers use for `encodeURIComponent`.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assembly::LayerAssembly;

/// Characters left unescaped: `A-Z a-z 0-9 - _ . ! ~ * ' ( )`
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single path segment or query value
#[must_use]
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// The remote operations this client knows how to issue
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// Look up a material and add it to the palette
    MaterialLookup,
    /// Create (or find) a layer and append it to the assembly
    LayerAdder,
    /// Create a lyph from the assembled layers
    LyphAdder,
    /// Fetch and display an existing lyph
    DisplayLyphById,
    /// Shortest path between two nodes, optionally constrained
    ShortestPath,
    /// Create an edge between two nodes
    NewEdge,
    /// Add a lyph constraint to an edge
    EdgeConstrain,
    /// Assign a lyph to an edge
    AssignLyph,
    /// Dump every lyph the server knows about
    ViewAllLyphs,
}

impl OperationKind {
    /// Every operation kind
    pub const ALL: [Self; 9] = [
        Self::MaterialLookup,
        Self::LayerAdder,
        Self::LyphAdder,
        Self::DisplayLyphById,
        Self::ShortestPath,
        Self::NewEdge,
        Self::EdgeConstrain,
        Self::AssignLyph,
        Self::ViewAllLyphs,
    ];

    /// Stable snake_case name (used in logs)
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MaterialLookup => "material_lookup",
            Self::LayerAdder => "layer_adder",
            Self::LyphAdder => "lyph_adder",
            Self::DisplayLyphById => "display_lyph_by_id",
            Self::ShortestPath => "shortest_path",
            Self::NewEdge => "new_edge",
            Self::EdgeConstrain => "edge_constrain",
            Self::AssignLyph => "assign_lyph",
            Self::ViewAllLyphs => "view_all_lyphs",
        }
    }

    /// How the server's reply to this operation is interpreted
    #[must_use]
    pub fn response_mode(&self) -> ResponseMode {
        match self {
            Self::MaterialLookup
            | Self::LayerAdder
            | Self::LyphAdder
            | Self::DisplayLyphById
            | Self::EdgeConstrain
            | Self::AssignLyph => ResponseMode::Parsed,
            Self::ShortestPath | Self::NewEdge | Self::ViewAllLyphs => ResponseMode::Raw,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Whether a reply is decoded as JSON or handed over as text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseMode {
    /// Decode as JSON, check for an `Error` field
    Parsed,
    /// Pass the body through untouched
    Raw,
}

/// A fully built request, consumed once by the transport
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Query {
    kind: OperationKind,
    path: String,
    response_mode: ResponseMode,
}

impl Query {
    fn new(kind: OperationKind, path: String) -> Self {
        Self {
            kind,
            path,
            response_mode: kind.response_mode(),
        }
    }

    /// Operation this query performs
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    /// Encoded request path, including the query string
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// How the reply is interpreted
    #[must_use]
    pub fn response_mode(&self) -> ResponseMode {
        self.response_mode
    }
}

/// A user request, carrying a snapshot of the relevant form fields
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    /// Look up a material by id
    MaterialLookup {
        /// Material id
        material_id: String,
    },
    /// Add a layer built from a material
    AddLayer {
        /// Material id
        material_id: String,
        /// Optional thickness
        thickness: Option<String>,
        /// Optional color
        color: Option<String>,
    },
    /// Create a lyph from the current layer assembly
    CreateLyph {
        /// Lyph name
        name: String,
        /// Lyph type ("mix" or "shell", any case)
        lyph_type: String,
    },
    /// Display an existing lyph
    DisplayLyph {
        /// Lyph id
        lyph_id: String,
    },
    /// Shortest path between two nodes
    ShortestPath {
        /// Start node
        from: String,
        /// End node
        to: String,
        /// Lyph to place along the path
        lyph_along_path: Option<String>,
        /// Lyph to add as a constraint along the path
        constrain_along_path: Option<String>,
        /// Only follow edges whose lyph is within this lyph
        filter: Option<String>,
        /// With a filter, also follow edges that have no lyph
        include_lyphless: Option<bool>,
    },
    /// Create an edge
    NewEdge {
        /// Start node
        from: String,
        /// End node
        to: String,
        /// Edge name
        name: String,
        /// Edge type
        edge_type: String,
        /// FMA term
        fma: String,
        /// Optional lyph assigned to the new edge
        lyph: Option<String>,
    },
    /// Constrain an edge to a lyph
    EdgeConstrain {
        /// Lyph id
        lyph: String,
        /// Edge id
        edge: String,
    },
    /// Assign a lyph to an edge
    AssignLyph {
        /// Lyph id
        lyph: String,
        /// Edge id
        edge: String,
    },
    /// List every lyph
    ViewAllLyphs,
}

impl Intent {
    /// The operation this intent maps to
    #[must_use]
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::MaterialLookup { .. } => OperationKind::MaterialLookup,
            Self::AddLayer { .. } => OperationKind::LayerAdder,
            Self::CreateLyph { .. } => OperationKind::LyphAdder,
            Self::DisplayLyph { .. } => OperationKind::DisplayLyphById,
            Self::ShortestPath { .. } => OperationKind::ShortestPath,
            Self::NewEdge { .. } => OperationKind::NewEdge,
            Self::EdgeConstrain { .. } => OperationKind::EdgeConstrain,
            Self::AssignLyph { .. } => OperationKind::AssignLyph,
            Self::ViewAllLyphs => OperationKind::ViewAllLyphs,
        }
    }
}

/// Input rejected before any request was sent
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Lyph name is empty
    #[error("Please specify a name for the lyph")]
    MissingLyphName,
    /// Lyph type is empty
    #[error("Please specify a type (MIX or SHELL) for the lyph")]
    MissingLyphType,
    /// Fewer than two layers assembled
    #[error("Please specify at least two layers for the lyph")]
    TooFewLayers {
        /// Number of populated positions
        found: usize,
    },
    /// Both along-path modes chosen at once
    #[error("Specify either a lyph along the path or a constraint along the path, not both")]
    ConflictingPathOptions,
}

/// Build the query for an intent
///
/// Returns `Ok(None)` for the silent no-ops (an empty material id, lyph or
/// edge id), and `Err` when the user must be told why nothing was sent.
///
/// # Errors
///
/// Returns a [`ValidationError`] for lyph creation without name, type or two
/// layers, and for a shortest path with both along-path options set.
pub fn build(intent: &Intent, assembly: &LayerAssembly) -> Result<Option<Query>, ValidationError> {
    let kind = intent.kind();

    let path = match intent {
        Intent::MaterialLookup { material_id } => {
            let id = material_id.trim();
            if id.is_empty() {
                return Ok(None);
            }
            format!("/lyph/{}", encode_component(id))
        }

        Intent::AddLayer {
            material_id,
            thickness,
            color,
        } => {
            let id = material_id.trim();
            if id.is_empty() {
                return Ok(None);
            }
            PathBuilder::new("/makelayer/")
                .param("material", id)
                .optional("thickness", thickness.as_deref())
                .optional("color", color.as_deref())
                .finish()
        }

        Intent::CreateLyph { name, lyph_type } => {
            let name = name.trim();
            if name.is_empty() {
                return Err(ValidationError::MissingLyphName);
            }
            let lyph_type = lyph_type.trim().to_lowercase();
            if lyph_type.is_empty() {
                return Err(ValidationError::MissingLyphType);
            }
            if !assembly.is_composable() {
                return Err(ValidationError::TooFewLayers {
                    found: assembly.len(),
                });
            }

            // The server reads layer1, layer2, ... until the first gap,
            // so parameters are numbered by rank, not by position.
            assembly
                .layer_ids()
                .into_iter()
                .enumerate()
                .fold(
                    PathBuilder::new("/makelyph/")
                        .param("name", name)
                        .param("type", &lyph_type),
                    |path, (rank, id)| path.param(&format!("layer{}", rank + 1), id.as_str()),
                )
                .finish()
        }

        Intent::DisplayLyph { lyph_id } => format!("/lyph/{}", encode_component(lyph_id)),

        Intent::ShortestPath {
            from,
            to,
            lyph_along_path,
            constrain_along_path,
            filter,
            include_lyphless,
        } => {
            let path = match (
                non_empty(lyph_along_path.as_deref()),
                non_empty(constrain_along_path.as_deref()),
            ) {
                (Some(_), Some(_)) => return Err(ValidationError::ConflictingPathOptions),
                (Some(lyph), None) => PathBuilder::new("/lyph_along_path/").param("lyph", lyph),
                (None, Some(lyph)) => {
                    PathBuilder::new("/constrain_along_path/").param("lyph", lyph)
                }
                (None, None) => PathBuilder::new("/lyphpath/"),
            };

            log_blank_fields(kind, &[("from", from), ("to", to)]);
            let mut path = path.param("from", from).param("to", to);

            if let Some(filter) = non_empty(filter.as_deref()) {
                path = path.param("filter", filter);
                if let Some(include) = include_lyphless {
                    path = path.param("include_lyphless", if *include { "yes" } else { "no" });
                }
            }
            path.finish()
        }

        Intent::NewEdge {
            from,
            to,
            name,
            edge_type,
            fma,
            lyph,
        } => {
            log_blank_fields(
                kind,
                &[
                    ("from", from),
                    ("to", to),
                    ("name", name),
                    ("type", edge_type),
                    ("fma", fma),
                ],
            );
            PathBuilder::new("/makelyphedge/")
                .param("from", from)
                .param("to", to)
                .param("name", name)
                .param("type", edge_type)
                .param("fma", fma)
                .optional("lyph", lyph.as_deref())
                .finish()
        }

        Intent::EdgeConstrain { lyph, edge } | Intent::AssignLyph { lyph, edge } => {
            let (lyph, edge) = (lyph.trim(), edge.trim());
            if lyph.is_empty() || edge.is_empty() {
                return Ok(None);
            }
            let route = if kind == OperationKind::EdgeConstrain {
                "/edgeconstrain/"
            } else {
                "/assignlyph/"
            };
            PathBuilder::new(route)
                .param("edge", edge)
                .param("lyph", lyph)
                .finish()
        }

        Intent::ViewAllLyphs => "/all_lyphs/".to_string(),
    };

    Ok(Some(Query::new(kind, path)))
}

/// Trimmed value, or `None` when blank
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Blank required fields are still sent; log them so server rejections are traceable
fn log_blank_fields(kind: OperationKind, fields: &[(&str, &String)]) {
    for (name, value) in fields {
        if value.trim().is_empty() {
            tracing::debug!(kind = %kind, field = *name, "Sending blank required field");
        }
    }
}

/// Incrementally builds `route?key=value&key=value`
struct PathBuilder {
    path: String,
    has_params: bool,
}

impl PathBuilder {
    fn new(route: &str) -> Self {
        Self {
            path: route.to_string(),
            has_params: false,
        }
    }

    fn param(mut self, key: &str, value: &str) -> Self {
        self.path.push(if self.has_params { '&' } else { '?' });
        self.path.push_str(key);
        self.path.push('=');
        self.path.push_str(&encode_component(value));
        self.has_params = true;
        self
    }

    fn optional(self, key: &str, value: Option<&str>) -> Self {
        match non_empty(value) {
            Some(value) => self.param(key, value),
            None => self,
        }
    }

    fn finish(self) -> String {
        self.path
    }
}
