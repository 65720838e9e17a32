//! Console command parsing
//!
//! Each input line is split into words (double quotes group words) and parsed
//! with clap, so `help` and `<command> --help` work as usual.

use clap::{Parser, Subcommand};

use lyphgui_core::{Intent, UserAction};

/// One console input line
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_version_flag = true)]
struct Line {
    #[command(subcommand)]
    command: Command,
}

/// Console commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Look up a material and add it to the palette
    Lookup {
        /// Material id
        id: String,
    },

    /// Add a layer made of a material
    Layer {
        /// Material id
        material: String,
        /// Layer thickness
        #[arg(long)]
        thickness: Option<String>,
        /// Layer color
        #[arg(long)]
        color: Option<String>,
    },

    /// Create a lyph from the current layers
    Create {
        /// Lyph name
        name: String,
        /// Lyph type (mix or shell)
        #[arg(value_name = "TYPE")]
        lyph_type: String,
    },

    /// Display an existing lyph
    Show {
        /// Lyph id
        id: String,
    },

    /// Shortest path between two nodes
    Path {
        /// Start node
        from: String,
        /// End node
        to: String,
        /// Lyph to place along the path
        #[arg(long, conflicts_with = "constrain")]
        along: Option<String>,
        /// Lyph to add as a constraint along the path
        #[arg(long)]
        constrain: Option<String>,
        /// Only follow edges within this lyph
        #[arg(long)]
        filter: Option<String>,
        /// With --filter, also follow edges without a lyph (yes or no)
        #[arg(long, value_parser = parse_yes_no, requires = "filter")]
        include_lyphless: Option<bool>,
    },

    /// Create an edge between two nodes
    Edge {
        /// Start node
        from: String,
        /// End node
        to: String,
        /// Edge name
        name: String,
        /// Edge type
        #[arg(value_name = "TYPE")]
        edge_type: String,
        /// FMA term
        fma: String,
        /// Lyph to assign to the new edge
        #[arg(long)]
        lyph: Option<String>,
    },

    /// Constrain an edge to a lyph
    Constrain {
        /// Lyph id
        lyph: String,
        /// Edge id
        edge: String,
    },

    /// Assign a lyph to an edge
    Assign {
        /// Lyph id
        lyph: String,
        /// Edge id
        edge: String,
    },

    /// List every lyph on the server
    All,

    /// Use a palette entry as the next layer's material
    Pick {
        /// Palette position
        position: usize,
    },

    /// Display a palette entry as a lyph
    View {
        /// Palette position
        position: usize,
    },

    /// Clear the layer stack
    Clear,

    /// Leave the console
    #[command(alias = "exit")]
    Quit,
}

impl Command {
    /// The action this command sends, `None` for `quit`
    pub fn into_action(self) -> Option<UserAction> {
        let intent = match self {
            Self::Lookup { id } => Intent::MaterialLookup { material_id: id },
            Self::Layer {
                material,
                thickness,
                color,
            } => Intent::AddLayer {
                material_id: material,
                thickness,
                color,
            },
            Self::Create { name, lyph_type } => Intent::CreateLyph { name, lyph_type },
            Self::Show { id } => Intent::DisplayLyph { lyph_id: id },
            Self::Path {
                from,
                to,
                along,
                constrain,
                filter,
                include_lyphless,
            } => Intent::ShortestPath {
                from,
                to,
                lyph_along_path: along,
                constrain_along_path: constrain,
                filter,
                include_lyphless,
            },
            Self::Edge {
                from,
                to,
                name,
                edge_type,
                fma,
                lyph,
            } => Intent::NewEdge {
                from,
                to,
                name,
                edge_type,
                fma,
                lyph,
            },
            Self::Constrain { lyph, edge } => Intent::EdgeConstrain { lyph, edge },
            Self::Assign { lyph, edge } => Intent::AssignLyph { lyph, edge },
            Self::All => Intent::ViewAllLyphs,
            Self::Pick { position } => return Some(UserAction::PickPaletteEntry { position }),
            Self::View { position } => return Some(UserAction::ViewPaletteEntry { position }),
            Self::Clear => return Some(UserAction::ClearDisplay),
            Self::Quit => return None,
        };
        Some(UserAction::Submit(intent))
    }
}

/// Parse one input line; blank lines yield `Ok(None)`
pub fn parse_line(line: &str) -> Result<Option<Command>, clap::Error> {
    let words = split_words(line);
    if words.is_empty() {
        return Ok(None);
    }
    Line::try_parse_from(words).map(|parsed| Some(parsed.command))
}

/// Split on whitespace, keeping double-quoted runs together
fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut in_word = false;

    for c in line.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                in_word = true;
            }
            c if c.is_whitespace() && !quoted => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            c => {
                current.push(c);
                in_word = true;
            }
        }
    }
    if in_word {
        words.push(current);
    }
    words
}

fn parse_yes_no(value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        other => Err(format!("expected yes or no, got '{other}'")),
    }
}
