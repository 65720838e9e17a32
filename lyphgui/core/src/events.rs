//! Surface Events
//!
//! Actions sent from a surface to the Composer. Surfaces report what the user
//! did; the Composer decides what it means.

use serde::{Deserialize, Serialize};

use crate::query::Intent;

/// Actions from surface to Composer
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserAction {
    /// A form was submitted
    Submit(Intent),

    /// A palette material was chosen as the next layer's material
    PickPaletteEntry {
        /// Palette display position (from `data-palette-position`)
        position: usize,
    },

    /// A palette entry's "View" link was followed
    ViewPaletteEntry {
        /// Palette display position (from `data-palette-position`)
        position: usize,
    },

    /// Reset the layer stack, header and composition fields
    ClearDisplay,
}

impl From<Intent> for UserAction {
    fn from(intent: Intent) -> Self {
        Self::Submit(intent)
    }
}
