//! Material Palette
//!
//! Deduplicated registry of every material looked up or used during the
//! session. Entries get a display position at insertion time; positions are
//! never reused and the palette never shrinks.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::{Identifier, Material};
use crate::view;

/// A material together with its palette display position
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaletteEntry {
    /// Display position (0-based, insertion order)
    pub position: usize,
    /// The material
    pub material: Material,
}

/// Session-scoped, append-only material palette
#[derive(Clone, Debug, Default)]
pub struct PaletteStore {
    entries: Vec<PaletteEntry>,
    by_id: HashMap<Identifier, usize>,
}

impl PaletteStore {
    /// Create an empty palette
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a material, or return the existing entry with the same id
    ///
    /// Adding an id that is already present performs no mutation.
    pub fn add(&mut self, material: Material) -> &PaletteEntry {
        if let Some(&position) = self.by_id.get(&material.id) {
            return &self.entries[position];
        }

        let position = self.entries.len();
        self.by_id.insert(material.id.clone(), position);
        self.entries.push(PaletteEntry { position, material });

        tracing::debug!(position, "Material added to palette");
        &self.entries[position]
    }

    /// Look up an entry by display position
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&PaletteEntry> {
        self.entries.get(position)
    }

    /// Look up an entry by material id
    #[must_use]
    pub fn find(&self, id: &Identifier) -> Option<&PaletteEntry> {
        self.by_id.get(id).map(|&position| &self.entries[position])
    }

    /// Whether a material with this id is present
    #[must_use]
    pub fn contains(&self, id: &Identifier) -> bool {
        self.by_id.contains_key(id)
    }

    /// Entries in insertion order
    #[must_use]
    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    /// Number of distinct materials
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the palette is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the palette list, most recently added first
    #[must_use]
    pub fn render(&self) -> String {
        view::render_palette(&self.entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_positions() {
        let mut palette = PaletteStore::new();
        assert_eq!(palette.add(Material::new("M1", "Mat1")).position, 0);
        assert_eq!(palette.add(Material::new("M2", "Mat2")).position, 1);
        assert_eq!(palette.len(), 2);
    }

    #[test]
    fn test_add_is_idempotent_by_id() {
        let mut palette = PaletteStore::new();
        palette.add(Material::new("M1", "Mat1"));

        // Same id, different name: existing entry wins, nothing changes
        let entry = palette.add(Material::new("M1", "Renamed")).clone();
        assert_eq!(entry.position, 0);
        assert_eq!(entry.material.name, "Mat1");
        assert_eq!(palette.len(), 1);
    }

    #[test]
    fn test_count_matches_distinct_ids() {
        let ids = ["a", "b", "a", "c", "b", "b", "d", "a"];
        let mut palette = PaletteStore::new();
        for id in ids {
            palette.add(Material::new(id, "x"));
        }
        assert_eq!(palette.len(), 4);

        // Order of insertion does not matter for the count
        let mut reversed = PaletteStore::new();
        for id in ids.iter().rev() {
            reversed.add(Material::new(*id, "x"));
        }
        assert_eq!(reversed.len(), 4);
    }

    #[test]
    fn test_lookup_by_position_and_id() {
        let mut palette = PaletteStore::new();
        palette.add(Material::new("M1", "Mat1"));
        palette.add(Material::new("M2", "Mat2"));

        assert_eq!(palette.get(1).unwrap().material.id.as_str(), "M2");
        assert!(palette.get(2).is_none());
        assert_eq!(palette.find(&Identifier::from("M1")).unwrap().position, 0);
        assert!(palette.contains(&Identifier::from("M2")));
        assert!(!palette.contains(&Identifier::from("M3")));
    }

    #[test]
    fn test_render_lists_newest_first() {
        let mut palette = PaletteStore::new();
        palette.add(Material::new("OLD", "first"));
        palette.add(Material::new("NEW", "second"));

        let html = palette.render();
        let newest = html.find("NEW").unwrap();
        let oldest = html.find("OLD").unwrap();
        assert!(newest < oldest);
    }
}
