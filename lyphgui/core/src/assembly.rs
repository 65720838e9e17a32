//! Layer Assembly
//!
//! The ordered, position-indexed stack of layers being composed into a new
//! lyph. Positions are 1-based. During normal composition they form a
//! contiguous run `1..=k`; a lyph needs at least two layers before it can be
//! submitted for creation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Identifier, Layer};
use crate::view;

/// Minimum number of layers a lyph must have to be created
pub const MIN_COMPOSABLE_LAYERS: usize = 2;

/// A layer together with its 1-based stack position
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionedLayer {
    /// 1-based stack position
    pub position: usize,
    /// The layer
    pub layer: Layer,
}

/// Sparse mapping from 1-based position to layer
#[derive(Clone, Debug, Default)]
pub struct LayerAssembly {
    layers: BTreeMap<usize, Layer>,
}

impl LayerAssembly {
    /// Create an empty assembly
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer after the highest occupied position
    ///
    /// Returns the assigned position (`1` when empty).
    pub fn append(&mut self, layer: Layer) -> usize {
        let position = self.layers.keys().next_back().map_or(1, |max| max + 1);
        self.layers.insert(position, layer);
        position
    }

    /// Store a layer at an explicit position, replacing any existing one
    ///
    /// Used when replaying a server-returned lyph. Position 0 is not a valid
    /// stack position and is ignored.
    pub fn insert_at(&mut self, position: usize, layer: Layer) -> Option<Layer> {
        if position == 0 {
            tracing::warn!("Ignoring layer insert at position 0");
            return None;
        }
        self.layers.insert(position, layer)
    }

    /// Remove every layer
    pub fn reset(&mut self) {
        self.layers.clear();
    }

    /// Occupied positions, ascending
    #[must_use]
    pub fn positions(&self) -> Vec<usize> {
        self.layers.keys().copied().collect()
    }

    /// Layer at a position
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&Layer> {
        self.layers.get(&position)
    }

    /// Iterate `(position, layer)` pairs in ascending position order
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Layer)> {
        self.layers.iter().map(|(position, layer)| (*position, layer))
    }

    /// Layer ids in ascending position order
    #[must_use]
    pub fn layer_ids(&self) -> Vec<&Identifier> {
        self.layers.values().map(|layer| &layer.id).collect()
    }

    /// Snapshot of the stack for view messages
    #[must_use]
    pub fn positioned(&self) -> Vec<PositionedLayer> {
        self.iter()
            .map(|(position, layer)| PositionedLayer {
                position,
                layer: layer.clone(),
            })
            .collect()
    }

    /// Number of populated positions
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Whether no layer is populated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    /// Whether enough layers are populated to create a lyph
    #[must_use]
    pub fn is_composable(&self) -> bool {
        self.layers.len() >= MIN_COMPOSABLE_LAYERS
    }

    /// Render the layer list
    #[must_use]
    pub fn render(&self) -> String {
        view::render_layers(&self.positioned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Material;

    fn layer(id: &str) -> Layer {
        Layer::new(id, Material::new(format!("M_{id}"), "mat"))
    }

    #[test]
    fn test_append_starts_at_one() {
        let mut assembly = LayerAssembly::new();
        assert_eq!(assembly.append(layer("A")), 1);
        assert_eq!(assembly.append(layer("B")), 2);
        assert_eq!(assembly.positions(), vec![1, 2]);
    }

    #[test]
    fn test_append_uses_max_position() {
        let mut assembly = LayerAssembly::new();
        assembly.insert_at(3, layer("C"));
        assembly.insert_at(1, layer("A"));

        // Gap at 2 is not filled: next is max + 1
        assert_eq!(assembly.append(layer("D")), 4);
        assert_eq!(assembly.positions(), vec![1, 3, 4]);
    }

    #[test]
    fn test_reset_restarts_numbering() {
        let mut assembly = LayerAssembly::new();
        assembly.append(layer("A"));
        assembly.append(layer("B"));
        assembly.reset();

        assert!(assembly.is_empty());
        assert_eq!(assembly.append(layer("C")), 1);
    }

    #[test]
    fn test_insert_at_overwrites() {
        let mut assembly = LayerAssembly::new();
        assembly.insert_at(1, layer("A"));
        let replaced = assembly.insert_at(1, layer("B"));

        assert_eq!(replaced.unwrap().id.as_str(), "A");
        assert_eq!(assembly.get(1).unwrap().id.as_str(), "B");
        assert_eq!(assembly.len(), 1);
    }

    #[test]
    fn test_insert_at_zero_is_ignored() {
        let mut assembly = LayerAssembly::new();
        assert!(assembly.insert_at(0, layer("A")).is_none());
        assert!(assembly.is_empty());
    }

    #[test]
    fn test_is_composable_threshold() {
        let mut assembly = LayerAssembly::new();
        assert!(!assembly.is_composable());
        assembly.append(layer("A"));
        assert!(!assembly.is_composable());
        assembly.append(layer("B"));
        assert!(assembly.is_composable());
        assembly.append(layer("C"));
        assert!(assembly.is_composable());
    }

    #[test]
    fn test_layer_ids_ascending() {
        let mut assembly = LayerAssembly::new();
        assembly.insert_at(2, layer("B"));
        assembly.insert_at(1, layer("A"));

        let ids: Vec<&str> = assembly.layer_ids().into_iter().map(Identifier::as_str).collect();
        assert_eq!(ids, vec!["A", "B"]);
    }
}
