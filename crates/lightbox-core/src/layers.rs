//! Layer store
//!
//! An ordered stack of image layers with one active layer. Insertion order is
//! the display and cycling order. All operations are synchronous.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{FilterConfig, FilterField};

/// Errors from layer store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    /// The operation needs an active layer but the store is empty.
    #[error("No layers loaded")]
    EmptyCollection,

    /// An explicit index does not name a layer.
    #[error("Layer index {index} out of range ({len} layers)")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Which way to cycle through the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// One image in the stack.
///
/// The path is fixed once the layer exists; only the filter can be replaced,
/// and only as a whole value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    #[serde(rename = "path")]
    source_path: String,
    #[serde(rename = "mode")]
    filter: FilterConfig,
}

impl Layer {
    pub fn new(source_path: impl Into<String>, filter: FilterConfig) -> Self {
        Self {
            source_path: source_path.into(),
            filter,
        }
    }

    /// Path of the original image.
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Current filter configuration.
    pub fn filter(&self) -> &FilterConfig {
        &self.filter
    }
}

/// Ordered layers plus the active index.
///
/// `active` is `Some` exactly when `layers` is non-empty, and always in range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayerStore {
    layers: Vec<Layer>,
    active: Option<usize>,
}

impl LayerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a layer to the end of the stack.
    ///
    /// The first layer appended to an empty store becomes active; otherwise
    /// the active index is unchanged. Returns the new layer's index.
    pub fn append(&mut self, layer: Layer) -> usize {
        self.layers.push(layer);
        if self.active.is_none() {
            self.active = Some(0);
        }
        self.layers.len() - 1
    }

    /// Make the next layer active, wrapping to the first.
    pub fn cycle_next(&mut self) -> Result<usize, LayerError> {
        self.cycle(Direction::Next)
    }

    /// Make the previous layer active, wrapping to the last.
    pub fn cycle_previous(&mut self) -> Result<usize, LayerError> {
        self.cycle(Direction::Previous)
    }

    /// Move the active index one step, wrapping modulo the layer count.
    pub fn cycle(&mut self, direction: Direction) -> Result<usize, LayerError> {
        let current = self.active.ok_or(LayerError::EmptyCollection)?;
        let len = self.layers.len();
        let next = match direction {
            Direction::Next => (current + 1) % len,
            Direction::Previous => (current + len - 1) % len,
        };
        self.active = Some(next);
        Ok(next)
    }

    /// Jump straight to a layer.
    pub fn set_active(&mut self, index: usize) -> Result<(), LayerError> {
        if self.layers.is_empty() {
            return Err(LayerError::EmptyCollection);
        }
        if index >= self.layers.len() {
            return Err(LayerError::IndexOutOfRange {
                index,
                len: self.layers.len(),
            });
        }
        self.active = Some(index);
        Ok(())
    }

    /// Overwrite the active layer's filter with a new value.
    pub fn replace_active_filter(&mut self, filter: FilterConfig) -> Result<(), LayerError> {
        let index = self.active.ok_or(LayerError::EmptyCollection)?;
        self.layers[index].filter = filter;
        Ok(())
    }

    /// Replace a single field of the active layer's filter.
    ///
    /// Returns the filter now stored on the layer.
    pub fn update_active_filter(&mut self, field: FilterField) -> Result<FilterConfig, LayerError> {
        let current = self.active_layer().ok_or(LayerError::EmptyCollection)?;
        let updated = current.filter.with_field(field);
        self.replace_active_filter(updated)?;
        Ok(updated)
    }

    /// The active layer, or `None` if the store is empty.
    pub fn active_layer(&self) -> Option<&Layer> {
        self.active.map(|index| &self.layers[index])
    }

    pub fn active_index(&self) -> Option<usize> {
        self.active
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::FilterMode;

    fn store_with(paths: &[&str]) -> LayerStore {
        let mut store = LayerStore::new();
        for path in paths {
            store.append(Layer::new(*path, FilterConfig::default()));
        }
        store
    }

    #[test]
    fn test_empty_store() {
        let store = LayerStore::new();
        assert!(store.is_empty());
        assert_eq!(store.active_index(), None);
        assert!(store.active_layer().is_none());
    }

    #[test]
    fn test_first_append_activates() {
        let mut store = LayerStore::new();
        assert_eq!(store.append(Layer::new("a.png", FilterConfig::default())), 0);
        assert_eq!(store.active_index(), Some(0));
        assert_eq!(store.active_layer().unwrap().source_path(), "a.png");
    }

    #[test]
    fn test_append_keeps_active() {
        let mut store = store_with(&["a.png", "b.png"]);
        store.cycle_next().unwrap();
        assert_eq!(store.append(Layer::new("c.png", FilterConfig::default())), 2);
        assert_eq!(store.active_index(), Some(1));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_cycle_next_wraps() {
        let mut store = store_with(&["a", "b", "c"]);
        store.set_active(2).unwrap();
        assert_eq!(store.cycle_next(), Ok(0));
        assert_eq!(store.active_index(), Some(0));
    }

    #[test]
    fn test_cycle_previous_wraps() {
        let mut store = store_with(&["a", "b", "c"]);
        assert_eq!(store.cycle_previous(), Ok(2));
        assert_eq!(store.cycle_previous(), Ok(1));
        assert_eq!(store.cycle(Direction::Next), Ok(2));
    }

    #[test]
    fn test_cycle_single_layer() {
        let mut store = store_with(&["only"]);
        assert_eq!(store.cycle_next(), Ok(0));
        assert_eq!(store.cycle_previous(), Ok(0));
    }

    #[test]
    fn test_empty_store_errors_leave_state() {
        let mut store = LayerStore::new();
        assert_eq!(store.cycle_next(), Err(LayerError::EmptyCollection));
        assert_eq!(store.cycle_previous(), Err(LayerError::EmptyCollection));
        assert_eq!(
            store.replace_active_filter(FilterConfig::default()),
            Err(LayerError::EmptyCollection)
        );
        assert_eq!(
            store.update_active_filter(FilterField::Grayscale(true)),
            Err(LayerError::EmptyCollection)
        );
        assert_eq!(store.set_active(0), Err(LayerError::EmptyCollection));
        assert_eq!(store, LayerStore::new());
    }

    #[test]
    fn test_set_active_out_of_range() {
        let mut store = store_with(&["a", "b"]);
        assert_eq!(
            store.set_active(2),
            Err(LayerError::IndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(store.active_index(), Some(0));
    }

    #[test]
    fn test_replace_active_filter_only_touches_active() {
        let mut store = store_with(&["a", "b"]);
        let kept = *store.layers()[0].filter();
        store.cycle_next().unwrap();

        let filter = FilterConfig {
            mode: FilterMode::Threshold,
            ..FilterConfig::default()
        };
        store.replace_active_filter(filter).unwrap();

        assert_eq!(store.layers()[1].filter(), &filter);
        assert_eq!(store.layers()[0].filter(), &kept);
        assert_eq!(kept, FilterConfig::default());
    }

    #[test]
    fn test_update_active_filter() {
        let mut store = store_with(&["a"]);
        let updated = store
            .update_active_filter(FilterField::ThresholdPercent(75.0))
            .unwrap();
        assert_eq!(updated.threshold_percent, 75.0);
        assert_eq!(store.active_layer().unwrap().filter(), &updated);
    }

    #[test]
    fn test_layer_serialized_shape() {
        let layer = Layer::new("/tmp/a.png", FilterConfig::default());
        let value = serde_json::to_value(&layer).unwrap();
        assert_eq!(value["path"], "/tmp/a.png");
        assert_eq!(value["mode"]["type"], "normal");
        assert_eq!(value["mode"]["thresholdValue"], 50.0);
    }
}
