//! Deciding how much work a new render input needs.

use crate::FilterConfig;

/// Everything a render depends on, borrowed from the active layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderInput<'a> {
    pub source_path: &'a str,
    pub filter: FilterConfig,
}

impl<'a> RenderInput<'a> {
    pub fn new(source_path: &'a str, filter: FilterConfig) -> Self {
        Self {
            source_path,
            filter,
        }
    }
}

impl<'a> From<&'a crate::Layer> for RenderInput<'a> {
    fn from(layer: &'a crate::Layer) -> Self {
        Self::new(layer.source_path(), *layer.filter())
    }
}

/// What changed between two render inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// The source path differs (or there was no previous input): fetch and decode.
    Reload,
    /// Same source, different filter: re-filter the cached decode.
    FilterOnly,
    /// Nothing changed: keep the previous output.
    Unchanged,
}

/// Compare the previous render input with the next one, field by field.
pub fn classify(previous: Option<RenderInput<'_>>, next: RenderInput<'_>) -> Change {
    match previous {
        None => Change::Reload,
        Some(prev) if prev.source_path != next.source_path => Change::Reload,
        Some(prev) if prev.filter != next.filter => Change::FilterOnly,
        Some(_) => Change::Unchanged,
    }
}
