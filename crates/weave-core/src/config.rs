//! Instantiation configuration.

use crate::TargetLayout;

/// Default limit on nested abstract-component instantiation.
pub const DEFAULT_MAX_NESTING_DEPTH: usize = 16;

/// Settings for one instantiation pass.
///
/// # Example
///
/// ```
/// use weave_core::{InstantiateConfig, TargetLayout};
///
/// let config = InstantiateConfig::new()
///     .with_target(TargetLayout::avr())
///     .with_max_nesting_depth(4);
/// assert_eq!(config.target.pointer.size, 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstantiateConfig {
    /// Machine description used for sizes, alignments and integer widths.
    pub target: TargetLayout,
    /// Maximum depth of abstract components instantiated from inside other
    /// abstract components.
    pub max_nesting_depth: usize,
}

impl InstantiateConfig {
    /// Configuration for the host target with the default nesting limit.
    pub fn new() -> Self {
        Self {
            target: TargetLayout::default(),
            max_nesting_depth: DEFAULT_MAX_NESTING_DEPTH,
        }
    }

    /// Use a different target description.
    pub fn with_target(mut self, target: TargetLayout) -> Self {
        self.target = target;
        self
    }

    /// Change the nesting limit.
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        self.max_nesting_depth = depth;
        self
    }
}

impl Default for InstantiateConfig {
    fn default() -> Self {
        Self::new()
    }
}
