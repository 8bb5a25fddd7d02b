//! Per-instantiation state.

use weave_core::{ComponentId, EnvId, NodeId};

use crate::forward::ForwardingTable;

/// A use of an abstract component found while cloning a configuration.
///
/// The component is a fresh specification copy that still has to be
/// folded and instantiated with `args`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NestedUse {
    /// The copy made for this use.
    pub component: ComponentId,
    /// The cloned argument expressions.
    pub args: Vec<NodeId>,
}

/// State carried through one call to `instantiate`.
#[derive(Debug)]
pub struct InstantiationContext {
    /// The component receiving the copies.
    pub container: ComponentId,
    /// Environment new declarations are declared in.
    pub env: EnvId,
    /// Template-to-instance declaration map.
    pub forwarding: ForwardingTable,
    /// Abstract component uses met while cloning.
    pub nested: Vec<NestedUse>,
    /// Declarations copied so far.
    pub decls_cloned: usize,
    /// Nodes copied so far.
    pub nodes_cloned: usize,
}

impl InstantiationContext {
    /// Start an instantiation of `container`, declaring into `env`.
    pub fn new(container: ComponentId, env: EnvId) -> Self {
        Self {
            container,
            env,
            forwarding: ForwardingTable::new(),
            nested: Vec::new(),
            decls_cloned: 0,
            nodes_cloned: 0,
        }
    }
}
