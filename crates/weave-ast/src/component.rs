//! Component descriptors.

use weave_core::{ComponentId, DeclId, EnvId, NodeId};

use crate::wiring::WiringGraph;

/// Module or configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// A component implemented in code.
    Module,
    /// A component implemented by wiring other components.
    Configuration,
}

/// One component, abstract or concrete.
///
/// Instances made for a concrete use of an abstract component are chained
/// to the descriptor they specialise through `original`; following the
/// chain to its end reaches the template whose wiring graph is never
/// instantiated.
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    /// Component name.
    pub name: String,
    /// Module or configuration.
    pub kind: ComponentKind,
    /// Whether the component takes compile-time arguments.
    pub is_abstract: bool,
    /// The descriptor this one specialises.
    pub original: Option<ComponentId>,
    /// Constant folding has run for this descriptor.
    pub folded: bool,
    /// The implementation has been cloned for this descriptor.
    pub instantiated: bool,
    /// Formal parameter declarations (`DataDecl` nodes).
    pub parameters: Vec<NodeId>,
    /// Module or configuration body.
    pub implementation: Option<NodeId>,
    /// Declarations of the specification: interface references, commands
    /// and events.
    pub specification: Vec<DeclId>,
    /// Specification scope.
    pub env: EnvId,
    /// Resolved wiring.
    pub connections: WiringGraph,
}

impl ComponentDescriptor {
    /// Create a descriptor with an empty specification and no body.
    pub fn new(name: impl Into<String>, kind: ComponentKind, is_abstract: bool, env: EnvId) -> Self {
        Self {
            name: name.into(),
            kind,
            is_abstract,
            original: None,
            folded: false,
            instantiated: false,
            parameters: Vec::new(),
            implementation: None,
            specification: Vec::new(),
            env,
            connections: WiringGraph::new(),
        }
    }

    /// Whether this is a configuration.
    pub fn is_configuration(&self) -> bool {
        self.kind == ComponentKind::Configuration
    }
}
