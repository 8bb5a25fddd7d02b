//! The compile-unit arena.
//!
//! A [`CompileUnit`] owns every declaration, syntax node, component
//! descriptor and environment of one compilation. Entities are appended
//! and never removed; they are all released together when the unit is
//! dropped. Instantiation allocates its copies in the same tables.

use rustc_hash::FxHashMap;
use weave_core::{ComponentId, DeclId, EnvId, NodeId};

use crate::component::ComponentDescriptor;
use crate::decl::Declaration;
use crate::env::Environment;
use crate::node::Node;
use crate::wiring::WiringGraph;

/// Arena of all entities of one compilation.
#[derive(Debug, Clone)]
pub struct CompileUnit {
    decls: Vec<Declaration>,
    nodes: Vec<Node>,
    components: Vec<ComponentDescriptor>,
    envs: Vec<Environment>,
    global_env: EnvId,
    copies_made: usize,
}

impl Default for CompileUnit {
    fn default() -> Self {
        Self::new()
    }
}

impl CompileUnit {
    /// Create a unit with an empty global environment.
    pub fn new() -> Self {
        Self {
            decls: Vec::new(),
            nodes: Vec::new(),
            components: Vec::new(),
            envs: vec![Environment::new(None, false)],
            global_env: EnvId::new(0),
            copies_made: 0,
        }
    }

    /// The global environment.
    pub fn global_env(&self) -> EnvId {
        self.global_env
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    /// Append a declaration without binding its name anywhere.
    pub fn add_decl(&mut self, decl: Declaration) -> DeclId {
        let id = DeclId::from_len(self.decls.len());
        self.decls.push(decl);
        id
    }

    /// Get a declaration.
    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    /// Get a mutable reference to a declaration.
    pub fn decl_mut(&mut self, id: DeclId) -> &mut Declaration {
        &mut self.decls[id.index()]
    }

    /// Number of declarations in the unit.
    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    // ==========================================================================
    // Nodes
    // ==========================================================================

    /// Append a node.
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_len(self.nodes.len());
        self.nodes.push(node);
        id
    }

    /// Get a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    /// Get a mutable reference to a node.
    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Number of nodes in the unit.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Point every child of `parent` back at it.
    pub fn adopt_children(&mut self, parent: NodeId) {
        for child in self.node(parent).kind.children() {
            self.node_mut(child).parent = Some(parent);
        }
    }

    // ==========================================================================
    // Components
    // ==========================================================================

    /// Append a component descriptor.
    pub fn add_component(&mut self, component: ComponentDescriptor) -> ComponentId {
        let id = ComponentId::from_len(self.components.len());
        self.components.push(component);
        id
    }

    /// Get a component.
    pub fn component(&self, id: ComponentId) -> &ComponentDescriptor {
        &self.components[id.index()]
    }

    /// Get a mutable reference to a component.
    pub fn component_mut(&mut self, id: ComponentId) -> &mut ComponentDescriptor {
        &mut self.components[id.index()]
    }

    /// Number of components in the unit.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Follow `original` links to the template that was never instantiated.
    pub fn root_original(&self, id: ComponentId) -> ComponentId {
        let mut current = id;
        while let Some(original) = self.component(current).original {
            current = original;
        }
        current
    }

    /// Number of `original` links between a component and its root template.
    pub fn original_depth(&self, id: ComponentId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(original) = self.component(current).original {
            current = original;
            depth += 1;
        }
        depth
    }

    /// Call `f` for every declaration of a component's specification.
    ///
    /// Stops at the first error.
    pub fn for_each_specification_decl<E>(
        &self,
        component: ComponentId,
        mut f: impl FnMut(DeclId) -> Result<(), E>,
    ) -> Result<(), E> {
        for decl in &self.component(component).specification {
            f(*decl)?;
        }
        Ok(())
    }

    /// Make a shallow specialisation of a component for one concrete use.
    ///
    /// The copy gets its own specification declarations, each shadowing
    /// the corresponding declaration of `source`, an `original` link to
    /// `source` and an empty wiring graph. Parameters and implementation
    /// are shared with `source` until the copy is instantiated.
    ///
    /// A use inside an abstract configuration stays abstract
    /// (`is_abstract`), so instantiating that configuration gives it a copy
    /// of its own. Every other use is concrete.
    pub fn specification_copy(&mut self, source: ComponentId, is_abstract: bool) -> ComponentId {
        self.copies_made += 1;
        let id = ComponentId::from_len(self.components.len());
        let env = self.new_environment(Some(self.global_env), false);

        let template = self.component(source);
        let name = format!("{}#{}", template.name, self.copies_made);
        let kind = template.kind;
        let parameters = template.parameters.clone();
        let implementation = template.implementation;
        let source_spec = template.specification.clone();

        let mut copied: FxHashMap<DeclId, DeclId> = FxHashMap::default();
        let mut specification = Vec::with_capacity(source_spec.len());
        for decl in source_spec {
            let copy = self.declare(env, decl);
            let record = self.decl_mut(copy);
            record.shadowed = Some(decl);
            record.container = Some(id);
            record.uses.clear();
            record.fn_uses.clear();
            copied.insert(decl, copy);
            specification.push(copy);
        }
        for copy in &specification {
            if let Some(interface) = self.decl(*copy).interface {
                let remapped = copied.get(&interface).copied().unwrap_or(interface);
                self.decl_mut(*copy).interface = Some(remapped);
            }
        }

        let mut descriptor = ComponentDescriptor::new(name, kind, is_abstract, env);
        descriptor.original = Some(source);
        descriptor.parameters = parameters;
        descriptor.implementation = implementation;
        descriptor.specification = specification;
        descriptor.connections = WiringGraph::new();
        self.add_component(descriptor)
    }

    // ==========================================================================
    // Environments
    // ==========================================================================

    /// Create an environment.
    pub fn new_environment(&mut self, parent: Option<EnvId>, parameter_level: bool) -> EnvId {
        let id = EnvId::from_len(self.envs.len());
        self.envs.push(Environment::new(parent, parameter_level));
        id
    }

    /// Get an environment.
    pub fn environment(&self, id: EnvId) -> &Environment {
        &self.envs[id.index()]
    }

    /// Declare a new declaration in an environment.
    pub fn declare_new(&mut self, env: EnvId, mut decl: Declaration) -> DeclId {
        decl.env = Some(env);
        let name = decl.name.clone();
        let id = self.add_decl(decl);
        self.envs[env.index()].insert(name, id);
        id
    }

    /// Declare a copy of an existing declaration in an environment.
    pub fn declare(&mut self, env: EnvId, template: DeclId) -> DeclId {
        let copy = self.decl(template).clone();
        self.declare_new(env, copy)
    }

    /// Resolve a name through an environment and its parents.
    pub fn lookup(&self, env: EnvId, name: &str) -> Option<DeclId> {
        let mut current = Some(env);
        while let Some(id) = current {
            let scope = self.environment(id);
            if let Some(decl) = scope.get(name) {
                return Some(decl);
            }
            current = scope.parent;
        }
        None
    }
}
