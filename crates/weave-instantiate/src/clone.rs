//! Structural cloning of component trees.
//!
//! The cloner copies a subtree node by node into the compile unit,
//! rewriting declaration references through the forwarding table and
//! copying instance-private declarations as their definition sites are
//! met. Template nodes are read, never written.

use tracing::trace;
use weave_ast::{CompileUnit, NodeKind, WiringGraph};
use weave_core::{AddressBase, ComponentId, ConstValue, DeclId, InternalFault, NodeId};

use crate::context::{InstantiationContext, NestedUse};
use crate::forward::ForwardingTable;
use crate::rebuild::rebuild_wiring;

/// Copies subtrees for one instantiation.
pub struct Cloner<'a> {
    unit: &'a mut CompileUnit,
    ctx: &'a mut InstantiationContext,
}

impl<'a> Cloner<'a> {
    /// Create a cloner writing into `unit` under `ctx`.
    pub fn new(unit: &'a mut CompileUnit, ctx: &'a mut InstantiationContext) -> Self {
        Self { unit, ctx }
    }

    /// Clone every node of a list.
    pub fn clone_list(&mut self, nodes: &[NodeId]) -> Result<Vec<NodeId>, InternalFault> {
        nodes.iter().map(|node| self.clone_tree(*node)).collect()
    }

    /// Clone the subtree rooted at `old` and return the new root.
    ///
    /// The new root's `parent` is left for the caller to set.
    pub fn clone_tree(&mut self, old: NodeId) -> Result<NodeId, InternalFault> {
        let mut copy = self.unit.node(old).clone();
        copy.parent = None;
        forward_address(&mut copy.expr.cst, &self.ctx.forwarding);
        forward_address(&mut copy.expr.static_address, &self.ctx.forwarding);
        let new = self.unit.add_node(copy);
        self.ctx.nodes_cloned += 1;

        let mut kind = self.unit.node(new).kind.clone();
        let mut descend = true;
        match &mut kind {
            NodeKind::Identifier { decl }
            | NodeKind::Typename { decl }
            | NodeKind::InterfaceDeref { decl, .. } => {
                *decl = self.ctx.forwarding.forward(*decl);
            }
            NodeKind::FunctionDecl { decl, .. } => {
                if let Some(instance) = self.clone_declaration(*decl)? {
                    let record = self.unit.decl_mut(instance);
                    record.definition = Some(new);
                    if record.ast == Some(old) {
                        record.ast = Some(new);
                    }
                    *decl = instance;
                }
            }
            NodeKind::VariableDecl { decl, .. } => {
                if let Some(instance) = self.clone_declaration(*decl)? {
                    let record = self.unit.decl_mut(instance);
                    if record.definition == Some(old) {
                        record.definition = Some(new);
                    }
                    if record.ast == Some(old) {
                        record.ast = Some(new);
                    }
                    *decl = instance;
                }
            }
            NodeKind::Enumerator { decl, .. } => {
                if let Some(instance) = self.clone_declaration(*decl)? {
                    let record = self.unit.decl_mut(instance);
                    record.definition = Some(new);
                    record.ast = Some(new);
                    *decl = instance;
                }
            }
            NodeKind::Configuration { components, .. } => {
                for slot in components.iter_mut() {
                    let child = self.clone_tree(*slot)?;
                    self.unit.node_mut(child).parent = Some(new);
                    *slot = child;
                }
                descend = false;
            }
            _ => {}
        }

        if descend {
            for slot in kind.children_mut() {
                let child = self.clone_tree(*slot)?;
                self.unit.node_mut(child).parent = Some(new);
                *slot = child;
            }
        } else {
            // Connection nodes stay shared; the graph is what gets rebuilt.
            self.rebuild_container_wiring();
        }

        if let NodeKind::ComponentRef { component, args } = &mut kind {
            if self.unit.component(*component).is_abstract {
                *component = self.nested_copy(*component, args.clone())?;
            }
        }

        self.unit.node_mut(new).kind = kind;
        Ok(new)
    }

    fn clone_declaration(
        &mut self,
        decl: DeclId,
    ) -> Result<Option<DeclId>, InternalFault> {
        let before = self.ctx.forwarding.len();
        let instance = self.ctx.forwarding.clone_declaration(
            self.unit,
            self.ctx.container,
            self.ctx.env,
            decl,
        )?;
        if self.ctx.forwarding.len() > before {
            self.ctx.decls_cloned += 1;
        }
        Ok(instance)
    }

    /// Give a use of an abstract component its own specification copy and
    /// queue it for instantiation.
    fn nested_copy(
        &mut self,
        component: ComponentId,
        args: Vec<NodeId>,
    ) -> Result<ComponentId, InternalFault> {
        let copy = self.unit.specification_copy(component, false);
        let forwarding = &mut self.ctx.forwarding;
        let unit = &*self.unit;
        unit.for_each_specification_decl(copy, |decl| forwarding.seed_from_copy_shallow(unit, decl))?;
        trace!(
            template = %self.unit.component(component).name,
            copy = %self.unit.component(copy).name,
            "queued nested instantiation"
        );
        self.ctx.nested.push(NestedUse {
            component: copy,
            args,
        });
        Ok(copy)
    }

    /// Build the container's wiring graph from the root template's graph.
    fn rebuild_container_wiring(&mut self) {
        let root = self.unit.root_original(self.ctx.container);
        let source = self.unit.component(root).connections.clone();
        let mut target = WiringGraph::new();
        rebuild_wiring(&source, &mut target, &self.ctx.forwarding);
        self.unit.component_mut(self.ctx.container).connections = target;
    }
}

/// Point a folded address at the instance's copy of its declaration.
fn forward_address(value: &mut Option<ConstValue>, forwarding: &ForwardingTable) {
    if let Some(ConstValue::Address {
        base: AddressBase::Decl(decl),
        ..
    }) = value
    {
        *decl = forwarding.forward(*decl);
    }
}
