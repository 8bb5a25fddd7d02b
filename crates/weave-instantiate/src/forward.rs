//! Symbol forwarding: template declaration to instance declaration.
//!
//! One [`ForwardingTable`] exists per instantiation. It is seeded from the
//! component specification before cloning starts and grows as the cloner
//! copies instance-private declarations. References in cloned nodes are
//! rewritten through [`ForwardingTable::forward`]; anything without an
//! entry (globals, declarations of other components) is left as is.

use rustc_hash::FxHashMap;
use tracing::trace;
use weave_ast::CompileUnit;
use weave_core::{ComponentId, DeclId, EnvId, InternalFault};

/// Map from template declarations to their per-instance copies.
#[derive(Debug, Clone, Default)]
pub struct ForwardingTable {
    links: FxHashMap<DeclId, DeclId>,
}

impl ForwardingTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// The instance declaration for `decl`, or `decl` itself when it has
    /// none.
    pub fn forward(&self, decl: DeclId) -> DeclId {
        self.links.get(&decl).copied().unwrap_or(decl)
    }

    /// The instance declaration for `decl`, if one exists.
    pub fn get(&self, decl: DeclId) -> Option<DeclId> {
        self.links.get(&decl).copied()
    }

    /// Record that `from` is instantiated as `to`.
    pub fn insert(&mut self, from: DeclId, to: DeclId) {
        self.links.insert(from, to);
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Give `decl` a per-instance copy in `env`, owned by `container`.
    ///
    /// Returns the instance declaration after the call, if there is one.
    /// A declaration already forwarded to a copy owned by `container` is
    /// left alone, so cloning the same declaration twice yields one copy.
    /// Declarations of other kinds, and those with no container (globals),
    /// are not copied.
    pub fn clone_declaration(
        &mut self,
        unit: &mut CompileUnit,
        container: ComponentId,
        env: EnvId,
        decl: DeclId,
    ) -> Result<Option<DeclId>, InternalFault> {
        if let Some(existing) = self.get(decl) {
            if unit.decl(existing).container == Some(container) {
                return Ok(Some(existing));
            }
        }

        let record = unit.decl(decl);
        if record.is_command_or_event() {
            return Err(InternalFault::CloneCommandOrEvent {
                name: record.name.clone(),
            });
        }
        if !record.is_instance_private_kind() || record.container.is_none() {
            return Ok(self.get(decl));
        }

        let copy = unit.declare(env, decl);
        self.insert(decl, copy);
        let instance = unit.decl_mut(copy);
        instance.uses.clear();
        instance.fn_uses.clear();
        instance.shadowed = Some(decl);
        instance.container = Some(container);
        trace!(name = %instance.name, %decl, %copy, "cloned declaration");
        Ok(Some(copy))
    }

    /// Map the template declaration `depth` shadow links above `decl` to
    /// `decl`.
    ///
    /// `decl` belongs to the specification of the descriptor being
    /// instantiated and `depth` is the length of that descriptor's
    /// `original` chain.
    pub fn seed_from_copy(
        &mut self,
        unit: &CompileUnit,
        decl: DeclId,
        depth: usize,
    ) -> Result<(), InternalFault> {
        let missing = || InternalFault::MissingShadow {
            name: unit.decl(decl).name.clone(),
            depth,
        };

        let mut template = decl;
        for _ in 0..depth {
            template = unit.decl(template).shadowed.ok_or_else(missing)?;
        }
        if template == decl {
            return Err(missing());
        }

        trace!(%template, %decl, depth, "seeded forwarding");
        self.insert(template, decl);
        Ok(())
    }

    /// Map the declaration `decl` directly shadows to `decl`.
    pub fn seed_from_copy_shallow(
        &mut self,
        unit: &CompileUnit,
        decl: DeclId,
    ) -> Result<(), InternalFault> {
        self.seed_from_copy(unit, decl, 1)
    }
}
