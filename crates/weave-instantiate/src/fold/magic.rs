//! Folding of function calls.
//!
//! Ordinary calls are never constant. The [`CallFolder`] seam lets a
//! compiler recognise its own compile-time functions; [`MagicFunctions`]
//! implements the `unique` family:
//!
//! - `unique("key")`: a fresh number per call, counting from 0 per key
//! - `uniqueN("key", n)`: the first of `n` consecutive fresh numbers
//! - `uniqueCount("key")`: how many numbers have been handed out for `key`

use rustc_hash::FxHashMap;
use tracing::trace;
use weave_ast::{CompileUnit, NodeKind};
use weave_core::{AddressBase, ConstValue, NodeId};

/// Folds calls to compile-time functions.
pub trait CallFolder {
    /// The constant value of the call `callee(args)`, if it has one.
    ///
    /// `callee` and `args` have already been folded.
    fn fold_call(&mut self, unit: &CompileUnit, callee: NodeId, args: &[NodeId]) -> Option<ConstValue>;
}

/// A folder that treats every call as non-constant.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCalls;

impl CallFolder for NoCalls {
    fn fold_call(&mut self, _unit: &CompileUnit, _callee: NodeId, _args: &[NodeId]) -> Option<ConstValue> {
        None
    }
}

/// The `unique`, `uniqueN` and `uniqueCount` functions.
#[derive(Debug, Clone, Default)]
pub struct MagicFunctions {
    counters: FxHashMap<String, u64>,
}

impl MagicFunctions {
    /// Create a folder with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Numbers handed out so far for `key`.
    pub fn count(&self, key: &str) -> u64 {
        self.counters.get(key).copied().unwrap_or(0)
    }

    fn take(&mut self, key: &str, n: u64) -> Option<u64> {
        let counter = self.counters.entry(key.to_string()).or_insert(0);
        let first = *counter;
        *counter = first.checked_add(n)?;
        Some(first)
    }
}

/// The string a folded argument denotes.
fn string_arg(unit: &CompileUnit, arg: NodeId) -> Option<String> {
    let attrs = &unit.node(arg).expr;
    match attrs.cst.as_ref().or(attrs.static_address.as_ref())? {
        ConstValue::Address {
            base: AddressBase::String(value),
            offset: 0,
        } => Some(value.clone()),
        _ => None,
    }
}

fn callee_name(unit: &CompileUnit, callee: NodeId) -> Option<&str> {
    match &unit.node(callee).kind {
        NodeKind::Identifier { decl } => {
            let record = unit.decl(*decl);
            // Only the global declarations count, not a module's own `unique`.
            record.container.is_none().then_some(record.name.as_str())
        }
        _ => None,
    }
}

impl CallFolder for MagicFunctions {
    fn fold_call(&mut self, unit: &CompileUnit, callee: NodeId, args: &[NodeId]) -> Option<ConstValue> {
        let name = callee_name(unit, callee)?;
        let value = match (name, args) {
            ("unique", [key]) => self.take(&string_arg(unit, *key)?, 1)?,
            ("uniqueN", [key, n]) => {
                let n = unit.node(*n).expr.cst.as_ref()?.as_i128()?;
                self.take(&string_arg(unit, *key)?, u64::try_from(n).ok()?)?
            }
            ("uniqueCount", [key]) => self.count(&string_arg(unit, *key)?),
            _ => return None,
        };
        trace!(function = name, value, "folded magic function");
        Some(ConstValue::UInt(value))
    }
}
