//! Name-to-declaration scopes.

use rustc_hash::FxHashMap;
use weave_core::{DeclId, EnvId};

/// A scope mapping names to declarations, with an optional parent scope.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// Enclosing scope.
    pub parent: Option<EnvId>,
    /// Whether this scope holds component parameters.
    pub parameter_level: bool,
    names: FxHashMap<String, DeclId>,
}

impl Environment {
    /// Create an empty environment.
    pub fn new(parent: Option<EnvId>, parameter_level: bool) -> Self {
        Self {
            parent,
            parameter_level,
            names: FxHashMap::default(),
        }
    }

    /// Bind a name in this scope, replacing any previous binding.
    pub fn insert(&mut self, name: impl Into<String>, decl: DeclId) {
        self.names.insert(name.into(), decl);
    }

    /// Look a name up in this scope only.
    pub fn get(&self, name: &str) -> Option<DeclId> {
        self.names.get(name).copied()
    }

    /// Number of names bound in this scope.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether no names are bound in this scope.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut env = Environment::new(None, false);
        assert!(env.is_empty());
        env.insert("x", DeclId::new(1));
        assert_eq!(env.get("x"), Some(DeclId::new(1)));
        assert_eq!(env.get("y"), None);

        env.insert("x", DeclId::new(2));
        assert_eq!(env.get("x"), Some(DeclId::new(2)));
        assert_eq!(env.len(), 1);
    }
}
