//! Typed indices into the compile-unit arena.
//!
//! Every entity produced by the front end or by instantiation lives in a
//! table owned by the compile unit and is addressed by one of these ids.
//! Ids are stable for the lifetime of the unit, so identity comparisons
//! reduce to index equality.

use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(u32);

        impl $name {
            /// Create an id from a raw table index.
            #[inline]
            pub const fn new(index: u32) -> Self {
                Self(index)
            }

            /// Create an id for the next slot of a table holding `len`
            /// entries.
            ///
            /// # Panics
            ///
            /// Panics if the table has outgrown the `u32` id space.
            #[inline]
            pub fn from_len(len: usize) -> Self {
                match u32::try_from(len) {
                    Ok(index) => Self(index),
                    Err(_) => panic!(concat!(stringify!($name), " space exhausted at {} entries"), len),
                }
            }

            /// Get the underlying table index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(index: u32) -> Self {
                Self::new(index)
            }
        }
    };
}

define_id!(
    /// Identifies a declaration (variable, function, constant, ...).
    DeclId,
    "decl_"
);

define_id!(
    /// Identifies a syntax node.
    NodeId,
    "node_"
);

define_id!(
    /// Identifies a component descriptor (module or configuration).
    ComponentId,
    "component_"
);

define_id!(
    /// Identifies a name-to-declaration environment.
    EnvId,
    "env_"
);
