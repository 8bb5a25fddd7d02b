//! The program model that instantiation operates on.
//!
//! Everything lives in a [`CompileUnit`] arena and is addressed by the
//! index types from `weave_core`:
//!
//! - [`Declaration`]: named entities, linked to the declarations they shadow
//! - [`Node`]: syntax nodes with their expression attributes
//! - [`ComponentDescriptor`]: modules and configurations
//! - [`Environment`]: name scopes
//! - [`WiringGraph`]: resolved configuration wiring

mod builder;
mod component;
mod decl;
mod env;
mod node;
mod ops;
mod types;
mod unit;
mod wiring;

pub use component::{ComponentDescriptor, ComponentKind};
pub use decl::{DeclFlags, DeclKind, Declaration, FunctionFlavor};
pub use env::Environment;
pub use node::{ExprAttrs, Node, NodeKind};
pub use ops::{BinaryOp, UnaryOp};
pub use types::{Field, FloatKind, IntKind, Type};
pub use unit::CompileUnit;
pub use wiring::{Endpoint, WiringGraph};
