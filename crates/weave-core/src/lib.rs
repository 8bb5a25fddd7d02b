//! Core types shared by the weave crates.
//!
//! - [`Span`]: source locations
//! - [`DeclId`], [`NodeId`], [`ComponentId`], [`EnvId`]: arena indices
//! - [`ConstValue`]: folded constants and address constants
//! - [`FoldError`], [`InternalFault`], [`Diagnostics`]: error reporting
//! - [`TargetLayout`], [`InstantiateConfig`]: configuration

mod config;
mod const_value;
mod error;
mod ids;
mod span;
mod target;

pub use config::{DEFAULT_MAX_NESTING_DEPTH, InstantiateConfig};
pub use const_value::{AddressBase, ConstValue};
pub use error::{Diagnostics, FoldError, InternalFault, WeaveError};
pub use ids::{ComponentId, DeclId, EnvId, NodeId};
pub use span::Span;
pub use target::{SizeAlign, TargetLayout};
