//! Generic component instantiation.
//!
//! An abstract component is a template: its parameters, private
//! declarations and body are shared until a concrete use asks for an
//! instance. Instantiation folds the use's arguments into the template,
//! then copies the template into the instance so that every use owns its
//! own declarations, syntax and wiring.
//!
//! ## Modules
//!
//! - [`forward`]: template-to-instance declaration map
//! - [`clone`]: structural tree copying
//! - [`fold`]: constant folding against a target layout
//! - [`rebuild`]: wiring graph copying for configurations
//! - [`driver`]: the [`Instantiator`] tying them together

pub mod clone;
pub mod context;
pub mod driver;
pub mod fold;
pub mod forward;
pub mod rebuild;

pub use clone::Cloner;
pub use context::{InstantiationContext, NestedUse};
pub use driver::{InstantiationOutput, InstantiationStats, Instantiator};
pub use fold::ConstantFolder;
pub use fold::magic::{CallFolder, MagicFunctions, NoCalls};
pub use forward::ForwardingTable;
pub use rebuild::rebuild_wiring;
