//! Weave: generic component instantiation for a nesC-style component
//! language.
//!
//! The workspace is split into three crates, re-exported here:
//!
//! - [`weave_core`]: ids, spans, constants, errors, target layout and
//!   configuration
//! - [`weave_ast`]: the compile-unit arena and program model
//! - [`weave_instantiate`]: forwarding, cloning, folding, wiring rebuild
//!   and the [`Instantiator`](weave_instantiate::Instantiator)
//!
//! ## Example
//!
//! ```
//! use weave::prelude::*;
//!
//! let mut unit = CompileUnit::new();
//! let queue = unit.new_component("QueueC", ComponentKind::Module, true);
//! let size = unit.add_parameter(queue, "size", Type::int());
//! let body = unit.module_body(Vec::new());
//! unit.set_implementation(queue, body);
//!
//! let use_site = unit.specification_copy(queue, false);
//! let arg = unit.int_lit(8);
//!
//! let config = InstantiateConfig::default().with_target(TargetLayout::avr());
//! let mut driver = Instantiator::new(&mut unit, &config);
//! driver.instantiate_use(use_site, &[arg]).unwrap();
//! let output = driver.finish();
//!
//! assert!(output.diagnostics.is_empty());
//! assert_eq!(unit.decl(size).value, Some(ConstValue::Int(8)));
//! ```

pub use weave_ast;
pub use weave_core;
pub use weave_instantiate;

pub mod prelude {
    pub use weave_ast::{
        BinaryOp, CompileUnit, ComponentDescriptor, ComponentKind, DeclFlags, DeclKind, Declaration,
        Endpoint, FunctionFlavor, NodeKind, Type, UnaryOp, WiringGraph,
    };
    pub use weave_core::{
        AddressBase, ComponentId, ConstValue, DeclId, Diagnostics, FoldError, InstantiateConfig,
        InternalFault, NodeId, Span, TargetLayout, WeaveError,
    };
    pub use weave_instantiate::{
        CallFolder, ConstantFolder, InstantiationOutput, InstantiationStats, Instantiator,
        MagicFunctions,
    };
}
