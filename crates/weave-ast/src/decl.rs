//! Declarations: the named compile-time entities of a program.

use bitflags::bitflags;
use weave_core::{ComponentId, ConstValue, DeclId, EnvId, NodeId};

use crate::types::Type;

/// Flavour of a function declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionFlavor {
    /// An ordinary C function.
    Plain,
    /// A deferred task.
    Task,
    /// A command of a component specification.
    Command,
    /// An event of a component specification.
    Event,
}

/// What a declaration declares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeclKind {
    /// A variable (including component parameters).
    Variable,
    /// A function, task, command or event.
    Function(FunctionFlavor),
    /// A named constant (enumerators).
    Constant,
    /// A type alias.
    Typedef,
    /// A use of an interface in a component specification.
    InterfaceRef,
    /// A component name.
    Component(ComponentId),
}

bitflags! {
    /// Boolean properties of a declaration.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct DeclFlags: u8 {
        /// A formal parameter of an abstract component.
        const PARAMETER = 0b0001;
        /// Lives in static storage (globals, module variables, statics).
        const STATIC_STORAGE = 0b0010;
        /// Has a definition (not just a declaration).
        const DEFINED = 0b0100;
    }
}

/// A named compile-time entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// Source name.
    pub name: String,
    /// What is declared.
    pub kind: DeclKind,
    /// Declared type.
    pub ty: Type,
    /// The component whose private namespace owns this declaration, or
    /// `None` for globals.
    pub container: Option<ComponentId>,
    /// The declaration this one specialises.
    pub shadowed: Option<DeclId>,
    /// Bound constant value (component parameters, enumerators).
    pub value: Option<ConstValue>,
    /// The node defining this declaration.
    pub definition: Option<NodeId>,
    /// The node where this declaration was first introduced.
    pub ast: Option<NodeId>,
    /// For commands and events, the interface reference they belong to.
    pub interface: Option<DeclId>,
    /// Expression nodes using this declaration.
    pub uses: Vec<NodeId>,
    /// Functions this function calls.
    pub fn_uses: Vec<DeclId>,
    /// Boolean properties.
    pub flags: DeclFlags,
    /// The environment the declaration was declared in.
    pub env: Option<EnvId>,
}

impl Declaration {
    /// Create a declaration with no links.
    pub fn new(name: impl Into<String>, kind: DeclKind, ty: Type) -> Self {
        Self {
            name: name.into(),
            kind,
            ty,
            container: None,
            shadowed: None,
            value: None,
            definition: None,
            ast: None,
            interface: None,
            uses: Vec::new(),
            fn_uses: Vec::new(),
            flags: DeclFlags::empty(),
            env: None,
        }
    }

    /// Set the owning component.
    pub fn with_container(mut self, container: ComponentId) -> Self {
        self.container = Some(container);
        self
    }

    /// Add flags.
    pub fn with_flags(mut self, flags: DeclFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Whether this is a command or an event.
    pub fn is_command_or_event(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Function(FunctionFlavor::Command | FunctionFlavor::Event)
        )
    }

    /// Whether this is any kind of function.
    pub fn is_function(&self) -> bool {
        matches!(self.kind, DeclKind::Function(_))
    }

    /// Whether instantiation copies declarations of this kind.
    ///
    /// Variables, functions (including tasks), constants and typedefs are
    /// private to a module and get a fresh copy per instance.
    pub fn is_instance_private_kind(&self) -> bool {
        matches!(
            self.kind,
            DeclKind::Variable | DeclKind::Function(_) | DeclKind::Constant | DeclKind::Typedef
        )
    }

    /// Whether this is a formal parameter of a component.
    pub fn is_parameter(&self) -> bool {
        self.flags.contains(DeclFlags::PARAMETER)
    }

    /// Whether this lives in static storage.
    pub fn has_static_storage(&self) -> bool {
        self.flags.contains(DeclFlags::STATIC_STORAGE)
    }
}
