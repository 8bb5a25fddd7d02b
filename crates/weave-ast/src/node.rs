//! Syntax tree nodes.
//!
//! Nodes are stored in the [`CompileUnit`](crate::CompileUnit) node table
//! and refer to each other by [`NodeId`]. Several kinds carry a
//! [`DeclId`] instead of (or as well as) children: references
//! (`Identifier`, `Typename`, `InterfaceDeref`) and definition sites
//! (`FunctionDecl`, `VariableDecl`, `Enumerator`). `ComponentRef` carries
//! the [`ComponentId`] of the component it uses.

use weave_core::{ComponentId, ConstValue, DeclId, NodeId, Span};

use crate::ops::{BinaryOp, UnaryOp};
use crate::types::Type;
use crate::wiring::Endpoint;

/// Per-expression attributes, filled in by the front end and the folder.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExprAttrs {
    /// Type of the expression.
    pub ty: Type,
    /// Compile-time constant value, if any.
    pub cst: Option<ConstValue>,
    /// Value as a constant address expression, if any.
    pub static_address: Option<ConstValue>,
    /// Whether the expression undergoes array/function-to-pointer decay.
    pub converted_to_pointer: bool,
}

/// A syntax node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// What the node is.
    pub kind: NodeKind,
    /// Enclosing node, if any.
    pub parent: Option<NodeId>,
    /// Source location.
    pub span: Span,
    /// Expression attributes (unused for non-expressions).
    pub expr: ExprAttrs,
}

impl Node {
    /// Create a node with default expression attributes.
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self {
            kind,
            parent: None,
            span,
            expr: ExprAttrs::default(),
        }
    }
}

/// The node taxonomy.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    // ------------------------------------------------------------------
    // Component bodies
    // ------------------------------------------------------------------
    /// A module implementation.
    Module {
        /// Top-level declarations and function definitions.
        declarations: Vec<NodeId>,
    },
    /// A configuration implementation.
    Configuration {
        /// `ComponentRef` nodes.
        components: Vec<NodeId>,
        /// `Connection` nodes (the wiring graph holds the resolved form).
        connections: Vec<NodeId>,
    },
    /// A use of a component inside a configuration, with its arguments.
    ComponentRef {
        /// The component used.
        component: ComponentId,
        /// Argument expressions.
        args: Vec<NodeId>,
    },
    /// A wiring statement as written.
    Connection {
        /// Caller side.
        from: Endpoint,
        /// Callee side.
        to: Endpoint,
    },

    // ------------------------------------------------------------------
    // Declarations
    // ------------------------------------------------------------------
    /// A declaration statement grouping declarators.
    DataDecl {
        /// `VariableDecl` (or `FunctionDecl`) nodes.
        declarators: Vec<NodeId>,
    },
    /// A variable declarator.
    VariableDecl {
        /// The declared variable.
        decl: DeclId,
        /// Initialiser expression.
        init: Option<NodeId>,
    },
    /// A function definition.
    FunctionDecl {
        /// The defined function.
        decl: DeclId,
        /// Function body.
        body: NodeId,
    },
    /// An enumerator definition.
    Enumerator {
        /// The enumerator constant.
        decl: DeclId,
        /// Explicit value expression.
        value: Option<NodeId>,
    },
    /// A reference to a type alias.
    Typename {
        /// The typedef.
        decl: DeclId,
    },

    // ------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------
    /// `{ ... }`
    Compound {
        /// Statements and local declarations.
        statements: Vec<NodeId>,
    },
    /// `expr;`
    ExprStmt {
        /// The expression.
        expr: NodeId,
    },
    /// `return expr;`
    Return {
        /// Returned value.
        value: Option<NodeId>,
    },
    /// `if (cond) then else`
    If {
        /// Condition.
        condition: NodeId,
        /// Then branch.
        then_branch: NodeId,
        /// Else branch.
        else_branch: Option<NodeId>,
    },

    // ------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------
    /// A numeric or character literal; its constant is set by the front end.
    Lexical,
    /// A string literal.
    StringLit {
        /// Literal contents.
        value: String,
    },
    /// A target-specific literal extension (`__extension__ e`).
    Extension {
        /// Operand.
        arg: NodeId,
    },
    /// `&&label`
    LabelAddress {
        /// Label name.
        label: String,
    },
    /// `sizeof expr`
    SizeofExpr {
        /// Operand.
        arg: NodeId,
    },
    /// `sizeof(type)`
    SizeofType {
        /// Operand type.
        ty: Type,
    },
    /// `alignof expr`
    AlignofExpr {
        /// Operand.
        arg: NodeId,
    },
    /// `alignof(type)`
    AlignofType {
        /// Operand type.
        ty: Type,
    },
    /// `(type) expr`
    Cast {
        /// Target type.
        ty: Type,
        /// Operand.
        arg: NodeId,
    },
    /// `cond ? a : b`
    Conditional {
        /// Condition.
        condition: NodeId,
        /// Value when true.
        then_expr: NodeId,
        /// Value when false.
        else_expr: NodeId,
    },
    /// `f(args)`
    FunctionCall {
        /// Callee expression.
        callee: NodeId,
        /// Arguments.
        args: Vec<NodeId>,
    },
    /// A name referring to a declaration.
    Identifier {
        /// The referenced declaration.
        decl: DeclId,
    },
    /// `iface.command`
    InterfaceDeref {
        /// The interface expression.
        base: NodeId,
        /// The command or event.
        decl: DeclId,
    },
    /// `base.field`
    FieldRef {
        /// Struct expression.
        base: NodeId,
        /// Field name.
        field: String,
    },
    /// `*arg`
    Dereference {
        /// Operand.
        arg: NodeId,
    },
    /// `&arg`
    AddressOf {
        /// Operand.
        arg: NodeId,
    },
    /// `left[right]` (either side may be the index)
    ArrayRef {
        /// First operand.
        left: NodeId,
        /// Second operand.
        right: NodeId,
    },
    /// `(e1, ..., en)`
    Comma {
        /// The sequence, in order.
        exprs: Vec<NodeId>,
    },
    /// A unary operator.
    Unary {
        /// Operator.
        op: UnaryOp,
        /// Operand.
        arg: NodeId,
    },
    /// A binary operator.
    Binary {
        /// Operator.
        op: BinaryOp,
        /// Left operand.
        left: NodeId,
        /// Right operand.
        right: NodeId,
    },
}

impl NodeKind {
    /// Whether this node is an expression.
    pub fn is_expression(&self) -> bool {
        matches!(
            self,
            NodeKind::Lexical
                | NodeKind::StringLit { .. }
                | NodeKind::Extension { .. }
                | NodeKind::LabelAddress { .. }
                | NodeKind::SizeofExpr { .. }
                | NodeKind::SizeofType { .. }
                | NodeKind::AlignofExpr { .. }
                | NodeKind::AlignofType { .. }
                | NodeKind::Cast { .. }
                | NodeKind::Conditional { .. }
                | NodeKind::FunctionCall { .. }
                | NodeKind::Identifier { .. }
                | NodeKind::InterfaceDeref { .. }
                | NodeKind::FieldRef { .. }
                | NodeKind::Dereference { .. }
                | NodeKind::AddressOf { .. }
                | NodeKind::ArrayRef { .. }
                | NodeKind::Comma { .. }
                | NodeKind::Unary { .. }
                | NodeKind::Binary { .. }
        )
    }

    /// The declaration this node refers to or defines, if any.
    pub fn decl(&self) -> Option<DeclId> {
        match self {
            NodeKind::VariableDecl { decl, .. }
            | NodeKind::FunctionDecl { decl, .. }
            | NodeKind::Enumerator { decl, .. }
            | NodeKind::Typename { decl }
            | NodeKind::Identifier { decl }
            | NodeKind::InterfaceDeref { decl, .. } => Some(*decl),
            _ => None,
        }
    }

    /// Child nodes, in source order.
    pub fn children(&self) -> Vec<NodeId> {
        let mut scratch = self.clone();
        let slots = scratch.children_mut();
        slots.into_iter().map(|slot| *slot).collect()
    }

    /// Mutable access to every child slot, in source order.
    pub fn children_mut(&mut self) -> Vec<&mut NodeId> {
        match self {
            NodeKind::Module { declarations: list }
            | NodeKind::DataDecl { declarators: list }
            | NodeKind::Compound { statements: list }
            | NodeKind::Comma { exprs: list }
            | NodeKind::ComponentRef { args: list, .. } => list.iter_mut().collect(),
            NodeKind::Configuration {
                components,
                connections,
            } => components.iter_mut().chain(connections.iter_mut()).collect(),
            NodeKind::VariableDecl { init: child, .. }
            | NodeKind::Enumerator { value: child, .. }
            | NodeKind::Return { value: child } => child.iter_mut().collect(),
            NodeKind::FunctionDecl { body: child, .. }
            | NodeKind::ExprStmt { expr: child }
            | NodeKind::Extension { arg: child }
            | NodeKind::SizeofExpr { arg: child }
            | NodeKind::AlignofExpr { arg: child }
            | NodeKind::Cast { arg: child, .. }
            | NodeKind::InterfaceDeref { base: child, .. }
            | NodeKind::FieldRef { base: child, .. }
            | NodeKind::Dereference { arg: child }
            | NodeKind::AddressOf { arg: child }
            | NodeKind::Unary { arg: child, .. } => vec![child],
            NodeKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let mut slots = vec![condition, then_branch];
                slots.extend(else_branch.iter_mut());
                slots
            }
            NodeKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => vec![condition, then_expr, else_expr],
            NodeKind::FunctionCall { callee, args } => {
                let mut slots = vec![callee];
                slots.extend(args.iter_mut());
                slots
            }
            NodeKind::ArrayRef { left, right } | NodeKind::Binary { left, right, .. } => {
                vec![left, right]
            }
            NodeKind::Connection { .. }
            | NodeKind::Typename { .. }
            | NodeKind::Lexical
            | NodeKind::StringLit { .. }
            | NodeKind::LabelAddress { .. }
            | NodeKind::SizeofType { .. }
            | NodeKind::AlignofType { .. }
            | NodeKind::Identifier { .. } => Vec::new(),
        }
    }
}
