//! Construction helpers for front ends and tests.
//!
//! Each expression builder allocates a node, links its children back to
//! it and fills in the attributes a front end would: the expression type,
//! the literal constant for lexical tokens and the decay flag for array
//! and function designators. Folded values (`cst` on compound
//! expressions, `static_address`) are left for the folder.

use weave_core::{AddressBase, ComponentId, ConstValue, DeclId, NodeId, Span};

use crate::component::{ComponentDescriptor, ComponentKind};
use crate::decl::{DeclFlags, DeclKind, Declaration, FunctionFlavor};
use crate::node::{Node, NodeKind};
use crate::ops::{BinaryOp, UnaryOp};
use crate::types::Type;
use crate::unit::CompileUnit;
use crate::wiring::Endpoint;

impl CompileUnit {
    fn expr_node(&mut self, kind: NodeKind, ty: Type) -> NodeId {
        let mut node = Node::new(kind, Span::default());
        node.expr.converted_to_pointer = ty.decays();
        node.expr.ty = ty;
        let id = self.add_node(node);
        self.adopt_children(id);
        id
    }

    fn stmt_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.add_node(Node::new(kind, Span::default()));
        self.adopt_children(id);
        id
    }

    fn expr_type(&self, id: NodeId) -> Type {
        self.node(id).expr.ty.clone()
    }

    /// Set a node's source location.
    pub fn set_span(&mut self, id: NodeId, span: Span) {
        self.node_mut(id).span = span;
    }

    // ==========================================================================
    // Literals
    // ==========================================================================

    /// A literal token of the given type and value.
    pub fn lexical(&mut self, value: ConstValue, ty: Type) -> NodeId {
        let id = self.expr_node(NodeKind::Lexical, ty);
        self.node_mut(id).expr.cst = Some(value);
        id
    }

    /// An `int` literal.
    pub fn int_lit(&mut self, value: i64) -> NodeId {
        self.lexical(ConstValue::Int(value), Type::int())
    }

    /// An `unsigned int` literal.
    pub fn uint_lit(&mut self, value: u64) -> NodeId {
        self.lexical(ConstValue::UInt(value), Type::uint())
    }

    /// A `double` literal.
    pub fn float_lit(&mut self, value: f64) -> NodeId {
        self.lexical(ConstValue::float(value), Type::double())
    }

    /// A string literal. Its storage is a static address.
    pub fn string_lit(&mut self, value: impl Into<String>) -> NodeId {
        let value = value.into();
        let len = value.len() as u64 + 1;
        let address = ConstValue::address(AddressBase::String(value.clone()), 0);
        let id = self.expr_node(
            NodeKind::StringLit { value },
            Type::char().array_of(Some(len)),
        );
        self.node_mut(id).expr.static_address = Some(address);
        id
    }

    /// `__extension__ arg`, carrying the operand's value.
    pub fn extension(&mut self, arg: NodeId) -> NodeId {
        let attrs = self.node(arg).expr.clone();
        let id = self.expr_node(NodeKind::Extension { arg }, attrs.ty);
        let node = self.node_mut(id);
        node.expr.cst = attrs.cst;
        node.expr.static_address = attrs.static_address;
        id
    }

    /// `&&label`
    pub fn label_address(&mut self, label: impl Into<String>) -> NodeId {
        self.expr_node(
            NodeKind::LabelAddress {
                label: label.into(),
            },
            Type::Void.pointer_to(),
        )
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    /// A reference to a declaration.
    pub fn ident(&mut self, decl: DeclId) -> NodeId {
        let ty = self.decl(decl).ty.clone();
        let id = self.expr_node(NodeKind::Identifier { decl }, ty);
        self.decl_mut(decl).uses.push(id);
        id
    }

    /// `sizeof arg`
    pub fn sizeof_expr(&mut self, arg: NodeId) -> NodeId {
        self.expr_node(NodeKind::SizeofExpr { arg }, Type::ulong())
    }

    /// `sizeof(ty)`
    pub fn sizeof_type(&mut self, ty: Type) -> NodeId {
        self.expr_node(NodeKind::SizeofType { ty }, Type::ulong())
    }

    /// `alignof arg`
    pub fn alignof_expr(&mut self, arg: NodeId) -> NodeId {
        self.expr_node(NodeKind::AlignofExpr { arg }, Type::ulong())
    }

    /// `alignof(ty)`
    pub fn alignof_type(&mut self, ty: Type) -> NodeId {
        self.expr_node(NodeKind::AlignofType { ty }, Type::ulong())
    }

    /// `(ty) arg`
    pub fn cast(&mut self, ty: Type, arg: NodeId) -> NodeId {
        self.expr_node(NodeKind::Cast { ty: ty.clone(), arg }, ty)
    }

    /// `condition ? then_expr : else_expr`
    pub fn conditional(&mut self, condition: NodeId, then_expr: NodeId, else_expr: NodeId) -> NodeId {
        let then_ty = self.expr_type(then_expr);
        let else_ty = self.expr_type(else_expr);
        let ty = if then_ty.is_arithmetic() && else_ty.is_arithmetic() {
            Type::usual_arithmetic(&then_ty, &else_ty)
        } else {
            then_ty.default_conversion()
        };
        self.expr_node(
            NodeKind::Conditional {
                condition,
                then_expr,
                else_expr,
            },
            ty,
        )
    }

    /// `callee(args)`
    pub fn call(&mut self, callee: NodeId, args: Vec<NodeId>) -> NodeId {
        let ty = match self.expr_type(callee) {
            Type::Function { ret } => *ret,
            Type::Pointer(inner) => match *inner {
                Type::Function { ret } => *ret,
                _ => Type::int(),
            },
            _ => Type::int(),
        };
        self.expr_node(NodeKind::FunctionCall { callee, args }, ty)
    }

    /// `base.decl` on an interface.
    pub fn interface_deref(&mut self, base: NodeId, decl: DeclId) -> NodeId {
        let ty = self.decl(decl).ty.clone();
        let id = self.expr_node(NodeKind::InterfaceDeref { base, decl }, ty);
        self.decl_mut(decl).uses.push(id);
        id
    }

    /// `base.field`
    pub fn field_ref(&mut self, base: NodeId, field: impl Into<String>) -> NodeId {
        let field = field.into();
        let ty = self
            .node(base)
            .expr
            .ty
            .field_type(&field)
            .cloned()
            .unwrap_or_default();
        self.expr_node(NodeKind::FieldRef { base, field }, ty)
    }

    /// `*arg`
    pub fn deref(&mut self, arg: NodeId) -> NodeId {
        let ty = self
            .expr_type(arg)
            .default_conversion()
            .pointee()
            .cloned()
            .unwrap_or_default();
        self.expr_node(NodeKind::Dereference { arg }, ty)
    }

    /// `&arg`
    pub fn address_of(&mut self, arg: NodeId) -> NodeId {
        let ty = self.expr_type(arg).pointer_to();
        self.expr_node(NodeKind::AddressOf { arg }, ty)
    }

    /// `left[right]`
    pub fn array_ref(&mut self, left: NodeId, right: NodeId) -> NodeId {
        let left_ty = self.expr_type(left);
        let base_ty = if left_ty.is_integer() {
            self.expr_type(right)
        } else {
            left_ty
        };
        let ty = base_ty
            .default_conversion()
            .pointee()
            .cloned()
            .unwrap_or_default();
        self.expr_node(NodeKind::ArrayRef { left, right }, ty)
    }

    /// `(e1, ..., en)`
    pub fn comma(&mut self, exprs: Vec<NodeId>) -> NodeId {
        let ty = exprs
            .last()
            .map(|last| self.expr_type(*last).default_conversion())
            .unwrap_or_default();
        self.expr_node(NodeKind::Comma { exprs }, ty)
    }

    /// A unary operator.
    pub fn unary(&mut self, op: UnaryOp, arg: NodeId) -> NodeId {
        let ty = match op {
            UnaryOp::Not => Type::int(),
            _ => self.expr_type(arg).default_conversion(),
        };
        self.expr_node(NodeKind::Unary { op, arg }, ty)
    }

    /// A binary operator.
    pub fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> NodeId {
        let left_ty = self.expr_type(left).default_conversion();
        let right_ty = self.expr_type(right).default_conversion();
        let ty = if op.is_comparison() || op.is_logical() {
            Type::int()
        } else if op.is_shift() {
            left_ty
        } else {
            match (op, left_ty.is_pointer(), right_ty.is_pointer()) {
                (BinaryOp::Sub, true, true) => Type::long(),
                (BinaryOp::Add | BinaryOp::Sub, true, false) => left_ty,
                (BinaryOp::Add, false, true) => right_ty,
                _ => Type::usual_arithmetic(&left_ty, &right_ty),
            }
        };
        self.expr_node(NodeKind::Binary { op, left, right }, ty)
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    /// `expr;`
    pub fn expr_stmt(&mut self, expr: NodeId) -> NodeId {
        self.stmt_node(NodeKind::ExprStmt { expr })
    }

    /// `return value;`
    pub fn return_stmt(&mut self, value: Option<NodeId>) -> NodeId {
        self.stmt_node(NodeKind::Return { value })
    }

    /// `if (condition) then_branch else else_branch`
    pub fn if_stmt(
        &mut self,
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    ) -> NodeId {
        self.stmt_node(NodeKind::If {
            condition,
            then_branch,
            else_branch,
        })
    }

    /// `{ statements }`
    pub fn compound(&mut self, statements: Vec<NodeId>) -> NodeId {
        self.stmt_node(NodeKind::Compound { statements })
    }

    // ==========================================================================
    // Declarations
    // ==========================================================================

    /// A variable declarator. Becomes the variable's definition and, if it
    /// has none yet, its introduction site.
    pub fn variable_decl(&mut self, decl: DeclId, init: Option<NodeId>) -> NodeId {
        let id = self.stmt_node(NodeKind::VariableDecl { decl, init });
        let record = self.decl_mut(decl);
        record.definition = Some(id);
        record.ast.get_or_insert(id);
        id
    }

    /// A declaration statement.
    pub fn data_decl(&mut self, declarators: Vec<NodeId>) -> NodeId {
        self.stmt_node(NodeKind::DataDecl { declarators })
    }

    /// A function definition.
    pub fn function_def(&mut self, decl: DeclId, body: NodeId) -> NodeId {
        let id = self.stmt_node(NodeKind::FunctionDecl { decl, body });
        let record = self.decl_mut(decl);
        record.definition = Some(id);
        record.ast.get_or_insert(id);
        record.flags |= DeclFlags::DEFINED;
        id
    }

    /// An enumerator definition.
    pub fn enumerator(&mut self, decl: DeclId, value: Option<NodeId>) -> NodeId {
        let id = self.stmt_node(NodeKind::Enumerator { decl, value });
        let record = self.decl_mut(decl);
        record.definition = Some(id);
        record.ast = Some(id);
        id
    }

    /// A use of a typedef name.
    pub fn typename(&mut self, decl: DeclId) -> NodeId {
        let ty = self.decl(decl).ty.clone();
        let id = self.add_node(Node::new(NodeKind::Typename { decl }, Span::default()));
        self.node_mut(id).expr.ty = ty;
        self.decl_mut(decl).uses.push(id);
        id
    }

    /// Declare a variable. Module variables and globals live in static
    /// storage.
    pub fn declare_variable(
        &mut self,
        container: Option<ComponentId>,
        name: impl Into<String>,
        ty: Type,
    ) -> DeclId {
        let env = self.scope_of(container);
        let mut decl = Declaration::new(name, DeclKind::Variable, ty).with_flags(DeclFlags::STATIC_STORAGE);
        decl.container = container;
        self.declare_new(env, decl)
    }

    /// Declare a local variable of a function body.
    pub fn declare_local(
        &mut self,
        container: Option<ComponentId>,
        name: impl Into<String>,
        ty: Type,
    ) -> DeclId {
        let env = self.scope_of(container);
        let mut decl = Declaration::new(name, DeclKind::Variable, ty);
        decl.container = container;
        self.declare_new(env, decl)
    }

    /// Declare a function, task, command or event.
    pub fn declare_function(
        &mut self,
        container: Option<ComponentId>,
        name: impl Into<String>,
        flavor: FunctionFlavor,
        ret: Type,
    ) -> DeclId {
        let env = self.scope_of(container);
        let ty = Type::Function { ret: Box::new(ret) };
        let mut decl = Declaration::new(name, DeclKind::Function(flavor), ty).with_flags(DeclFlags::STATIC_STORAGE);
        decl.container = container;
        self.declare_new(env, decl)
    }

    /// Declare an enumerator constant with a known value.
    pub fn declare_constant(
        &mut self,
        container: Option<ComponentId>,
        name: impl Into<String>,
        value: ConstValue,
    ) -> DeclId {
        let env = self.scope_of(container);
        let mut decl = Declaration::new(name, DeclKind::Constant, Type::int());
        decl.container = container;
        decl.value = Some(value);
        self.declare_new(env, decl)
    }

    /// Declare a type alias.
    pub fn declare_typedef(
        &mut self,
        container: Option<ComponentId>,
        name: impl Into<String>,
        ty: Type,
    ) -> DeclId {
        let env = self.scope_of(container);
        let mut decl = Declaration::new(name, DeclKind::Typedef, ty);
        decl.container = container;
        self.declare_new(env, decl)
    }

    fn scope_of(&self, container: Option<ComponentId>) -> weave_core::EnvId {
        match container {
            Some(component) => self.component(component).env,
            None => self.global_env(),
        }
    }

    // ==========================================================================
    // Components
    // ==========================================================================

    /// Create a component with its own specification scope.
    pub fn new_component(
        &mut self,
        name: impl Into<String>,
        kind: ComponentKind,
        is_abstract: bool,
    ) -> ComponentId {
        let env = self.new_environment(Some(self.global_env()), false);
        self.add_component(ComponentDescriptor::new(name, kind, is_abstract, env))
    }

    /// Add a formal parameter to a component.
    pub fn add_parameter(&mut self, component: ComponentId, name: impl Into<String>, ty: Type) -> DeclId {
        let env = self.component(component).env;
        let decl = Declaration::new(name, DeclKind::Variable, ty)
            .with_container(component)
            .with_flags(DeclFlags::PARAMETER);
        let decl = self.declare_new(env, decl);
        let declarator = self.variable_decl(decl, None);
        let data = self.data_decl(vec![declarator]);
        self.component_mut(component).parameters.push(data);
        decl
    }

    /// Add an interface reference to a component's specification.
    pub fn add_interface(&mut self, component: ComponentId, name: impl Into<String>) -> DeclId {
        let env = self.component(component).env;
        let decl = Declaration::new(name, DeclKind::InterfaceRef, Type::Void).with_container(component);
        let decl = self.declare_new(env, decl);
        self.component_mut(component).specification.push(decl);
        decl
    }

    /// Add a command or event to a component's specification, optionally as
    /// part of an interface.
    ///
    /// The specification entry is the declaration's introduction site; a
    /// later function definition does not replace it.
    pub fn add_spec_function(
        &mut self,
        component: ComponentId,
        interface: Option<DeclId>,
        name: impl Into<String>,
        flavor: FunctionFlavor,
        ret: Type,
    ) -> DeclId {
        let decl = self.declare_function(Some(component), name, flavor, ret);
        let site = self.add_node(Node::new(
            NodeKind::VariableDecl { decl, init: None },
            Span::default(),
        ));
        let record = self.decl_mut(decl);
        record.interface = interface;
        record.ast = Some(site);
        self.component_mut(component).specification.push(decl);
        decl
    }

    /// A module body.
    pub fn module_body(&mut self, declarations: Vec<NodeId>) -> NodeId {
        self.stmt_node(NodeKind::Module { declarations })
    }

    /// A configuration body.
    pub fn configuration_body(&mut self, components: Vec<NodeId>, connections: Vec<NodeId>) -> NodeId {
        self.stmt_node(NodeKind::Configuration {
            components,
            connections,
        })
    }

    /// A use of `component` inside a configuration.
    pub fn component_ref(&mut self, component: ComponentId, args: Vec<NodeId>) -> NodeId {
        self.stmt_node(NodeKind::ComponentRef { component, args })
    }

    /// A connection as written, also recorded in the owner's wiring graph.
    pub fn connection(&mut self, owner: ComponentId, from: Endpoint, to: Endpoint) -> NodeId {
        self.component_mut(owner).connections.connect(from, to);
        self.stmt_node(NodeKind::Connection { from, to })
    }

    /// Attach a body to a component.
    pub fn set_implementation(&mut self, component: ComponentId, body: NodeId) {
        self.component_mut(component).implementation = Some(body);
    }
}
