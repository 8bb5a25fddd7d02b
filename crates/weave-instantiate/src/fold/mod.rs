//! Constant folding.
//!
//! The folder walks a tree bottom-up and recomputes, for every expression,
//! its compile-time constant (`cst`) and its value as a constant address
//! (`static_address`). Component parameters become constants once their
//! declarations carry a `value`, so folding after argument binding turns
//! parameter-dependent expressions into constants.
//!
//! ## Modules
//!
//! - [`magic`]: function-call folding and the `unique` family
//! - [`ops`]: target-width arithmetic, casts and pointer arithmetic

pub mod magic;
pub mod ops;

use weave_ast::{BinaryOp, CompileUnit, DeclKind, ExprAttrs, Node, NodeKind, Type};
use weave_core::{AddressBase, ConstValue, NodeId, TargetLayout};

use self::magic::CallFolder;
use self::ops::{Operands, cast_value, fold_binary, fold_unary};

fn expr_of(unit: &CompileUnit, id: NodeId) -> &ExprAttrs {
    &unit.node(id).expr
}

/// Bottom-up constant folder for one target.
pub struct ConstantFolder<'a> {
    layout: &'a TargetLayout,
    calls: &'a mut dyn CallFolder,
}

impl<'a> ConstantFolder<'a> {
    /// Create a folder for `layout` that delegates calls to `calls`.
    pub fn new(layout: &'a TargetLayout, calls: &'a mut dyn CallFolder) -> Self {
        Self { layout, calls }
    }

    /// Fold every expression in the subtree rooted at `root`.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn fold(&mut self, unit: &mut CompileUnit, root: NodeId) {
        for child in unit.node(root).kind.children() {
            self.fold(unit, child);
        }
        if !unit.node(root).kind.is_expression() {
            return;
        }

        let (cst, static_address) = self.fold_expression(unit, root);
        let node = unit.node_mut(root);
        node.expr.cst = if node.expr.converted_to_pointer {
            static_address.clone()
        } else {
            cst
        };
        node.expr.static_address = static_address;
    }

    fn fold_expression(
        &mut self,
        unit: &CompileUnit,
        id: NodeId,
    ) -> (Option<ConstValue>, Option<ConstValue>) {
        let node = unit.node(id);

        match &node.kind {
            // Literal values are set by the front end.
            NodeKind::Lexical | NodeKind::StringLit { .. } | NodeKind::Extension { .. } => {
                (node.expr.cst.clone(), node.expr.static_address.clone())
            }
            NodeKind::LabelAddress { label } => (
                Some(ConstValue::address(AddressBase::Label(label.clone()), 0)),
                None,
            ),
            NodeKind::SizeofExpr { arg } => (self.size_of(&expr_of(unit, *arg).ty), None),
            NodeKind::SizeofType { ty } => (self.size_of(ty), None),
            NodeKind::AlignofExpr { arg } => (self.align_of(&expr_of(unit, *arg).ty), None),
            NodeKind::AlignofType { ty } => (self.align_of(ty), None),
            NodeKind::Cast { ty, arg } => {
                let operand = expr_of(unit, *arg);
                let cst = operand
                    .cst
                    .as_ref()
                    .and_then(|value| cast_value(value, ty, self.layout));
                (cst, operand.static_address.clone())
            }
            NodeKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                let chosen = expr_of(unit, *condition)
                    .cst
                    .as_ref()
                    .and_then(ConstValue::truth)
                    .map(|truth| if truth { *then_expr } else { *else_expr });
                (chosen.and_then(|arm| expr_of(unit, arm).cst.clone()), None)
            }
            NodeKind::FunctionCall { callee, args } => {
                (self.calls.fold_call(unit, *callee, args), None)
            }
            NodeKind::Identifier { decl } => {
                let record = unit.decl(*decl);
                let static_address = (record.has_static_storage()
                    && matches!(record.kind, DeclKind::Variable | DeclKind::Function(_)))
                .then(|| ConstValue::address(AddressBase::Decl(*decl), 0));
                (record.value.clone(), static_address)
            }
            NodeKind::FieldRef { base, field } => {
                let base = expr_of(unit, *base);
                let static_address = base.static_address.as_ref().and_then(|address| {
                    let offset = base.ty.field_offset(field, self.layout)?;
                    address.offset_by(i64::try_from(offset).ok()?)
                });
                (None, static_address)
            }
            NodeKind::Dereference { arg } => (
                None,
                expr_of(unit, *arg).cst.as_ref().and_then(ConstValue::to_address),
            ),
            NodeKind::AddressOf { arg } => (expr_of(unit, *arg).static_address.clone(), None),
            NodeKind::ArrayRef { left, right } => {
                let (base, index) = if expr_of(unit, *left).ty.is_integer() {
                    (*right, *left)
                } else {
                    (*left, *right)
                };
                let pointer_ty = expr_of(unit, base).ty.default_conversion();
                (None, self.binary(unit, BinaryOp::Add, base, index, &pointer_ty))
            }
            NodeKind::Comma { exprs } => (self.fold_comma(unit, exprs), None),
            NodeKind::Unary { op, arg } => {
                let cst = expr_of(unit, *arg)
                    .cst
                    .as_ref()
                    .and_then(|value| fold_unary(*op, value, &node.expr.ty, self.layout));
                (cst, None)
            }
            NodeKind::Binary { op, left, right } => {
                (self.binary(unit, *op, *left, *right, &node.expr.ty), None)
            }
            NodeKind::InterfaceDeref { .. } => (None, None),
            NodeKind::Module { .. }
            | NodeKind::Configuration { .. }
            | NodeKind::ComponentRef { .. }
            | NodeKind::Connection { .. }
            | NodeKind::DataDecl { .. }
            | NodeKind::VariableDecl { .. }
            | NodeKind::FunctionDecl { .. }
            | NodeKind::Enumerator { .. }
            | NodeKind::Typename { .. }
            | NodeKind::Compound { .. }
            | NodeKind::ExprStmt { .. }
            | NodeKind::Return { .. }
            | NodeKind::If { .. } => (None, None),
        }
    }

    /// `(e1, ..., en)` is constant when every `ei` is, with the value of
    /// `en`.
    fn fold_comma(&self, unit: &CompileUnit, exprs: &[NodeId]) -> Option<ConstValue> {
        let mut value = None;
        for (position, expr) in exprs.iter().enumerate() {
            let cst = unit.node(*expr).expr.cst.as_ref()?;
            if position + 1 == exprs.len() {
                value = Some(cst.clone());
            }
        }
        value
    }

    fn binary(
        &self,
        unit: &CompileUnit,
        op: BinaryOp,
        left: NodeId,
        right: NodeId,
        result: &Type,
    ) -> Option<ConstValue> {
        let left: &Node = unit.node(left);
        let right: &Node = unit.node(right);
        let operands = Operands {
            left: left.expr.cst.as_ref()?,
            left_ty: &left.expr.ty,
            right: right.expr.cst.as_ref()?,
            right_ty: &right.expr.ty,
        };
        fold_binary(op, &operands, result, self.layout)
    }

    fn size_of(&self, ty: &Type) -> Option<ConstValue> {
        ty.size_of(self.layout).map(ConstValue::UInt)
    }

    fn align_of(&self, ty: &Type) -> Option<ConstValue> {
        ty.align_of(self.layout).map(ConstValue::UInt)
    }
}
