//! Constant arithmetic on target-sized values.
//!
//! Integers are computed in `i128`, wide enough for every `i64` and `u64`
//! operand, then wrapped to the width and signedness of the result type
//! on the target. Address constants support offsetting and comparison
//! against the same base only.

use weave_ast::{BinaryOp, FloatKind, Type, UnaryOp};
use weave_core::{AddressBase, ConstValue, TargetLayout};

/// Wrap an integer to `ty` on `layout`.
///
/// Pointer types produce an absolute address constant.
pub fn wrap_int(value: i128, ty: &Type, layout: &TargetLayout) -> Option<ConstValue> {
    match ty {
        Type::Pointer(_) => {
            let wrapped = wrap_bits(value, layout.pointer.size * 8, false);
            i64::try_from(wrapped)
                .ok()
                .map(|offset| ConstValue::address(AddressBase::Absolute, offset))
        }
        Type::Int { .. } => {
            let bits = ty.size_of(layout)? * 8;
            let signed = ty.is_signed(layout);
            let wrapped = if matches!(ty, Type::Int { kind: weave_ast::IntKind::Bool, .. }) {
                i128::from(value != 0)
            } else {
                wrap_bits(value, bits, signed)
            };
            if signed {
                i64::try_from(wrapped).ok().map(ConstValue::Int)
            } else {
                u64::try_from(wrapped).ok().map(ConstValue::UInt)
            }
        }
        _ => None,
    }
}

fn wrap_bits(value: i128, bits: u64, signed: bool) -> i128 {
    if bits == 0 || bits >= 128 {
        return value;
    }
    let modulus = 1i128 << bits;
    let low = value.rem_euclid(modulus);
    if signed && low >= modulus >> 1 {
        low - modulus
    } else {
        low
    }
}

fn round_float(value: f64, ty: &Type) -> f64 {
    match ty {
        Type::Float(FloatKind::Float) => f64::from(value as f32),
        _ => value,
    }
}

/// Convert a constant to `ty`.
pub fn cast_value(value: &ConstValue, ty: &Type, layout: &TargetLayout) -> Option<ConstValue> {
    match (value, ty) {
        (ConstValue::Address { .. }, Type::Pointer(_)) => Some(value.clone()),
        (ConstValue::Address { .. }, Type::Int { .. }) => {
            // Only a target large enough to hold a pointer keeps the address.
            (ty.size_of(layout)? >= layout.pointer.size).then(|| value.clone())
        }
        (ConstValue::Float(f), Type::Int { .. } | Type::Pointer(_)) => {
            if !f.0.is_finite() {
                return None;
            }
            wrap_int(f.0.trunc() as i128, ty, layout)
        }
        (ConstValue::Int(_) | ConstValue::UInt(_), Type::Int { .. } | Type::Pointer(_)) => {
            wrap_int(value.as_i128()?, ty, layout)
        }
        (ConstValue::Int(_) | ConstValue::UInt(_) | ConstValue::Float(_), Type::Float(_)) => {
            Some(ConstValue::float(round_float(value.as_float()?, ty)))
        }
        _ => None,
    }
}

/// Fold a unary operator.
pub fn fold_unary(
    op: UnaryOp,
    operand: &ConstValue,
    result: &Type,
    layout: &TargetLayout,
) -> Option<ConstValue> {
    if op == UnaryOp::Not {
        return Some(ConstValue::Int(i64::from(!operand.truth()?)));
    }
    if let ConstValue::Float(f) = operand {
        return match op {
            UnaryOp::Neg => Some(ConstValue::float(-f.0)),
            UnaryOp::Plus => Some(operand.clone()),
            _ => None,
        };
    }
    let value = operand.as_i128()?;
    match op {
        UnaryOp::Neg => wrap_int(-value, result, layout),
        UnaryOp::Plus => wrap_int(value, result, layout),
        UnaryOp::BitNot => wrap_int(!value, result, layout),
        UnaryOp::Not => None,
    }
}

/// Operands of a binary operator, with their types.
pub struct Operands<'a> {
    /// Left value.
    pub left: &'a ConstValue,
    /// Left type.
    pub left_ty: &'a Type,
    /// Right value.
    pub right: &'a ConstValue,
    /// Right type.
    pub right_ty: &'a Type,
}

/// Fold a binary operator producing a value of type `result`.
pub fn fold_binary(
    op: BinaryOp,
    operands: &Operands<'_>,
    result: &Type,
    layout: &TargetLayout,
) -> Option<ConstValue> {
    if op.is_logical() {
        let left = operands.left.truth()?;
        let right = operands.right.truth()?;
        let value = match op {
            BinaryOp::LogicalAnd => left && right,
            _ => left || right,
        };
        return Some(ConstValue::Int(i64::from(value)));
    }

    let left_ty = operands.left_ty.default_conversion();
    let right_ty = operands.right_ty.default_conversion();
    if left_ty.is_pointer() || right_ty.is_pointer() || operands.left.is_address() || operands.right.is_address() {
        return fold_pointer(op, operands, &left_ty, &right_ty, result, layout);
    }

    if op.is_comparison() {
        let common = Type::usual_arithmetic(&left_ty, &right_ty);
        let ordering = if common.is_float() {
            let left = operands.left.as_float()?;
            let right = operands.right.as_float()?;
            left.partial_cmp(&right)?
        } else {
            let left = wrap_int(operands.left.as_i128()?, &common, layout)?.as_i128()?;
            let right = wrap_int(operands.right.as_i128()?, &common, layout)?.as_i128()?;
            left.cmp(&right)
        };
        return Some(compare(op, ordering));
    }

    if result.is_float() {
        let left = operands.left.as_float()?;
        let right = operands.right.as_float()?;
        let value = match op {
            BinaryOp::Add => left + right,
            BinaryOp::Sub => left - right,
            BinaryOp::Mul => left * right,
            BinaryOp::Div if right != 0.0 => left / right,
            _ => return None,
        };
        return Some(ConstValue::float(round_float(value, result)));
    }

    // Shifts keep the promoted left type; everything else converts both
    // operands to the common type first.
    let operand_ty = if op.is_shift() {
        left_ty.clone()
    } else {
        Type::usual_arithmetic(&left_ty, &right_ty)
    };
    let left = wrap_int(operands.left.as_i128()?, &operand_ty, layout)?.as_i128()?;
    let right = if op.is_shift() {
        operands.right.as_i128()?
    } else {
        wrap_int(operands.right.as_i128()?, &operand_ty, layout)?.as_i128()?
    };

    let value = match op {
        BinaryOp::Add => left.wrapping_add(right),
        BinaryOp::Sub => left.wrapping_sub(right),
        BinaryOp::Mul => left.wrapping_mul(right),
        BinaryOp::Div => left.checked_div(right)?,
        BinaryOp::Mod => left.checked_rem(right)?,
        BinaryOp::Shl | BinaryOp::Shr => {
            let bits = operand_ty.size_of(layout)? * 8;
            let amount = u32::try_from(right).ok().filter(|amount| u64::from(*amount) < bits)?;
            if op == BinaryOp::Shl {
                left << amount
            } else {
                left >> amount
            }
        }
        BinaryOp::BitAnd => left & right,
        BinaryOp::BitOr => left | right,
        BinaryOp::BitXor => left ^ right,
        _ => return None,
    };
    wrap_int(value, result, layout)
}

fn compare(op: BinaryOp, ordering: std::cmp::Ordering) -> ConstValue {
    use std::cmp::Ordering::{Equal, Greater, Less};
    let value = match op {
        BinaryOp::Lt => ordering == Less,
        BinaryOp::Le => ordering != Greater,
        BinaryOp::Gt => ordering == Greater,
        BinaryOp::Ge => ordering != Less,
        BinaryOp::Eq => ordering == Equal,
        _ => ordering != Equal,
    };
    ConstValue::Int(i64::from(value))
}

fn pointee_size(ty: &Type, layout: &TargetLayout) -> Option<i64> {
    let size = ty.pointee()?.size_of(layout)?;
    i64::try_from(size).ok()
}

/// Pointer arithmetic and comparison.
fn fold_pointer(
    op: BinaryOp,
    operands: &Operands<'_>,
    left_ty: &Type,
    right_ty: &Type,
    result: &Type,
    layout: &TargetLayout,
) -> Option<ConstValue> {
    match op {
        BinaryOp::Add | BinaryOp::Sub if left_ty.is_pointer() && right_ty.is_integer() => {
            let scale = pointee_size(left_ty, layout)?;
            let index = operands.right.as_int()?.checked_mul(scale)?;
            let delta = if op == BinaryOp::Sub { index.checked_neg()? } else { index };
            operands.left.to_address()?.offset_by(delta)
        }
        BinaryOp::Add if left_ty.is_integer() && right_ty.is_pointer() => {
            let scale = pointee_size(right_ty, layout)?;
            let index = operands.left.as_int()?.checked_mul(scale)?;
            operands.right.to_address()?.offset_by(index)
        }
        BinaryOp::Sub if left_ty.is_pointer() && right_ty.is_pointer() => {
            let (left_base, left_offset) = address_parts(operands.left)?;
            let (right_base, right_offset) = address_parts(operands.right)?;
            if left_base != right_base {
                return None;
            }
            let scale = pointee_size(left_ty, layout)?;
            if scale == 0 {
                return None;
            }
            let difference = left_offset.checked_sub(right_offset)? / scale;
            wrap_int(i128::from(difference), result, layout)
        }
        _ if op.is_comparison() => {
            let (left_base, left_offset) = address_parts(operands.left)?;
            let (right_base, right_offset) = address_parts(operands.right)?;
            if left_base != right_base {
                return None;
            }
            Some(compare(op, left_offset.cmp(&right_offset)))
        }
        _ => None,
    }
}

fn address_parts(value: &ConstValue) -> Option<(AddressBase, i64)> {
    match value.to_address()? {
        ConstValue::Address { base, offset } => Some((base, offset)),
        _ => None,
    }
}
