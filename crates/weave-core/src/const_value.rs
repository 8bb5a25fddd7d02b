//! Compile-time constant values.
//!
//! A folded expression carries at most two of these: its value as a plain
//! constant (`cst`) and its value as a constant address expression
//! (`static_address`). Address constants are symbolic: a base (a
//! declaration, a label, a string literal or an absolute location) plus a
//! byte offset.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::DeclId;

/// The symbolic base of an address constant.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AddressBase {
    /// An absolute address (an integer reinterpreted as a pointer).
    Absolute,
    /// The address of a static-storage variable or a function.
    Decl(DeclId),
    /// The address of a label (`&&label`).
    Label(String),
    /// The address of a string literal's storage.
    String(String),
}

/// A compile-time constant value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConstValue {
    /// Signed integer value
    Int(i64),
    /// Unsigned integer value
    UInt(u64),
    /// Floating-point value (f64 for precision)
    Float(OrderedFloat<f64>),
    /// Address constant
    Address {
        /// What the address is relative to.
        base: AddressBase,
        /// Byte offset from the base.
        offset: i64,
    },
}

impl ConstValue {
    /// Build a float constant.
    pub fn float(value: f64) -> Self {
        ConstValue::Float(OrderedFloat(value))
    }

    /// Build an address constant.
    pub fn address(base: AddressBase, offset: i64) -> Self {
        ConstValue::Address { base, offset }
    }

    /// Whether this value is an integer (signed or unsigned).
    pub fn is_integer(&self) -> bool {
        matches!(self, ConstValue::Int(_) | ConstValue::UInt(_))
    }

    /// Whether this value is an address constant.
    pub fn is_address(&self) -> bool {
        matches!(self, ConstValue::Address { .. })
    }

    /// The integer value widened to `i128`, so that every `i64` and `u64`
    /// fits without loss.
    pub fn as_i128(&self) -> Option<i128> {
        match self {
            ConstValue::Int(v) => Some(i128::from(*v)),
            ConstValue::UInt(v) => Some(i128::from(*v)),
            _ => None,
        }
    }

    /// Try to convert this value to an i64.
    pub fn as_int(&self) -> Option<i64> {
        self.as_i128().and_then(|v| i64::try_from(v).ok())
    }

    /// Try to convert this value to an f64.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            ConstValue::Int(v) => Some(*v as f64),
            ConstValue::UInt(v) => Some(*v as f64),
            ConstValue::Float(v) => Some(v.0),
            ConstValue::Address { .. } => None,
        }
    }

    /// Truth value for conditions.
    ///
    /// Symbolic addresses are non-null; only an absolute address can be
    /// judged, by its offset.
    pub fn truth(&self) -> Option<bool> {
        match self {
            ConstValue::Int(v) => Some(*v != 0),
            ConstValue::UInt(v) => Some(*v != 0),
            ConstValue::Float(v) => Some(v.0 != 0.0),
            ConstValue::Address {
                base: AddressBase::Absolute,
                offset,
            } => Some(*offset != 0),
            ConstValue::Address { .. } => Some(true),
        }
    }

    /// Reinterpret this value as an address constant.
    ///
    /// Integers become absolute addresses; floats have no address meaning.
    pub fn to_address(&self) -> Option<ConstValue> {
        match self {
            ConstValue::Address { .. } => Some(self.clone()),
            ConstValue::Int(v) => Some(ConstValue::address(AddressBase::Absolute, *v)),
            ConstValue::UInt(v) => i64::try_from(*v)
                .ok()
                .map(|v| ConstValue::address(AddressBase::Absolute, v)),
            ConstValue::Float(_) => None,
        }
    }

    /// Offset an address constant by `delta` bytes.
    pub fn offset_by(&self, delta: i64) -> Option<ConstValue> {
        match self {
            ConstValue::Address { base, offset } => offset
                .checked_add(delta)
                .map(|offset| ConstValue::address(base.clone(), offset)),
            _ => None,
        }
    }
}

impl fmt::Display for ConstValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstValue::Int(v) => write!(f, "{v}"),
            ConstValue::UInt(v) => write!(f, "{v}u"),
            ConstValue::Float(v) => write!(f, "{}", v.0),
            ConstValue::Address { base, offset } => {
                match base {
                    AddressBase::Absolute => write!(f, "&*")?,
                    AddressBase::Decl(decl) => write!(f, "&{decl}")?,
                    AddressBase::Label(label) => write!(f, "&&{label}")?,
                    AddressBase::String(s) => write!(f, "{s:?}")?,
                }
                if *offset != 0 {
                    write!(f, "{offset:+}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_conversions() {
        assert_eq!(ConstValue::Int(-3).as_i128(), Some(-3));
        assert_eq!(ConstValue::UInt(u64::MAX).as_i128(), Some(u64::MAX as i128));
        assert_eq!(ConstValue::UInt(u64::MAX).as_int(), None);
        assert_eq!(ConstValue::float(1.5).as_i128(), None);
    }

    #[test]
    fn truth_values() {
        assert_eq!(ConstValue::Int(0).truth(), Some(false));
        assert_eq!(ConstValue::UInt(7).truth(), Some(true));
        assert_eq!(ConstValue::float(0.0).truth(), Some(false));
        let label = ConstValue::address(AddressBase::Label("out".into()), 0);
        assert_eq!(label.truth(), Some(true));
        let null = ConstValue::address(AddressBase::Absolute, 0);
        assert_eq!(null.truth(), Some(false));
    }

    #[test]
    fn reinterpret_as_address() {
        assert_eq!(
            ConstValue::Int(0x20).to_address(),
            Some(ConstValue::address(AddressBase::Absolute, 0x20))
        );
        assert_eq!(ConstValue::float(2.0).to_address(), None);
    }

    #[test]
    fn address_offsets() {
        let base = ConstValue::address(AddressBase::Decl(DeclId::new(3)), 4);
        assert_eq!(
            base.offset_by(6),
            Some(ConstValue::address(AddressBase::Decl(DeclId::new(3)), 10))
        );
        assert_eq!(ConstValue::Int(1).offset_by(1), None);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", ConstValue::Int(-2)), "-2");
        assert_eq!(format!("{}", ConstValue::UInt(2)), "2u");
        let addr = ConstValue::address(AddressBase::Decl(DeclId::new(1)), 8);
        assert_eq!(format!("{addr}"), "&decl_1+8");
    }
}
