//! A small C type model.
//!
//! Enough structure for constant folding: sizes and alignments against a
//! [`TargetLayout`], struct field offsets, integer width and signedness,
//! array/function decay and the usual arithmetic conversions.

use weave_core::TargetLayout;

/// Integer type kinds, in increasing conversion rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum IntKind {
    /// `_Bool`
    Bool,
    /// `char` (signedness from the target)
    PlainChar,
    /// `signed char` / `unsigned char`
    Char,
    /// `short`
    Short,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `long long`
    LongLong,
}

/// Floating-point type kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FloatKind {
    /// `float`
    Float,
    /// `double`
    Double,
    /// `long double`
    LongDouble,
}

/// A named struct field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    /// Field name.
    pub name: String,
    /// Field type.
    pub ty: Type,
}

impl Field {
    /// Create a field.
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A C type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Type {
    /// `void`, also used for non-expression nodes.
    #[default]
    Void,
    /// An integer type.
    Int {
        /// Rank.
        kind: IntKind,
        /// Signedness (ignored for `PlainChar` and `Bool`).
        signed: bool,
    },
    /// A floating-point type.
    Float(FloatKind),
    /// Pointer to a type.
    Pointer(Box<Type>),
    /// Array of a type, with a length when complete.
    Array {
        /// Element type.
        elem: Box<Type>,
        /// Number of elements.
        len: Option<u64>,
    },
    /// A struct with its fields in declaration order.
    Struct {
        /// Tag name.
        name: String,
        /// Fields.
        fields: Vec<Field>,
    },
    /// A function returning a type.
    Function {
        /// Return type.
        ret: Box<Type>,
    },
}

impl Type {
    /// `int`
    pub fn int() -> Self {
        Type::Int {
            kind: IntKind::Int,
            signed: true,
        }
    }

    /// `unsigned int`
    pub fn uint() -> Self {
        Type::Int {
            kind: IntKind::Int,
            signed: false,
        }
    }

    /// `long`
    pub fn long() -> Self {
        Type::Int {
            kind: IntKind::Long,
            signed: true,
        }
    }

    /// `unsigned long`, the folder's stand-in for `size_t`.
    pub fn ulong() -> Self {
        Type::Int {
            kind: IntKind::Long,
            signed: false,
        }
    }

    /// Plain `char`.
    pub fn char() -> Self {
        Type::Int {
            kind: IntKind::PlainChar,
            signed: true,
        }
    }

    /// `unsigned char`, i.e. `uint8_t`.
    pub fn uchar() -> Self {
        Type::Int {
            kind: IntKind::Char,
            signed: false,
        }
    }

    /// `unsigned short`, i.e. `uint16_t` on most targets.
    pub fn ushort() -> Self {
        Type::Int {
            kind: IntKind::Short,
            signed: false,
        }
    }

    /// `double`
    pub fn double() -> Self {
        Type::Float(FloatKind::Double)
    }

    /// Pointer to this type.
    pub fn pointer_to(self) -> Self {
        Type::Pointer(Box::new(self))
    }

    /// Array of `len` elements of this type.
    pub fn array_of(self, len: Option<u64>) -> Self {
        Type::Array {
            elem: Box::new(self),
            len,
        }
    }

    /// Whether this is an integer type.
    pub fn is_integer(&self) -> bool {
        matches!(self, Type::Int { .. })
    }

    /// Whether this is a floating-point type.
    pub fn is_float(&self) -> bool {
        matches!(self, Type::Float(_))
    }

    /// Whether this is an integer or floating-point type.
    pub fn is_arithmetic(&self) -> bool {
        self.is_integer() || self.is_float()
    }

    /// Whether this is a pointer type.
    pub fn is_pointer(&self) -> bool {
        matches!(self, Type::Pointer(_))
    }

    /// Whether expressions of this type decay to a pointer.
    pub fn decays(&self) -> bool {
        matches!(self, Type::Array { .. } | Type::Function { .. })
    }

    /// Type pointed to (or element type of an array).
    pub fn pointee(&self) -> Option<&Type> {
        match self {
            Type::Pointer(inner) => Some(inner),
            Type::Array { elem, .. } => Some(elem),
            _ => None,
        }
    }

    /// Whether values of this integer type are signed on `layout`.
    pub fn is_signed(&self, layout: &TargetLayout) -> bool {
        match self {
            Type::Int {
                kind: IntKind::PlainChar,
                ..
            } => layout.char_signed,
            Type::Int {
                kind: IntKind::Bool,
                ..
            } => false,
            Type::Int { signed, .. } => *signed,
            Type::Float(_) => true,
            _ => false,
        }
    }

    /// Size in bytes, or `None` for incomplete types.
    pub fn size_of(&self, layout: &TargetLayout) -> Option<u64> {
        match self {
            Type::Void | Type::Function { .. } => None,
            Type::Int { kind, .. } => Some(match kind {
                IntKind::Bool | IntKind::PlainChar | IntKind::Char => 1,
                IntKind::Short => layout.short.size,
                IntKind::Int => layout.int.size,
                IntKind::Long => layout.long.size,
                IntKind::LongLong => layout.long_long.size,
            }),
            Type::Float(kind) => Some(match kind {
                FloatKind::Float => layout.float.size,
                FloatKind::Double => layout.double.size,
                FloatKind::LongDouble => layout.long_double.size,
            }),
            Type::Pointer(_) => Some(layout.pointer.size),
            Type::Array { elem, len } => elem.size_of(layout)?.checked_mul((*len)?),
            Type::Struct { fields, .. } => {
                let (end, align) = struct_extent(fields, layout)?;
                Some(round_up(end, align))
            }
        }
    }

    /// Alignment in bytes, or `None` for incomplete types.
    pub fn align_of(&self, layout: &TargetLayout) -> Option<u64> {
        match self {
            Type::Void | Type::Function { .. } => None,
            Type::Int { kind, .. } => Some(match kind {
                IntKind::Bool | IntKind::PlainChar | IntKind::Char => layout.int_align_for(1),
                IntKind::Short => layout.short.align,
                IntKind::Int => layout.int.align,
                IntKind::Long => layout.long.align,
                IntKind::LongLong => layout.long_long.align,
            }),
            Type::Float(kind) => Some(match kind {
                FloatKind::Float => layout.float.align,
                FloatKind::Double => layout.double.align,
                FloatKind::LongDouble => layout.long_double.align,
            }),
            Type::Pointer(_) => Some(layout.pointer.align),
            Type::Array { elem, .. } => elem.align_of(layout),
            Type::Struct { fields, .. } => struct_extent(fields, layout).map(|(_, align)| align),
        }
    }

    /// Byte offset of a named field in a struct type.
    pub fn field_offset(&self, name: &str, layout: &TargetLayout) -> Option<u64> {
        let Type::Struct { fields, .. } = self else {
            return None;
        };
        let mut offset = 0;
        for field in fields {
            offset = round_up(offset, field.ty.align_of(layout)?);
            if field.name == name {
                return Some(offset);
            }
            offset += field.ty.size_of(layout)?;
        }
        None
    }

    /// Type of a named struct field.
    pub fn field_type(&self, name: &str) -> Option<&Type> {
        match self {
            Type::Struct { fields, .. } => fields.iter().find(|f| f.name == name).map(|f| &f.ty),
            _ => None,
        }
    }

    /// Array-to-pointer and function-to-pointer decay followed by integer
    /// promotion.
    pub fn default_conversion(&self) -> Type {
        match self {
            Type::Array { elem, .. } => Type::Pointer(elem.clone()),
            Type::Function { .. } => Type::Pointer(Box::new(self.clone())),
            Type::Int { kind, .. } if *kind < IntKind::Int => Type::int(),
            _ => self.clone(),
        }
    }

    /// The usual arithmetic conversion of two operand types.
    ///
    /// Conversion rank decides between integer types; on equal rank the
    /// unsigned type wins.
    pub fn usual_arithmetic(left: &Type, right: &Type) -> Type {
        let left = left.default_conversion();
        let right = right.default_conversion();
        match (&left, &right) {
            (Type::Float(a), Type::Float(b)) => Type::Float(*a.max(b)),
            (Type::Float(_), _) => left,
            (_, Type::Float(_)) => right,
            (
                Type::Int {
                    kind: lk,
                    signed: ls,
                },
                Type::Int {
                    kind: rk,
                    signed: rs,
                },
            ) => {
                let kind = *lk.max(rk);
                let signed = match lk.cmp(rk) {
                    std::cmp::Ordering::Equal => *ls && *rs,
                    std::cmp::Ordering::Greater => *ls,
                    std::cmp::Ordering::Less => *rs,
                };
                Type::Int { kind, signed }
            }
            (Type::Pointer(_), _) => left,
            (_, Type::Pointer(_)) => right,
            _ => Type::int(),
        }
    }
}

fn round_up(value: u64, align: u64) -> u64 {
    if align <= 1 {
        value
    } else {
        value.div_ceil(align) * align
    }
}

/// End offset of the last field and the struct's alignment.
fn struct_extent(fields: &[Field], layout: &TargetLayout) -> Option<(u64, u64)> {
    let mut offset = 0;
    let mut align = 1;
    for field in fields {
        let field_align = field.ty.align_of(layout)?;
        offset = round_up(offset, field_align) + field.ty.size_of(layout)?;
        align = align.max(field_align);
    }
    Some((offset, align))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point() -> Type {
        Type::Struct {
            name: "point".to_string(),
            fields: vec![
                Field::new("tag", Type::uchar()),
                Field::new("x", Type::int()),
                Field::new("y", Type::int()),
            ],
        }
    }

    #[test]
    fn scalar_sizes() {
        let lp64 = TargetLayout::lp64();
        let avr = TargetLayout::avr();
        assert_eq!(Type::int().size_of(&lp64), Some(4));
        assert_eq!(Type::int().size_of(&avr), Some(2));
        assert_eq!(Type::char().pointer_to().size_of(&avr), Some(2));
        assert_eq!(Type::Void.size_of(&lp64), None);
    }

    #[test]
    fn array_sizes() {
        let lp64 = TargetLayout::lp64();
        assert_eq!(Type::int().array_of(Some(10)).size_of(&lp64), Some(40));
        assert_eq!(Type::int().array_of(None).size_of(&lp64), None);
        assert_eq!(Type::int().array_of(Some(3)).align_of(&lp64), Some(4));
    }

    #[test]
    fn struct_layout_with_padding() {
        let lp64 = TargetLayout::lp64();
        let ty = point();
        assert_eq!(ty.field_offset("tag", &lp64), Some(0));
        assert_eq!(ty.field_offset("x", &lp64), Some(4));
        assert_eq!(ty.field_offset("y", &lp64), Some(8));
        assert_eq!(ty.size_of(&lp64), Some(12));
        assert_eq!(ty.field_offset("z", &lp64), None);
    }

    #[test]
    fn struct_layout_packed_on_avr() {
        let avr = TargetLayout::avr();
        let ty = point();
        assert_eq!(ty.field_offset("x", &avr), Some(1));
        assert_eq!(ty.size_of(&avr), Some(5));
    }

    #[test]
    fn plain_char_signedness_follows_target() {
        let mut layout = TargetLayout::lp64();
        assert!(Type::char().is_signed(&layout));
        layout.char_signed = false;
        assert!(!Type::char().is_signed(&layout));
        assert!(!Type::uchar().is_signed(&layout));
    }

    #[test]
    fn default_conversion_decays_and_promotes() {
        let array = Type::int().array_of(Some(4));
        assert_eq!(array.default_conversion(), Type::int().pointer_to());
        assert_eq!(Type::uchar().default_conversion(), Type::int());
        assert_eq!(Type::long().default_conversion(), Type::long());
    }

    #[test]
    fn usual_arithmetic_conversion() {
        assert_eq!(Type::usual_arithmetic(&Type::int(), &Type::uint()), Type::uint());
        assert_eq!(Type::usual_arithmetic(&Type::uint(), &Type::long()), Type::long());
        assert_eq!(
            Type::usual_arithmetic(&Type::uchar(), &Type::ushort()),
            Type::int()
        );
        assert_eq!(Type::usual_arithmetic(&Type::int(), &Type::double()), Type::double());
    }
}
