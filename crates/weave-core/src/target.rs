//! Target machine description.
//!
//! Sizes, alignments and signedness of the basic C types for one target
//! architecture. The constant folder consults this for `sizeof`,
//! `alignof`, field offsets and integer wrap-around.

/// Size and alignment of one type, in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SizeAlign {
    /// Size in bytes.
    pub size: u64,
    /// Alignment in bytes.
    pub align: u64,
}

impl SizeAlign {
    /// Create a size/alignment pair.
    pub const fn new(size: u64, align: u64) -> Self {
        Self { size, align }
    }
}

/// Basic type layout for a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TargetLayout {
    /// Target name.
    pub name: String,
    /// Data pointers and function pointers.
    pub pointer: SizeAlign,
    /// `float`
    pub float: SizeAlign,
    /// `double`
    pub double: SizeAlign,
    /// `long double`
    pub long_double: SizeAlign,
    /// `short`
    pub short: SizeAlign,
    /// `int`
    pub int: SizeAlign,
    /// `long`
    pub long: SizeAlign,
    /// `long long`
    pub long_long: SizeAlign,
    /// Alignment of 1, 2, 4 and 8 byte integers.
    pub int_align: [u64; 4],
    /// Size of `wchar_t`.
    pub wchar_size: u64,
    /// Size of `size_t`.
    pub size_t_size: u64,
    /// Whether plain `char` is signed.
    pub char_signed: bool,
    /// Whether `wchar_t` is signed.
    pub wchar_signed: bool,
}

impl TargetLayout {
    /// The 8-bit AVR microcontroller family: 16-bit pointers and `int`,
    /// everything byte-aligned.
    pub fn avr() -> Self {
        Self {
            name: "avr".to_string(),
            pointer: SizeAlign::new(2, 1),
            float: SizeAlign::new(4, 1),
            double: SizeAlign::new(4, 1),
            long_double: SizeAlign::new(4, 1),
            short: SizeAlign::new(2, 1),
            int: SizeAlign::new(2, 1),
            long: SizeAlign::new(4, 1),
            long_long: SizeAlign::new(8, 1),
            int_align: [1, 1, 1, 1],
            wchar_size: 2,
            size_t_size: 2,
            char_signed: true,
            wchar_signed: true,
        }
    }

    /// A 64-bit host with the LP64 data model.
    pub fn lp64() -> Self {
        Self {
            name: "lp64".to_string(),
            pointer: SizeAlign::new(8, 8),
            float: SizeAlign::new(4, 4),
            double: SizeAlign::new(8, 8),
            long_double: SizeAlign::new(16, 16),
            short: SizeAlign::new(2, 2),
            int: SizeAlign::new(4, 4),
            long: SizeAlign::new(8, 8),
            long_long: SizeAlign::new(8, 8),
            int_align: [1, 2, 4, 8],
            wchar_size: 4,
            size_t_size: 8,
            char_signed: true,
            wchar_signed: true,
        }
    }

    /// Alignment of an integer of `size` bytes.
    pub fn int_align_for(&self, size: u64) -> u64 {
        match size {
            1 => self.int_align[0],
            2 => self.int_align[1],
            4 => self.int_align[2],
            _ => self.int_align[3],
        }
    }
}

impl Default for TargetLayout {
    fn default() -> Self {
        Self::lp64()
    }
}
