//! The type catalog: primitive TDF field types and how each one is read.
//!
//! Multi-byte values in a TDF record are always little-endian; only packed
//! integers (see [crate::conversion::Conversion::packed]) may choose their
//! byte order.

use std::fmt;

/// A primitive field type as named in a schema (`uint16_t`, `float32_t`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Char,
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Int64,
    UInt64,
    Float32,
    Float64,
}

impl Primitive {
    pub const ALL: [Primitive; 11] = [
        Primitive::Char,
        Primitive::Int8,
        Primitive::UInt8,
        Primitive::Int16,
        Primitive::UInt16,
        Primitive::Int32,
        Primitive::UInt32,
        Primitive::Int64,
        Primitive::UInt64,
        Primitive::Float32,
        Primitive::Float64,
    ];

    /// Looks up a primitive by its schema name. Returns `None` for anything
    /// else, which callers then resolve as a struct name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "char" => Some(Primitive::Char),
            "int8_t" => Some(Primitive::Int8),
            "uint8_t" => Some(Primitive::UInt8),
            "int16_t" => Some(Primitive::Int16),
            "uint16_t" => Some(Primitive::UInt16),
            "int32_t" => Some(Primitive::Int32),
            "uint32_t" => Some(Primitive::UInt32),
            "int64_t" => Some(Primitive::Int64),
            "uint64_t" => Some(Primitive::UInt64),
            "float32_t" => Some(Primitive::Float32),
            "float64_t" => Some(Primitive::Float64),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Primitive::Char => "char",
            Primitive::Int8 => "int8_t",
            Primitive::UInt8 => "uint8_t",
            Primitive::Int16 => "int16_t",
            Primitive::UInt16 => "uint16_t",
            Primitive::Int32 => "int32_t",
            Primitive::UInt32 => "uint32_t",
            Primitive::Int64 => "int64_t",
            Primitive::UInt64 => "uint64_t",
            Primitive::Float32 => "float32_t",
            Primitive::Float64 => "float64_t",
        }
    }

    /// Width of one value in bytes.
    pub fn width(self) -> usize {
        match self {
            Primitive::Char | Primitive::Int8 | Primitive::UInt8 => 1,
            Primitive::Int16 | Primitive::UInt16 => 2,
            Primitive::Int32 | Primitive::UInt32 | Primitive::Float32 => 4,
            Primitive::Int64 | Primitive::UInt64 | Primitive::Float64 => 8,
        }
    }

    pub fn is_signed(self) -> bool {
        matches!(
            self,
            Primitive::Int8 | Primitive::Int16 | Primitive::Int32 | Primitive::Int64
        )
    }

    pub fn is_float(self) -> bool {
        matches!(self, Primitive::Float32 | Primitive::Float64)
    }

    /// True for the byte types that may be packed into 24/48-bit integers.
    pub fn is_single_byte_int(self) -> bool {
        matches!(self, Primitive::Int8 | Primitive::UInt8)
    }

    /// Whether the read needs an explicit byte order.
    pub fn needs_endianness(self) -> bool {
        self.width() > 1
    }

    /// Rust type produced by the read; `char` is read as a raw byte.
    pub fn rust_type(self) -> &'static str {
        match self {
            Primitive::Char | Primitive::UInt8 => "u8",
            Primitive::Int8 => "i8",
            Primitive::Int16 => "i16",
            Primitive::UInt16 => "u16",
            Primitive::Int32 => "i32",
            Primitive::UInt32 => "u32",
            Primitive::Int64 => "i64",
            Primitive::UInt64 => "u64",
            Primitive::Float32 => "f32",
            Primitive::Float64 => "f64",
        }
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Byte order of a multi-byte read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Endian {
    #[default]
    Little,
    Big,
}

impl Endian {
    /// Name of the matching `byteorder` marker type.
    pub fn byteorder(self) -> &'static str {
        match self {
            Endian::Little => "LittleEndian",
            Endian::Big => "BigEndian",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_round_trip() {
        for primitive in Primitive::ALL {
            assert_eq!(Primitive::from_name(primitive.name()), Some(primitive));
        }
        assert_eq!(Primitive::from_name("uint24_t"), None);
        assert_eq!(Primitive::from_name("UINT8_T"), None);
    }

    #[test]
    fn test_endianness_iff_multi_byte() {
        for primitive in Primitive::ALL {
            assert_eq!(primitive.needs_endianness(), primitive.width() > 1);
        }
        assert!(!Primitive::Char.needs_endianness());
        assert!(Primitive::Float32.needs_endianness());
    }

    #[test]
    fn test_single_byte_ints() {
        let packable: Vec<_> = Primitive::ALL
            .into_iter()
            .filter(|p| p.is_single_byte_int())
            .collect();
        assert_eq!(packable, vec![Primitive::Int8, Primitive::UInt8]);
    }
}
