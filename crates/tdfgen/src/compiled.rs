use std::fmt;

use log::trace;

use crate::{
    conversion::Affine,
    errors::CompileError,
    field::{Field, FieldType},
    primitive::{Endian, Primitive},
    registry::StructRegistry,
    schema::RenderContext,
};

/// Largest payload of one TDF record; the record length is a single byte.
pub const MAX_RECORD_SIZE: usize = u8::MAX as usize;

/// Width of a packed integer read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedWidth {
    Bits24,
    Bits48,
}

impl PackedWidth {
    fn from_count(count: usize) -> Option<Self> {
        match count {
            3 => Some(PackedWidth::Bits24),
            6 => Some(PackedWidth::Bits48),
            _ => None,
        }
    }

    pub fn bytes(self) -> usize {
        match self {
            PackedWidth::Bits24 => 3,
            PackedWidth::Bits48 => 6,
        }
    }

    fn bits(self) -> usize {
        self.bytes() * 8
    }
}

/// The raw read performed for one flattened entry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReadOp {
    /// One value of a primitive type.
    Primitive(Primitive),
    /// A 3 or 6 byte array read as one integer.
    Packed {
        width: PackedWidth,
        signed: bool,
        endian: Endian,
    },
    /// A fixed-length `char` array read as one string.
    String { len: usize },
    /// The rest of the record read as a string.
    RemainingString,
    /// The rest of the record read as a hex dump.
    RemainingHex,
}

impl ReadOp {
    /// Byte width of the decoded numeric value, `None` for text reads.
    pub fn value_width(&self) -> Option<usize> {
        match self {
            ReadOp::Primitive(primitive) => Some(primitive.width()),
            ReadOp::Packed { width, .. } => Some(width.bytes()),
            ReadOp::String { .. } | ReadOp::RemainingString | ReadOp::RemainingHex => None,
        }
    }

    /// Bytes the read consumes, `0` for reads of the rest of the record.
    pub fn fixed_size(&self) -> usize {
        match self {
            ReadOp::Primitive(primitive) => primitive.width(),
            ReadOp::Packed { width, .. } => width.bytes(),
            ReadOp::String { len } => *len,
            ReadOp::RemainingString | ReadOp::RemainingHex => 0,
        }
    }

    /// Whether the read consumes the rest of the record.
    pub fn is_variable(&self) -> bool {
        matches!(self, ReadOp::RemainingString | ReadOp::RemainingHex)
    }

    /// Whether the read yields text rather than a number.
    pub fn is_text(&self) -> bool {
        self.value_width().is_none()
    }

    /// Byte order tag of the read, present iff more than one byte is read
    /// as a number.
    pub fn endianness(&self) -> Option<Endian> {
        match self {
            ReadOp::Primitive(primitive) if primitive.needs_endianness() => Some(Endian::Little),
            ReadOp::Packed { endian, .. } => Some(*endian),
            _ => None,
        }
    }
}

impl fmt::Display for ReadOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadOp::Primitive(primitive) => {
                write!(f, "cursor.read_{}", primitive.rust_type())?;
                if let Some(endian) = self.endianness() {
                    write!(f, "::<{}>", endian.byteorder())?;
                }
                f.write_str("()?")
            }
            ReadOp::Packed {
                width,
                signed,
                endian,
            } => {
                let sign = if *signed { 'i' } else { 'u' };
                write!(
                    f,
                    "cursor.read_{sign}{}::<{}>()?",
                    width.bits(),
                    endian.byteorder()
                )
            }
            ReadOp::String { len } => write!(f, "tdf_field_read_string(cursor, {len})?"),
            ReadOp::RemainingString => {
                f.write_str("tdf_field_read_remaining_string(cursor, cursor_start, size)?")
            }
            ReadOp::RemainingHex => f.write_str("tdf_field_read_vla(cursor, cursor_start, size)?"),
        }
    }
}

/// Decode operation of one flattened entry: a read plus optional affine
/// conversion. Displays as the Rust expression that performs it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecodeOp {
    pub read: ReadOp,
    pub affine: Option<Affine>,
}

impl DecodeOp {
    /// Whether the decoded value is a float, either natively or after an
    /// affine conversion.
    pub fn is_float(&self) -> bool {
        self.affine.is_some() || matches!(self.read, ReadOp::Primitive(p) if p.is_float())
    }
}

impl fmt::Display for DecodeOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.read)?;
        if let Some(affine) = &self.affine {
            write!(f, "{affine}")?;
        }
        Ok(())
    }
}

/// How many entries a primitive field flattens into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Repeat {
    Once,
    Indexed(usize),
}

impl Repeat {
    pub(crate) fn len(self) -> usize {
        match self {
            Repeat::Once => 1,
            Repeat::Indexed(count) => count,
        }
    }
}

/// Per-element decode operation of a primitive field and its cardinality.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct PrimitivePlan {
    pub op: DecodeOp,
    pub repeat: Repeat,
}

/// Validates a primitive field's conversion against its type and length and
/// returns the operation every one of its entries uses.
pub(crate) fn plan_primitive(
    field: &Field,
    primitive: Primitive,
) -> Result<PrimitivePlan, CompileError> {
    let conversion = field.conversion.as_ref();

    let (read, repeat) = match (conversion.and_then(|c| c.packed), field.count) {
        (Some(endian), count) => {
            if !primitive.is_single_byte_int() {
                return Err(CompileError::conversion(
                    &field.name,
                    format!("packed integers need a single-byte integer type, found `{primitive}`"),
                ));
            }
            let width = match count {
                Some(count) => PackedWidth::from_count(count).ok_or_else(|| {
                    CompileError::conversion(
                        &field.name,
                        format!("packed integers need 3 or 6 bytes, found {count}"),
                    )
                })?,
                None => {
                    return Err(CompileError::conversion(
                        &field.name,
                        "packed integers need 3 or 6 bytes, field is not an array",
                    ));
                }
            };
            let read = ReadOp::Packed {
                width,
                signed: primitive.is_signed(),
                endian,
            };
            (read, Repeat::Once)
        }
        (None, Some(0)) if primitive == Primitive::Char => (ReadOp::RemainingString, Repeat::Once),
        (None, Some(len)) if primitive == Primitive::Char => {
            check_size(field, Some(len))?;
            (ReadOp::String { len }, Repeat::Once)
        }
        (None, Some(0)) => (ReadOp::RemainingHex, Repeat::Once),
        (None, Some(count)) => {
            check_size(field, count.checked_mul(primitive.width()))?;
            (ReadOp::Primitive(primitive), Repeat::Indexed(count))
        }
        (None, None) => (ReadOp::Primitive(primitive), Repeat::Once),
    };

    let affine = match conversion {
        Some(conversion) => conversion.affine()?,
        None => None,
    };
    if affine.is_some() && read.is_text() {
        return Err(CompileError::conversion(
            &field.name,
            "scale and offset need a numeric field",
        ));
    }

    Ok(PrimitivePlan {
        op: DecodeOp { read, affine },
        repeat,
    })
}

/// Fails unless the field's bytes fit in one record. `None` means the size
/// overflowed.
fn check_size(field: &Field, bytes: Option<usize>) -> Result<(), CompileError> {
    match bytes {
        Some(bytes) if bytes <= MAX_RECORD_SIZE => Ok(()),
        _ => Err(CompileError::conversion(
            &field.name,
            format!("field needs more than the {MAX_RECORD_SIZE} bytes a record holds"),
        )),
    }
}

/// How many times a struct-typed field repeats its struct `inner`.
pub(crate) fn struct_repeat(field: &Field, inner: &RenderContext) -> Result<Repeat, CompileError> {
    if field.conversion.is_some() {
        return Err(CompileError::conversion(
            &field.name,
            "conversions apply to primitive fields only",
        ));
    }
    if field.display.is_some() {
        return Err(CompileError::InvalidDisplay {
            field: field.name.clone(),
            reason: "display formats apply to primitive fields only".to_string(),
        });
    }
    match field.count {
        None => Ok(Repeat::Once),
        Some(0) => Err(CompileError::conversion(
            &field.name,
            "struct arrays need a fixed length",
        )),
        Some(count) => {
            check_size(field, count.checked_mul(inner.fixed_size()))?;
            Ok(Repeat::Indexed(count))
        }
    }
}

/// Flattens one field into its ordered `(name, operation)` entries.
///
/// Struct-typed fields expand to the registered struct's entries prefixed
/// with `field.`; arrays expand to `field[i]`; strings, packed integers and
/// variable-length fields stay a single entry.
pub fn compile_field(
    field: &Field,
    registry: &StructRegistry,
) -> Result<Vec<(String, DecodeOp)>, CompileError> {
    let entries: Vec<(String, DecodeOp)> = match &field.ty {
        FieldType::Struct(name) => {
            let inner = registry.lookup(field, name)?;
            let prefixes: Vec<String> = match struct_repeat(field, inner)? {
                Repeat::Once => vec![field.name.clone()],
                Repeat::Indexed(count) => {
                    (0..count).map(|i| format!("{}[{i}]", field.name)).collect()
                }
            };
            prefixes
                .iter()
                .flat_map(|prefix| {
                    inner
                        .names()
                        .iter()
                        .zip(inner.ops())
                        .map(move |(name, op)| (format!("{prefix}.{name}"), *op))
                })
                .collect()
        }
        FieldType::Primitive(primitive) => {
            let plan = plan_primitive(field, *primitive)?;
            match plan.repeat {
                Repeat::Once => vec![(field.name.clone(), plan.op)],
                Repeat::Indexed(count) => (0..count)
                    .map(|i| (format!("{}[{i}]", field.name), plan.op))
                    .collect(),
            }
        }
    };

    for (name, op) in &entries {
        trace!("{name}: {op}");
    }

    Ok(entries)
}
