//! Format compiler: display placeholders aligned with [crate::compiled::compile_field].

use std::fmt;

use crate::{
    compiled::{DecodeOp, plan_primitive, struct_repeat},
    errors::CompileError,
    field::{DisplayFormat, Field, FieldType},
    registry::StructRegistry,
};

/// Placeholder for one flattened entry in the output format string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatToken {
    /// `{}`
    Plain,
    /// `0x{:0Nx}`, zero-padded to `digits` hex digits.
    Hex { digits: usize },
}

impl FormatToken {
    /// Token for a value decoded by `op` with the given display hint.
    pub fn for_op(
        field: &str,
        op: &DecodeOp,
        display: Option<DisplayFormat>,
    ) -> Result<Self, CompileError> {
        let Some(width) = op.read.value_width() else {
            return Ok(FormatToken::Plain);
        };

        match display {
            None => Ok(FormatToken::Plain),
            Some(DisplayFormat::Hex) if op.is_float() => Err(CompileError::InvalidDisplay {
                field: field.to_string(),
                reason: "hex display needs an integer value".to_string(),
            }),
            Some(DisplayFormat::Hex) => Ok(FormatToken::Hex { digits: width * 2 }),
        }
    }
}

impl fmt::Display for FormatToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatToken::Plain => f.write_str("{}"),
            FormatToken::Hex { digits } => write!(f, "0x{{:0{digits}x}}"),
        }
    }
}

/// Produces one format token per entry [crate::compiled::compile_field]
/// returns for the same field, in the same order.
pub fn compile_formats(
    field: &Field,
    registry: &StructRegistry,
) -> Result<Vec<FormatToken>, CompileError> {
    match &field.ty {
        FieldType::Struct(name) => {
            let inner = registry.lookup(field, name)?;
            let repeat = struct_repeat(field, inner)?;
            Ok(inner
                .formats()
                .iter()
                .copied()
                .cycle()
                .take(inner.len() * repeat.len())
                .collect())
        }
        FieldType::Primitive(primitive) => {
            let plan = plan_primitive(field, *primitive)?;
            let token = FormatToken::for_op(&field.name, &plan.op, field.display)?;
            Ok(vec![token; plan.repeat.len()])
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{conversion::Conversion, primitive::Endian, schema::Struct};

    use super::*;

    fn tokens(field: &Field) -> Vec<String> {
        compile_formats(field, &StructRegistry::new())
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    fn hex(name: &str, ty: &str) -> Field {
        let mut field = Field::new(name, ty);
        field.set_display(DisplayFormat::Hex);
        field
    }

    #[test]
    fn test_plain_and_hex() {
        assert_eq!(tokens(&Field::new("x", "int16_t")), vec!["{}"]);
        assert_eq!(tokens(&hex("flags", "uint8_t")), vec!["0x{:02x}"]);
        assert_eq!(tokens(&hex("crc", "uint16_t")), vec!["0x{:04x}"]);
        assert_eq!(tokens(&hex("application", "uint32_t")), vec!["0x{:08x}"]);
        assert_eq!(tokens(&hex("id", "uint64_t")), vec!["0x{:016x}"]);
    }

    #[test]
    fn test_array_repeats_token() {
        let mut field = hex("reserved", "uint8_t");
        field.set_count(4);
        assert_eq!(tokens(&field), vec!["0x{:02x}"; 4]);
    }

    #[test]
    fn test_strings_are_plain() {
        let mut field = hex("thread", "char");
        field.set_count(8);
        assert_eq!(tokens(&field), vec!["{}"]);

        let mut field = hex("payload", "uint8_t");
        field.set_count(0);
        assert_eq!(tokens(&field), vec!["{}"]);
    }

    #[test]
    fn test_packed_collapses_to_one_token() {
        let mut conversion = Conversion::new();
        conversion.set_packed(Endian::Big);
        let mut field = hex("bssid", "uint8_t");
        field.set_count(6).set_conversion(conversion);
        assert_eq!(tokens(&field), vec!["0x{:012x}"]);
    }

    #[test]
    fn test_hex_rejected_on_floats() {
        let registry = StructRegistry::new();
        assert!(matches!(
            compile_formats(&hex("cosine", "float32_t"), &registry),
            Err(CompileError::InvalidDisplay { .. })
        ));

        let mut conversion = Conversion::new();
        conversion.set_scale("0.5".parse().unwrap());
        let mut field = hex("voltage", "uint16_t");
        field.set_conversion(conversion);
        assert!(matches!(
            compile_formats(&field, &registry),
            Err(CompileError::InvalidDisplay { .. })
        ));
    }

    #[test]
    fn test_struct_tokens_repeat() {
        let registry = StructRegistry::build(&[Struct {
            name: "cell".to_string(),
            fields: vec![hex("eci", "uint32_t"), Field::new("rsrp", "int8_t")],
        }])
        .unwrap();

        let mut field = Field::new("cells", "cell");
        field.set_count(2);
        let tokens: Vec<_> = compile_formats(&field, &registry)
            .unwrap()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(tokens, vec!["0x{:08x}", "{}", "0x{:08x}", "{}"]);
    }
}
