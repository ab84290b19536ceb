//! Renders a compiled [Schema] into the `decoders.rs` source artifact.
//!
//! The artifact depends on `byteorder` only and exposes:
//! - `tdf_name(&u16) -> String`
//! - `tdf_fields(&u16) -> Vec<&'static str>`
//! - `tdf_read_into_str(&u16, u8, &mut Cursor<&[u8]>) -> Result<String>`

use log::debug;

use crate::schema::{CompiledDefinition, RenderContext, Schema};

const PRELUDE: &str = "\
// Generated by tdfgen. Do not edit by hand.

#![allow(dead_code, unused_imports)]

use std::io::{Cursor, Read, Result, Error, ErrorKind};

use byteorder::{LittleEndian, BigEndian, ReadBytesExt};
";

const HELPERS: &str = r#"
fn tdf_hex(buf: &[u8]) -> String
{
    buf.iter().map(|b| format!("{:02x}", b)).collect()
}

fn tdf_remaining(cursor: &Cursor<&[u8]>, cursor_start: u64, size: u8) -> Result<u8>
{
    let cursor_read = cursor.position() - cursor_start;
    if cursor_read >= size as u64 {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "Insufficient data remaining",
        ));
    }
    Ok((size as u64 - cursor_read) as u8)
}

fn tdf_field_read_string(cursor: &mut Cursor<&[u8]>, size: u8) -> Result<String>
{
    let mut buf = vec![0u8; size as usize];
    cursor.read_exact(&mut buf)?;

    match String::from_utf8(buf) {
        Ok(val) => Ok(format!("\"{}\"", val.trim_matches(char::from(0)))),
        Err(..) => Ok(String::from("\"\"")),
    }
}

fn tdf_field_read_remaining_string(cursor: &mut Cursor<&[u8]>, cursor_start: u64, size: u8) -> Result<String>
{
    let remaining = tdf_remaining(cursor, cursor_start, size)?;
    tdf_field_read_string(cursor, remaining)
}

fn tdf_field_read_vla(cursor: &mut Cursor<&[u8]>, cursor_start: u64, size: u8) -> Result<String>
{
    let remaining = tdf_remaining(cursor, cursor_start, size)?;
    let mut buf = vec![0u8; remaining as usize];
    cursor.read_exact(&mut buf)?;
    Ok(tdf_hex(&buf))
}
"#;

/// Renders every definition of `schema`, in declaration order.
pub fn render(schema: &Schema) -> String {
    render_definitions(&schema.definitions)
}

pub fn render_definitions(definitions: &[CompiledDefinition]) -> String {
    let mut code = String::new();

    code.push_str(PRELUDE);
    code.push_str(&render_names(definitions));
    code.push_str(&render_fields(definitions));
    code.push_str(HELPERS);
    code.push_str(&render_reader(definitions));

    debug!(
        "rendered {} definitions ({} bytes)",
        definitions.len(),
        code.len()
    );
    code
}

fn render_names(definitions: &[CompiledDefinition]) -> String {
    let mut code = String::new();

    code.push_str("\npub fn tdf_name(tdf_id: &u16) -> String\n{\n");
    code.push_str("    match tdf_id {\n");
    for definition in definitions {
        code.push_str(&format!(
            "        {} => String::from({:?}),\n",
            definition.id, definition.name
        ));
    }
    code.push_str("        _ => format!(\"{}\", tdf_id),\n");
    code.push_str("    }\n}\n");
    code
}

fn render_fields(definitions: &[CompiledDefinition]) -> String {
    let mut code = String::new();

    code.push_str("\npub fn tdf_fields(tdf_id: &u16) -> Vec<&'static str>\n{\n");
    code.push_str("    match tdf_id {\n");
    for definition in definitions {
        let names = definition
            .context
            .names()
            .iter()
            .map(|name| format!("{name:?}"))
            .collect::<Vec<_>>()
            .join(",");
        code.push_str(&format!("        {} => vec![{names}],\n", definition.id));
    }
    code.push_str("        _ => vec![\"unknown\"],\n");
    code.push_str("    }\n}\n");
    code
}

fn render_arm(context: &RenderContext) -> String {
    if context.is_empty() {
        return " Ok(String::new()),\n".to_string();
    }

    let mut code = String::new();
    code.push_str("\n            Ok(format!(\n");
    code.push_str(&format!("                \"{}\",\n", context.format_string()));
    for op in context.ops() {
        code.push_str(&format!("                {op},\n"));
    }
    code.push_str("            )),\n");
    code
}

fn render_reader(definitions: &[CompiledDefinition]) -> String {
    let mut code = String::new();

    code.push_str(
        "\npub fn tdf_read_into_str(tdf_id: &u16, size: u8, cursor: &mut Cursor<&[u8]>) -> Result<String>\n{\n",
    );
    code.push_str("    let cursor_start = cursor.position();\n\n");
    code.push_str("    let res = match tdf_id {\n");
    for definition in definitions {
        code.push_str(&format!("        {} =>", definition.id));
        code.push_str(&render_arm(&definition.context));
    }
    code.push_str(
        "        _ => {
            let mut buf = vec![0u8; size as usize];
            cursor.read_exact(&mut buf)?;
            Ok(tdf_hex(&buf))
        }
    };
    let cursor_read = cursor.position() - cursor_start;
    let underflow = (size as u64).saturating_sub(cursor_read);

    // Consume bytes the definition did not describe
    if underflow > 0 {
        tdf_field_read_string(cursor, underflow as u8)?;
    }
    res
}
",
    );
    code
}
