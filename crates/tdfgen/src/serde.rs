//! JSON‑deserializable schema description.
//!
//! These types mirror the TDF schema document:
//!
//! ```json
//! {
//!   "structs": { "bt_addr_le": { "fields": [ ... ] } },
//!   "definitions": { "30": { "name": "BLUETOOTH_RSSI", "fields": [ ... ] } }
//! }
//! ```
//!
//! Both maps keep document order. Numeric conversion factors are kept as
//! written (`serde_json` is built with `arbitrary_precision`) and parsed into
//! exact [`Decimal`]s when the document is converted into a [`Schema`].

use serde::{Deserialize, Serialize};

use crate::{
    conversion::Conversion,
    decimal::Decimal,
    errors::{CompileError, LoadError},
    primitive::Endian,
    schema::{Definition, Schema, Struct},
};

/// Top‑level schema document.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SchemaDef {
    /// Reusable structs, in declaration order.
    #[serde(default, with = "ordered")]
    pub structs: Vec<(String, StructDef)>,
    /// Record definitions keyed by their TDF id, in declaration order.
    #[serde(with = "ordered")]
    pub definitions: Vec<(String, DefinitionDef)>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StructDef {
    pub fields: Vec<FieldDef>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DefinitionDef {
    /// Human‑readable name, e.g. `ACC_2G`.
    #[serde(default)]
    pub name: Option<String>,
    pub fields: Vec<FieldDef>,
}

/// Description of a single field.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    pub name: String,
    /// Primitive type name or struct name.
    #[serde(rename = "type")]
    pub ty: String,
    /// Array length; string length for `char`; `0` for a variable-length tail.
    #[serde(default)]
    pub num: Option<usize>,
    #[serde(default)]
    pub conversion: Option<ConversionDef>,
    #[serde(default)]
    pub display: Option<DisplayDef>,
}

/// Affine and packed‑integer conversion.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ConversionDef {
    /// Scale factor.
    #[serde(default)]
    pub m: Option<serde_json::Number>,
    /// Offset added after scaling.
    #[serde(default)]
    pub c: Option<serde_json::Number>,
    /// Byte order of a packed 24/48‑bit integer.
    #[serde(default)]
    pub int: Option<EndianDef>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum EndianDef {
    Little,
    Big,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DisplayDef {
    pub fmt: DisplayFmtDef,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum DisplayFmtDef {
    Hex,
}

fn decimal(number: &serde_json::Number) -> Result<Decimal, CompileError> {
    number.to_string().parse()
}

impl TryFrom<ConversionDef> for Conversion {
    type Error = CompileError;

    fn try_from(value: ConversionDef) -> Result<Self, Self::Error> {
        Ok(Conversion {
            scale: value.m.as_ref().map(decimal).transpose()?,
            offset: value.c.as_ref().map(decimal).transpose()?,
            packed: value.int.map(|endian| match endian {
                EndianDef::Little => Endian::Little,
                EndianDef::Big => Endian::Big,
            }),
        })
    }
}

fn fields(defs: Vec<FieldDef>) -> Result<Vec<crate::field::Field>, CompileError> {
    defs.into_iter().map(TryInto::try_into).collect()
}

fn definition_id(id: &str) -> Result<u16, CompileError> {
    id.parse::<u16>()
        .ok()
        .filter(|id| *id <= 0x0FFF)
        .ok_or_else(|| CompileError::InvalidDefinitionId(id.to_string()))
}

impl TryFrom<SchemaDef> for Schema {
    type Error = CompileError;

    fn try_from(value: SchemaDef) -> Result<Self, Self::Error> {
        let structs = value
            .structs
            .into_iter()
            .map(|(name, def)| {
                let fields = fields(def.fields).map_err(|e| e.in_struct(&name))?;
                Ok(Struct { name, fields })
            })
            .collect::<Result<Vec<_>, CompileError>>()?;

        let definitions = value
            .definitions
            .into_iter()
            .map(|(id, def)| {
                let id = definition_id(&id)?;
                Ok(Definition {
                    id,
                    name: def.name,
                    fields: fields(def.fields).map_err(|e| e.in_definition(id))?,
                })
            })
            .collect::<Result<Vec<_>, CompileError>>()?;

        Schema::compile(&structs, &definitions)
    }
}

impl Schema {
    /// Parses a JSON schema document and compiles it.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        let def: SchemaDef = serde_json::from_str(json)?;
        Ok(Schema::try_from(def)?)
    }
}

/// (De)serializes a JSON object as a list of entries in document order.
mod ordered {
    use std::{fmt, marker::PhantomData};

    use serde::{
        Deserialize, Deserializer, Serialize, Serializer,
        de::{MapAccess, Visitor},
    };

    pub fn serialize<S, V>(entries: &[(String, V)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
        V: Serialize,
    {
        serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
    }

    pub fn deserialize<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
    where
        D: Deserializer<'de>,
        V: Deserialize<'de>,
    {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = Vec<(String, V)>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry()? {
                    entries.push(entry);
                }
                Ok(entries)
            }
        }

        deserializer.deserialize_map(EntriesVisitor(PhantomData))
    }
}
