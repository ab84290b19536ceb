//! # tdfgen
//!
//! A generator of decoders for TDF (Typed Data Format) binary records.
//!
//! A schema describes each record definition as an ordered list of fields:
//! primitive types, fixed-size arrays, strings, nested structs, packed 24/48-bit
//! integers, affine scaling and display hints. The schema is compiled into one
//! flat list of read operations and an aligned list of format placeholders per
//! definition, which [render::render] turns into a Rust source file of
//! `byteorder` reads.
//!
//! No bytes are decoded at generation time.
//!
//! ## Example
//!
//! ```
//! use tdfgen::conversion::Conversion;
//! use tdfgen::field::Field;
//! use tdfgen::schema::{Definition, Schema};
//!
//! let mut conversion = Conversion::new();
//! conversion.set_scale("0.01".parse().unwrap());
//! let mut humidity = Field::new("humidity", "uint16_t");
//! humidity.set_conversion(conversion);
//!
//! let definitions = vec![Definition {
//!     id: 3,
//!     name: Some("AMBIENT_HUMIDITY".to_string()),
//!     fields: vec![humidity],
//! }];
//! let schema = Schema::compile(&[], &definitions).unwrap();
//!
//! let context = &schema.get(3).unwrap().context;
//! assert_eq!(context.names(), &["humidity"]);
//! assert_eq!(
//!     context.ops()[0].to_string(),
//!     "cursor.read_u16::<LittleEndian>()? as f64 / 100.0"
//! );
//!
//! let code = tdfgen::render::render(&schema);
//! assert!(code.contains("pub fn tdf_read_into_str"));
//! ```

pub mod compiled;
pub mod conversion;
pub mod decimal;
pub mod errors;
pub mod field;
pub mod format;
pub mod primitive;
pub mod registry;
pub mod render;
pub mod schema;

#[cfg(feature = "serde")]
pub mod serde;
