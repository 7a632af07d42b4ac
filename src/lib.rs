//! # Getting started
//!
//! ```
//! use avro_tap::{Schema, Value};
//!
//! let schema = Schema::parse(r#"
//! {
//! 	"namespace": "test",
//! 	"type": "record",
//! 	"name": "Test",
//! 	"fields": [
//! 		{
//! 			"type": "string",
//! 			"name": "field"
//! 		}
//! 	]
//! }
//! "#)
//! .expect("Failed to parse schema");
//!
//! let value = Value::Record(vec![("field".to_owned(), Value::String("foo".to_owned()))]);
//!
//! let avro_datum = schema.encode(&value, Default::default()).unwrap();
//! assert_eq!(avro_datum, [6, 102, 111, 111]);
//! assert_eq!(schema.decode(&avro_datum).unwrap(), value);
//! ```
//!
//! # Scope
//!
//! This crate is a schema engine and binary codec for [Avro](https://avro.apache.org/docs/current/specification/):
//! [`Schema::parse`] turns a schema document into a reusable graph of typed
//! nodes, and that graph's [`validate`](Schema::validate)/[`encode`](Schema::encode)/[`decode`](Schema::decode)/[`random`](Schema::random)
//! methods are the whole surface. It deliberately stops there: the Avro
//! container/object-file format, reader/writer schema resolution, RPC/IDL
//! schemas, JSON-encoded Avro and logical types are all external concerns
//! layered on top of a schema engine, not part of one, and are left to
//! other crates.
//!
//! There is no network I/O, no async scheduling and no persistent state:
//! [`Schema`] is an immutable graph once parsed, and every [`Schema::encode`]/[`Schema::decode`]
//! call gets its own short-lived byte cursor, so distinct calls on the same
//! `Schema` never interact.

pub mod error;
pub mod schema;
mod tap;
mod value;

pub use error::{DecodeError, EncodeError, SchemaError, ValidationError};
pub use schema::{EncodeOptions, Name, Node, NodeKey, ParseOptions, Registry, Schema};
pub use value::Value;
