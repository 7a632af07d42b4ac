//! The capability set spec §3 requires of every [`Node`] variant
//! (`validate`/`read`/`write`/`random`/`type_name`), implemented as free
//! functions dispatching on the variant, plus the union branch
//! [`discriminator_name`] helper shared by the parser and the union
//! read/write/validate algorithms.
//!
//! Free functions rather than a `TypeNode` trait object per node: children
//! are addressed by [`NodeKey`] into a [`Registry`], so there is never an
//! owned sub-tree to call a method on. Every operation needs the
//! `Registry` in hand anyway, which a trait object dispatching on `self`
//! would not give it "for free" per spec §9's "virtual calls against the
//! static field list" guidance.

use rand::Rng;

use super::{Node, NodeKey, Registry};
use crate::error::{DecodeError, EncodeError};
use crate::tap::{ReadTap, WriteTap};
use crate::value::Value;

pub(super) fn type_name(node: &Node) -> &'static str {
	match node {
		Node::Null => "null",
		Node::Boolean => "boolean",
		Node::Int => "int",
		Node::Long => "long",
		Node::Float => "float",
		Node::Double => "double",
		Node::Bytes => "bytes",
		Node::String => "string",
		Node::Array(_) => "array",
		Node::Map(_) => "map",
		Node::Enum { .. } => "enum",
		Node::Fixed { .. } => "fixed",
		Node::Record { .. } => "record",
		Node::Union { .. } => "union",
	}
}

/// The name a union branch is discriminated by: the primitive kind name for
/// primitives, the literal kind for `array`/`map`, and the fully qualified
/// name for `enum`/`fixed`/`record` (spec §4.5.1).
pub(super) fn discriminator_name(registry: &Registry, key: NodeKey) -> String {
	match registry.get(key) {
		Node::Enum { name, .. } | Node::Fixed { name, .. } | Node::Record { name, .. } => {
			name.fully_qualified_name().to_owned()
		}
		node => type_name(node).to_owned(),
	}
}

pub(super) fn validate(registry: &Registry, key: NodeKey, value: &Value) -> bool {
	match (registry.get(key), value) {
		(Node::Null, Value::Null) => true,
		(Node::Boolean, Value::Boolean(_)) => true,
		(Node::Int, Value::Int(_)) => true,
		(Node::Long, Value::Long(_)) => true,
		(Node::Float, Value::Float(v)) => v.abs() < 3.4028234e38,
		(Node::Double, Value::Double(_)) => true,
		(Node::Bytes, Value::Bytes(_)) => true,
		(Node::String, Value::String(_)) => true,
		(Node::Array(item_key), Value::Array(items)) => {
			items.iter().all(|v| validate(registry, *item_key, v))
		}
		(Node::Map(value_key), Value::Map(entries)) => {
			entries.iter().all(|(_, v)| validate(registry, *value_key, v))
		}
		(Node::Enum { symbols, .. }, Value::Enum(symbol)) => symbols.iter().any(|s| s == symbol),
		(Node::Fixed { size, .. }, Value::Fixed(bytes)) => bytes.len() == *size,
		(Node::Record { fields, .. }, Value::Record(present)) => fields.iter().all(|field| {
			match present.iter().find(|(name, _)| *name == field.name) {
				Some((_, v)) => validate(registry, field.type_key, v),
				None => field.default.is_some(),
			}
		}),
		(Node::Union { branches, .. }, Value::Null) => branches
			.iter()
			.any(|&b| matches!(registry.get(b), Node::Null)),
		(Node::Union { branches, unwrapped }, value) => {
			if *unwrapped {
				branches.iter().any(|&b| validate(registry, b, value))
			} else if let Value::Union(branch_name, inner) = value {
				branches
					.iter()
					.any(|&b| &discriminator_name(registry, b) == branch_name && validate(registry, b, inner))
			} else {
				false
			}
		}
		_ => false,
	}
}

pub(super) fn write(
	registry: &Registry,
	key: NodeKey,
	value: &Value,
	tap: &mut WriteTap,
) -> Result<(), EncodeError> {
	match (registry.get(key), value) {
		(Node::Null, Value::Null) => {}
		(Node::Boolean, Value::Boolean(v)) => tap.write_bool(*v),
		(Node::Int, Value::Int(v)) => tap.write_long(i64::from(*v)),
		(Node::Long, Value::Long(v)) => tap.write_long(*v),
		(Node::Float, Value::Float(v)) => tap.write_float(*v),
		(Node::Double, Value::Double(v)) => tap.write_double(*v),
		(Node::Bytes, Value::Bytes(v)) => tap.write_len_prefixed(v),
		(Node::String, Value::String(v)) => tap.write_len_prefixed(v.as_bytes()),
		(Node::Array(item_key), Value::Array(items)) => {
			tap.write_block(items, |tap, item| write(registry, *item_key, item, tap))?;
		}
		(Node::Map(value_key), Value::Map(entries)) => {
			tap.write_block(entries, |tap, (k, v)| {
				tap.write_len_prefixed(k.as_bytes());
				write(registry, *value_key, v, tap)
			})?;
		}
		(Node::Enum { symbols, .. }, Value::Enum(symbol)) => {
			let index = symbols
				.iter()
				.position(|s| s == symbol)
				.ok_or_else(|| EncodeError::InvalidEnumSymbol(symbol.clone()))?;
			tap.write_long(index as i64);
		}
		(Node::Fixed { size, .. }, Value::Fixed(bytes)) => {
			debug_assert_eq!(bytes.len(), *size);
			tap.write_fixed(bytes);
		}
		(Node::Record { fields, .. }, Value::Record(present)) => {
			for field in fields {
				match present.iter().find(|(name, _)| *name == field.name) {
					Some((_, v)) => write(registry, field.type_key, v, tap)?,
					None => {
						let default = field
							.default
							.as_ref()
							.ok_or_else(|| EncodeError::MissingField(field.name.clone()))?;
						write(registry, field.type_key, default, tap)?;
					}
				}
			}
		}
		(Node::Union { branches, .. }, Value::Null) => {
			let index = branches
				.iter()
				.position(|&b| matches!(registry.get(b), Node::Null))
				.ok_or_else(|| EncodeError::NoSuchBranch("null".to_owned()))?;
			tap.write_long(index as i64);
		}
		(Node::Union { branches, unwrapped: true }, value) => {
			let index = branches
				.iter()
				.position(|&b| validate(registry, b, value))
				.ok_or_else(|| EncodeError::NoSuchBranch(format!("{value:?}")))?;
			tap.write_long(index as i64);
			write(registry, branches[index], value, tap)?;
		}
		(Node::Union { branches, unwrapped: false }, Value::Union(branch_name, inner)) => {
			let index = branches
				.iter()
				.position(|&b| &discriminator_name(registry, b) == branch_name)
				.ok_or_else(|| EncodeError::NoSuchBranch(branch_name.clone()))?;
			tap.write_long(index as i64);
			write(registry, branches[index], inner, tap)?;
		}
		(node, _) => return Err(EncodeError::TypeMismatch(type_name(node))),
	}
	Ok(())
}

pub(super) fn read(registry: &Registry, key: NodeKey, tap: &mut ReadTap<'_>) -> Result<Value, DecodeError> {
	Ok(match registry.get(key) {
		Node::Null => Value::Null,
		Node::Boolean => Value::Boolean(tap.read_bool()),
		Node::Int => Value::Int(tap.read_int()),
		Node::Long => Value::Long(tap.read_long()),
		Node::Float => Value::Float(tap.read_float()),
		Node::Double => Value::Double(tap.read_double()),
		Node::Bytes => Value::Bytes(tap.read_len_prefixed()),
		Node::String => {
			let bytes = tap.read_len_prefixed();
			Value::String(String::from_utf8_lossy(&bytes).into_owned())
		}
		Node::Array(item_key) => {
			let mut err = None;
			let items = tap.read_block(|tap| match read(registry, *item_key, tap) {
				Ok(v) => v,
				Err(e) => {
					err.get_or_insert(e);
					Value::Null
				}
			});
			if let Some(e) = err {
				return Err(e);
			}
			Value::Array(items)
		}
		Node::Map(value_key) => {
			let mut err = None;
			let entries = tap.read_block(|tap| {
				let key = String::from_utf8_lossy(&tap.read_len_prefixed()).into_owned();
				let value = match read(registry, *value_key, tap) {
					Ok(v) => v,
					Err(e) => {
						err.get_or_insert(e);
						Value::Null
					}
				};
				(key, value)
			});
			if let Some(e) = err {
				return Err(e);
			}
			Value::Map(entries)
		}
		Node::Enum { symbols, .. } => {
			let index = tap.read_long();
			let symbol = usize::try_from(index)
				.ok()
				.and_then(|i| symbols.get(i))
				.ok_or(DecodeError::InvalidEnumIndex(index))?;
			Value::Enum(symbol.clone())
		}
		Node::Fixed { size, .. } => Value::Fixed(tap.read_fixed(*size)),
		Node::Record { fields, .. } => {
			let mut out = Vec::with_capacity(fields.len());
			for field in fields {
				out.push((field.name.clone(), read(registry, field.type_key, tap)?));
			}
			Value::Record(out)
		}
		Node::Union { branches, unwrapped } => {
			let index = tap.read_long();
			let &branch_key = usize::try_from(index)
				.ok()
				.and_then(|i| branches.get(i))
				.ok_or(DecodeError::InvalidUnionIndex(index))?;
			if matches!(registry.get(branch_key), Node::Null) {
				Value::Null
			} else {
				let inner = read(registry, branch_key, tap)?;
				if *unwrapped {
					inner
				} else {
					Value::Union(discriminator_name(registry, branch_key), Box::new(inner))
				}
			}
		}
	})
}

pub(super) fn random(registry: &Registry, key: NodeKey, rng: &mut impl Rng) -> Value {
	match registry.get(key) {
		Node::Null => Value::Null,
		Node::Boolean => Value::Boolean(rng.gen()),
		Node::Int => Value::Int(rng.gen()),
		Node::Long => Value::Long(rng.gen()),
		Node::Float => Value::Float(rng.gen_range(-1e4_f32..1e4_f32)),
		Node::Double => Value::Double(rng.gen_range(-1e8_f64..1e8_f64)),
		Node::Bytes => Value::Bytes(random_bytes(rng)),
		Node::String => Value::String(random_string(rng)),
		Node::Array(item_key) => {
			let len = rng.gen_range(0..4);
			Value::Array((0..len).map(|_| random(registry, *item_key, rng)).collect())
		}
		Node::Map(value_key) => {
			let len = rng.gen_range(0..4);
			Value::Map(
				(0..len)
					.map(|_| (random_string(rng), random(registry, *value_key, rng)))
					.collect(),
			)
		}
		Node::Enum { symbols, .. } => {
			let idx = rng.gen_range(0..symbols.len());
			Value::Enum(symbols[idx].clone())
		}
		Node::Fixed { size, .. } => Value::Fixed((0..*size).map(|_| rng.gen()).collect()),
		Node::Record { fields, .. } => Value::Record(
			fields
				.iter()
				.map(|field| (field.name.clone(), random(registry, field.type_key, rng)))
				.collect(),
		),
		Node::Union { branches, unwrapped } => {
			let idx = rng.gen_range(0..branches.len());
			let branch_key = branches[idx];
			if matches!(registry.get(branch_key), Node::Null) {
				return Value::Null;
			}
			let inner = random(registry, branch_key, rng);
			if *unwrapped {
				inner
			} else {
				Value::Union(discriminator_name(registry, branch_key), Box::new(inner))
			}
		}
	}
}

fn random_bytes(rng: &mut impl Rng) -> Vec<u8> {
	let len = rng.gen_range(0..8);
	(0..len).map(|_| rng.gen()).collect()
}

fn random_string(rng: &mut impl Rng) -> String {
	const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
	let len = rng.gen_range(0..8);
	(0..len)
		.map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
		.collect()
}
