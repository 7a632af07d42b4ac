//! Walks a `serde_json::Value` schema document into a [`Node`] graph,
//! grounded on the teacher's `apache_schema_to_node` (`schema/safe.rs`):
//! reserve a name, recurse into children, then backfill the real node so
//! self-referential records resolve.

use std::collections::HashSet;

use serde_json::Value as Json;

use super::{Field, Name, Node, NodeKey, ParseOptions, Registry};
use crate::error::SchemaError;
use crate::value::Value;

/// Parses `schema_json` and appends the resulting node(s) into `registry`,
/// returning the key of the root node.
///
/// Calling this more than once against the same `registry` lets later
/// documents reference names earlier ones registered (spec §8 "name
/// registration").
pub fn parse_into(
	schema_json: &str,
	options: ParseOptions<'_>,
	registry: &mut Registry,
) -> Result<NodeKey, SchemaError> {
	let json: Json = serde_json::from_str(schema_json)?;
	parse_value(&json, options.namespace, options.unwrap_unions, registry)
}

fn parse_value(
	json: &Json,
	namespace: Option<&str>,
	unwrap_unions: bool,
	registry: &mut Registry,
) -> Result<NodeKey, SchemaError> {
	match json {
		Json::String(s) => parse_string(s, namespace, registry),
		Json::Array(branches) => parse_union(branches, namespace, unwrap_unions, registry),
		Json::Object(map) => parse_object(map, namespace, unwrap_unions, registry),
		other => Err(SchemaError::other(format!(
			"schema must be a string, array or object, got {other}"
		))),
	}
}

fn parse_string(s: &str, namespace: Option<&str>, registry: &Registry) -> Result<NodeKey, SchemaError> {
	if let Some(key) = Registry::primitive_key(s) {
		return Ok(key);
	}
	let fully_qualified = qualify(s, namespace);
	registry
		.resolve(&fully_qualified)
		.ok_or_else(|| SchemaError::MissingName(fully_qualified))
}

/// Primitive kinds are never namespaced (spec Invariant 6); only a bare,
/// dot-free reference picks up the enclosing namespace.
fn qualify(name: &str, namespace: Option<&str>) -> String {
	match namespace {
		Some(ns) if !name.contains('.') && !ns.is_empty() => format!("{ns}.{name}"),
		_ => name.to_owned(),
	}
}

fn parse_union(
	branches: &[Json],
	namespace: Option<&str>,
	unwrap_unions: bool,
	registry: &mut Registry,
) -> Result<NodeKey, SchemaError> {
	if branches.is_empty() {
		return Err(SchemaError::EmptyUnion);
	}
	let keys = branches
		.iter()
		.map(|b| parse_value(b, namespace, unwrap_unions, registry))
		.collect::<Result<Vec<_>, _>>()?;
	let mut seen = HashSet::with_capacity(keys.len());
	for &key in &keys {
		let discriminator = super::ops::discriminator_name(registry, key);
		if !seen.insert(discriminator.clone()) {
			return Err(SchemaError::DuplicateUnionBranch(discriminator));
		}
	}
	Ok(registry.push(Node::Union {
		branches: keys,
		unwrapped: unwrap_unions,
	}))
}

fn parse_object(
	map: &serde_json::Map<String, Json>,
	namespace: Option<&str>,
	unwrap_unions: bool,
	registry: &mut Registry,
) -> Result<NodeKey, SchemaError> {
	let kind = map
		.get("type")
		.and_then(Json::as_str)
		.ok_or_else(|| SchemaError::MissingAttribute {
			kind: "schema",
			attribute: "type",
		})?;

	if let Some(key) = Registry::primitive_key(kind) {
		return Ok(key);
	}

	match kind {
		"array" => {
			let items = map.get("items").ok_or_else(|| SchemaError::MissingAttribute {
				kind: "array",
				attribute: "items",
			})?;
			let item_key = parse_value(items, namespace, unwrap_unions, registry)?;
			Ok(registry.push(Node::Array(item_key)))
		}
		"map" => {
			let values = map.get("values").ok_or_else(|| SchemaError::MissingAttribute {
				kind: "map",
				attribute: "values",
			})?;
			let value_key = parse_value(values, namespace, unwrap_unions, registry)?;
			Ok(registry.push(Node::Map(value_key)))
		}
		"enum" => parse_enum(map, namespace, registry),
		"fixed" => parse_fixed(map, namespace, registry),
		"record" => parse_record(map, namespace, unwrap_unions, registry),
		other => Err(SchemaError::UnknownTypeKind(other.to_owned())),
	}
}

fn named(map: &serde_json::Map<String, Json>, kind: &'static str, namespace: Option<&str>) -> Result<Name, SchemaError> {
	let local_name = map
		.get("name")
		.and_then(Json::as_str)
		.ok_or(SchemaError::MissingAttribute { kind, attribute: "name" })?;
	let own_namespace = map.get("namespace").and_then(Json::as_str);
	Ok(Name::new(own_namespace.or(namespace), local_name))
}

fn parse_enum(
	map: &serde_json::Map<String, Json>,
	namespace: Option<&str>,
	registry: &mut Registry,
) -> Result<NodeKey, SchemaError> {
	let name = named(map, "enum", namespace)?;
	let symbols = map
		.get("symbols")
		.and_then(Json::as_array)
		.ok_or(SchemaError::MissingAttribute {
			kind: "enum",
			attribute: "symbols",
		})?
		.iter()
		.map(|s| {
			s.as_str()
				.map(str::to_owned)
				.ok_or_else(|| SchemaError::MalformedField("enum symbol must be a string".into()))
		})
		.collect::<Result<Vec<_>, _>>()?;
	if symbols.is_empty() {
		return Err(SchemaError::EmptySymbols(name.fully_qualified_name().to_owned()));
	}
	let key = registry.reserve(&name)?;
	registry.fill(key, Node::Enum { name, symbols });
	Ok(key)
}

fn parse_fixed(
	map: &serde_json::Map<String, Json>,
	namespace: Option<&str>,
	registry: &mut Registry,
) -> Result<NodeKey, SchemaError> {
	let name = named(map, "fixed", namespace)?;
	let size_json = map.get("size").ok_or(SchemaError::MissingAttribute {
		kind: "fixed",
		attribute: "size",
	})?;
	let size = size_json
		.as_u64()
		.filter(|&n| n >= 1)
		.ok_or_else(|| SchemaError::InvalidFixedSize(size_json.clone()))? as usize;
	let key = registry.reserve(&name)?;
	registry.fill(key, Node::Fixed { name, size });
	Ok(key)
}

fn parse_record(
	map: &serde_json::Map<String, Json>,
	namespace: Option<&str>,
	unwrap_unions: bool,
	registry: &mut Registry,
) -> Result<NodeKey, SchemaError> {
	let name = named(map, "record", namespace)?;
	// Reserve + register before recursing into fields so a field can refer
	// back to this record's own name (spec §9 self-referential schemas).
	let key = registry.reserve(&name)?;
	let field_namespace = name.namespace().map(str::to_owned);

	let fields_json = map
		.get("fields")
		.and_then(Json::as_array)
		.ok_or(SchemaError::MissingAttribute {
			kind: "record",
			attribute: "fields",
		})?;

	let mut fields = Vec::with_capacity(fields_json.len());
	for field_json in fields_json {
		let field_map = field_json
			.as_object()
			.ok_or_else(|| SchemaError::MalformedField("field entry must be an object".into()))?;
		let field_name = field_map
			.get("name")
			.and_then(Json::as_str)
			.ok_or_else(|| SchemaError::MalformedField("field is missing its name".into()))?
			.to_owned();
		let field_type_json = field_map
			.get("type")
			.ok_or_else(|| SchemaError::MalformedField(format!("field {field_name:?} is missing its type")))?;
		let type_key = parse_value(
			field_type_json,
			field_namespace.as_deref().or(namespace),
			unwrap_unions,
			registry,
		)?;
		let doc = field_map.get("doc").and_then(Json::as_str).map(str::to_owned);
		let default = match field_map.get("default") {
			Some(default_json) => Some(
				json_default_to_value(default_json, type_key, registry)
					.map_err(|reason| SchemaError::InvalidDefault {
						field: field_name.clone(),
						reason,
					})?,
			),
			None => None,
		};
		fields.push(Field {
			name: field_name,
			doc,
			type_key,
			default,
		});
	}

	registry.fill(key, Node::Record { name, fields });
	Ok(key)
}

/// Converts a JSON default literal into the in-memory [`Value`] it
/// represents, per spec Invariant 3: a union field's default validates
/// against (and is shaped like) the FIRST branch only.
fn json_default_to_value(json: &Json, type_key: NodeKey, registry: &Registry) -> Result<Value, String> {
	let value = match registry.get(type_key) {
		Node::Null => {
			json.as_null().ok_or("expected null")?;
			Value::Null
		}
		Node::Boolean => Value::Boolean(json.as_bool().ok_or("expected boolean")?),
		Node::Int => Value::Int(json.as_i64().ok_or("expected integer")? as i32),
		Node::Long => Value::Long(json.as_i64().ok_or("expected integer")?),
		Node::Float => Value::Float(json.as_f64().ok_or("expected number")? as f32),
		Node::Double => Value::Double(json.as_f64().ok_or("expected number")?),
		Node::String => Value::String(json.as_str().ok_or("expected string")?.to_owned()),
		Node::Bytes => Value::Bytes(latin1_bytes(json.as_str().ok_or("expected string")?)?),
		Node::Fixed { size, .. } => {
			let bytes = latin1_bytes(json.as_str().ok_or("expected string")?)?;
			if bytes.len() != *size {
				return Err(format!("expected {size} bytes, got {}", bytes.len()));
			}
			Value::Fixed(bytes)
		}
		Node::Enum { symbols, .. } => {
			let symbol = json.as_str().ok_or("expected string")?;
			if !symbols.iter().any(|s| s == symbol) {
				return Err(format!("{symbol:?} is not a symbol of this enum"));
			}
			Value::Enum(symbol.to_owned())
		}
		Node::Array(item_key) => {
			let items = json.as_array().ok_or("expected array")?;
			Value::Array(
				items
					.iter()
					.map(|i| json_default_to_value(i, *item_key, registry))
					.collect::<Result<_, _>>()?,
			)
		}
		Node::Map(value_key) => {
			let object = json.as_object().ok_or("expected object")?;
			Value::Map(
				object
					.iter()
					.map(|(k, v)| Ok((k.clone(), json_default_to_value(v, *value_key, registry)?)))
					.collect::<Result<_, String>>()?,
			)
		}
		Node::Record { fields, .. } => {
			let object = json.as_object().ok_or("expected object")?;
			let mut out = Vec::with_capacity(fields.len());
			for field in fields {
				let field_json = object
					.get(&field.name)
					.ok_or_else(|| format!("missing field {:?} in default", field.name))?;
				out.push((
					field.name.clone(),
					json_default_to_value(field_json, field.type_key, registry)?,
				));
			}
			Value::Record(out)
		}
		Node::Union { branches, .. } => {
			let first = branches
				.first()
				.copied()
				.ok_or("union has no branches")?;
			if matches!(registry.get(first), Node::Null) {
				json.as_null().ok_or("expected null")?;
				return Ok(Value::Null);
			}
			let inner = json_default_to_value(json, first, registry)?;
			let discriminator = super::ops::discriminator_name(registry, first);
			Value::Union(discriminator, Box::new(inner))
		}
	};
	Ok(value)
}

/// Avro defaults for `bytes`/`fixed` are JSON strings whose code units are
/// each one raw byte (Latin-1), per spec §9 "Defaults for bytes/fixed".
fn latin1_bytes(s: &str) -> Result<Vec<u8>, String> {
	s.chars()
		.map(|c| {
			let code = c as u32;
			if code > 0xFF {
				Err(format!("default byte literal has a code unit > 0xFF: {c:?}"))
			} else {
				Ok(code as u8)
			}
		})
		.collect()
}
