//! Schema parsing and the [`TypeNode`](Node) graph it produces.
//!
//! A parsed schema is an arena of [`Node`]s addressed by [`NodeKey`], the
//! same shape the teacher crate uses for its `SchemaNode`/`SchemaKey` pair.
//! It sidesteps the self-referential-struct problem that a naive
//! `Rc<RefCell<Node>>` graph would run into for recursive records, and keeps
//! every node's children as plain, `Copy` indices instead of owned
//! sub-trees.
//!
//! [`Registry`] owns the arena and the fully-qualified-name table; [`Schema`]
//! pairs a [`Registry`] with the key of its root node and is the type most
//! callers reach for.

mod ops;
mod parse;

use std::collections::HashMap;

pub use crate::error::SchemaError;
use crate::error::{DecodeError, EncodeError, ValidationError};
use crate::tap::{ReadTap, WriteTap};
use crate::value::Value;

pub use parse::parse_into;

/// A fully qualified Avro name: `namespace.localName`, or bare `localName`
/// when no namespace is in scope.
///
/// Primitive kinds never carry one of these; only `enum`/`fixed`/`record`
/// nodes do.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Name {
	fully_qualified: String,
	namespace_len: Option<usize>,
}

impl std::fmt::Debug for Name {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		std::fmt::Debug::fmt(&self.fully_qualified, f)
	}
}

impl Name {
	/// If `local_name` already contains a `.` it is treated as fully
	/// qualified already and `namespace` is ignored, matching the Avro
	/// specification's name-resolution rule.
	fn new(namespace: Option<&str>, local_name: &str) -> Self {
		if let Some(dot) = local_name.rfind('.') {
			return Name {
				fully_qualified: local_name.to_owned(),
				namespace_len: Some(dot),
			};
		}
		match namespace {
			Some(ns) if !ns.is_empty() => Name {
				fully_qualified: format!("{ns}.{local_name}"),
				namespace_len: Some(ns.len()),
			},
			_ => Name {
				fully_qualified: local_name.to_owned(),
				namespace_len: None,
			},
		}
	}

	/// The local name, without any namespace prefix.
	pub fn name(&self) -> &str {
		match self.namespace_len {
			Some(len) => &self.fully_qualified[len + 1..],
			None => &self.fully_qualified,
		}
	}

	pub fn namespace(&self) -> Option<&str> {
		self.namespace_len.map(|len| &self.fully_qualified[..len])
	}

	pub fn fully_qualified_name(&self) -> &str {
		&self.fully_qualified
	}
}

/// The location of a [`Node`] inside a [`Registry`]'s arena.
///
/// Cheap to copy around; meaningless outside the [`Registry`] that produced
/// it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct NodeKey(usize);

impl NodeKey {
	fn new(idx: usize) -> Self {
		NodeKey(idx)
	}
	fn idx(self) -> usize {
		self.0
	}
}

/// One field of a [`Node::Record`].
#[derive(Clone, Debug)]
pub struct Field {
	pub name: String,
	pub doc: Option<String>,
	pub type_key: NodeKey,
	pub default: Option<Value>,
}

/// A single Avro type node.
///
/// Mirrors spec §3's tagged-variant contract: every variant here implements
/// `validate`/`read`/`write`/`random`/`type_name` through the free functions
/// in [`ops`](self::ops), dispatching on this enum instead of on the
/// runtime shape of the [`Value`] being handled (see `SPEC_FULL.md` §3/§9).
#[derive(Clone, Debug)]
pub enum Node {
	Null,
	Boolean,
	Int,
	Long,
	Float,
	Double,
	Bytes,
	String,
	Array(NodeKey),
	Map(NodeKey),
	Enum { name: Name, symbols: Vec<String> },
	Fixed { name: Name, size: usize },
	Record { name: Name, fields: Vec<Field> },
	Union { branches: Vec<NodeKey>, unwrapped: bool },
}

const PRIMITIVE_ORDER: [(&str, Node); 8] = [
	("null", Node::Null),
	("boolean", Node::Boolean),
	("int", Node::Int),
	("long", Node::Long),
	("float", Node::Float),
	("double", Node::Double),
	("bytes", Node::Bytes),
	("string", Node::String),
];

/// The arena of [`Node`]s built up while parsing one or more schema
/// documents, plus the fully-qualified-name table used to resolve
/// references and reject duplicate definitions.
///
/// The eight primitive kinds are pre-seeded at construction (spec §3 "one
/// shared node per kind lives in the registry"). Sharing one `Registry`
/// across several [`parse_into`] calls is what lets a later document refer
/// to a name a previous call registered, and is how spec §8's "name
/// registration" property (identical [`NodeKey`] on repeat reference) is
/// satisfied: it's a literal index, not just structural equality.
#[derive(Clone, Debug)]
pub struct Registry {
	nodes: Vec<Node>,
	names: HashMap<String, NodeKey>,
}

impl Default for Registry {
	fn default() -> Self {
		Self::new()
	}
}

impl Registry {
	pub fn new() -> Self {
		let nodes: Vec<Node> = PRIMITIVE_ORDER.iter().map(|(_, node)| node.clone()).collect();
		Registry {
			nodes,
			names: HashMap::new(),
		}
	}

	pub(crate) fn primitive_key(kind: &str) -> Option<NodeKey> {
		PRIMITIVE_ORDER
			.iter()
			.position(|(name, _)| *name == kind)
			.map(NodeKey::new)
	}

	pub fn get(&self, key: NodeKey) -> &Node {
		&self.nodes[key.idx()]
	}

	pub fn resolve(&self, fully_qualified_name: &str) -> Option<NodeKey> {
		self.names.get(fully_qualified_name).copied()
	}

	/// Reserves a slot for a named type and registers it under `name`
	/// *before* any of its children are parsed, so that self-referential
	/// records can resolve a reference to their own name (spec §4.2 rule 4,
	/// §9 "recursive/self-referential schemas").
	fn reserve(&mut self, name: &Name) -> Result<NodeKey, SchemaError> {
		if self.names.contains_key(name.fully_qualified_name()) {
			return Err(SchemaError::DuplicateName(
				name.fully_qualified_name().to_owned(),
			));
		}
		let key = NodeKey::new(self.nodes.len());
		self.nodes.push(Node::Null); // placeholder, overwritten by `fill`
		self.names.insert(name.fully_qualified_name().to_owned(), key);
		Ok(key)
	}

	fn fill(&mut self, key: NodeKey, node: Node) {
		self.nodes[key.idx()] = node;
	}

	fn push(&mut self, node: Node) -> NodeKey {
		let key = NodeKey::new(self.nodes.len());
		self.nodes.push(node);
		key
	}
}

/// Options accepted by [`parse_into`]/[`Schema::parse_with_options`].
#[derive(Clone, Debug, Default)]
pub struct ParseOptions<'a> {
	/// Enclosing namespace for the document's root, as if it were nested
	/// inside a schema that set this namespace.
	pub namespace: Option<&'a str>,
	/// When set, union values are read/written "bare" instead of wrapped in
	/// a `{branchName: value}` single-key map (spec §4.5.2).
	pub unwrap_unions: bool,
}

/// Options accepted by [`Schema::encode`].
#[derive(Clone, Copy, Debug)]
pub struct EncodeOptions {
	/// Initial buffer capacity guess; on overflow the buffer is resized
	/// exactly once to the size that was actually needed (spec §4.7).
	pub size: usize,
	/// Skip the `validate` call before writing. A value that doesn't
	/// validate may still produce non-round-tripping bytes, or panic-free
	/// garbage, rather than an error.
	pub unsafe_: bool,
}

impl Default for EncodeOptions {
	fn default() -> Self {
		EncodeOptions {
			size: 1024,
			unsafe_: false,
		}
	}
}

/// A parsed schema: a [`Registry`] plus the [`NodeKey`] of its root node.
///
/// This is the library's main entry point. `Schema::parse` turns a JSON
/// schema document into one of these, and `validate`/`encode`/`decode`/
/// `random`/`type_name` drive the root node (and transitively, the whole
/// graph) against it.
#[derive(Clone, Debug)]
pub struct Schema {
	registry: Registry,
	root: NodeKey,
}

impl Schema {
	/// Parses `schema_json` into a fresh [`Registry`].
	pub fn parse(schema_json: &str) -> Result<Self, SchemaError> {
		Self::parse_with_options(schema_json, ParseOptions::default())
	}

	pub fn parse_with_options(
		schema_json: &str,
		options: ParseOptions<'_>,
	) -> Result<Self, SchemaError> {
		let mut registry = Registry::new();
		let root = parse_into(schema_json, options, &mut registry)?;
		Ok(Schema { registry, root })
	}

	/// Wraps an already-populated [`Registry`] (e.g. one several
	/// [`parse_into`] calls contributed to) and a chosen root node.
	pub fn from_registry(registry: Registry, root: NodeKey) -> Self {
		Schema { registry, root }
	}

	pub fn registry(&self) -> &Registry {
		&self.registry
	}

	pub fn root(&self) -> NodeKey {
		self.root
	}

	/// The Avro kind name of the root node (`"record"`, `"array"`, ...).
	pub fn type_name(&self) -> &'static str {
		ops::type_name(self.registry.get(self.root))
	}

	pub fn validate(&self, value: &Value) -> bool {
		ops::validate(&self.registry, self.root, value)
	}

	/// Produces a structurally valid sample value (spec §4.7's `random`).
	pub fn random(&self) -> Value {
		ops::random(&self.registry, self.root, &mut rand::thread_rng())
	}

	/// Encodes `value` to Avro binary, validating first unless
	/// [`EncodeOptions::unsafe_`] is set.
	pub fn encode(&self, value: &Value, options: EncodeOptions) -> Result<Vec<u8>, EncodeError> {
		if !options.unsafe_ && !self.validate(value) {
			return Err(EncodeError::Validation(ValidationError::new()));
		}
		let mut tap = WriteTap::with_capacity(options.size);
		ops::write(&self.registry, self.root, value, &mut tap)?;
		if tap.overflowed() {
			let needed = tap.position();
			let mut tap = WriteTap::with_capacity(needed);
			ops::write(&self.registry, self.root, value, &mut tap)?;
			debug_assert!(!tap.overflowed());
			Ok(tap.into_written())
		} else {
			Ok(tap.into_written())
		}
	}

	/// Decodes Avro binary back into a [`Value`], failing with
	/// [`DecodeError::Truncated`] if the buffer ran out before the whole
	/// value was read.
	pub fn decode(&self, bytes: &[u8]) -> Result<Value, DecodeError> {
		let mut tap = ReadTap::new(bytes);
		let value = ops::read(&self.registry, self.root, &mut tap)?;
		if !tap.valid() {
			return Err(DecodeError::Truncated);
		}
		Ok(value)
	}
}

impl std::str::FromStr for Schema {
	type Err = SchemaError;
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Schema::parse(s)
	}
}
