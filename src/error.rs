//! Error kinds produced while parsing schemas, validating, encoding and
//! decoding values.
//!
//! These map directly onto the four error kinds a schema engine of this
//! shape naturally produces: malformed schemas fail at parse time, bad
//! values fail at encode time (before any bytes are produced), and
//! malformed wire data fails at decode time.

/// A schema document could not be turned into a [`Schema`](crate::Schema).
#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
	#[error("unknown type kind {0:?}")]
	UnknownTypeKind(String),

	#[error("schema of type {kind:?} is missing required attribute {attribute:?}")]
	MissingAttribute {
		kind: &'static str,
		attribute: &'static str,
	},

	#[error("fixed size must be a positive integer, got {0}")]
	InvalidFixedSize(serde_json::Value),

	#[error("enum {0:?} has no symbols")]
	EmptySymbols(String),

	#[error("union has no branches")]
	EmptyUnion,

	#[error("union has two branches named {0:?}")]
	DuplicateUnionBranch(String),

	#[error("no type named {0:?} is registered")]
	MissingName(String),

	#[error("a type named {0:?} is already registered")]
	DuplicateName(String),

	#[error("invalid default for field {field:?}: {reason}")]
	InvalidDefault { field: String, reason: String },

	#[error("malformed field entry: {0}")]
	MalformedField(String),

	#[error("schema document is not valid JSON: {0}")]
	Json(#[from] serde_json::Error),

	#[error("{0}")]
	Other(String),
}

impl SchemaError {
	pub(crate) fn other(msg: impl Into<String>) -> Self {
		SchemaError::Other(msg.into())
	}
}

/// A value did not conform to the [`Node`](crate::schema::Node) it was
/// checked against.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("value does not conform to schema{}", path.as_deref().map(|p| format!(" at {p}")).unwrap_or_default())]
pub struct ValidationError {
	pub path: Option<String>,
}

impl ValidationError {
	pub(crate) fn new() -> Self {
		ValidationError { path: None }
	}
}

/// A value either failed validation, or validated but could not be expressed
/// on the wire.
#[derive(thiserror::Error, Debug)]
pub enum EncodeError {
	#[error(transparent)]
	Validation(#[from] ValidationError),

	#[error("no branch named {0:?} in this union")]
	NoSuchBranch(String),

	#[error("{0:?} is not a valid symbol for this enum")]
	InvalidEnumSymbol(String),

	#[error("field {0:?} is missing and has no default")]
	MissingField(String),

	#[error("value does not conform to the {0} schema it is being written against")]
	TypeMismatch(&'static str),
}

/// Binary Avro data could not be decoded against a [`Schema`](crate::Schema).
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
	#[error("unexpected end of buffer while decoding")]
	Truncated,

	#[error("union branch index {0} is out of range")]
	InvalidUnionIndex(i64),

	#[error("enum symbol index {0} is out of range")]
	InvalidEnumIndex(i64),
}
