//! The dynamically-typed value representation that [`Schema`](crate::Schema)
//! validates, reads, writes and samples against a [`Node`](crate::schema::Node).
//!
//! Unlike `apache-avro`'s `types::Value`, a wrapped union is not a separate
//! tagged variant: the null branch is the [`Value::Null`] sentinel directly,
//! and any other branch is [`Value::Union`] holding the branch's
//! discriminator name alongside the inner value, matching the in-memory
//! shape the schema engine's wrapped-union contract specifies.

/// Any value that can be validated, encoded or decoded against a [`Schema`](crate::Schema).
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
	Null,
	Boolean(bool),
	Int(i32),
	Long(i64),
	Float(f32),
	Double(f64),
	Bytes(Vec<u8>),
	String(String),
	Array(Vec<Value>),
	Map(Vec<(String, Value)>),
	/// The symbol name, not its index.
	Enum(String),
	Fixed(Vec<u8>),
	/// Ordered the same way as the record's fields.
	Record(Vec<(String, Value)>),
	/// `{branchName: innerValue}`, the wrapped-union in-memory shape.
	///
	/// Never used for the null branch: a union value that picked its null
	/// branch is [`Value::Null`] directly.
	Union(String, Box<Value>),
}

impl Value {
	/// Look up a field by name in a [`Value::Record`], or an entry by key in
	/// a [`Value::Map`].
	pub fn get(&self, key: &str) -> Option<&Value> {
		match self {
			Value::Record(fields) | Value::Map(fields) => {
				fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
			}
			_ => None,
		}
	}
}

impl From<()> for Value {
	fn from((): ()) -> Self {
		Value::Null
	}
}
impl From<bool> for Value {
	fn from(b: bool) -> Self {
		Value::Boolean(b)
	}
}
impl From<i32> for Value {
	fn from(v: i32) -> Self {
		Value::Int(v)
	}
}
impl From<i64> for Value {
	fn from(v: i64) -> Self {
		Value::Long(v)
	}
}
impl From<f32> for Value {
	fn from(v: f32) -> Self {
		Value::Float(v)
	}
}
impl From<f64> for Value {
	fn from(v: f64) -> Self {
		Value::Double(v)
	}
}
impl From<String> for Value {
	fn from(v: String) -> Self {
		Value::String(v)
	}
}
impl From<&str> for Value {
	fn from(v: &str) -> Self {
		Value::String(v.to_owned())
	}
}
impl From<Vec<u8>> for Value {
	fn from(v: Vec<u8>) -> Self {
		Value::Bytes(v)
	}
}
