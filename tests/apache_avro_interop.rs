//! Cross-checks our encoder against `apache-avro`, a conformant Avro peer,
//! confirming spec §6.2's "byte-identical round-trip with any conformant
//! Avro peer" requirement for the data shapes that don't touch the
//! `bytes`/`fixed` default-value divergence noted in `DESIGN.md`.

use apache_avro::types::Value as ApacheValue;
use pretty_assertions::assert_eq;

use avro_tap::{Schema, Value};

fn assert_matches_apache_avro(schema_json: &str, apache_schema_json: &str, ours: &Value, theirs: ApacheValue) {
	let schema = Schema::parse(schema_json).unwrap();
	let apache_schema = apache_avro::Schema::parse_str(apache_schema_json).unwrap();

	let our_bytes = schema.encode(ours, Default::default()).unwrap();
	let their_bytes = apache_avro::to_avro_datum(&apache_schema, theirs).unwrap();
	assert_eq!(our_bytes, their_bytes);
}

#[test]
fn primitives_match_apache_avro() {
	assert_matches_apache_avro(r#""int""#, r#""int""#, &Value::Int(-8193), ApacheValue::Int(-8193));
	assert_matches_apache_avro(r#""long""#, r#""long""#, &Value::Long(8192), ApacheValue::Long(8192));
	assert_matches_apache_avro(
		r#""string""#,
		r#""string""#,
		&Value::String("hello avro".to_owned()),
		ApacheValue::String("hello avro".to_owned()),
	);
	assert_matches_apache_avro(
		r#""double""#,
		r#""double""#,
		&Value::Double(1.5),
		ApacheValue::Double(1.5),
	);
}

#[test]
fn array_matches_apache_avro() {
	let schema_json = r#"{"type": "array", "items": "long"}"#;
	assert_matches_apache_avro(
		schema_json,
		schema_json,
		&Value::Array(vec![Value::Long(1), Value::Long(3), Value::Long(2)]),
		ApacheValue::Array(vec![
			ApacheValue::Long(1),
			ApacheValue::Long(3),
			ApacheValue::Long(2),
		]),
	);
}

#[test]
fn union_matches_apache_avro() {
	let schema_json = r#"["string", "null", "long"]"#;
	assert_matches_apache_avro(
		schema_json,
		schema_json,
		&Value::Null,
		ApacheValue::Union(1, Box::new(ApacheValue::Null)),
	);
	assert_matches_apache_avro(
		schema_json,
		schema_json,
		&Value::Union("long".to_owned(), Box::new(Value::Long(7))),
		ApacheValue::Union(2, Box::new(ApacheValue::Long(7))),
	);
}

#[test]
fn record_matches_apache_avro() {
	let schema_json = r#"{
		"type": "record",
		"name": "Test",
		"fields": [{"name": "f", "type": "long"}]
	}"#;
	assert_matches_apache_avro(
		schema_json,
		schema_json,
		&Value::Record(vec![("f".to_owned(), Value::Long(1))]),
		ApacheValue::Record(vec![("f".to_owned(), ApacheValue::Long(1))]),
	);
}
