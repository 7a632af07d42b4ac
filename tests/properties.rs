//! The testable properties from spec §8, minus S1-S6 (covered by
//! `scenarios.rs`).

use pretty_assertions::assert_eq;

use avro_tap::schema::{parse_into, EncodeOptions, ParseOptions, Registry};
use avro_tap::{EncodeError, Schema, SchemaError, Value};

const RECORD_SCHEMA: &str = r#"{
	"type": "record",
	"name": "WithDefault",
	"fields": [
		{ "name": "required", "type": "string" },
		{ "name": "flag", "type": "boolean", "default": true }
	]
}"#;

const UNION_ARRAY_SCHEMA: &str = r#"[
	"null",
	"int",
	"string",
	{ "type": "array", "items": "long" },
	{ "type": "record", "name": "Rec", "fields": [ { "name": "x", "type": "long" } ] }
]"#;

const RECURSIVE_SCHEMA: &str = r#"{
	"type": "record",
	"name": "Node",
	"fields": [
		{ "name": "value", "type": "long" },
		{ "name": "next", "type": ["null", "Node"], "default": null }
	]
}"#;

/// Property 1 + 2: every `Schema::random()` validates, and round-trips
/// through encode/decode unchanged.
#[test]
fn random_values_validate_and_round_trip() {
	for schema_json in [
		r#""null""#,
		r#""boolean""#,
		r#""int""#,
		r#""long""#,
		r#""float""#,
		r#""double""#,
		r#""bytes""#,
		r#""string""#,
		r#"{"type": "array", "items": "string"}"#,
		r#"{"type": "map", "values": "long"}"#,
		r#"{"type": "enum", "name": "E", "symbols": ["A", "B", "C"]}"#,
		r#"{"type": "fixed", "name": "F", "size": 4}"#,
		UNION_ARRAY_SCHEMA,
		RECURSIVE_SCHEMA,
	] {
		let schema = Schema::parse(schema_json).unwrap();
		for _ in 0..20 {
			let sample = schema.random();
			assert!(
				schema.validate(&sample),
				"random() produced a value that doesn't validate: {sample:?}"
			);
			let bytes = schema.encode(&sample, Default::default()).unwrap();
			assert_eq!(schema.decode(&bytes).unwrap(), sample);
		}
	}
}

/// Property 3: parsing a second document against a shared registry, where
/// the second document is just a reference to a name the first registered,
/// yields the exact same `NodeKey`.
#[test]
fn name_registration_is_stable_across_parse_calls() {
	let mut registry = Registry::new();
	let first = parse_into(
		r#"{"type": "record", "name": "Shared", "fields": [{"name": "x", "type": "int"}]}"#,
		ParseOptions::default(),
		&mut registry,
	)
	.unwrap();
	let second = parse_into(r#""Shared""#, ParseOptions::default(), &mut registry).unwrap();
	assert_eq!(first, second);
}

/// Property 4: two union branches sharing a discriminator name fail to
/// parse.
#[test]
fn duplicate_union_branch_name_is_a_schema_error() {
	let err = Schema::parse(r#"["string", "string"]"#).unwrap_err();
	assert!(matches!(err, SchemaError::DuplicateUnionBranch(ref s) if s == "string"));

	let err = Schema::parse(
		r#"[
			{ "type": "record", "name": "A", "fields": [] },
			{ "type": "record", "name": "A", "fields": [] }
		]"#,
	)
	.unwrap_err();
	// the second `A` fails to even register before the union notices the
	// clash, since named types are registered exactly once (Invariant 1)
	assert!(matches!(err, SchemaError::DuplicateName(ref s) if s == "A"));
}

#[test]
fn empty_union_is_a_schema_error() {
	assert!(matches!(Schema::parse("[]").unwrap_err(), SchemaError::EmptyUnion));
}

/// Property 5: a record encoded without an optional field produces
/// identical bytes to one where the field was filled with its default.
#[test]
fn default_substitution_matches_explicit_value() {
	let schema = Schema::parse(RECORD_SCHEMA).unwrap();
	let without_flag = Value::Record(vec![("required".to_owned(), Value::String("x".to_owned()))]);
	let with_flag = Value::Record(vec![
		("required".to_owned(), Value::String("x".to_owned())),
		("flag".to_owned(), Value::Boolean(true)),
	]);
	assert!(schema.validate(&without_flag));
	let a = schema.encode(&without_flag, Default::default()).unwrap();
	let b = schema.encode(&with_flag, Default::default()).unwrap();
	assert_eq!(a, b);
}

#[test]
fn missing_required_field_fails_validation() {
	let schema = Schema::parse(RECORD_SCHEMA).unwrap();
	let missing_required = Value::Record(vec![("flag".to_owned(), Value::Boolean(false))]);
	assert!(!schema.validate(&missing_required));
}

/// Property 6: with `unsafe_ = true`, an invalid value is not rejected at
/// encode time.
#[test]
fn unsafe_bypasses_validation() {
	let schema = Schema::parse(r#""int""#).unwrap();
	let not_an_int = Value::String("nope".to_owned());
	assert!(!schema.validate(&not_an_int));
	assert!(matches!(
		schema.encode(&not_an_int, Default::default()),
		Err(EncodeError::Validation(_))
	));
	// Bypasses the check, but the mismatched `write` still can't invent
	// bytes for a node/value pair that makes no sense, so it reports a
	// `TypeMismatch` rather than silently emitting garbage.
	let result = schema.encode(
		&not_an_int,
		EncodeOptions {
			unsafe_: true,
			..Default::default()
		},
	);
	assert!(matches!(result, Err(EncodeError::TypeMismatch("int"))));
}

/// `unsafe_` skips `validate`, so a record missing a required field with no
/// default must fail with an `EncodeError` rather than panic.
#[test]
fn unsafe_encode_of_record_missing_required_field_is_an_error_not_a_panic() {
	let schema = Schema::parse(
		r#"{
			"type": "record",
			"name": "NoDefault",
			"fields": [ { "name": "required", "type": "string" } ]
		}"#,
	)
	.unwrap();
	let empty = Value::Record(vec![]);
	assert!(!schema.validate(&empty));
	let result = schema.encode(
		&empty,
		EncodeOptions {
			unsafe_: true,
			..Default::default()
		},
	);
	assert!(matches!(result, Err(EncodeError::MissingField(ref f)) if f == "required"));
}

#[test]
fn unsafe_does_not_reject_extra_or_union_branch_mismatch() {
	let schema = Schema::parse(r#"["null", "string"]"#).unwrap();
	let bare_string = Value::String("not wrapped".to_owned());
	assert!(!schema.validate(&bare_string));
	let result = schema.encode(
		&bare_string,
		EncodeOptions {
			unsafe_: true,
			..Default::default()
		},
	);
	assert!(result.is_err());
}

#[test]
fn self_referential_record_resolves_and_round_trips() {
	let schema = Schema::parse(RECURSIVE_SCHEMA).unwrap();
	let value = Value::Record(vec![
		("value".to_owned(), Value::Long(1)),
		(
			"next".to_owned(),
			Value::Union(
				"Node".to_owned(),
				Box::new(Value::Record(vec![
					("value".to_owned(), Value::Long(2)),
					("next".to_owned(), Value::Null),
				])),
			),
		),
	]);
	assert!(schema.validate(&value));
	let bytes = schema.encode(&value, Default::default()).unwrap();
	assert_eq!(schema.decode(&bytes).unwrap(), value);
}

#[test]
fn unwrap_unions_uses_bare_values() {
	let schema = Schema::parse_with_options(
		r#"["null", "long"]"#,
		ParseOptions {
			namespace: None,
			unwrap_unions: true,
		},
	)
	.unwrap();
	let value = Value::Long(42);
	assert!(schema.validate(&value));
	let bytes = schema.encode(&value, Default::default()).unwrap();
	assert_eq!(schema.decode(&bytes).unwrap(), value);
}
