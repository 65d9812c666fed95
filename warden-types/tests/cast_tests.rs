use pretty_assertions::assert_eq;
use serde_json::json;
use warden_types::{parse_datetime, PrimitiveType, StorageCast};

// ── Cast selection ───────────────────────────────────────────────

#[test]
fn first_supported_type_wins() {
    let kinds = [PrimitiveType::Null, PrimitiveType::Integer, PrimitiveType::String];
    assert_eq!(StorageCast::first_supported(&kinds), Some(StorageCast::Integer));
}

#[test]
fn uncast_kinds_are_skipped() {
    let kinds = [PrimitiveType::Float, PrimitiveType::Mixed];
    assert_eq!(StorageCast::first_supported(&kinds), None);

    let kinds = [PrimitiveType::Other("Money".into()), PrimitiveType::String];
    assert_eq!(StorageCast::first_supported(&kinds), Some(StorageCast::String));

    let kinds = [PrimitiveType::Float, PrimitiveType::Boolean];
    assert_eq!(StorageCast::first_supported(&kinds), Some(StorageCast::Boolean));
}

// ── Conversions ──────────────────────────────────────────────────

#[test]
fn integer_cast_converts_lossless_inputs() {
    let cast = StorageCast::Integer;
    assert_eq!(cast.coerce(&json!("42")), json!(42));
    assert_eq!(cast.coerce(&json!(7.0)), json!(7));
    assert_eq!(cast.coerce(&json!(true)), json!(1));
    assert_eq!(cast.coerce(&json!(7.25)), json!(7.25));
    assert_eq!(cast.coerce(&json!("seven")), json!("seven"));
}

#[test]
fn string_cast_stringifies_scalars() {
    let cast = StorageCast::String;
    assert_eq!(cast.coerce(&json!(42)), json!("42"));
    assert_eq!(cast.coerce(&json!(false)), json!("false"));
    assert_eq!(cast.coerce(&json!(["a"])), json!(["a"]));
}

#[test]
fn boolean_cast_accepts_flags() {
    let cast = StorageCast::Boolean;
    assert_eq!(cast.coerce(&json!(1)), json!(true));
    assert_eq!(cast.coerce(&json!("FALSE")), json!(false));
    assert_eq!(cast.coerce(&json!(2)), json!(2));
}

#[test]
fn structured_casts_decode_json_strings() {
    assert_eq!(StorageCast::Array.coerce(&json!("[1,2]")), json!([1, 2]));
    assert_eq!(StorageCast::Object.coerce(&json!(r#"{"a":1}"#)), json!({"a": 1}));
    assert_eq!(StorageCast::Object.coerce(&json!("[1,2]")), json!("[1,2]"));
}

#[test]
fn datetime_cast_normalizes_to_utc_rfc3339() {
    let cast = StorageCast::DateTime;
    assert_eq!(
        cast.coerce(&json!("2024-05-01T12:00:00+02:00")),
        json!("2024-05-01T10:00:00Z")
    );
    assert_eq!(cast.coerce(&json!("2024-05-01")), json!("2024-05-01T00:00:00Z"));
    assert_eq!(cast.coerce(&json!(0)), json!("1970-01-01T00:00:00Z"));
}

#[test]
fn null_is_never_converted() {
    for cast in [
        StorageCast::String,
        StorageCast::Integer,
        StorageCast::Boolean,
        StorageCast::Array,
        StorageCast::Object,
        StorageCast::DateTime,
    ] {
        assert_eq!(cast.coerce(&json!(null)), json!(null));
    }
}

#[test]
fn parse_datetime_rejects_garbage() {
    assert!(parse_datetime("not a date").is_none());
    assert!(parse_datetime("2024-13-45").is_none());
}
