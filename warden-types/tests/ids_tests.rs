use std::collections::HashSet;
use warden_types::{Error, RecordId};

#[test]
fn new_ids_are_unique() {
    let ids: HashSet<RecordId> = (0..1000).map(|_| RecordId::new()).collect();
    assert_eq!(ids.len(), 1000);
}

#[test]
fn display_and_parse_roundtrip() {
    let id = RecordId::new();
    let parsed = RecordId::parse(&id.to_string()).unwrap();
    assert_eq!(id, parsed);

    let via_from_str: RecordId = id.to_string().parse().unwrap();
    assert_eq!(id, via_from_str);
}

#[test]
fn new_ids_are_version_4() {
    assert_eq!(RecordId::new().as_uuid().get_version_num(), 4);
    assert_eq!(RecordId::ordered().as_uuid().get_version_num(), 7);
}

#[test]
fn parse_rejects_invalid_input() {
    let err = RecordId::parse("not-a-uuid").unwrap_err();
    assert!(matches!(err, Error::InvalidUuid(_)));
    assert!(err.to_string().starts_with("invalid UUID"));

    let err = "1234".parse::<RecordId>().unwrap_err();
    assert!(matches!(err, Error::InvalidUuid(_)));
}

#[test]
fn serde_is_transparent() {
    let id = RecordId::new();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, format!("\"{id}\""));
    let back: RecordId = serde_json::from_str(&json).unwrap();
    assert_eq!(back, id);
}
