use pagemark_types::{OutlineId, PublicationId};
use std::collections::HashSet;
use std::str::FromStr;

// ── OutlineId ─────────────────────────────────────────────────────

#[test]
fn outline_id_generate_is_unique() {
    let a = OutlineId::generate();
    let b = OutlineId::generate();
    assert_ne!(a, b);
}

#[test]
fn outline_id_generated_is_uuid() {
    let id = OutlineId::generate();
    assert!(uuid::Uuid::parse_str(id.as_str()).is_ok());
    assert!(!id.is_temporary());
}

#[test]
fn outline_id_keeps_server_value_verbatim() {
    let id = OutlineId::parse("42").unwrap();
    assert_eq!(id.as_str(), "42");
    assert_eq!(id.to_string(), "42");
}

#[test]
fn outline_id_parse_trims() {
    let id = OutlineId::from_str("  abc ").unwrap();
    assert_eq!(id.as_str(), "abc");
}

#[test]
fn outline_id_parse_empty_is_error() {
    assert!(OutlineId::parse("").is_err());
    assert!(OutlineId::parse("   ").is_err());
}

#[test]
fn outline_id_temporary() {
    let id = OutlineId::temporary(3);
    assert_eq!(id.as_str(), "temp-3");
    assert!(id.is_temporary());
}

#[test]
fn outline_id_from_uuid() {
    let uuid = uuid::Uuid::now_v7();
    let id = OutlineId::from(uuid);
    assert_eq!(id.as_str(), uuid.to_string());
}

#[test]
fn outline_id_serializes_as_plain_string() {
    let id = OutlineId::parse("abc-1").unwrap();
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"abc-1\"");
    let parsed: OutlineId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn outline_id_hash_and_eq() {
    let id = OutlineId::generate();
    let mut set = HashSet::new();
    set.insert(id.clone());
    set.insert(id);
    assert_eq!(set.len(), 1);
}

// ── PublicationId ─────────────────────────────────────────────────

#[test]
fn publication_id_parse() {
    let id = PublicationId::parse("pub-7").unwrap();
    assert_eq!(id.as_str(), "pub-7");
    assert_eq!(format!("{id}"), "pub-7");
}

#[test]
fn publication_id_rejects_path_segments() {
    assert!(PublicationId::parse("a/b").is_err());
    assert!(PublicationId::parse("").is_err());
}

#[test]
fn publication_id_serde() {
    let id: PublicationId = serde_json::from_str("\"p1\"").unwrap();
    assert_eq!(id, PublicationId::parse("p1").unwrap());
}
