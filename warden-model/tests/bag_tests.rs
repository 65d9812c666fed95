use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use warden_model::{
    AttributeDecl, AttributeSlots, Behavior, ConfiguredLocale, DefaultResolvers, EntityAttributeBag,
    EntityDefinition, LocaleConfig, SchemaCompiler, SchemalessConfig, SchemalessOverlay,
    TransformRegistry, TranslationStore,
};

fn stored(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn registry() -> TransformRegistry {
    let def = EntityDefinition::new("page")
        .attribute("title", AttributeDecl::of_type("string").with(Behavior::Translatable))
        .attribute("data", AttributeDecl::new().with(Behavior::Schemaless));
    SchemaCompiler::new(Arc::new(DefaultResolvers::default()))
        .compile(&def)
        .unwrap()
        .transforms
}

#[test]
fn loaded_bag_starts_clean() {
    let bag = EntityAttributeBag::from_stored(stored(json!({"a": 1, "b": "x"})));
    assert_eq!(bag.original(), bag.attributes());
    assert!(bag.changes().is_empty());
    assert_eq!(bag.original_value("a"), Some(&json!(1)));
}

#[test]
fn changes_list_new_and_modified_values() {
    let mut bag = EntityAttributeBag::from_stored(stored(json!({"a": 1, "b": "x"})));
    bag.insert("a", json!(2));
    bag.insert("c", json!(true));
    bag.insert("b", json!("x"));

    assert_eq!(bag.changes(), stored(json!({"a": 2, "c": true})));
    assert!(bag.is_dirty("a"));
    assert!(!bag.is_dirty("b"));

    bag.sync_original();
    assert!(bag.changes().is_empty());
}

#[test]
fn removed_value_is_dirty() {
    let mut bag = EntityAttributeBag::from_stored(stored(json!({"a": 1})));
    assert_eq!(bag.remove("a"), Some(json!(1)));
    assert!(!bag.contains("a"));
    assert!(bag.is_dirty("a"));
}

#[test]
fn raw_slots_have_no_transforms() {
    let mut bag = EntityAttributeBag::new();
    bag.write_slot("secret", json!("plain")).unwrap();
    assert_eq!(bag.read_slot("secret").unwrap(), Some(json!("plain")));
    assert_eq!(bag.read_slot("missing").unwrap(), None);
}

#[test]
fn translation_store_works_on_a_bare_bag() {
    let store = TranslationStore::new(Arc::new(ConfiguredLocale::new(&LocaleConfig::default())));
    let registry = registry();
    let mut bag = EntityAttributeBag::new();

    store.set_translation(&mut bag, &registry, "title", "Home", None).unwrap();
    store
        .set_translation(&mut bag, &registry, "title", "Startseite", Some("de"))
        .unwrap();

    assert_eq!(bag.get("title"), Some(&json!(r#"{"de":"Startseite","en":"Home"}"#)));
    assert_eq!(store.translate(&bag, "title", Some("de")).unwrap(), "Startseite");
}

#[test]
fn schemaless_overlay_works_on_a_bare_bag() {
    let overlay = SchemalessOverlay::new(&SchemalessConfig::default());
    let registry = registry();
    let mut bag = EntityAttributeBag::new();

    overlay.set(&mut bag, &registry, "data", "a.b", json!(1)).unwrap();
    assert_eq!(bag.get("data"), Some(&json!(r#"{"a":{"b":1}}"#)));
    assert_eq!(overlay.get(&bag, &registry, "data", "a.b").unwrap(), Some(json!(1)));

    let mut attributes = bag.attributes().clone();
    attributes.remove("data");
    overlay.fill_missing(&registry, &mut attributes);
    assert_eq!(attributes, stored(json!({"data": null})));
}

#[test]
fn bag_serializes_both_maps() {
    let bag = EntityAttributeBag::from_stored(stored(json!({"a": 1})));
    let value = serde_json::to_value(&bag).unwrap();
    assert_eq!(value, json!({"attributes": {"a": 1}, "original": {"a": 1}}));
}
