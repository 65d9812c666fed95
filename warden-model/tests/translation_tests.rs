use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use warden_crypto::{generate_key, Argon2Hasher, Argon2Params, ChaChaCipher};
use warden_model::{
    AttributeDecl, Behavior, ConfiguredLocale, Engine, EngineConfig, Entity, EntityDefinition,
    LocaleConfig, ModelError, TranslationStore, Translations,
};

fn locales() -> Arc<ConfiguredLocale> {
    Arc::new(ConfiguredLocale::new(&LocaleConfig {
        active: "en".to_string(),
        fallback: "en".to_string(),
    }))
}

fn engine(locale: Arc<ConfiguredLocale>) -> Engine {
    let engine = Engine::builder(EngineConfig::default())
        .cipher(Arc::new(ChaChaCipher::new(generate_key())))
        .hasher(Arc::new(Argon2Hasher::new(Argon2Params::insecure_fast())))
        .locale(locale)
        .build()
        .unwrap();
    engine
        .register(
            &EntityDefinition::new("product")
                .attribute(
                    "title",
                    AttributeDecl::of_type("string")
                        .with(Behavior::Translatable)
                        .with(Behavior::Fillable),
                )
                .attribute(
                    "tagline",
                    AttributeDecl::of_type("string")
                        .with(Behavior::Translatable)
                        .with(Behavior::Encrypted),
                )
                .attribute("sku", AttributeDecl::of_type("string")),
        )
        .unwrap();
    engine
}

fn product(engine: &Engine) -> Entity {
    engine.instantiate("product").unwrap()
}

fn translations(pairs: &[(&str, &str)]) -> Translations {
    pairs
        .iter()
        .map(|(locale, text)| (locale.to_string(), text.to_string()))
        .collect()
}

#[test]
fn set_and_get_translation() {
    let engine = engine(locales());
    let mut entity = product(&engine);

    entity.set_translation("title", "Chair", Some("en")).unwrap();
    entity.set_translation("title", "Stuhl", Some("de")).unwrap();

    assert_eq!(entity.get_translation("title", Some("de")).unwrap(), Some("Stuhl".to_string()));
    assert_eq!(entity.get_translation("title", None).unwrap(), Some("Chair".to_string()));
    assert_eq!(
        entity.get_translations("title").unwrap(),
        translations(&[("de", "Stuhl"), ("en", "Chair")])
    );
}

#[test]
fn slot_holds_encoded_locale_map() {
    let engine = engine(locales());
    let mut entity = product(&engine);
    entity.set_translation("title", "Chair", Some("en")).unwrap();

    let stored = entity.bag().get("title").unwrap().as_str().unwrap().to_string();
    let decoded: BTreeMap<String, String> = serde_json::from_str(&stored).unwrap();
    assert_eq!(decoded, translations(&[("en", "Chair")]));
}

#[test]
fn missing_locale_falls_back() {
    let engine = engine(locales());
    let mut entity = product(&engine);
    entity.set_translation("title", "Chair", Some("en")).unwrap();

    assert_eq!(entity.get_translation("title", Some("fr")).unwrap(), Some("Chair".to_string()));
    assert!(!entity.has_translation("title", Some("fr")).unwrap());
    assert!(entity.has_translation("title", Some("en")).unwrap());
}

#[test]
fn nothing_found_is_none_or_empty() {
    let engine = engine(locales());
    let mut entity = product(&engine);
    assert_eq!(entity.get_translation("title", Some("fr")).unwrap(), None);
    assert_eq!(entity.translate("title", Some("fr")).unwrap(), "");

    entity.set_translation("title", "Stuhl", Some("de")).unwrap();
    assert_eq!(entity.get_translation("title", Some("fr")).unwrap(), None);
    assert_eq!(entity.translate("title", Some("de")).unwrap(), "Stuhl");
}

#[test]
fn active_locale_is_read_at_call_time() {
    let locale = locales();
    let engine = engine(Arc::clone(&locale));
    let mut entity = product(&engine);

    entity.set("title", json!("Chair")).unwrap();
    locale.set_active("de");
    entity.set("title", json!("Stuhl")).unwrap();

    assert_eq!(entity.translate("title", None).unwrap(), "Stuhl");
    assert_eq!(entity.translate("title", Some("en")).unwrap(), "Chair");
}

#[test]
fn set_routes_maps_and_scalars() {
    let engine = engine(locales());
    let mut entity = product(&engine);

    entity.set("title", json!({"en": "Chair", "de": "Stuhl"})).unwrap();
    entity.set("title", json!({"fr": "Chaise"})).unwrap();
    entity.set("title", json!(7)).unwrap();

    assert_eq!(
        entity.get_translations("title").unwrap(),
        translations(&[("de", "Stuhl"), ("en", "7"), ("fr", "Chaise")])
    );
}

#[test]
fn set_null_clears_all_translations() {
    let engine = engine(locales());
    let mut entity = product(&engine);
    entity.set("title", json!({"en": "Chair"})).unwrap();
    entity.set("title", json!(null)).unwrap();
    assert!(entity.get_translations("title").unwrap().is_empty());
}

#[test]
fn set_rejects_arrays_and_nested_maps() {
    let engine = engine(locales());
    let mut entity = product(&engine);
    assert!(matches!(
        entity.set("title", json!(["a", "b"])),
        Err(ModelError::Validation { .. })
    ));
    assert!(matches!(
        entity.set("title", json!({"en": {"nested": true}})),
        Err(ModelError::Validation { .. })
    ));
    assert!(entity.bag().get("title").is_none());
}

#[test]
fn forget_translations() {
    let engine = engine(locales());
    let mut entity = product(&engine);
    entity
        .set_translations("title", translations(&[("en", "Chair"), ("de", "Stuhl"), ("fr", "Chaise")]))
        .unwrap();

    entity.forget_translation("title", Some("fr")).unwrap();
    assert_eq!(
        entity.get_translations("title").unwrap(),
        translations(&[("de", "Stuhl"), ("en", "Chair")])
    );

    entity.forget_translations("title", &["de", "en"]).unwrap();
    assert!(entity.get_translations("title").unwrap().is_empty());
}

#[test]
fn non_translatable_attribute_is_refused() {
    let engine = engine(locales());
    let mut entity = product(&engine);

    let err = entity.set_translation("sku", "X-1", Some("en")).unwrap_err();
    assert!(matches!(&err, ModelError::NotTranslatable(name) if name == "sku"));
    assert_eq!(err.to_string(), "sku is not a translatable attribute");
    assert!(entity.forget_translation("sku", None).is_err());
    assert!(entity.bag().get("sku").is_none());
}

#[test]
fn translations_compose_with_encryption() {
    let engine = engine(locales());
    let mut entity = product(&engine);
    entity.set_translation("tagline", "Sit well", Some("en")).unwrap();

    let stored = entity.bag().get("tagline").unwrap().as_str().unwrap();
    assert!(stored.starts_with("__ENCRYPTED__"));
    assert!(!stored.contains("Sit well"));
    assert_eq!(entity.translate("tagline", Some("en")).unwrap(), "Sit well");
}

#[test]
fn empty_slots_decode_to_empty_maps() {
    assert!(TranslationStore::decode(None).unwrap().is_empty());
    assert!(TranslationStore::decode(Some(&json!(null))).unwrap().is_empty());
    assert!(TranslationStore::decode(Some(&json!(""))).unwrap().is_empty());
    assert!(matches!(
        TranslationStore::decode(Some(&json!("{broken"))),
        Err(ModelError::Serialization(_))
    ));
}
