use warden_crypto::{derive_key, generate_key, Argon2Params, Salt, SecretKey, KEY_SIZE};

fn test_salt() -> Salt {
    Salt::from_bytes([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16])
}

#[test]
fn derive_key_is_deterministic() {
    let params = Argon2Params::insecure_fast();
    let k1 = derive_key("correct horse", &test_salt(), &params).unwrap();
    let k2 = derive_key("correct horse", &test_salt(), &params).unwrap();
    assert_eq!(k1.as_bytes(), k2.as_bytes());
}

#[test]
fn different_passphrases_produce_different_keys() {
    let params = Argon2Params::insecure_fast();
    let k1 = derive_key("one", &test_salt(), &params).unwrap();
    let k2 = derive_key("two", &test_salt(), &params).unwrap();
    assert_ne!(k1.as_bytes(), k2.as_bytes());
}

#[test]
fn invalid_params_fail_derivation() {
    let params = Argon2Params {
        memory_cost: 1,
        time_cost: 0,
        parallelism: 0,
    };
    let err = derive_key("x", &test_salt(), &params).unwrap_err();
    assert!(format!("{err}").contains("key derivation failed"));
}

#[test]
fn generated_keys_differ() {
    assert_ne!(generate_key().as_bytes(), generate_key().as_bytes());
}

#[test]
fn secret_key_debug_is_redacted() {
    let key = SecretKey::from_bytes([7u8; KEY_SIZE]);
    let dbg = format!("{key:?}");
    assert!(dbg.contains("REDACTED"));
    assert!(!dbg.contains('7'));
}

#[test]
fn random_salts_differ() {
    assert_ne!(Salt::random().as_bytes(), Salt::random().as_bytes());
}

#[test]
fn params_deserialize_with_defaults() {
    let params: Argon2Params = serde_json::from_str(r#"{"time_cost": 3}"#).unwrap();
    assert_eq!(params.time_cost, 3);
    assert_eq!(params.memory_cost, Argon2Params::default().memory_cost);
}
