use warden_crypto::{Argon2Hasher, Argon2Params, HashingPrimitive};

fn hasher() -> Argon2Hasher {
    Argon2Hasher::new(Argon2Params::insecure_fast())
}

#[test]
fn hash_then_verify() {
    let h = hasher();
    let digest = h.hash("hunter2").unwrap();
    assert!(h.verify("hunter2", &digest));
    assert!(!h.verify("wrong", &digest));
}

#[test]
fn digests_are_salted() {
    let h = hasher();
    assert_ne!(h.hash("same").unwrap(), h.hash("same").unwrap());
}

#[test]
fn digest_is_phc_string() {
    let digest = hasher().hash("pw").unwrap();
    assert!(digest.starts_with("$argon2id$v=19$"));
    assert!(digest.contains("m=1024,t=1,p=1"));
}

#[test]
fn verify_with_garbage_digest_is_false() {
    assert!(!hasher().verify("pw", "not a digest"));
    assert!(!hasher().verify("pw", ""));
}

#[test]
fn verify_ignores_current_params() {
    let digest = hasher().hash("pw").unwrap();
    let other = Argon2Hasher::default();
    assert!(other.verify("pw", &digest));
}

#[test]
fn is_digest_recognizes_own_output() {
    let h = hasher();
    let digest = h.hash("pw").unwrap();
    assert!(h.is_digest(&digest));
    assert!(!h.is_digest("pw"));
    assert!(!h.is_digest("$2b$12$abcdefghijklmnopqrstuv"));
}

#[test]
fn invalid_params_fail_hashing() {
    let h = Argon2Hasher::new(Argon2Params {
        memory_cost: 1,
        time_cost: 0,
        parallelism: 0,
    });
    let err = h.hash("pw").unwrap_err();
    assert!(format!("{err}").contains("hashing failed"));
}
