use pretty_assertions::assert_eq;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use warden_model::{
    state_key, AttributeDecl, Behavior, CompiledSchema, DefaultResolvers, EntityDefinition,
    ModelError, SchemaCompiler, StateGuard, TransitionMap, NONE_STATE,
};

fn publication() -> CompiledSchema {
    let def = EntityDefinition::new("article")
        .attribute(
            "status",
            AttributeDecl::of_type("string").with(Behavior::Stateful),
        )
        .attribute("stage", AttributeDecl::of_type("integer").with(Behavior::Stateful))
        .attribute("title", AttributeDecl::of_type("string"))
        .transition("status", "draft", ["published"])
        .transition("status", "published", ["archived", "draft"])
        .transition("status", "archived", Vec::<&str>::new())
        .transition("stage", "1", [2]);
    SchemaCompiler::new(Arc::new(DefaultResolvers::default()))
        .compile(&def)
        .unwrap()
}

fn map(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[test]
fn state_keys() {
    assert_eq!(state_key(None), NONE_STATE);
    assert_eq!(state_key(Some(&Value::Null)), "none");
    assert_eq!(state_key(Some(&json!("draft"))), "draft");
    assert_eq!(state_key(Some(&json!(2))), "2");
    assert_eq!(state_key(Some(&json!(true))), "true");
}

#[test]
fn declared_move_is_allowed() {
    let compiled = publication();
    let result = StateGuard.check(
        &compiled,
        &map(json!({"status": "draft"})),
        &map(json!({"status": "published"})),
    );
    assert!(result.is_ok());
}

#[test]
fn undeclared_move_is_refused() {
    let compiled = publication();
    let err = StateGuard
        .check(
            &compiled,
            &map(json!({"status": "draft"})),
            &map(json!({"status": "archived"})),
        )
        .unwrap_err();

    match err {
        ModelError::Transition {
            attribute,
            current,
            candidate,
        } => {
            assert_eq!(attribute, "status");
            assert_eq!(current, "draft");
            assert_eq!(candidate, "archived");
        }
        other => panic!("expected a transition error, got {other:?}"),
    }
}

#[test]
fn transition_error_message_names_both_states() {
    let compiled = publication();
    let err = StateGuard
        .check(
            &compiled,
            &map(json!({"status": "draft"})),
            &map(json!({"status": "archived"})),
        )
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"transition from "draft" to "archived" not allowed on attribute "status""#
    );
}

#[test]
fn unchanged_state_must_be_a_declared_target() {
    let compiled = publication();
    let result = StateGuard.check(
        &compiled,
        &map(json!({"status": "draft"})),
        &map(json!({"status": "draft"})),
    );
    assert!(result.is_err());
}

#[test]
fn terminal_state_refuses_every_move() {
    let compiled = publication();
    let result = StateGuard.check(
        &compiled,
        &map(json!({"status": "archived"})),
        &map(json!({"status": "published"})),
    );
    assert!(result.is_err());
}

#[test]
fn undeclared_origin_is_unconstrained() {
    let compiled = publication();
    // A fresh entity has no original state.
    assert!(StateGuard
        .check(&compiled, &Map::new(), &map(json!({"status": "archived"})))
        .is_ok());
    assert!(StateGuard
        .check(
            &compiled,
            &map(json!({"status": "review"})),
            &map(json!({"status": "anything"}))
        )
        .is_ok());
}

#[test]
fn absent_stateful_attribute_is_skipped() {
    let compiled = publication();
    assert!(StateGuard
        .check(&compiled, &map(json!({"status": "draft"})), &map(json!({"title": "x"})))
        .is_ok());
}

#[test]
fn non_string_states_compare_by_key() {
    let compiled = publication();
    assert!(StateGuard
        .check(&compiled, &map(json!({"stage": 1})), &map(json!({"stage": 2})))
        .is_ok());
    assert!(StateGuard
        .check(&compiled, &map(json!({"stage": 1})), &map(json!({"stage": 3})))
        .is_err());
}

#[test]
fn first_violation_in_declaration_order_is_reported() {
    let compiled = publication();
    let err = StateGuard
        .check(
            &compiled,
            &map(json!({"status": "draft", "stage": 1})),
            &map(json!({"status": "archived", "stage": 5})),
        )
        .unwrap_err();
    assert!(matches!(err, ModelError::Transition { attribute, .. } if attribute == "status"));
}

#[test]
fn can_transition_probe() {
    let compiled = publication();
    let draft = json!("draft");
    assert!(StateGuard.can_transition(&compiled, "status", Some(&draft), &json!("published")));
    assert!(!StateGuard.can_transition(&compiled, "status", Some(&draft), &json!("archived")));
    assert!(StateGuard.can_transition(&compiled, "status", None, &json!("archived")));
    // Non-stateful attributes are never constrained.
    assert!(StateGuard.can_transition(&compiled, "title", Some(&json!("a")), &json!("b")));
}

#[test]
fn transition_map_can_be_built_by_hand() {
    let mut map = TransitionMap::new();
    assert!(map.is_empty());
    map.allow("phase", "new", ["active"]);
    map.allow("phase", "active", ["done"]);

    assert!(map.constrains("phase"));
    assert!(!map.constrains("other"));
    assert_eq!(map.targets("phase", "new"), Some(&["active".to_string()][..]));
    assert_eq!(map.targets("phase", "done"), None);
    assert!(map.permits("phase", "done", "new"));
    assert!(!map.permits("phase", "new", "done"));
}
