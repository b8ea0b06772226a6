use crate::collection::DisjointSetCollection;
use crate::config::SwarmConfig;
use crate::disjoint::DisjointSetError;
use crate::key::Key;
use crate::local::LocalEngine;

type Groups = DisjointSetCollection<String, Key>;

#[test]
fn test_integer_and_string_dimensions_are_distinct() {
    let mut groups = Groups::new();
    let int_dim = Key::Int(42);
    let str_dim = Key::from("42");

    groups.make_set(&int_dim, ["a", "b"]).unwrap();
    groups.make_singleton(&str_dim, "a");
    groups.make_singleton(&str_dim, "b");

    assert!(groups.connected(&int_dim, "a", "b").unwrap());
    assert!(!groups.connected(&str_dim, "a", "b").unwrap());
    assert_eq!(groups.class_count(&str_dim), 2);
}

#[test]
fn test_handles_are_shared_across_dimensions() {
    let mut groups = Groups::new();
    let first = groups.make_singleton(&Key::Int(1), "web");
    let second = groups.make_singleton(&Key::Int(2), "web");
    assert_eq!(first, second);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups.element(first).map(String::as_str), Some("web"));
}

#[test]
fn test_fingerprint_ignores_construction_order() {
    let dim = Key::Int(7);

    let mut forward = Groups::new();
    forward.make_sets(&dim, vec![vec!["a", "b", "c"], vec!["d"]]).unwrap();

    let mut backward = Groups::new();
    backward.make_singleton(&dim, "d");
    backward.make_singleton(&dim, "c");
    backward.make_singleton(&dim, "b");
    backward.make_union(&dim, "b", "c").unwrap();
    backward.make_singleton(&dim, "a");
    backward.make_union(&dim, "c", "a").unwrap();

    assert_eq!(
        forward.partition_digest_hex(&dim, "sha256").unwrap(),
        backward.partition_digest_hex(&dim, "sha256").unwrap()
    );

    backward.make_union(&dim, "a", "d").unwrap();
    assert_ne!(
        forward.partition_digest_hex(&dim, "sha256").unwrap(),
        backward.partition_digest_hex(&dim, "sha256").unwrap()
    );
}

#[test]
fn test_engine_groups_can_grow_after_load() {
    let config = SwarmConfig::from_toml(
        r#"
        [[group]]
        dimension = "site"
        members = ["ip", "web"]
        "#,
    )
    .unwrap();
    let mut engine = LocalEngine::new(config).unwrap();
    let site = Key::from("site");

    let groups = engine.groups_mut();
    groups.make_singleton(&site, "db");
    assert!(groups.make_union(&site, "db", "web").unwrap());
    assert!(!groups.make_union(&site, "ip", "db").unwrap());

    let summary = engine.summary().unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].classes.len(), 1);
    assert_eq!(summary[0].classes[0].root, "ip");
    assert_eq!(summary[0].classes[0].members, vec!["db", "ip", "web"]);
}

#[test]
fn test_not_found_names_dimension_and_element() {
    let mut groups = Groups::new();
    groups.make_singleton(&Key::Int(1), "a");

    let err = groups.find_root(&Key::Int(2), "a").unwrap_err();
    assert!(matches!(err, DisjointSetError::NotFound { .. }));
    let message = err.to_string();
    assert!(message.contains("Int(2)"));
    assert!(message.contains("\"a\""));
}
