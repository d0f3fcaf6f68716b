// crates/keel-core/src/kernel/tests/chain_tests.rs
#![cfg(test)]

use crate::kernel::chain::{ChainBuilder, ChainError};
use crate::kernel::component::Phase;

fn build<'a>(phase: Phase, nodes: &[(&'a str, &'a [&'static str])]) -> Result<Vec<&'a str>, ChainError> {
    let mut builder = ChainBuilder::new(phase);
    for &(identity, requires) in nodes {
        builder.add_node(identity, requires);
    }
    builder.build("core")
}

#[test]
fn test_anchor_first_without_dependents() {
    let chain = build(Phase::Initialize, &[("a", &[]), ("b", &[]), ("core", &[])]).unwrap();
    assert_eq!(chain, vec!["core", "a", "b"]);
}

#[test]
fn test_dependency_precedes_dependent() {
    let chain = build(
        Phase::Initialize,
        &[("core", &[]), ("b", &["a"]), ("a", &["core"])],
    )
    .unwrap();
    assert_eq!(chain, vec!["core", "a", "b"]);
}

#[test]
fn test_unconstrained_components_keep_insertion_order() {
    let chain = build(
        Phase::Configure,
        &[("core", &[]), ("zeta", &[]), ("alpha", &[]), ("mid", &[])],
    )
    .unwrap();
    assert_eq!(chain, vec!["core", "zeta", "alpha", "mid"], "Order must not be alphabetical");
}

#[test]
fn test_diamond_has_no_duplicates() {
    let chain = build(
        Phase::Initialize,
        &[
            ("core", &[]),
            ("a", &["b", "c"]),
            ("b", &["d"]),
            ("c", &["d"]),
            ("d", &[]),
        ],
    )
    .unwrap();
    assert_eq!(chain, vec!["core", "d", "b", "c", "a"]);
}

#[test]
fn test_missing_dependency_is_fatal() {
    let err = build(Phase::Initialize, &[("core", &[]), ("a", &["ghost"])]).unwrap_err();
    assert_eq!(
        err,
        ChainError::MissingDependency {
            phase: Phase::Initialize,
            component: "a".to_string(),
            dependency: "ghost".to_string(),
        }
    );
    assert!(err.to_string().contains("'ghost'"));
}

#[test]
fn test_missing_anchor_is_fatal() {
    let err = build(Phase::Initialize, &[("a", &[])]).unwrap_err();
    assert!(matches!(err, ChainError::MissingAnchor { ref anchor, .. } if anchor == "core"));
}

#[test]
fn test_cycle_detected_with_path() {
    let err = build(
        Phase::Configure,
        &[("core", &[]), ("a", &["b"]), ("b", &["a"])],
    )
    .unwrap_err();
    match err {
        ChainError::CyclicDependency { phase, path } => {
            assert_eq!(phase, Phase::Configure);
            assert_eq!(path, vec!["a", "b", "a"]);
        }
        other => panic!("Expected cyclic dependency, got {:?}", other),
    }
}

#[test]
fn test_self_requirement_is_a_cycle() {
    let err = build(Phase::Initialize, &[("core", &[]), ("a", &["a"])]).unwrap_err();
    assert!(err.to_string().contains("a -> a"), "Unexpected message: {}", err);
}

#[test]
fn test_anchor_requirements_are_not_visited() {
    // The anchor is placed before traversal starts, so its own requirements never resolve.
    let chain = build(Phase::Initialize, &[("core", &["nowhere"]), ("a", &[])]).unwrap();
    assert_eq!(chain, vec!["core", "a"]);
}

#[test]
fn test_requirement_on_anchor_does_not_move_it() {
    let chain = build(Phase::Initialize, &[("a", &["core"]), ("core", &[])]).unwrap();
    assert_eq!(chain, vec!["core", "a"]);
}

#[test]
fn test_chain_is_deterministic() {
    let nodes: &[(&str, &[&'static str])] = &[
        ("core", &[]),
        ("web", &["auth", "store"]),
        ("auth", &["store"]),
        ("store", &[]),
        ("audit", &[]),
    ];
    let first = build(Phase::Initialize, nodes).unwrap();
    let second = build(Phase::Initialize, nodes).unwrap();
    assert_eq!(first, second);
    assert_eq!(first, vec!["core", "store", "auth", "web", "audit"]);
}
