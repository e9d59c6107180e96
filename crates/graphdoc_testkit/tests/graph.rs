//! Graph layer end to end.

use graphdoc_core::{
    CascadeKind, CoreError, FuzzyOptions, NounDefinition, QueryOptions,
    VerbDefinition,
};
use graphdoc_testkit::prelude::*;
use serde_json::{json, Value};
use std::sync::Arc;

fn ids(things: Vec<graphdoc_core::Thing>) -> Vec<String> {
    things.into_iter().map(|t| t.id).collect()
}

#[test]
fn schema_and_entities() {
    with_temp_graph(|graph| {
        graph
            .nouns()
            .define("User", NounDefinition::new().description("A person"))
            .unwrap();
        graph
            .verbs()
            .define(
                "worksAt",
                VerbDefinition::new().from_types(["User"]).to_types(["Company"]),
            )
            .unwrap();

        let user = graph
            .things()
            .create("User", json!({"name": "Ada", "role": "engineer"}), None)
            .unwrap();
        assert!(user.id.starts_with("user_"));

        let found = graph
            .things()
            .find(Some("User"), &json!({"role": "engineer"}), &QueryOptions::new())
            .unwrap();
        assert_eq!(found, vec![user]);

        let stats = graph.stats().unwrap();
        assert_eq!((stats.nouns, stats.verbs, stats.things), (1, 1, 1));
    });
}

#[test]
fn traversal_over_org_chart() {
    let graph = scenarios::org_chart();

    assert_eq!(ids(graph.traverse("ada", "worksAt").unwrap()), vec!["acme"]);
    assert_eq!(
        ids(graph.traverse_back("acme", "worksAt").unwrap()),
        vec!["ada", "grace"]
    );

    graph.things().delete("grace").unwrap();
    assert_eq!(ids(graph.traverse_back("acme", "worksAt").unwrap()), vec!["ada"]);
    assert!(graph
        .relationships()
        .relations_from("grace", None)
        .unwrap()
        .is_empty());
}

#[test]
fn deleting_a_company_detaches_employees() {
    let graph = scenarios::org_chart();
    assert!(graph.things().delete("acme").unwrap());

    assert!(graph.traverse("ada", "worksAt").unwrap().is_empty());
    assert!(graph.relationships().relations_to("acme", None).unwrap().is_empty());
    assert_eq!(graph.relationships().count().unwrap(), 1);
}

#[test]
fn history_records_every_mutation() {
    let graph = scenarios::org_chart();
    graph.things().update("ada", json!({"title": "CTO"})).unwrap();
    graph.relationships().unrelate("ada", "worksAt", "acme").unwrap();
    graph.things().delete("ada").unwrap();

    let verbs: Vec<_> = graph
        .actions()
        .for_thing("ada")
        .unwrap()
        .into_iter()
        .map(|a| a.verb)
        .collect();
    assert_eq!(
        verbs,
        vec!["created", "worksAt", "updated", "unworksAt", "deleted"]
    );
}

#[test]
fn versions_and_timestamps() {
    with_temp_graph(|graph| {
        let things = graph.things();
        let created = things.create("Doc", json!({"rev": 0}), None).unwrap();
        let mut previous = created.clone();
        for rev in 1..=5 {
            let next = things
                .update(&created.id, json!({ "rev": rev }))
                .unwrap()
                .unwrap();
            assert_eq!(next.version, previous.version + 1);
            assert_eq!(next.created_at, created.created_at);
            assert!(next.updated_at >= previous.updated_at);
            previous = next;
        }
        assert_eq!(previous.data["rev"], json!(5));
    });
}

#[tokio::test]
async fn fuzzy_relate_reuses_or_creates() {
    let graph = TestGraph::memory();
    let acme = graph
        .things()
        .create("Company", json!({"name": "Acme"}), None)
        .unwrap();
    let matcher = Arc::new(
        ScriptedMatcher::new()
            .respond("Company", "ACME Inc", vec![(acme.clone(), 0.91)])
            .respond("Company", "Acme Labs", vec![(acme.clone(), 0.42)]),
    );
    let graph = graph.with_matcher(matcher.clone());
    let ada = graph.things().create("User", json!({}), None).unwrap();

    let reused = graph
        .fuzzy_relate(&ada.id, "worksAt", "Company", "ACME Inc", None, FuzzyOptions::new())
        .await
        .unwrap();
    assert!(!reused.created);
    assert_eq!(reused.thing.id, acme.id);
    assert_eq!(reused.relationship.cascade, CascadeKind::Fuzzy);

    let created = graph
        .fuzzy_relate(&ada.id, "worksAt", "Company", "Acme Labs", None, FuzzyOptions::new())
        .await
        .unwrap();
    assert!(created.created);
    assert_ne!(created.thing.id, acme.id);
    assert!(created.thing.id.starts_with("company_"));
    assert_eq!(created.relationship.cascade, CascadeKind::Fuzzy);

    assert_eq!(graph.things().count(Some("Company")).unwrap(), 2);
    assert_eq!(graph.traverse(&ada.id, "worksAt").unwrap().len(), 2);

    let calls = matcher.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c.thing_type == "Company" && c.threshold == 0.8));
}

#[tokio::test]
async fn fuzzy_relate_explicit_threshold_wins() {
    let graph = TestGraph::memory();
    let acme = graph.things().create("Company", json!({}), None).unwrap();
    let matcher = Arc::new(ScriptedMatcher::new().respond(
        "Company",
        "Acme Labs",
        vec![(acme.clone(), 0.42)],
    ));
    let graph = graph.with_matcher(matcher);

    let result = graph
        .fuzzy_relate(
            "ada",
            "worksAt",
            "Company",
            "Acme Labs",
            None,
            FuzzyOptions::new().threshold(0.4),
        )
        .await
        .unwrap();
    assert!(!result.created);
    assert_eq!(result.thing.id, acme.id);
}

#[tokio::test]
async fn fuzzy_relate_surfaces_matcher_failures() {
    let graph = TestGraph::memory()
        .with_matcher(Arc::new(ScriptedMatcher::new().failing("embedding index down")));
    let err = graph
        .fuzzy_relate("ada", "worksAt", "Company", "x", None, FuzzyOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Matcher { .. }));
    assert_eq!(graph.actions().count(&Value::Null).unwrap(), 0);
}

#[tokio::test]
async fn fuzzy_relate_requires_matcher() {
    let graph = TestGraph::memory();
    let err = graph
        .fuzzy_relate("ada", "worksAt", "Company", "x", None, FuzzyOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Configuration { .. }));
}
