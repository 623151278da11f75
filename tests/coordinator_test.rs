//! Coordinator flows: agent dispatch plus rule persistence, end to end
//! against the snapshot DOM and a file-backed store.

use std::time::Duration;

use element_hider::agent::{AgentResponse, MARKER_ATTRIBUTE};
use element_hider::config::Language;
use element_hider::coordinator::{Coordinator, Settings};
use element_hider::dom::snapshot::SnapshotDom;
use element_hider::dom::{BoundingBox, NodeId, PageDom, PickerEvent};
use element_hider::rules::{JsonFileStore, Rule, RuleStore};
use tempfile::TempDir;

fn coordinator_for(
    dom: SnapshotDom,
    dir: &TempDir,
) -> Coordinator<SnapshotDom, JsonFileStore> {
    let store = JsonFileStore::new(dir.path().join("rules.json"));
    Coordinator::new(dom, store, Settings::new(Language::En, Vec::new()))
}

fn page_with_banner() -> (SnapshotDom, NodeId) {
    let mut dom = SnapshotDom::new("https://a.com/x");
    let node = dom.append_element(None, "div", &[("id", "banner")]);
    dom.set_bounding_box(node, BoundingBox::new(0.0, 0.0, 200.0, 50.0));
    (dom, node)
}

#[tokio::test]
async fn hide_at_point_persists_a_rule() {
    let dir = tempfile::tempdir().unwrap();
    let (dom, node) = page_with_banner();
    let mut coordinator = coordinator_for(dom, &dir);

    let response = coordinator.hide_at_point(10.0, 10.0).await.unwrap();
    assert!(response.is_success());

    let rules = coordinator.store().get_all().await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].selector, "#banner");
    assert_eq!(rules[0].url, "https://a.com/x");
    assert!(rules[0].is_hidden);
    assert!(rules[0].is_enabled);

    assert_eq!(
        coordinator
            .agent()
            .dom()
            .attribute(node, MARKER_ATTRIBUTE)
            .await
            .unwrap(),
        Some("true".to_string())
    );
}

#[tokio::test]
async fn hide_at_point_misses_store_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let dom = SnapshotDom::new("https://a.com/x");
    let mut coordinator = coordinator_for(dom, &dir);

    let response = coordinator.hide_at_point(300.0, 300.0).await.unwrap();
    assert_eq!(response, AgentResponse::error("No element found"));
    assert!(coordinator.store().get_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn repeated_hide_keeps_a_single_rule() {
    let dir = tempfile::tempdir().unwrap();
    let (dom, _node) = page_with_banner();
    let mut coordinator = coordinator_for(dom, &dir);

    coordinator.hide_at_point(10.0, 10.0).await.unwrap();
    coordinator.hide_by_selector("#banner", None).await.unwrap();

    let rules = coordinator.store().get_all().await.unwrap();
    assert_eq!(rules.len(), 1);
}

#[tokio::test]
async fn hide_by_selector_records_against_the_given_url() {
    let dir = tempfile::tempdir().unwrap();
    let (dom, _node) = page_with_banner();
    let mut coordinator = coordinator_for(dom, &dir);

    let response = coordinator
        .hide_by_selector("#banner", Some("https://a.com/"))
        .await
        .unwrap();
    assert!(response.is_success());

    let rules = coordinator.store().get_all().await.unwrap();
    assert_eq!(rules[0].url, "https://a.com/");
}

#[tokio::test]
async fn toggle_rule_flips_store_and_live_page() {
    let dir = tempfile::tempdir().unwrap();
    let (dom, node) = page_with_banner();
    let mut coordinator = coordinator_for(dom, &dir);

    coordinator.hide_by_selector("#banner", None).await.unwrap();

    let enabled = coordinator
        .toggle_rule("#banner", "https://a.com/x")
        .await
        .unwrap();
    assert!(!enabled);
    assert!(!coordinator.store().get_all().await.unwrap()[0].is_enabled);
    assert_eq!(
        coordinator
            .agent()
            .dom()
            .attribute(node, MARKER_ATTRIBUTE)
            .await
            .unwrap(),
        None
    );

    let enabled = coordinator
        .toggle_rule("#banner", "https://a.com/x")
        .await
        .unwrap();
    assert!(enabled);
    assert_eq!(
        coordinator
            .agent()
            .dom()
            .attribute(node, MARKER_ATTRIBUTE)
            .await
            .unwrap(),
        Some("true".to_string())
    );
}

#[tokio::test]
async fn toggling_a_missing_rule_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let dom = SnapshotDom::new("https://a.com/x");
    let mut coordinator = coordinator_for(dom, &dir);

    assert!(coordinator
        .toggle_rule("#nope", "https://a.com/x")
        .await
        .is_err());
}

#[tokio::test]
async fn delete_rule_reverses_the_mutation_but_keeps_other_rules() {
    let dir = tempfile::tempdir().unwrap();
    let mut dom = SnapshotDom::new("https://a.com/x");
    let banner = dom.append_element(None, "div", &[("id", "banner")]);
    let sidebar = dom.append_element(None, "div", &[("id", "sidebar")]);
    let mut coordinator = coordinator_for(dom, &dir);

    coordinator.hide_by_selector("#banner", None).await.unwrap();
    coordinator.hide_by_selector("#sidebar", None).await.unwrap();

    let remaining = coordinator
        .delete_rule("#banner", "https://a.com/x")
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].selector, "#sidebar");

    let dom = coordinator.agent().dom();
    assert_eq!(dom.attribute(banner, MARKER_ATTRIBUTE).await.unwrap(), None);
    assert_eq!(
        dom.attribute(sidebar, MARKER_ATTRIBUTE).await.unwrap(),
        Some("true".to_string())
    );
}

#[tokio::test]
async fn reconcile_with_retries_stays_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let (dom, _node) = page_with_banner();

    let store = JsonFileStore::new(dir.path().join("rules.json"));
    store
        .upsert(Rule::hide("#banner", "https://a.com/x"))
        .await
        .unwrap();

    let settings = Settings::new(
        Language::En,
        vec![Duration::from_millis(10), Duration::from_millis(10)],
    );
    let mut coordinator = Coordinator::new(dom, store, settings);

    // Three passes run in total; only the first one mutates anything
    let applied = coordinator.reconcile_with_retries().await.unwrap();
    assert_eq!(applied, 1);
}

#[tokio::test]
async fn picker_session_persists_the_picked_rule() {
    let dir = tempfile::tempdir().unwrap();
    let (mut dom, node) = page_with_banner();
    dom.push_picker_event(PickerEvent::PointerEnter {
        node,
        x: 5.0,
        y: 5.0,
    });
    dom.push_picker_event(PickerEvent::Click { node });

    let mut coordinator = coordinator_for(dom, &dir);

    let outcome = coordinator.run_picker().await.unwrap().unwrap();
    assert_eq!(outcome.selector, "#banner");
    assert_eq!(outcome.url, "https://a.com/x");

    let rules = coordinator.store().get_all().await.unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].selector, "#banner");

    // Session tore down after the grace delay
    assert_eq!(coordinator.agent().dom().overlay_count(), 0);
    assert!(!coordinator.agent().dom().is_scroll_locked());
}

#[tokio::test]
async fn cancelled_picker_session_stores_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let (mut dom, _node) = page_with_banner();
    dom.push_picker_event(PickerEvent::CancelKey);

    let mut coordinator = coordinator_for(dom, &dir);

    let outcome = coordinator.run_picker().await.unwrap();
    assert!(outcome.is_none());
    assert!(coordinator.store().get_all().await.unwrap().is_empty());
    assert_eq!(coordinator.agent().dom().overlay_count(), 0);
}

#[tokio::test]
async fn non_finite_coordinates_fall_back_to_viewport_center() {
    let dir = tempfile::tempdir().unwrap();
    let mut dom = SnapshotDom::new("https://a.com/x");
    dom.set_viewport(1000.0, 600.0);
    let node = dom.append_element(None, "div", &[("id", "center")]);
    dom.set_bounding_box(node, BoundingBox::new(450.0, 250.0, 100.0, 100.0));

    let mut coordinator = coordinator_for(dom, &dir);

    let response = coordinator.hide_at_point(f64::NAN, f64::NAN).await.unwrap();
    assert!(response.is_success());

    let rules = coordinator.store().get_all().await.unwrap();
    assert_eq!(rules[0].selector, "#center");
}
