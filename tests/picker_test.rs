//! Picker state machine flows against the snapshot DOM.

use element_hider::agent::{PageAgent, PickerState, PickerStep, MARKER_ATTRIBUTE};
use element_hider::config::Language;
use element_hider::dom::snapshot::SnapshotDom;
use element_hider::dom::{PageDom, PickerEvent};

fn agent_for(dom: SnapshotDom) -> PageAgent<SnapshotDom> {
    PageAgent::new(dom, Language::En.messages())
}

#[tokio::test]
async fn starting_twice_leaves_one_overlay() {
    let dom = SnapshotDom::new("https://a.com/x");
    let mut agent = agent_for(dom);

    agent.start_picker().await.unwrap();
    agent.start_picker().await.unwrap();

    assert_eq!(agent.picker_state(), PickerState::Picking);
    assert_eq!(agent.dom().overlay_count(), 1);
    assert!(agent.dom().is_scroll_locked());
    assert_eq!(
        agent.dom().banner(),
        Some("Click on any element to hide it. Press Esc to cancel.")
    );
}

#[tokio::test]
async fn localized_banner_follows_the_language_setting() {
    let dom = SnapshotDom::new("https://a.com/x");
    let mut agent = PageAgent::new(dom, Language::ZhCn.messages());

    agent.start_picker().await.unwrap();
    assert_eq!(agent.dom().banner(), Some("点击任意元素进行隐藏。按 Esc 键取消。"));
}

#[tokio::test]
async fn hover_outlines_element_and_previews_selector() {
    let mut dom = SnapshotDom::new("https://a.com/x");
    let node = dom.append_element(None, "div", &[("class", "ad banner extra")]);
    let mut agent = agent_for(dom);

    agent.start_picker().await.unwrap();
    agent
        .dom_mut()
        .push_picker_event(PickerEvent::PointerEnter {
            node,
            x: 40.0,
            y: 60.0,
        });

    let step = agent.pump_picker().await.unwrap();
    assert_eq!(step, PickerStep::Continue);
    assert_eq!(agent.dom().highlighted(), Some(node));

    let tooltip = agent.dom().tooltip().unwrap();
    assert_eq!(tooltip.0, "div.ad.banner");
    assert_eq!((tooltip.1, tooltip.2), (50.0, 70.0));
}

#[tokio::test]
async fn pointer_leave_hides_the_tooltip() {
    let mut dom = SnapshotDom::new("https://a.com/x");
    let node = dom.append_element(None, "div", &[]);
    let mut agent = agent_for(dom);

    agent.start_picker().await.unwrap();
    agent
        .dom_mut()
        .push_picker_event(PickerEvent::PointerEnter {
            node,
            x: 0.0,
            y: 0.0,
        });
    agent.dom_mut().push_picker_event(PickerEvent::PointerLeave);

    agent.pump_picker().await.unwrap();
    agent.pump_picker().await.unwrap();
    assert!(agent.dom().tooltip().is_none());
}

#[tokio::test]
async fn click_hides_and_reports_the_outcome() {
    let mut dom = SnapshotDom::new("https://a.com/x");
    let node = dom.append_element(None, "div", &[("id", "promo")]);
    let mut agent = agent_for(dom);

    agent.start_picker().await.unwrap();
    agent.dom_mut().push_picker_event(PickerEvent::Click { node });

    let step = agent.pump_picker().await.unwrap();
    match step {
        PickerStep::Concluded(Some(outcome)) => {
            assert_eq!(outcome.selector, "#promo");
            assert_eq!(outcome.url, "https://a.com/x");
        }
        other => panic!("expected a concluding pick, got {:?}", other),
    }

    assert_eq!(
        agent.dom().attribute(node, MARKER_ATTRIBUTE).await.unwrap(),
        Some("true".to_string())
    );
    assert_eq!(
        agent.dom().feedback_log(),
        &[("Element hidden!".to_string(), true)]
    );
}

#[tokio::test]
async fn clicking_an_already_hidden_element_reports_failure_feedback() {
    let mut dom = SnapshotDom::new("https://a.com/x");
    let node = dom.append_element(None, "div", &[("id", "promo")]);
    let mut agent = agent_for(dom);

    agent.apply_hide(node, "#promo", "https://a.com/x").await.unwrap();
    agent.start_picker().await.unwrap();
    agent.dom_mut().push_picker_event(PickerEvent::Click { node });

    let step = agent.pump_picker().await.unwrap();
    assert_eq!(step, PickerStep::Concluded(None));
    assert_eq!(
        agent.dom().feedback_log(),
        &[("Element already hidden".to_string(), false)]
    );
}

#[tokio::test]
async fn cancel_key_stops_immediately_without_mutation() {
    let mut dom = SnapshotDom::new("https://a.com/x");
    let node = dom.append_element(None, "div", &[]);
    let mut agent = agent_for(dom);

    agent.start_picker().await.unwrap();
    agent.dom_mut().push_picker_event(PickerEvent::CancelKey);

    let step = agent.pump_picker().await.unwrap();
    assert_eq!(step, PickerStep::Cancelled);
    assert_eq!(agent.picker_state(), PickerState::Idle);
    assert_eq!(agent.dom().overlay_count(), 0);
    assert!(!agent.dom().is_scroll_locked());
    assert!(!agent.is_hidden_by_us(node).await.unwrap());
}

#[tokio::test]
async fn stop_clears_highlight_and_restores_scroll() {
    let mut dom = SnapshotDom::new("https://a.com/x");
    let node = dom.append_element(None, "div", &[]);
    let mut agent = agent_for(dom);

    agent.start_picker().await.unwrap();
    agent
        .dom_mut()
        .push_picker_event(PickerEvent::PointerEnter {
            node,
            x: 0.0,
            y: 0.0,
        });
    agent.pump_picker().await.unwrap();

    agent.stop_picker().await.unwrap();

    assert_eq!(agent.picker_state(), PickerState::Idle);
    assert_eq!(agent.dom().highlighted(), None);
    assert_eq!(agent.dom().overlay_count(), 0);
    assert!(!agent.dom().is_scroll_locked());

    // A second stop is harmless
    agent.stop_picker().await.unwrap();
}

#[tokio::test]
async fn events_while_idle_are_ignored() {
    let mut dom = SnapshotDom::new("https://a.com/x");
    let node = dom.append_element(None, "div", &[]);
    let mut agent = agent_for(dom);

    let step = agent
        .handle_picker_event(PickerEvent::Click { node })
        .await
        .unwrap();

    assert_eq!(step, PickerStep::Continue);
    assert!(!agent.is_hidden_by_us(node).await.unwrap());
    assert!(agent.dom().feedback_log().is_empty());
}
