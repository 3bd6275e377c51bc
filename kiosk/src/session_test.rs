use std::time::Duration;

use super::*;
use frames::{Direction, Letter, Page};
use serde_json::json;

use crate::test_helpers::{RecordingHost, quiz_snapshot, target};

fn connected(namespace: &str) -> DisplaySession<RecordingHost> {
    let mut session = DisplaySession::new(namespace, RecordingHost::default());
    session.on_connect();
    session
}

fn control(action: &str) -> Event {
    Event::Control { action: action.into() }
}

fn later(t0: Instant, ms: u64) -> Instant {
    t0 + Duration::from_millis(ms)
}

// =============================================================
// Lifecycle
// =============================================================

#[test]
fn connect_subscribes_and_renders_spinner() {
    let mut session = DisplaySession::new("quiz", RecordingHost::default());
    assert_eq!(session.on_connect(), Event::Subscribe { namespace: "quiz".into() });
    assert_eq!(session.state(), &ContentState::Loading);
    assert_eq!(session.host().rendered, vec![Phase::Loading]);
}

#[test]
fn connected_event_records_connection_id() {
    let mut session = connected("quiz");
    let reaction = session.handle(Event::Connected { connection_id: "c-1".into() }, Instant::now());
    assert_eq!(reaction, Reaction::Connected);
    assert_eq!(session.connection_id(), Some("c-1"));
}

#[test]
fn disconnect_tears_everything_down() {
    let mut session = connected("quiz");
    session.handle(Event::Connected { connection_id: "c-1".into() }, Instant::now());
    session.handle(Event::data("quiz", json!({"questions": []})), Instant::now());
    session.targets_changed(quiz_snapshot());

    session.on_disconnect();
    assert_eq!(session.state(), &ContentState::Idle);
    assert!(session.focus().is_empty());
    assert!(session.answers().is_empty());
    assert_eq!(session.connection_id(), None);
    assert_eq!(session.host().rendered.last(), Some(&Phase::Idle));
}

#[test]
fn events_after_disconnect_are_ignored_until_resubscribe() {
    let mut session = connected("quiz");
    session.on_disconnect();
    assert_eq!(session.handle(Event::data("quiz", json!({})), Instant::now()), Reaction::Ignored);

    session.on_connect();
    assert_eq!(
        session.handle(Event::data("quiz", json!({})), Instant::now()),
        Reaction::Rendered(Phase::Ready)
    );
}

#[test]
fn switch_namespace_resubscribes() {
    let mut session = connected("quiz");
    session.handle(Event::data("quiz", json!({"q": 1})), Instant::now());
    assert_eq!(session.switch_namespace("about"), Event::Subscribe { namespace: "about".into() });
    assert_eq!(session.namespace(), "about");
    assert_eq!(session.state(), &ContentState::Loading);
    assert_eq!(session.handle(Event::data("quiz", json!({})), Instant::now()), Reaction::Ignored);
}

// =============================================================
// Content
// =============================================================

#[test]
fn quiz_ready_then_error_scenario() {
    let mut session = connected("quiz");
    let now = Instant::now();
    assert_eq!(
        session.handle(Event::data("quiz", json!({"questions": ["q1"]})), now),
        Reaction::Rendered(Phase::Ready)
    );
    assert_eq!(
        session.handle(Event::data_error("quiz", json!({"requested": "Wakanda"})), now),
        Reaction::Rendered(Phase::Errored)
    );
    assert_eq!(session.host().rendered, vec![Phase::Loading, Phase::Ready, Phase::Errored]);
}

#[test]
fn other_namespace_never_renders() {
    let mut session = connected("a");
    assert_eq!(session.handle(Event::data("b", json!({"leak": 1})), Instant::now()), Reaction::Ignored);
    assert_eq!(session.host().rendered, vec![Phase::Loading]);
}

#[test]
fn loading_after_ready_clears_stale_targets() {
    let mut session = connected("quiz");
    session.handle(Event::data("quiz", json!({})), Instant::now());
    session.targets_changed(quiz_snapshot());
    assert_eq!(session.focus().len(), 1);

    let reaction = session.handle(Event::Loading { namespace: Some("quiz".into()) }, Instant::now());
    assert_eq!(reaction, Reaction::Rendered(Phase::Loading));
    assert!(session.focus().is_empty());
    assert!(session.answers().is_empty());
}

// =============================================================
// Control
// =============================================================

#[test]
fn control_is_ignored_while_loading() {
    let mut session = connected("quiz");
    session.targets_changed(quiz_snapshot());
    assert_eq!(session.handle(control("select"), Instant::now()), Reaction::Ignored);
    assert_eq!(session.handle(control("quiz"), Instant::now()), Reaction::Ignored);
    assert!(session.host().activated.is_empty());
    assert!(session.host().navigated.is_empty());
}

#[test]
fn select_on_empty_page_is_safe() {
    let mut session = connected("about");
    session.handle(Event::data("about", json!({})), Instant::now());
    assert_eq!(
        session.handle(control("select"), Instant::now()),
        Reaction::Dispatched(Dispatch::NothingFocused)
    );
}

#[test]
fn quiz_answer_and_next_flow() {
    let mut session = connected("quiz");
    let t0 = Instant::now();
    session.handle(Event::data("quiz", json!({"questions": ["q1", "q2"]})), t0);
    session.targets_changed(quiz_snapshot());
    assert_eq!(session.host().focused, vec!["next"]);

    assert_eq!(
        session.handle(control("B"), later(t0, 0)),
        Reaction::Dispatched(Dispatch::Answered(Letter::B))
    );
    assert_eq!(session.handle(control("select"), later(t0, 40)), Reaction::Dispatched(Dispatch::Throttled));
    assert_eq!(session.handle(control("select"), later(t0, 200)), Reaction::Dispatched(Dispatch::Activated));
    assert_eq!(session.host().activated, vec!["answer-b", "next"]);
}

#[test]
fn errored_page_still_accepts_navigation() {
    let mut session = connected("invention");
    session.handle(Event::data_error("invention", json!({"requested": "Atlantis"})), Instant::now());
    assert_eq!(
        session.handle(control("about"), Instant::now()),
        Reaction::Dispatched(Dispatch::Navigated(Page::About))
    );
    assert_eq!(session.host().navigated, vec![Page::About]);
}

#[test]
fn directional_control_moves_focus() {
    let mut session = connected("invention");
    session.handle(Event::data("invention", json!({})), Instant::now());
    session.targets_changed(TargetSnapshot {
        navigable: vec![target("prev", "left right select"), target("next", "left right select")],
        answers: Vec::new(),
    });
    let reaction = session.handle(Event::control(&ControlCode::Move(Direction::Right)), Instant::now());
    assert!(matches!(reaction, Reaction::Dispatched(Dispatch::Moved(_))));
    assert_eq!(session.focus().cursor(), Some(1));
}

// =============================================================
// Coordinates and start flag
// =============================================================

#[test]
fn stable_coordinates_then_start_reset() {
    let mut session = connected("quiz");
    let now = Instant::now();
    session.handle(Event::Start { start: true }, now);
    assert!(session.start());

    let coords = Coordinates { lat: 41.9, lon: 12.5 };
    session.handle(Event::CoordinatesPending(coords), now);
    assert_eq!(session.pending(), Some(coords));

    assert_eq!(session.handle(Event::CoordinatesStable(coords), now), Reaction::Coordinates { stable: true });
    assert_eq!(session.handle(Event::Start { start: false }, now), Reaction::StartChanged(false));

    assert_eq!(session.stable(), Some(coords));
    assert_eq!(session.pending(), None);
    assert!(!session.start());
    assert_eq!(session.host().coordinates, vec![(coords, false), (coords, true)]);
    assert_eq!(session.host().starts, vec![true, false]);
}

#[test]
fn relay_error_is_ignored() {
    let mut session = connected("quiz");
    let reaction = session.handle(
        Event::Error { code: "E_UNKNOWN_KIND".into(), message: "nope".into() },
        Instant::now(),
    );
    assert_eq!(reaction, Reaction::Ignored);
    assert_eq!(session.state(), &ContentState::Loading);
}
