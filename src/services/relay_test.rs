use super::*;
use kiosk::Phase;
use serde_json::json;

struct Peer {
    id: Uuid,
    rx: mpsc::Receiver<Event>,
}

impl Peer {
    fn drain(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}

fn join(relay: &mut Relay, role: Role) -> Peer {
    let id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel(16);
    relay.connect(id, role, tx);
    Peer { id, rx }
}

fn subscribed(relay: &mut Relay, namespace: &str) -> Peer {
    let mut peer = join(relay, Role::Display);
    relay.handle(peer.id, Event::Subscribe { namespace: namespace.into() });
    peer.drain();
    peer
}

#[test]
fn connect_greets_with_connection_id() {
    let mut relay = Relay::new();
    let id = Uuid::new_v4();
    let (tx, _rx) = mpsc::channel(1);
    assert_eq!(relay.connect(id, Role::Display, tx), Event::Connected { connection_id: id.to_string() });
}

#[test]
fn subscribe_pulls_from_producers() {
    let mut relay = Relay::new();
    let mut producer = join(&mut relay, Role::Producer);
    let display = join(&mut relay, Role::Display);

    relay.handle(display.id, Event::Subscribe { namespace: "quiz".into() });
    assert_eq!(producer.drain(), vec![Event::RequestData { namespace: "quiz".into() }]);
    assert_eq!(relay.registry().namespace_of(display.id), Some("quiz"));
}

#[test]
fn quiz_ready_then_error_scenario() {
    let mut relay = Relay::new();
    let producer = join(&mut relay, Role::Producer);
    let mut display = subscribed(&mut relay, "quiz");

    let ready = Event::data("quiz", json!({"questions": ["q1"]}));
    relay.handle(producer.id, ready.clone());
    assert_eq!(display.drain(), vec![ready]);
    assert_eq!(relay.status()[0].phase, Phase::Ready);

    let missing = Event::data_error("quiz", json!({"requested": "Wakanda"}));
    relay.handle(producer.id, missing.clone());
    assert_eq!(display.drain(), vec![missing]);
    assert_eq!(relay.status()[0].phase, Phase::Errored);
}

#[test]
fn namespaced_data_stays_in_its_group() {
    let mut relay = Relay::new();
    let producer = join(&mut relay, Role::Producer);
    let mut a = subscribed(&mut relay, "a");
    let mut b = subscribed(&mut relay, "b");

    relay.handle(producer.id, Event::data("a", json!({})));
    assert_eq!(a.drain().len(), 1);
    assert!(b.drain().is_empty());
}

#[test]
fn namespaceless_data_is_broadcast_to_displays() {
    let mut relay = Relay::new();
    let producer = join(&mut relay, Role::Producer);
    let mut a = subscribed(&mut relay, "a");
    let mut idle = join(&mut relay, Role::Display);

    let event = Event::Data { namespace: None, content: frames::Content::Payload(json!({"x": 1})) };
    relay.handle(producer.id, event.clone());
    assert_eq!(a.drain(), vec![event.clone()]);
    assert_eq!(idle.drain(), vec![event]);
}

#[test]
fn loading_invalidates_ready_namespace() {
    let mut relay = Relay::new();
    let producer = join(&mut relay, Role::Producer);
    let mut display = subscribed(&mut relay, "quiz");
    relay.handle(producer.id, Event::data("quiz", json!({})));
    relay.handle(producer.id, Event::Loading { namespace: Some("quiz".into()) });

    let seen = display.drain();
    assert!(matches!(seen.last(), Some(Event::Loading { .. })));
    assert_eq!(relay.status()[0].phase, Phase::Loading);
}

#[test]
fn display_request_data_marks_loading_without_moving() {
    let mut relay = Relay::new();
    let mut producer = join(&mut relay, Role::Producer);
    let display = subscribed(&mut relay, "quiz");
    relay.handle(producer.id, Event::data("quiz", json!({})));
    producer.drain();
    relay.handle(display.id, Event::RequestData { namespace: "about".into() });
    assert_eq!(producer.drain(), vec![Event::RequestData { namespace: "about".into() }]);
    assert_eq!(relay.registry().namespace_of(display.id), Some("quiz"));
}

#[test]
fn control_reaches_displays_not_sender() {
    let mut relay = Relay::new();
    let mut controller = join(&mut relay, Role::Producer);
    let mut display = subscribed(&mut relay, "quiz");

    relay.handle(controller.id, Event::Control { action: "select".into() });
    assert_eq!(display.drain(), vec![Event::Control { action: "select".into() }]);
    assert!(controller.drain().is_empty());
}

#[test]
fn pending_coordinates_reach_everyone_else() {
    let mut relay = Relay::new();
    let controller = join(&mut relay, Role::Producer);
    let mut other_producer = join(&mut relay, Role::Producer);
    let mut display = subscribed(&mut relay, "quiz");

    let pending = Event::CoordinatesPending(Coordinates { lat: 10.0, lon: 20.0 });
    relay.handle(controller.id, pending.clone());
    assert_eq!(display.drain(), vec![pending.clone()]);
    assert_eq!(other_producer.drain(), vec![pending]);
}

#[test]
fn stable_coordinates_are_followed_by_start_reset() {
    let mut relay = Relay::new();
    let controller = join(&mut relay, Role::Producer);
    let mut a = subscribed(&mut relay, "a");
    let mut b = subscribed(&mut relay, "b");

    relay.handle(controller.id, Event::Start { start: true });
    assert!(relay.summary().start);
    a.drain();
    b.drain();

    let coords = Coordinates { lat: 48.8, lon: 2.3 };
    relay.handle(controller.id, Event::CoordinatesStable(coords));
    let expected = vec![Event::CoordinatesStable(coords), Event::Start { start: false }];
    assert_eq!(a.drain(), expected);
    assert_eq!(b.drain(), expected);
    assert!(!relay.summary().start);
    assert_eq!(relay.summary().last_stable, Some(coords));
}

#[test]
fn ingest_stable_has_no_sender_to_exclude() {
    let mut relay = Relay::new();
    let mut controller = join(&mut relay, Role::Producer);
    let delivery = relay.stable(Coordinates { lat: 0.0, lon: 0.0 }, None);
    assert_eq!(delivery.delivered, 1);
    assert_eq!(controller.drain().len(), 2);
}

#[test]
fn disconnect_removes_from_group_and_is_idempotent() {
    let mut relay = Relay::new();
    let producer = join(&mut relay, Role::Producer);
    let display = subscribed(&mut relay, "quiz");
    relay.handle(producer.id, Event::data("quiz", json!({})));

    relay.disconnect(display.id);
    relay.disconnect(display.id);
    assert_eq!(relay.registry().group_size("quiz"), 0);
    assert!(relay.status().is_empty());
}

#[test]
fn namespace_state_survives_producer_but_not_last_display() {
    let mut relay = Relay::new();
    let producer = join(&mut relay, Role::Producer);
    let first = subscribed(&mut relay, "quiz");
    let second = subscribed(&mut relay, "quiz");
    relay.handle(producer.id, Event::data("quiz", json!({})));

    relay.disconnect(producer.id);
    relay.disconnect(first.id);
    assert_eq!(relay.status()[0].phase, Phase::Ready);
    assert_eq!(relay.status()[0].subscribers, 1);

    relay.disconnect(second.id);
    assert!(relay.status().is_empty());
}

#[test]
fn moving_away_drops_the_emptied_namespace() {
    let mut relay = Relay::new();
    let display = subscribed(&mut relay, "quiz");
    relay.handle(display.id, Event::Subscribe { namespace: "about".into() });

    let tracked: Vec<String> = relay.status().into_iter().map(|status| status.namespace).collect();
    assert_eq!(tracked, vec!["about".to_owned()]);
}

#[test]
fn request_data_for_unwatched_namespaces_is_not_tracked() {
    let mut relay = Relay::new();
    let mut producer = join(&mut relay, Role::Producer);
    let stray = join(&mut relay, Role::Display);

    for i in 0..100 {
        relay.handle(stray.id, Event::RequestData { namespace: format!("junk-{i}") });
    }
    assert_eq!(producer.drain().len(), 100);
    assert!(relay.status().is_empty());

    relay.disconnect(stray.id);
    assert!(relay.status().is_empty());
}

#[test]
fn relay_only_kinds_are_bounced_to_sender() {
    let mut relay = Relay::new();
    let display = join(&mut relay, Role::Display);
    let replies = relay.handle(display.id, Event::Connected { connection_id: "spoof".into() });
    assert!(matches!(replies.as_slice(), [Event::Error { code, .. }] if code == "E_UNEXPECTED_KIND"));
}
