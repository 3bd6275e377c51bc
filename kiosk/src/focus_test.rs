use super::*;
use crate::test_helpers::{RecordingHost, target};

fn engine_with(targets: Vec<FocusTarget<&'static str>>) -> (FocusEngine<&'static str>, RecordingHost) {
    let mut host = RecordingHost::default();
    let mut engine = FocusEngine::new();
    engine.rebuild(targets, &mut host);
    (engine, host)
}

// =============================================================
// Rebuild
// =============================================================

#[test]
fn rebuild_focuses_first_target() {
    let (engine, host) = engine_with(vec![target("a", "right"), target("b", "right")]);
    assert_eq!(engine.cursor(), Some(0));
    assert_eq!(host.focused, vec!["a"]);
}

#[test]
fn rebuild_with_empty_sequence_deactivates_cursor() {
    let (mut engine, mut host) = engine_with(vec![target("a", "right")]);
    engine.rebuild(Vec::new(), &mut host);
    assert_eq!(engine.cursor(), None);
    assert!(engine.current().is_none());
    assert_eq!(host.focused, vec!["a"]);
}

#[test]
fn rebuild_resets_cursor_even_when_moved() {
    let (mut engine, mut host) = engine_with(vec![target("a", "right"), target("b", "right")]);
    engine.move_focus(Direction::Right, &mut host);
    assert_eq!(engine.cursor(), Some(1));

    engine.rebuild(vec![target("x", "down"), target("y", "down")], &mut host);
    assert_eq!(engine.cursor(), Some(0));
    assert_eq!(engine.current().map(|t| t.element), Some("x"));
    assert_eq!(engine.len(), 2);
}

#[test]
fn clear_drops_targets_without_focusing() {
    let (mut engine, host) = engine_with(vec![target("a", "right")]);
    engine.clear();
    assert!(engine.is_empty());
    assert_eq!(engine.cursor(), None);
    assert_eq!(host.focused, vec!["a"]);
}

// =============================================================
// Traversal
// =============================================================

#[test]
fn move_on_empty_sequence_is_noop() {
    let mut host = RecordingHost::default();
    let mut engine: FocusEngine<&'static str> = FocusEngine::new();
    assert_eq!(engine.move_focus(Direction::Down, &mut host), Step::Empty);
    assert!(host.focused.is_empty());
}

#[test]
fn move_right_advances_and_focuses() {
    let (mut engine, mut host) = engine_with(vec![target("a", "right"), target("b", "right")]);
    assert_eq!(engine.move_focus(Direction::Right, &mut host), Step::Moved { from: 0, to: 1 });
    assert_eq!(host.focused, vec!["a", "b"]);
}

#[test]
fn move_left_wraps_to_last() {
    let (mut engine, mut host) = engine_with(vec![target("a", "left"), target("b", "left"), target("c", "left")]);
    assert_eq!(engine.move_focus(Direction::Left, &mut host), Step::Moved { from: 0, to: 2 });
}

#[test]
fn move_is_blocked_when_current_disallows_direction() {
    let (mut engine, mut host) = engine_with(vec![target("carousel-prev", "left right select"), target("b", "down")]);
    assert_eq!(engine.move_focus(Direction::Down, &mut host), Step::Blocked);
    assert_eq!(engine.cursor(), Some(0));
}

#[test]
fn move_skips_candidates_that_refuse_entry() {
    let (mut engine, mut host) = engine_with(vec![
        target("a", "down"),
        target("b", "left right"),
        target("c", "down"),
    ]);
    assert_eq!(engine.move_focus(Direction::Down, &mut host), Step::Moved { from: 0, to: 2 });
    assert_eq!(host.focused.last(), Some(&"c"));
}

#[test]
fn move_is_unreachable_when_no_other_target_accepts() {
    let (mut engine, mut host) = engine_with(vec![target("a", "up"), target("b", "select"), target("c", "left")]);
    assert_eq!(engine.move_focus(Direction::Up, &mut host), Step::Unreachable);
    assert_eq!(engine.cursor(), Some(0));
    assert_eq!(host.focused, vec!["a"]);
}

#[test]
fn single_target_never_moves() {
    let (mut engine, mut host) = engine_with(vec![target("only", "up down left right")]);
    for direction in Direction::ALL {
        assert_eq!(engine.move_focus(direction, &mut host), Step::Unreachable);
    }
    assert_eq!(engine.cursor(), Some(0));
}

#[test]
fn full_rotation_returns_to_start() {
    let names = ["a", "b", "c", "d", "e"];
    let (mut engine, mut host) = engine_with(names.iter().map(|&n| target(n, "right")).collect());
    engine.move_focus(Direction::Right, &mut host);
    engine.move_focus(Direction::Right, &mut host);
    let start = engine.cursor();

    for _ in 0..names.len() {
        assert!(matches!(engine.move_focus(Direction::Right, &mut host), Step::Moved { .. }));
    }
    assert_eq!(engine.cursor(), start);
}

#[test]
fn step_does_not_move_cursor() {
    let (engine, _host) = engine_with(vec![target("a", "down"), target("b", "down")]);
    assert_eq!(engine.step(Direction::Down), Step::Moved { from: 0, to: 1 });
    assert_eq!(engine.cursor(), Some(0));
}

#[test]
fn up_and_down_walk_opposite_ways() {
    let (mut engine, mut host) = engine_with(vec![
        target("a", "up down"),
        target("b", "up down"),
        target("c", "up down"),
    ]);
    engine.move_focus(Direction::Down, &mut host);
    engine.move_focus(Direction::Down, &mut host);
    assert_eq!(engine.cursor(), Some(2));
    engine.move_focus(Direction::Up, &mut host);
    assert_eq!(engine.cursor(), Some(1));
    engine.move_focus(Direction::Down, &mut host);
    engine.move_focus(Direction::Down, &mut host);
    assert_eq!(engine.cursor(), Some(0));
}
