use std::time::{Duration, Instant};

use crossterm::event::{KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use sheetdom::{
    GesturePhase, HitMap, PanEvent, PanTracker, Point, PointerGesture, PointerInput, PointerKind,
    Rect,
};

fn input(kind: PointerKind, x: f32, y: f32, at: Instant) -> PointerInput {
    PointerInput::new(kind, Point::new(x, y), at)
}

fn pan(gesture: Option<PointerGesture>) -> PanEvent {
    match gesture {
        Some(PointerGesture::Pan(event)) => event,
        other => panic!("expected pan, got {:?}", other),
    }
}

// =============================================================================
// PanTracker
// =============================================================================

#[test]
fn test_short_press_is_a_tap() {
    let t0 = Instant::now();
    let mut tracker = PanTracker::new();
    assert_eq!(tracker.process(input(PointerKind::Down, 5.0, 5.0, t0)), None);
    assert_eq!(
        tracker.process(input(PointerKind::Move, 7.0, 8.0, t0 + Duration::from_millis(10))),
        None
    );
    assert!(!tracker.is_panning());
    assert_eq!(
        tracker.process(input(PointerKind::Up, 7.0, 8.0, t0 + Duration::from_millis(20))),
        Some(PointerGesture::Tap(Point::new(5.0, 5.0)))
    );
}

#[test]
fn test_pan_lifecycle() {
    let t0 = Instant::now();
    let mut tracker = PanTracker::new();
    tracker.process(input(PointerKind::Down, 0.0, 0.0, t0));

    let began = pan(tracker.process(input(
        PointerKind::Move,
        0.0,
        10.0,
        t0 + Duration::from_millis(100),
    )));
    assert_eq!(began.phase, GesturePhase::Began);
    assert_eq!(began.location, Point::ZERO);
    assert_eq!(began.translation.y, 10.0);
    assert!(tracker.is_panning());

    let changed = pan(tracker.process(input(
        PointerKind::Move,
        0.0,
        15.0,
        t0 + Duration::from_millis(150),
    )));
    assert_eq!(changed.phase, GesturePhase::Changed);
    assert_eq!(changed.translation.y, 15.0);

    let ended = pan(tracker.process(input(
        PointerKind::Up,
        0.0,
        20.0,
        t0 + Duration::from_millis(200),
    )));
    assert_eq!(ended.phase, GesturePhase::Ended);
    assert!(ended.phase.is_terminal());
    assert_eq!(ended.translation.y, 20.0);
    assert!(ended.velocity.y > 0.0);
    assert!(!tracker.is_panning());
}

#[test]
fn test_upward_pan_has_negative_velocity() {
    let t0 = Instant::now();
    let mut tracker = PanTracker::new();
    tracker.process(input(PointerKind::Down, 0.0, 100.0, t0));
    tracker.process(input(PointerKind::Move, 0.0, 80.0, t0 + Duration::from_millis(50)));
    let ended = pan(tracker.process(input(
        PointerKind::Up,
        0.0,
        60.0,
        t0 + Duration::from_millis(100),
    )));
    assert!(ended.translation.y < 0.0);
    assert!(ended.velocity.y < 0.0);
}

#[test]
fn test_cancel_reports_cancelled_pan() {
    let t0 = Instant::now();
    let mut tracker = PanTracker::new();
    tracker.process(input(PointerKind::Down, 0.0, 0.0, t0));
    tracker.process(input(PointerKind::Move, 0.0, 30.0, t0 + Duration::from_millis(50)));

    let cancelled = pan(tracker.process(input(
        PointerKind::Cancel,
        0.0,
        0.0,
        t0 + Duration::from_millis(60),
    )));
    assert_eq!(cancelled.phase, GesturePhase::Cancelled);
    assert_eq!(cancelled.translation.y, 30.0);
}

#[test]
fn test_cancelled_tap_reports_nothing() {
    let t0 = Instant::now();
    let mut tracker = PanTracker::new();
    tracker.process(input(PointerKind::Down, 0.0, 0.0, t0));
    assert_eq!(tracker.process(input(PointerKind::Cancel, 0.0, 0.0, t0)), None);
}

#[test]
fn test_moves_without_press_are_ignored() {
    let mut tracker = PanTracker::new();
    assert_eq!(
        tracker.process(input(PointerKind::Move, 0.0, 50.0, Instant::now())),
        None
    );
    assert_eq!(
        tracker.process(input(PointerKind::Up, 0.0, 50.0, Instant::now())),
        None
    );
}

#[test]
fn test_crossterm_left_button_maps_to_pointer() {
    let now = Instant::now();
    let event = MouseEvent {
        kind: MouseEventKind::Drag(MouseButton::Left),
        column: 12,
        row: 30,
        modifiers: KeyModifiers::NONE,
    };
    let input = PointerInput::from_crossterm(event, now).unwrap();
    assert_eq!(input.kind, PointerKind::Move);
    assert_eq!(input.position, Point::new(12.0, 30.0));

    let right = MouseEvent {
        kind: MouseEventKind::Down(MouseButton::Right),
        column: 0,
        row: 0,
        modifiers: KeyModifiers::NONE,
    };
    assert!(PointerInput::from_crossterm(right, now).is_none());
}

// =============================================================================
// HitMap
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Backdrop,
    Card,
}

#[test]
fn test_hit_map_prefers_topmost_layer() {
    let mut map = HitMap::new();
    map.push(Layer::Backdrop, Rect::new(0.0, 0.0, 100.0, 100.0));
    map.push(Layer::Card, Rect::new(0.0, 50.0, 100.0, 50.0));

    assert_eq!(map.hit_test(Point::new(10.0, 10.0)), Some(Layer::Backdrop));
    assert_eq!(map.hit_test(Point::new(10.0, 60.0)), Some(Layer::Card));
    assert_eq!(map.hit_test(Point::new(10.0, 200.0)), None);
    assert!(map.contains(Layer::Backdrop, Point::new(10.0, 60.0)));
    assert_eq!(map.rect(Layer::Card), Some(Rect::new(0.0, 50.0, 100.0, 50.0)));
}

#[test]
fn test_hit_map_skips_empty_rects() {
    let mut map = HitMap::new();
    map.push(Layer::Card, Rect::ZERO);
    assert_eq!(map.rect(Layer::Card), None);
    map.push(Layer::Backdrop, Rect::from_size(10.0, 10.0));
    map.clear();
    assert_eq!(map.hit_test(Point::new(1.0, 1.0)), None);
}
