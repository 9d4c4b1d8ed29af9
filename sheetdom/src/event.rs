use std::time::Instant;

use crate::layout::Point;

/// Distance a pointer must travel from its press location before a pan
/// begins. Shorter presses are reported as taps.
pub const DRAG_THRESHOLD: f32 = 8.0;

/// Weight of the newest sample in the smoothed velocity.
const VELOCITY_SMOOTHING: f32 = 0.3;

/// Samples further apart than this don't contribute to velocity.
const MAX_SAMPLE_GAP_SECS: f32 = 0.5;

/// Discrete phase of a continuous gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GesturePhase {
    Began,
    Changed,
    Ended,
    Cancelled,
    Failed,
}

impl GesturePhase {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GesturePhase::Ended | GesturePhase::Cancelled | GesturePhase::Failed
        )
    }
}

/// One event of a pan (drag) gesture.
///
/// `translation` is the total movement since the gesture began, `velocity`
/// is in points per second. Positive y points down.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanEvent {
    pub phase: GesturePhase,
    pub location: Point,
    pub translation: Point,
    pub velocity: Point,
    pub timestamp: Instant,
}

impl PanEvent {
    pub fn new(phase: GesturePhase, location: Point, translation_y: f32, velocity_y: f32, timestamp: Instant) -> Self {
        Self {
            phase,
            location,
            translation: Point::new(0.0, translation_y),
            velocity: Point::new(0.0, velocity_y),
            timestamp,
        }
    }
}

/// Raw pointer sample kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Down,
    Move,
    Up,
    Cancel,
}

/// Raw pointer sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    pub kind: PointerKind,
    pub position: Point,
    pub timestamp: Instant,
}

impl PointerInput {
    pub fn new(kind: PointerKind, position: Point, timestamp: Instant) -> Self {
        Self {
            kind,
            position,
            timestamp,
        }
    }

    /// Convert a terminal mouse event. One cell maps to one point; only the
    /// left button drives gestures.
    pub fn from_crossterm(event: crossterm::event::MouseEvent, timestamp: Instant) -> Option<Self> {
        use crossterm::event::{MouseButton, MouseEventKind};
        let kind = match event.kind {
            MouseEventKind::Down(MouseButton::Left) => PointerKind::Down,
            MouseEventKind::Drag(MouseButton::Left) => PointerKind::Move,
            MouseEventKind::Up(MouseButton::Left) => PointerKind::Up,
            _ => return None,
        };
        let position = Point::new(event.column as f32, event.row as f32);
        Some(Self::new(kind, position, timestamp))
    }
}

/// Output of [`PanTracker`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerGesture {
    Pan(PanEvent),
    Tap(Point),
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: Point,
    last: Point,
    last_time: Instant,
    velocity_y: f32,
    panning: bool,
}

/// Recognizes pans and taps from raw pointer samples.
#[derive(Debug, Default)]
pub struct PanTracker {
    press: Option<Press>,
}

impl PanTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_panning(&self) -> bool {
        self.press.is_some_and(|press| press.panning)
    }

    pub fn process(&mut self, input: PointerInput) -> Option<PointerGesture> {
        match input.kind {
            PointerKind::Down => {
                // A new press while one is active means we missed the release.
                let cancelled = self.cancel(input.timestamp);
                self.press = Some(Press {
                    origin: input.position,
                    last: input.position,
                    last_time: input.timestamp,
                    velocity_y: 0.0,
                    panning: false,
                });
                cancelled
            }
            PointerKind::Move => {
                let press = self.press.as_mut()?;
                track_velocity(press, input);
                let translation_y = input.position.y - press.origin.y;
                if press.panning {
                    return Some(PointerGesture::Pan(PanEvent::new(
                        GesturePhase::Changed,
                        input.position,
                        translation_y,
                        press.velocity_y,
                        input.timestamp,
                    )));
                }
                if press.origin.distance_to(input.position) < DRAG_THRESHOLD {
                    return None;
                }
                press.panning = true;
                log::trace!("pan began at {:?}", press.origin);
                Some(PointerGesture::Pan(PanEvent::new(
                    GesturePhase::Began,
                    press.origin,
                    translation_y,
                    press.velocity_y,
                    input.timestamp,
                )))
            }
            PointerKind::Up => {
                let mut press = self.press.take()?;
                if !press.panning {
                    return Some(PointerGesture::Tap(press.origin));
                }
                track_velocity(&mut press, input);
                Some(PointerGesture::Pan(PanEvent::new(
                    GesturePhase::Ended,
                    input.position,
                    input.position.y - press.origin.y,
                    press.velocity_y,
                    input.timestamp,
                )))
            }
            PointerKind::Cancel => self.cancel(input.timestamp),
        }
    }

    fn cancel(&mut self, timestamp: Instant) -> Option<PointerGesture> {
        let press = self.press.take()?;
        if !press.panning {
            return None;
        }
        Some(PointerGesture::Pan(PanEvent::new(
            GesturePhase::Cancelled,
            press.last,
            press.last.y - press.origin.y,
            press.velocity_y,
            timestamp,
        )))
    }
}

fn track_velocity(press: &mut Press, input: PointerInput) {
    let dt = input
        .timestamp
        .saturating_duration_since(press.last_time)
        .as_secs_f32();
    if dt > 0.0 && dt < MAX_SAMPLE_GAP_SECS {
        let instant = (input.position.y - press.last.y) / dt;
        press.velocity_y =
            press.velocity_y * (1.0 - VELOCITY_SMOOTHING) + instant * VELOCITY_SMOOTHING;
    } else if dt >= MAX_SAMPLE_GAP_SECS {
        press.velocity_y = 0.0;
    }
    press.last = input.position;
    press.last_time = input.timestamp;
}
