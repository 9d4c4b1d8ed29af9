//! Vertical scroll region model.
//!
//! Offsets follow the usual convention: `content_offset` is the distance the
//! content has moved up, and the region is "at its top edge" when
//! `content_offset == -content_inset.top`. Every mutation publishes a fresh
//! [`ScrollMetrics`] snapshot to subscribers, but only when something
//! observable actually changed.

use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use tokio::sync::watch;

use crate::layout::{Insets, Point, Rect, Size};

/// Offsets closer than this to an edge count as being on the edge.
pub const POINT_PRECISION: f32 = 0.5;

/// Rubber-band resistance right at the edge.
const RUBBER_BAND_START: f32 = 0.55;
/// Rubber-band resistance at maximum stretch.
const RUBBER_BAND_END: f32 = 0.10;
/// Maximum overscroll as a fraction of the visible height.
const MAX_OVERSCROLL: f32 = 0.3;
/// Momentum friction, in points per second squared.
const DECELERATION: f32 = 1500.0;
/// Momentum stops below this speed, in points per second.
const VELOCITY_THRESHOLD: f32 = 10.0;
/// Exponential rate at which an overscrolled region returns to its edge.
const BOUNCE_BACK_RATE: f32 = 18.0;

static NEXT_REGION_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a scroll region, used for logging and lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(u64);

impl RegionId {
    fn next() -> Self {
        Self(NEXT_REGION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "region#{}", self.0)
    }
}

/// Observable snapshot of a scroll region.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub frame: Rect,
    pub content_size: Size,
    pub content_offset: f32,
    pub content_inset: Insets,
}

impl ScrollMetrics {
    /// Offset measured from the top edge of the scrollable area.
    pub fn relative_offset(&self) -> f32 {
        self.content_offset + self.content_inset.top
    }

    /// Height of the area content scrolls through.
    pub fn visible_height(&self) -> f32 {
        (self.frame.height - self.content_inset.vertical_total()).max(0.0)
    }

    pub fn content_exceeds_bounds(&self) -> bool {
        self.content_size.height - self.visible_height() > POINT_PRECISION
    }

    /// Sitting on the top edge, or rubber-banding past it.
    pub fn is_at_top(&self) -> bool {
        let offset = self.relative_offset();
        offset < 0.0 || offset.abs() < POINT_PRECISION
    }

    /// How far the content is pulled below its natural top edge.
    pub fn bounce_overshoot(&self) -> f32 {
        (-self.relative_offset()).max(0.0)
    }

    fn min_offset(&self) -> f32 {
        -self.content_inset.top
    }

    fn max_offset(&self) -> f32 {
        let content_height = self.content_size.height + self.content_inset.bottom;
        (content_height - self.frame.height).max(self.min_offset())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Motion {
    Idle,
    Dragging,
    Decelerating { velocity: f32, last: Instant },
    BouncingBack { last: Instant },
}

/// A scrollable region with rubber-banding and momentum.
#[derive(Debug)]
pub struct ScrollRegion {
    id: RegionId,
    metrics: ScrollMetrics,
    /// Whether the region rubber-bands past its edges.
    pub bounces: bool,
    /// Whether the region rubber-bands even when content fits.
    pub always_bounce_vertical: bool,
    pub scroll_enabled: bool,
    pub shows_vertical_indicator: bool,
    pub indicator_insets: Insets,
    motion: Motion,
    publisher: watch::Sender<ScrollMetrics>,
}

impl ScrollRegion {
    pub fn new(frame: Rect) -> Self {
        let metrics = ScrollMetrics {
            frame,
            ..Default::default()
        };
        let (publisher, _) = watch::channel(metrics);
        Self {
            id: RegionId::next(),
            metrics,
            bounces: true,
            always_bounce_vertical: false,
            scroll_enabled: true,
            shows_vertical_indicator: true,
            indicator_insets: Insets::ZERO,
            motion: Motion::Idle,
            publisher,
        }
    }

    pub fn id(&self) -> RegionId {
        self.id
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn frame(&self) -> Rect {
        self.metrics.frame
    }

    pub fn content_size(&self) -> Size {
        self.metrics.content_size
    }

    pub fn content_offset(&self) -> f32 {
        self.metrics.content_offset
    }

    pub fn content_inset(&self) -> Insets {
        self.metrics.content_inset
    }

    pub fn relative_offset(&self) -> f32 {
        self.metrics.relative_offset()
    }

    pub fn is_at_top(&self) -> bool {
        self.metrics.is_at_top()
    }

    pub fn content_exceeds_bounds(&self) -> bool {
        self.metrics.content_exceeds_bounds()
    }

    pub fn is_tracking(&self) -> bool {
        self.motion == Motion::Dragging
    }

    pub fn is_decelerating(&self) -> bool {
        matches!(
            self.motion,
            Motion::Decelerating { .. } | Motion::BouncingBack { .. }
        )
    }

    /// Whether `point` (in container coordinates) lands on actual content
    /// rather than on inset space.
    pub fn is_point_in_content(&self, point: Point) -> bool {
        if !self.metrics.frame.contains(point) {
            return false;
        }
        let content_top = self.metrics.frame.y - self.metrics.content_offset;
        let content = Rect::new(
            self.metrics.frame.x,
            content_top,
            self.metrics.content_size.width.max(self.metrics.frame.width),
            self.metrics.content_size.height,
        );
        content.contains(point)
    }

    pub fn subscribe(&self) -> watch::Receiver<ScrollMetrics> {
        self.publisher.subscribe()
    }

    pub fn set_frame(&mut self, frame: Rect) {
        self.metrics.frame = frame;
        self.publish();
    }

    pub fn set_content_size(&mut self, size: Size) {
        self.metrics.content_size = size;
        self.publish();
    }

    pub fn set_content_height(&mut self, height: f32) {
        self.metrics.content_size.height = height.max(0.0);
        self.publish();
    }

    /// Change the top inset while keeping the content visually anchored if
    /// it was resting on its top edge.
    pub fn set_content_inset(&mut self, inset: Insets) {
        if self.metrics.content_inset == inset {
            return;
        }
        let was_at_top = self.motion == Motion::Idle
            && self.metrics.relative_offset().abs() < POINT_PRECISION;
        self.metrics.content_inset = inset;
        if was_at_top {
            self.metrics.content_offset = -inset.top;
        }
        self.publish();
    }

    pub fn set_content_offset(&mut self, offset: f32) {
        self.metrics.content_offset = offset;
        self.publish();
    }

    /// Snap the offset to the top edge of the scrollable area.
    pub fn set_at_top(&mut self) {
        self.motion = Motion::Idle;
        self.set_content_offset(self.metrics.min_offset());
    }

    /// Immediately halt any motion and clamp the offset into the scrollable
    /// range. Returns the change in offset caused by clamping.
    pub fn stop_vertical_scrolling(&mut self) -> f32 {
        if self.motion != Motion::Dragging {
            self.motion = Motion::Idle;
        }
        let before = self.metrics.content_offset;
        let clamped = before.clamp(self.metrics.min_offset(), self.metrics.max_offset());
        self.set_content_offset(clamped);
        clamped - before
    }

    pub fn begin_drag(&mut self) {
        self.motion = Motion::Dragging;
    }

    /// Apply a finger movement of `delta` points (positive = finger moved
    /// down, which moves the content toward its top edge).
    pub fn drag_by(&mut self, delta: f32) {
        if !self.scroll_enabled || delta == 0.0 {
            return;
        }
        let can_move = self.content_exceeds_bounds() || self.always_bounce_vertical;
        if !can_move {
            return;
        }

        let min = self.metrics.min_offset();
        let max = self.metrics.max_offset();
        let current = self.metrics.content_offset;
        let proposed_delta = -delta;

        let proposed = current + proposed_delta;
        let next = if !self.bounces {
            proposed.clamp(min, max)
        } else {
            let limit = self.metrics.frame.height.max(1.0) * MAX_OVERSCROLL;
            if proposed < min && proposed_delta < 0.0 {
                let edge = current.min(min);
                let excess = edge - proposed;
                let resistance = rubber_band_resistance(min - edge, limit);
                (edge - excess * resistance).max(min - limit)
            } else if proposed > max && proposed_delta > 0.0 {
                let edge = current.max(max);
                let excess = proposed - edge;
                let resistance = rubber_band_resistance(edge - max, limit);
                (edge + excess * resistance).min(max + limit)
            } else {
                proposed.clamp(min - limit, max + limit)
            }
        };
        self.set_content_offset(next);
    }

    /// Lift the finger. `velocity` is the finger velocity in points per
    /// second (positive = moving down).
    pub fn end_drag(&mut self, velocity: f32, now: Instant) {
        let min = self.metrics.min_offset();
        let max = self.metrics.max_offset();
        let offset = self.metrics.content_offset;
        self.motion = if offset < min - POINT_PRECISION || offset > max + POINT_PRECISION {
            Motion::BouncingBack { last: now }
        } else if velocity.abs() > VELOCITY_THRESHOLD && self.content_exceeds_bounds() {
            Motion::Decelerating {
                velocity: -velocity,
                last: now,
            }
        } else {
            Motion::Idle
        };
    }

    /// Advance momentum and bounce-back. Returns true while still moving.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.motion {
            Motion::Idle | Motion::Dragging => false,
            Motion::Decelerating { velocity, last } => {
                let dt = now.saturating_duration_since(last).as_secs_f32();
                let min = self.metrics.min_offset();
                let max = self.metrics.max_offset();
                let next = self.metrics.content_offset + velocity * dt;
                let decel = DECELERATION * dt;
                let velocity = if velocity > 0.0 {
                    (velocity - decel).max(0.0)
                } else {
                    (velocity + decel).min(0.0)
                };

                if next < min || next > max {
                    self.motion = Motion::Idle;
                    self.set_content_offset(next.clamp(min, max));
                    return false;
                }
                self.set_content_offset(next);
                if velocity.abs() < VELOCITY_THRESHOLD {
                    self.motion = Motion::Idle;
                    return false;
                }
                self.motion = Motion::Decelerating { velocity, last: now };
                true
            }
            Motion::BouncingBack { last } => {
                let dt = now.saturating_duration_since(last).as_secs_f32();
                let min = self.metrics.min_offset();
                let max = self.metrics.max_offset();
                let offset = self.metrics.content_offset;
                let edge = offset.clamp(min, max);
                let remaining = (offset - edge) * (-BOUNCE_BACK_RATE * dt).exp();
                if remaining.abs() < POINT_PRECISION {
                    self.motion = Motion::Idle;
                    self.set_content_offset(edge);
                    return false;
                }
                self.set_content_offset(edge + remaining);
                self.motion = Motion::BouncingBack { last: now };
                true
            }
        }
    }

    fn publish(&self) {
        let metrics = self.metrics;
        self.publisher.send_if_modified(|current| {
            if *current == metrics {
                false
            } else {
                *current = metrics;
                true
            }
        });
    }
}

/// Resistance applied to movement past an edge, given how far past the
/// edge the content already is.
fn rubber_band_resistance(overshoot: f32, limit: f32) -> f32 {
    let stretch = (overshoot / limit).min(1.0);
    RUBBER_BAND_START - stretch * (RUBBER_BAND_START - RUBBER_BAND_END)
}

/// Shared handle to a scroll region.
///
/// Regions are shared between the content that owns them and the panel
/// that coordinates with them. Everything runs on one thread, so the handle
/// is a plain `Rc<RefCell<_>>`.
#[derive(Debug, Clone)]
pub struct ScrollHandle(Rc<RefCell<ScrollRegion>>);

impl ScrollHandle {
    pub fn new(region: ScrollRegion) -> Self {
        Self(Rc::new(RefCell::new(region)))
    }

    pub fn with_frame(frame: Rect) -> Self {
        Self::new(ScrollRegion::new(frame))
    }

    pub fn id(&self) -> RegionId {
        self.0.borrow().id()
    }

    pub fn borrow(&self) -> Ref<'_, ScrollRegion> {
        self.0.borrow()
    }

    pub fn borrow_mut(&self) -> RefMut<'_, ScrollRegion> {
        self.0.borrow_mut()
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.0.borrow().metrics()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScrollMetrics> {
        self.0.borrow().subscribe()
    }

    /// Same underlying region.
    pub fn ptr_eq(&self, other: &ScrollHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
