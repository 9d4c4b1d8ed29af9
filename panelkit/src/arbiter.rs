//! Decides which gesture owns a drag.
//!
//! Three things can claim a vertical drag inside a panel: the content's own
//! scroll region, the panel's outer scroll container, or drag-to-dismiss.
//! The decision is made once, when the drag begins.

use sheetdom::ScrollMetrics;

/// Scroll state of a region under the touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionState {
    /// Content is taller than the visible area.
    pub scrollable: bool,
    /// Resting on, or bouncing past, the top edge.
    pub at_top: bool,
}

impl RegionState {
    pub fn new(scrollable: bool, at_top: bool) -> Self {
        Self { scrollable, at_top }
    }

    pub fn from_metrics(metrics: &ScrollMetrics) -> Self {
        Self {
            scrollable: metrics.content_exceeds_bounds(),
            at_top: metrics.is_at_top(),
        }
    }

    fn scrolls_on_its_own(&self) -> bool {
        self.scrollable && !self.at_top
    }
}

/// Everything the arbiter needs to know about a touch at gesture begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TouchContext {
    pub can_be_dismissed: bool,
    pub in_header: bool,
    /// Set when the touch landed inside the content's scroll region.
    pub inner: Option<RegionState>,
    /// Set when the touch landed inside the outer scroll container.
    pub outer: Option<RegionState>,
}

/// Which scroll region a drag-to-dismiss session is tied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScrollOwner {
    Outer,
    Inner,
}

/// Outcome of arbitration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Claim {
    /// No panel gesture may begin.
    Denied,
    InnerScroll,
    OuterScroll,
    /// The whole panel follows the finger. Both regions are halted and the
    /// owning one is clamped to its top edge the moment this is granted.
    DragToDismiss { owner: ScrollOwner },
}

/// Gesture recognizers competing for a touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recognizer {
    DragToDismiss,
    OuterScroll,
    InnerScroll,
}

impl From<ScrollOwner> for Recognizer {
    fn from(owner: ScrollOwner) -> Self {
        match owner {
            ScrollOwner::Outer => Recognizer::OuterScroll,
            ScrollOwner::Inner => Recognizer::InnerScroll,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GestureArbiter;

impl GestureArbiter {
    pub fn new() -> Self {
        Self
    }

    /// Decide who owns a drag that begins with the given touch.
    pub fn decide(&self, touch: &TouchContext) -> Claim {
        let claim = self.evaluate(touch);
        log::debug!("arbitration {:?} -> {:?}", touch, claim);
        claim
    }

    fn evaluate(&self, touch: &TouchContext) -> Claim {
        if !touch.can_be_dismissed {
            return Claim::Denied;
        }
        // The header never scrolls on its own.
        if touch.in_header {
            return Claim::DragToDismiss {
                owner: ScrollOwner::Outer,
            };
        }
        if let Some(inner) = touch.inner {
            if inner.scrolls_on_its_own() {
                return Claim::InnerScroll;
            }
            return Claim::DragToDismiss {
                owner: ScrollOwner::Inner,
            };
        }
        if let Some(outer) = touch.outer {
            if outer.scrolls_on_its_own() {
                return Claim::OuterScroll;
            }
        }
        // Only a touch inside the content's region ties the drag to it.
        Claim::DragToDismiss {
            owner: ScrollOwner::Outer,
        }
    }

    /// Which scroll a touch drives when no panel gesture is allowed; the
    /// regions' own scrolling doesn't depend on dismissibility.
    pub fn native_scroll(&self, touch: &TouchContext) -> Option<ScrollOwner> {
        if touch.inner.is_some_and(|inner| inner.scrollable) {
            return Some(ScrollOwner::Inner);
        }
        if touch.outer.is_some() {
            return Some(ScrollOwner::Outer);
        }
        None
    }

    /// Whether two recognizers may track the same touch together. Only
    /// drag-to-dismiss and the outer container's scroll may; the content's
    /// scroll region always owns its touches exclusively.
    pub fn may_recognize_simultaneously(&self, a: Recognizer, b: Recognizer) -> bool {
        matches!(
            (a, b),
            (Recognizer::DragToDismiss, Recognizer::OuterScroll)
                | (Recognizer::OuterScroll, Recognizer::DragToDismiss)
        )
    }
}
