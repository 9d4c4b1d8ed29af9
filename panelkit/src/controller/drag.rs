//! Interactive drag-to-dismiss.

use std::time::Duration;

use sheetdom::{Easing, GesturePhase, PanEvent, Point, ScrollHandle, TransitionConfig};

use super::{
    PanelLayer, PanelPhase, PanelProperty, PanelRequest, PresentationController, SPRING_DURATION,
    ScrollSession,
};
use crate::animator::SPRING_DAMPING;
use crate::arbiter::{Claim, RegionState, ScrollOwner, TouchContext};

/// How quickly dimming and opacity recover when a drag interrupts a
/// dismissal.
const RECOVER_DURATION: Duration = Duration::from_millis(210);

/// A touch that scrolls a region the usual way, without moving the panel.
#[derive(Debug)]
pub(super) struct NativeScroll {
    region: ScrollHandle,
    last_translation_y: f32,
}

impl PresentationController {
    /// Feed one pan event. Returns whether the panel or one of its scroll
    /// regions consumed it.
    pub fn handle_pan(&mut self, event: &PanEvent) -> bool {
        self.now = event.timestamp;
        let handled = match event.phase {
            GesturePhase::Began => self.pan_began(event),
            GesturePhase::Changed => self.pan_changed(event),
            GesturePhase::Ended | GesturePhase::Cancelled | GesturePhase::Failed => {
                self.pan_ended(event)
            }
        };
        self.sync_scroll_observers();
        handled
    }

    /// A tap outside the panel background dismisses the panel.
    pub fn handle_tap(&mut self, location: Point) -> bool {
        if !self.content.can_be_dismissed() {
            return false;
        }
        if !matches!(self.phase(), PanelPhase::Idle | PanelPhase::SpringingBack) {
            return false;
        }
        if self.hit_map().contains(PanelLayer::Background, location) {
            return false;
        }
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        log::debug!("tap outside panel at {:?}", location);
        session.dismiss_velocity = 0.0;
        session.set_phase(PanelPhase::Committed { velocity: 0.0 });
        self.requests.push(PanelRequest::Dismiss { velocity: 0.0 });
        true
    }

    /// Scroll state under `location` at the start of a gesture.
    pub fn touch_context(&self, location: Point) -> TouchContext {
        let layers = self.hit_map();
        let in_header = layers.hit_test(location) == Some(PanelLayer::Header);
        let inner = self.content_observer.region().and_then(|region| {
            layers
                .contains(PanelLayer::ContentScroll, location)
                .then(|| RegionState::from_metrics(&region.metrics()))
        });
        // The container's own pan covers the whole panel while its content
        // fits, and only the container once it scrolls.
        let in_container = layers.contains(PanelLayer::Container, location);
        let outer = (in_container || !self.container_pan_scoped)
            .then(|| RegionState::from_metrics(&self.container_scroll.metrics()));
        TouchContext {
            can_be_dismissed: self.content.can_be_dismissed(),
            in_header,
            inner,
            outer,
        }
    }

    fn pan_began(&mut self, event: &PanEvent) -> bool {
        let Some(phase) = self.session.as_ref().map(|session| session.phase) else {
            return false;
        };
        if phase == PanelPhase::AnimatingPresent {
            log::trace!("ignoring drag during presentation");
            return false;
        }
        if self.session.as_ref().is_some_and(|s| s.scroll.is_some()) {
            log::debug!("new drag began before the previous one ended");
            self.close_scroll_session();
        }
        self.native_scroll = None;

        let ctx = self.touch_context(event.location);
        match self.arbiter.decide(&ctx) {
            Claim::Denied => match self.arbiter.native_scroll(&ctx) {
                Some(owner) => self.begin_native_scroll(owner),
                None => false,
            },
            Claim::InnerScroll => self.begin_native_scroll(ScrollOwner::Inner),
            Claim::OuterScroll => self.begin_native_scroll(ScrollOwner::Outer),
            Claim::DragToDismiss { owner } => {
                let tracking = match owner {
                    ScrollOwner::Outer => ctx.outer.is_some(),
                    ScrollOwner::Inner => ctx.inner.is_some(),
                };
                self.open_scroll_session(owner, tracking, phase);
                true
            }
        }
    }

    fn region_for(&self, owner: ScrollOwner) -> ScrollHandle {
        match (owner, self.content_observer.region()) {
            (ScrollOwner::Inner, Some(inner)) => inner.clone(),
            _ => self.container_scroll.clone(),
        }
    }

    fn begin_native_scroll(&mut self, owner: ScrollOwner) -> bool {
        let region = self.region_for(owner);
        region.borrow_mut().begin_drag();
        log::trace!("native scroll of {}", region.id());
        self.native_scroll = Some(NativeScroll {
            region,
            last_translation_y: 0.0,
        });
        true
    }

    fn open_scroll_session(&mut self, owner: ScrollOwner, tracking: bool, phase: PanelPhase) {
        let now = self.now;
        let interrupting = matches!(
            phase,
            PanelPhase::SpringingBack | PanelPhase::AnimatingDismiss | PanelPhase::Committed { .. }
        );
        let mut translation = if interrupting {
            self.animations.cancel(PanelProperty::Translation, now)
        } else {
            self.animations.value(PanelProperty::Translation, now)
        };
        if phase == PanelPhase::AnimatingDismiss {
            self.recover_from_dismissal();
        }

        let region = self.region_for(owner);
        // Hand a rubber-band overshoot over to the panel so nothing jumps
        // when the region gets clamped below.
        let carried = region.metrics().bounce_overshoot();
        translation += carried;

        self.container_scroll.borrow_mut().stop_vertical_scrolling();
        if let Some(inner) = self.content_observer.region() {
            inner.borrow_mut().stop_vertical_scrolling();
        }
        {
            let mut region = region.borrow_mut();
            region.set_at_top();
            if tracking {
                region.begin_drag();
            }
        }
        self.animations.set(PanelProperty::Translation, translation);

        let mut scroll = ScrollSession::new(owner, region, translation);
        scroll.tracking = tracking;
        log::debug!(
            "scroll session opened on {:?} at translation {} (carried {})",
            owner,
            translation,
            carried
        );
        if let Some(session) = self.session.as_mut() {
            session.scroll = Some(scroll);
            session.drag_translation = translation;
            session.set_phase(PanelPhase::Dragging);
        }
    }

    fn recover_from_dismissal(&mut self) {
        let now = self.now;
        let config = TransitionConfig::eased(RECOVER_DURATION, Easing::EaseOut);
        for key in [PanelProperty::Opacity, PanelProperty::DimAlpha] {
            self.animations.cancel(key, now);
            self.animations.animate(key, 1.0, config, now);
        }
    }

    fn pan_changed(&mut self, event: &PanEvent) -> bool {
        if let Some(native) = self.native_scroll.as_mut() {
            let ty = event.translation.y;
            let delta = ty - native.last_translation_y;
            native.last_translation_y = ty;
            native.region.borrow_mut().drag_by(delta);
            return true;
        }

        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(scroll) = session.scroll.as_mut() else {
            return false;
        };

        let ty = event.translation.y;
        let delta = ty - scroll.last_translation_y;
        scroll.last_translation_y = ty;
        let raw = scroll.base_translation + ty;
        let translation = raw.max(0.0);

        {
            let mut region = scroll.region().borrow_mut();
            region.bounces = region.relative_offset() > 0.0 || raw < 0.0;
            if scroll.tracking && translation <= 0.0 {
                region.drag_by(delta);
            }
            region.shows_vertical_indicator = translation <= 0.0;
        }

        session.drag_translation = translation;
        self.animations.set(PanelProperty::Translation, translation);
        true
    }

    fn pan_ended(&mut self, event: &PanEvent) -> bool {
        let now = event.timestamp;
        let velocity = event.velocity.y;

        if let Some(native) = self.native_scroll.take() {
            native.region.borrow_mut().end_drag(velocity, now);
            return true;
        }

        let Some(session) = self.session.as_mut() else {
            return false;
        };
        let Some(scroll) = session.scroll.take() else {
            return false;
        };
        log::debug!("scroll session on {:?} closed", scroll.owner());

        let translation = session.drag_translation;
        let region = scroll.region().clone();
        region.borrow_mut().shows_vertical_indicator = true;

        // The finger must end up below where it started, not just the panel.
        let moved_down = event.translation.y > 0.0;
        if event.phase == GesturePhase::Ended && moved_down && translation > 0.0 && velocity > 0.0 {
            if scroll.tracking {
                region.borrow_mut().end_drag(0.0, now);
            }
            session.dismiss_velocity = velocity;
            session.set_phase(PanelPhase::Committed { velocity });
            self.requests.push(PanelRequest::Dismiss { velocity });
            return true;
        }

        region.borrow_mut().bounces = true;
        if translation <= 0.0 {
            if scroll.tracking {
                region.borrow_mut().end_drag(velocity, now);
            }
            session.set_phase(PanelPhase::Idle);
            return true;
        }

        // Keep the region under the finger from gaining momentum; only the
        // panel moves back.
        if scroll.tracking {
            let mut region = region.borrow_mut();
            region.stop_vertical_scrolling();
            region.set_at_top();
        }
        let spring_velocity = -(velocity / translation);
        session.set_phase(PanelPhase::SpringingBack);
        log::trace!(
            "springing back from {} (velocity {})",
            translation,
            spring_velocity
        );
        self.animations.animate(
            PanelProperty::Translation,
            0.0,
            TransitionConfig::spring(SPRING_DURATION, SPRING_DAMPING, spring_velocity),
            now,
        );
        true
    }

    /// End the current drag session without a decision, restoring the
    /// owning region.
    pub(super) fn close_scroll_session(&mut self) {
        let Some(scroll) = self.session.as_mut().and_then(|session| session.scroll.take()) else {
            return;
        };
        log::debug!("scroll session on {:?} closed", scroll.owner());
        let mut region = scroll.region().borrow_mut();
        region.bounces = true;
        region.shows_vertical_indicator = true;
        if region.is_tracking() {
            region.set_at_top();
        }
    }
}
