//! Modal host: keeps track of screens and the panel presented over them.

use std::collections::HashMap;
use std::rc::Rc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use sheetdom::{Completion, Insets, PanEvent, PanTracker, Point, PointerGesture, PointerInput, Rect};

use crate::animator::{MotionPreferences, TransitionDirection};
use crate::controller::{PanelRequest, PresentationController};
use crate::coordinator::TransitioningDelegate;
use crate::error::PanelError;
use crate::presentable::{PanelPresentable, ScreenId};

/// How a screen's accent colors are drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TintMode {
    #[default]
    Automatic,
    /// Desaturated, as for a screen behind a modal.
    Dimmed,
}

/// Presentation changes, drained with [`ModalHost::take_events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The presentation transition finished; the panel is on screen.
    Presented(ScreenId),
    /// The dismissal transition finished; the panel is gone.
    Dismissed(ScreenId),
    /// A drag caught the panel mid-dismissal; it stays on screen.
    DismissCancelled(ScreenId),
}

struct ScreenEntry {
    content: Rc<dyn PanelPresentable>,
    tint: TintMode,
}

struct PendingTransition {
    direction: TransitionDirection,
    completion: Completion,
}

/// Everything the host keeps for the panel on screen.
struct Presentation {
    screen: ScreenId,
    presenting: ScreenId,
    /// Owned copy of the coordinator; lives until the panel is gone.
    delegate: Box<dyn TransitioningDelegate>,
    controller: PresentationController,
    transition: Option<PendingTransition>,
    /// Presenter's tint from before it was dimmed.
    saved_tint: Option<TintMode>,
}

/// Retains registered screens and at most one presented panel, and routes
/// input, frame ticks and transition completions to it.
pub struct ModalHost {
    /// Screen bounds.
    bounds: Rect,

    /// Insets of the screen's unobstructed area.
    safe_area: Insets,

    keyboard_frame: Option<Rect>,

    motion: MotionPreferences,

    /// All registered screens.
    screens: HashMap<ScreenId, ScreenEntry>,

    /// The panel currently on screen, if any.
    presented: Option<Presentation>,

    /// Turns raw pointer samples into pans and taps.
    tracker: PanTracker,

    events: Vec<HostEvent>,
}

impl ModalHost {
    pub fn new(bounds: Rect, safe_area: Insets) -> Self {
        Self {
            bounds,
            safe_area,
            keyboard_frame: None,
            motion: MotionPreferences::default(),
            screens: HashMap::new(),
            presented: None,
            tracker: PanTracker::new(),
            events: Vec::new(),
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn safe_area(&self) -> Insets {
        self.safe_area
    }

    pub fn motion_preferences(&self) -> MotionPreferences {
        self.motion
    }

    // =========================================================================
    // Screens
    // =========================================================================

    /// Register a screen. The host keeps it alive until it is unregistered.
    pub fn register(&mut self, content: Rc<dyn PanelPresentable>) -> ScreenId {
        let id = ScreenId::new();
        log::debug!("registered screen {} ({})", id, content.name());
        self.screens.insert(
            id,
            ScreenEntry {
                content,
                tint: TintMode::Automatic,
            },
        );
        id
    }

    /// Remove a screen. A panel it presents or is presented in is removed
    /// immediately, without animation.
    pub fn unregister(&mut self, screen: ScreenId) -> Option<Rc<dyn PanelPresentable>> {
        let involved = self
            .presented
            .as_ref()
            .is_some_and(|p| p.screen == screen || p.presenting == screen);
        if involved {
            if let Some(mut presentation) = self.presented.take() {
                presentation.controller.dismissal_transition_did_end(true);
                self.restore_tint(&mut presentation);
                self.events.push(HostEvent::Dismissed(presentation.screen));
            }
        }
        self.screens.remove(&screen).map(|entry| entry.content)
    }

    pub fn is_registered(&self, screen: ScreenId) -> bool {
        self.screens.contains_key(&screen)
    }

    pub fn tint_mode(&self, screen: ScreenId) -> Option<TintMode> {
        self.screens.get(&screen).map(|entry| entry.tint)
    }

    pub fn set_tint_mode(&mut self, screen: ScreenId, tint: TintMode) -> Result<(), PanelError> {
        let entry = self
            .screens
            .get_mut(&screen)
            .ok_or(PanelError::ScreenNotFound(screen))?;
        entry.tint = tint;
        Ok(())
    }

    // =========================================================================
    // Presentation
    // =========================================================================

    /// The screen currently presented as a panel.
    pub fn presented_screen(&self) -> Option<ScreenId> {
        self.presented.as_ref().map(|p| p.screen)
    }

    /// The screen the current panel was presented from.
    pub fn presenting_screen(&self) -> Option<ScreenId> {
        self.presented.as_ref().map(|p| p.presenting)
    }

    /// Whether a presentation or dismissal transition is running.
    pub fn is_transitioning(&self) -> bool {
        self.presented
            .as_ref()
            .is_some_and(|p| p.transition.is_some())
    }

    pub fn panel(&self, screen: ScreenId) -> Option<&PresentationController> {
        self.presented
            .as_ref()
            .filter(|p| p.screen == screen)
            .map(|p| &p.controller)
    }

    pub fn panel_mut(&mut self, screen: ScreenId) -> Option<&mut PresentationController> {
        self.presented
            .as_mut()
            .filter(|p| p.screen == screen)
            .map(|p| &mut p.controller)
    }

    /// Present `screen` as a panel above `presenting`, using the delegate's
    /// controller and animators. The host keeps the delegate until the
    /// panel has been dismissed.
    pub fn present(
        &mut self,
        screen: ScreenId,
        presenting: ScreenId,
        delegate: Box<dyn TransitioningDelegate>,
        animated: bool,
        now: Instant,
    ) -> Result<(), PanelError> {
        if screen == presenting {
            return Err(PanelError::SelfPresentation(screen));
        }
        if let Some(current) = &self.presented {
            return Err(PanelError::AlreadyPresenting(current.screen));
        }
        if !self.screens.contains_key(&presenting) {
            return Err(PanelError::ScreenNotFound(presenting));
        }
        let content = self
            .screens
            .get(&screen)
            .map(|entry| entry.content.clone())
            .ok_or(PanelError::ScreenNotFound(screen))?;

        let mut controller = delegate.presentation_controller(screen, content, now);
        controller.presentation_transition_will_begin(self.bounds, self.safe_area, now);
        controller.set_keyboard_frame(self.keyboard_frame);

        let animator = delegate.animator_for_presented(self.motion);
        let completion = animator.animate_transition(&mut controller.transition_context(animated, now));

        log::debug!("presenting {} from {}", screen, presenting);
        self.presented = Some(Presentation {
            screen,
            presenting,
            delegate,
            controller,
            transition: Some(PendingTransition {
                direction: TransitionDirection::Presenting,
                completion,
            }),
            saved_tint: None,
        });
        self.settle(now);
        Ok(())
    }

    /// Dismiss the panel showing `screen`. Does nothing if it is already
    /// being dismissed.
    pub fn dismiss(&mut self, screen: ScreenId, animated: bool, now: Instant) -> Result<(), PanelError> {
        let dismissing = match &self.presented {
            Some(p) if p.screen == screen => p
                .transition
                .as_ref()
                .is_some_and(|t| t.direction == TransitionDirection::Dismissing),
            _ => return Err(PanelError::NotPresented(screen)),
        };
        if !dismissing {
            self.begin_dismissal(0.0, animated, now);
            self.settle(now);
        }
        Ok(())
    }

    fn begin_dismissal(&mut self, velocity: f32, animated: bool, now: Instant) {
        let motion = self.motion;
        let Some(presentation) = self.presented.as_mut() else {
            return;
        };
        // A dismissal can overtake a presentation that is still running.
        if let Some(pending) = presentation
            .transition
            .take_if(|t| t.direction == TransitionDirection::Presenting)
        {
            drop(pending);
            presentation.controller.presentation_transition_did_end(true);
            self.events.push(HostEvent::Presented(presentation.screen));
        }

        presentation.delegate.record_dismiss_velocity(velocity);
        presentation.controller.dismissal_transition_will_begin(now);
        let animator = presentation.delegate.animator_for_dismissed(motion);
        let completion = animator.animate_transition(&mut presentation.controller.transition_context(animated, now));
        log::debug!(
            "dismissing {} (velocity {}, animated {})",
            presentation.screen,
            velocity,
            animated
        );
        presentation.transition = Some(PendingTransition {
            direction: TransitionDirection::Dismissing,
            completion,
        });
    }

    /// Handle controller requests and finished transitions until none are
    /// left. Unanimated transitions complete here synchronously.
    fn settle(&mut self, now: Instant) {
        loop {
            let requests = match self.presented.as_mut() {
                Some(p) => p.controller.take_requests(),
                None => return,
            };
            let mut progressed = !requests.is_empty();
            for request in requests {
                self.handle_request(request, now);
            }
            progressed |= self.poll_transition();
            if !progressed {
                return;
            }
        }
    }

    fn handle_request(&mut self, request: PanelRequest, now: Instant) {
        match request {
            PanelRequest::Dismiss { velocity } => self.begin_dismissal(velocity, true, now),
            PanelRequest::AdjustPresenterTint(dim) => {
                let Some(mut presentation) = self.presented.take() else {
                    return;
                };
                if dim {
                    self.dim_presenter(&mut presentation);
                } else {
                    self.restore_tint(&mut presentation);
                }
                self.presented = Some(presentation);
            }
        }
    }

    fn dim_presenter(&mut self, presentation: &mut Presentation) {
        if presentation.saved_tint.is_some() {
            return;
        }
        if let Some(entry) = self.screens.get_mut(&presentation.presenting) {
            presentation.saved_tint = Some(entry.tint);
            entry.tint = TintMode::Dimmed;
        }
    }

    fn restore_tint(&mut self, presentation: &mut Presentation) {
        let Some(saved) = presentation.saved_tint.take() else {
            return;
        };
        if let Some(entry) = self.screens.get_mut(&presentation.presenting) {
            entry.tint = saved;
        }
    }

    /// Returns true if a pending transition finished.
    fn poll_transition(&mut self) -> bool {
        let Some(presentation) = self.presented.as_mut() else {
            return false;
        };
        let Some(finished) = presentation
            .transition
            .as_mut()
            .and_then(|t| t.completion.try_finished())
        else {
            return false;
        };
        let Some(pending) = presentation.transition.take() else {
            return false;
        };
        let screen = presentation.screen;

        match (pending.direction, finished) {
            (TransitionDirection::Presenting, true) => {
                presentation.controller.presentation_transition_did_end(true);
                self.events.push(HostEvent::Presented(screen));
            }
            (TransitionDirection::Dismissing, false) => {
                presentation.controller.dismissal_transition_did_end(false);
                self.events.push(HostEvent::DismissCancelled(screen));
            }
            (TransitionDirection::Presenting, false) | (TransitionDirection::Dismissing, true) => {
                if let Some(mut presentation) = self.presented.take() {
                    if pending.direction == TransitionDirection::Presenting {
                        presentation.controller.presentation_transition_did_end(false);
                    } else {
                        presentation.controller.dismissal_transition_did_end(true);
                    }
                    self.restore_tint(&mut presentation);
                    log::debug!("removed panel {}", screen);
                }
                self.events.push(HostEvent::Dismissed(screen));
            }
        }
        true
    }

    // =========================================================================
    // Input and frames
    // =========================================================================

    /// Route a pan event to the presented panel.
    pub fn handle_pan(&mut self, event: &PanEvent) -> bool {
        let Some(presentation) = self.presented.as_mut() else {
            return false;
        };
        let handled = presentation.controller.handle_pan(event);
        self.settle(event.timestamp);
        handled
    }

    /// Route a tap to the presented panel.
    pub fn handle_tap(&mut self, location: Point, now: Instant) -> bool {
        let Some(presentation) = self.presented.as_mut() else {
            return false;
        };
        let handled = presentation.controller.handle_tap(location);
        self.settle(now);
        handled
    }

    /// Route a raw pointer sample.
    pub fn handle_pointer(&mut self, input: PointerInput) -> bool {
        match self.tracker.process(input) {
            Some(PointerGesture::Pan(event)) => self.handle_pan(&event),
            Some(PointerGesture::Tap(location)) => self.handle_tap(location, input.timestamp),
            None => false,
        }
    }

    /// Advance animations and deliver finished transitions.
    pub fn tick(&mut self, now: Instant) {
        if let Some(presentation) = self.presented.as_mut() {
            presentation.controller.tick(now);
        }
        self.settle(now);
    }

    pub fn take_events(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    // =========================================================================
    // Environment
    // =========================================================================

    pub fn set_bounds(&mut self, bounds: Rect, safe_area: Insets) {
        self.bounds = bounds;
        self.safe_area = safe_area;
        if let Some(presentation) = self.presented.as_mut() {
            presentation.controller.set_bounds(bounds, safe_area);
            presentation.controller.layout_if_needed();
        }
    }

    /// Keyboard frame in screen coordinates, `None` when hidden.
    pub fn set_keyboard_frame(&mut self, frame: Option<Rect>) {
        self.keyboard_frame = frame;
        if let Some(presentation) = self.presented.as_mut() {
            presentation.controller.set_keyboard_frame(frame);
        }
    }

    pub fn set_motion_preferences(&mut self, motion: MotionPreferences) {
        self.motion = motion;
    }
}
