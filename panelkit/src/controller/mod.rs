//! The panel's presentation controller.
//!
//! Owns everything that exists while a panel is on screen: the layer
//! frames, the outer scroll container, the two scroll observers and the
//! drag-to-dismiss state machine. Presented content talks to it through
//! [`set_needs_scroll_view_update`](PresentationController::set_needs_scroll_view_update),
//! [`layout_if_needed`](PresentationController::layout_if_needed) and
//! [`animate_changes`](PresentationController::animate_changes).

mod drag;
mod layout;
mod session;

use std::rc::Rc;
use std::time::{Duration, Instant};

use sheetdom::{AnimationState, Completion, Insets, Rect, ScrollHandle, TransitionConfig};

use crate::animator::{SPRING_DAMPING, TransitionContext};
use crate::arbiter::GestureArbiter;
use crate::coordinator::PresenterId;
use crate::observer::ScrollCoordinationObserver;
use crate::options::PanelOptions;
use crate::presentable::{PanelPresentable, ScreenId};

use drag::NativeScroll;
use layout::Frames;

pub use layout::{ContentMetrics, PanelLayer, PanelViews, header_shadow_opacity};
pub use session::{PanelPhase, PanelSession, ScrollSession};

/// Duration of spring-backs and animated layout changes.
pub const SPRING_DURATION: Duration = Duration::from_millis(420);

/// Animated properties of a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelProperty {
    /// Vertical offset of the whole panel; positive moves it down.
    Translation,
    /// Panel opacity, used by cross-fade transitions.
    Opacity,
    /// Fraction of `dim_opacity` applied to the dimming layer.
    DimAlpha,
    /// Top edge of the panel background at rest.
    PanelTop,
}

/// Something the controller needs its host to do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelRequest {
    /// Start the dismissal transition.
    Dismiss { velocity: f32 },
    /// Dim (`true`) or restore (`false`) the presenting screen's tint.
    AdjustPresenterTint(bool),
}

pub struct PresentationController {
    screen: ScreenId,
    presenter: PresenterId,
    content: Rc<dyn PanelPresentable>,
    options: PanelOptions,
    session: Option<PanelSession>,
    container_scroll: ScrollHandle,
    container_observer: ScrollCoordinationObserver,
    content_observer: ScrollCoordinationObserver,
    arbiter: GestureArbiter,
    native_scroll: Option<NativeScroll>,
    animations: AnimationState<PanelProperty>,
    is_view_loaded: bool,
    needs_layout: bool,
    bounds: Rect,
    safe_area: Insets,
    keyboard_frame: Option<Rect>,
    frames: Frames,
    metrics: ContentMetrics,
    last_inner_content_height: Option<f32>,
    background_bounce: f32,
    header_shadow: f32,
    container_pan_scoped: bool,
    requests: Vec<PanelRequest>,
    now: Instant,
}

impl std::fmt::Debug for PresentationController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationController")
            .field("screen", &self.screen)
            .field("content", &self.content.name())
            .field("phase", &self.phase())
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}

impl PresentationController {
    pub fn new(
        screen: ScreenId,
        presenter: PresenterId,
        content: Rc<dyn PanelPresentable>,
        options: PanelOptions,
        now: Instant,
    ) -> Self {
        let mut container_scroll = sheetdom::ScrollRegion::new(Rect::ZERO);
        container_scroll.always_bounce_vertical = true;
        Self {
            screen,
            presenter,
            content,
            options,
            session: None,
            container_scroll: ScrollHandle::new(container_scroll),
            container_observer: ScrollCoordinationObserver::new("container"),
            content_observer: ScrollCoordinationObserver::new("content"),
            arbiter: GestureArbiter::new(),
            native_scroll: None,
            animations: AnimationState::new(),
            is_view_loaded: false,
            needs_layout: true,
            bounds: Rect::ZERO,
            safe_area: Insets::ZERO,
            keyboard_frame: None,
            frames: Frames::default(),
            metrics: ContentMetrics::default(),
            last_inner_content_height: None,
            background_bounce: 0.0,
            header_shadow: 0.0,
            container_pan_scoped: false,
            requests: Vec::new(),
            now,
        }
    }

    pub fn screen(&self) -> ScreenId {
        self.screen
    }

    pub fn presenter(&self) -> PresenterId {
        self.presenter
    }

    pub fn content(&self) -> &Rc<dyn PanelPresentable> {
        &self.content
    }

    pub fn options(&self) -> &PanelOptions {
        &self.options
    }

    pub fn session(&self) -> Option<&PanelSession> {
        self.session.as_ref()
    }

    /// Current phase; `Idle` when no session exists.
    pub fn phase(&self) -> PanelPhase {
        self.session
            .as_ref()
            .map_or(PanelPhase::Idle, PanelSession::phase)
    }

    pub fn is_view_loaded(&self) -> bool {
        self.is_view_loaded
    }

    pub fn content_metrics(&self) -> ContentMetrics {
        self.metrics
    }

    /// The panel's own scroll container.
    pub fn container_scroll(&self) -> &ScrollHandle {
        &self.container_scroll
    }

    /// The content's scroll region currently cooperated with.
    pub fn content_scroll(&self) -> Option<&ScrollHandle> {
        self.content_observer.region()
    }

    pub fn translation(&self) -> f32 {
        self.animations.value(PanelProperty::Translation, self.now)
    }

    pub fn is_animating(&self) -> bool {
        self.animations.has_active_transitions()
    }

    /// Drain pending host requests.
    pub fn take_requests(&mut self) -> Vec<PanelRequest> {
        std::mem::take(&mut self.requests)
    }

    // =========================================================================
    // Transition lifecycle
    // =========================================================================

    /// Build the panel and open its session. Called by the host right
    /// before the presentation animation starts.
    pub fn presentation_transition_will_begin(&mut self, bounds: Rect, safe_area: Insets, now: Instant) {
        self.now = now;
        self.bounds = bounds;
        self.safe_area = safe_area;
        self.set_up_views();

        let session = PanelSession::new(&self.options, self.extends_to_full_height());
        self.session = Some(session);
        self.needs_layout = true;
        self.layout_if_needed();

        if self.adjusts_presenter_tint() {
            self.requests.push(PanelRequest::AdjustPresenterTint(true));
        }
        log::debug!("presenting {} ({})", self.content.name(), self.screen);
    }

    pub fn presentation_transition_did_end(&mut self, completed: bool) {
        if !completed {
            log::debug!("presentation of {} did not complete", self.screen);
            self.tear_down();
            return;
        }
        if let Some(session) = self.session.as_mut() {
            if session.phase == PanelPhase::AnimatingPresent {
                session.set_phase(PanelPhase::Idle);
            }
        }
    }

    pub fn dismissal_transition_will_begin(&mut self, now: Instant) {
        self.now = now;
        self.close_scroll_session();
        if let Some(session) = self.session.as_mut() {
            session.set_phase(PanelPhase::AnimatingDismiss);
        }
        if self.adjusts_presenter_tint() {
            self.requests.push(PanelRequest::AdjustPresenterTint(false));
        }
    }

    /// `finished` is false when a new drag interrupted the dismissal; the
    /// panel then stays on screen.
    pub fn dismissal_transition_did_end(&mut self, finished: bool) {
        if finished {
            log::debug!("dismissed {}", self.screen);
            self.tear_down();
            return;
        }
        log::debug!("dismissal of {} interrupted", self.screen);
        if self.adjusts_presenter_tint() {
            self.requests.push(PanelRequest::AdjustPresenterTint(true));
        }
    }

    /// Animation context for the presentation or dismissal of this panel.
    pub fn transition_context(&mut self, animated: bool, now: Instant) -> TransitionContext<'_> {
        self.now = now;
        let resting_top = self.animations.target(PanelProperty::PanelTop);
        let offscreen_translation = (self.bounds.bottom() - resting_top).max(0.0);
        TransitionContext {
            animations: &mut self.animations,
            now,
            animated,
            offscreen_translation,
        }
    }

    fn set_up_views(&mut self) {
        if self.is_view_loaded {
            return;
        }
        self.container_observer
            .observe(Some(self.container_scroll.clone()));
        self.animations.set(PanelProperty::Opacity, 1.0);
        self.is_view_loaded = true;
        self.update_content_scroll_region();
        log::debug!("panel views set up for {}", self.screen);
    }

    fn tear_down(&mut self) {
        self.close_scroll_session();
        self.native_scroll = None;
        self.container_observer.clear();
        self.content_observer.clear();
        self.session = None;
    }

    // =========================================================================
    // Content entry points
    // =========================================================================

    /// Re-read the content's scroll region and recompute the panel height.
    pub fn set_needs_scroll_view_update(&mut self) {
        if !self.is_view_loaded {
            return;
        }
        self.update_content_scroll_region();
        self.needs_layout = true;
        self.sync_scroll_observers();
    }

    /// Perform any pending layout pass now.
    pub fn layout_if_needed(&mut self) {
        if !self.is_view_loaded {
            return;
        }
        self.sync_scroll_observers();
    }

    /// Apply `changes` and animate the resulting layout with the panel's
    /// spring. The completion fires once the spring settles, or with
    /// `false` if another layout animation replaces it.
    pub fn animate_changes(&mut self, now: Instant, changes: impl FnOnce(&mut PanelOptions)) -> Completion {
        self.now = now;
        let from = self.animations.value(PanelProperty::PanelTop, now);
        changes(&mut self.options);
        self.needs_layout = true;
        if !self.is_view_loaded {
            return Completion::ready(true);
        }
        self.sync_scroll_observers();

        let to = self.animations.target(PanelProperty::PanelTop);
        log::debug!("animating panel top {} -> {}", from, to);
        self.animations.set(PanelProperty::PanelTop, from);
        self.animations.animate(
            PanelProperty::PanelTop,
            to,
            TransitionConfig::spring(SPRING_DURATION, SPRING_DAMPING, 0.0),
            now,
        )
    }

    /// Advance animations and scroll physics.
    pub fn tick(&mut self, now: Instant) {
        self.now = now;
        let finished = self.animations.tick(now);
        self.container_scroll.borrow_mut().tick(now);
        if let Some(inner) = self.content_observer.region() {
            inner.borrow_mut().tick(now);
        }

        let translation = self.animations.value(PanelProperty::Translation, now);
        if let Some(session) = self.session.as_mut() {
            if session.scroll.is_none() {
                session.drag_translation = translation;
            }
            if session.phase == PanelPhase::SpringingBack
                && finished.contains(&PanelProperty::Translation)
            {
                session.set_phase(PanelPhase::Idle);
            }
        }
        if self.is_view_loaded {
            self.sync_scroll_observers();
        }
    }

    // =========================================================================
    // Environment
    // =========================================================================

    pub fn set_bounds(&mut self, bounds: Rect, safe_area: Insets) {
        if self.bounds == bounds && self.safe_area == safe_area {
            return;
        }
        self.bounds = bounds;
        self.safe_area = safe_area;
        self.needs_layout = true;
    }

    /// Keyboard frame in screen coordinates, `None` when hidden.
    pub fn set_keyboard_frame(&mut self, frame: Option<Rect>) {
        if self.keyboard_frame == frame {
            return;
        }
        self.keyboard_frame = frame;
        self.needs_layout = true;
        self.layout_if_needed();
    }

    /// Bottom inset added to the content while the keyboard overlaps it.
    pub fn keyboard_inset(&self) -> f32 {
        let Some(keyboard) = self.keyboard_frame else {
            return 0.0;
        };
        let visible = self.bounds.inset(self.safe_area);
        match visible.intersection(&keyboard) {
            Some(overlap) if overlap.height > 0.0 => 8.0 + overlap.height,
            _ => 0.0,
        }
    }

    // =========================================================================
    // Options
    // =========================================================================

    pub fn set_options(&mut self, options: PanelOptions) {
        let tint_changed =
            options.should_adjust_presenter_tint_mode != self.options.should_adjust_presenter_tint_mode;
        let adjust = options.should_adjust_presenter_tint_mode;
        self.options = options;
        self.needs_layout = true;
        if tint_changed {
            self.presenter_tint_option_changed(adjust);
        }
    }

    pub fn set_dim_opacity(&mut self, opacity: f32) {
        self.options.dim_opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn set_shows_header(&mut self, shows_header: bool) {
        if self.options.shows_header != shows_header {
            self.options.shows_header = shows_header;
            self.needs_layout = true;
        }
    }

    pub fn set_header_height(&mut self, height: f32) {
        self.options.header_height = height.max(0.0);
        self.needs_layout = true;
    }

    pub fn set_corner_radius(&mut self, radius: f32) {
        self.options.corner_radius = radius.max(0.0);
    }

    pub fn set_top_inset(&mut self, inset: f32) {
        self.options.top_inset = inset.max(0.0);
        self.needs_layout = true;
    }

    pub fn set_fade_header_while_scrolling(&mut self, fade: bool) {
        self.options.fade_header_while_scrolling = fade;
        self.update_header_shadow();
    }

    pub fn set_extends_to_full_height(&mut self, extends: bool) {
        self.options.extends_to_full_height = extends;
        self.needs_layout = true;
    }

    pub fn set_should_adjust_presenter_tint_mode(&mut self, adjust: bool) {
        if self.options.should_adjust_presenter_tint_mode == adjust {
            return;
        }
        self.options.should_adjust_presenter_tint_mode = adjust;
        self.presenter_tint_option_changed(adjust);
    }

    fn presenter_tint_option_changed(&mut self, adjust: bool) {
        let presented = matches!(
            self.phase(),
            PanelPhase::Idle | PanelPhase::Dragging | PanelPhase::SpringingBack
        );
        if self.session.is_some() && presented && self.content.should_dim_presenter() {
            self.requests.push(PanelRequest::AdjustPresenterTint(adjust));
        }
    }

    fn adjusts_presenter_tint(&self) -> bool {
        self.options.should_adjust_presenter_tint_mode && self.content.should_dim_presenter()
    }

    fn extends_to_full_height(&self) -> bool {
        self.options.extends_to_full_height || self.content.extends_to_full_height()
    }
}
