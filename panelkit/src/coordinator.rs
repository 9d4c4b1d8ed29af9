//! Binding screens to the panel presentation machinery.

use std::rc::Rc;
use std::time::Instant;

use sheetdom::Completion;
use uuid::Uuid;

use crate::animator::{MotionPreferences, TransitionAnimator};
use crate::controller::PresentationController;
use crate::error::PanelError;
use crate::host::ModalHost;
use crate::options::PanelOptions;
use crate::presentable::{PanelPresentable, ScreenId};

/// Unique identifier for a presenter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PresenterId(Uuid);

impl PresenterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for PresenterId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PresenterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the host asks for when it presents or dismisses a screen.
pub trait TransitioningDelegate {
    /// Build the controller that runs the presented panel.
    fn presentation_controller(
        &self,
        presented: ScreenId,
        content: Rc<dyn PanelPresentable>,
        now: Instant,
    ) -> PresentationController;

    fn animator_for_presented(&self, motion: MotionPreferences) -> TransitionAnimator;

    fn animator_for_dismissed(&self, motion: MotionPreferences) -> TransitionAnimator;

    /// Velocity of the drag that triggered the upcoming dismissal, zero for
    /// taps and programmatic dismissals.
    fn record_dismiss_velocity(&mut self, velocity: f32);
}

/// Presents a screen as a panel.
///
/// The presenter is a small value. Presenting hands a copy of it to the
/// host, which keeps it for as long as the panel is on screen, so the
/// caller is free to drop its own copy right after
/// [`present`](Self::present) returns.
///
/// ```ignore
/// let list = host.register(Rc::new(ListScreen::new()));
/// PanelPresenter::for_screen(list)
///     .with_options(PanelOptions::new().header(44.0))
///     .present(&mut host, root, true, Instant::now())?;
/// ```
#[derive(Debug, Clone)]
pub struct PanelPresenter {
    id: PresenterId,
    screen: Option<ScreenId>,
    options: PanelOptions,
    dismiss_velocity: f32,
}

impl Default for PanelPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl PanelPresenter {
    /// A presenter with no screen bound yet.
    pub fn new() -> Self {
        Self {
            id: PresenterId::new(),
            screen: None,
            options: PanelOptions::default(),
            dismiss_velocity: 0.0,
        }
    }

    pub fn for_screen(screen: ScreenId) -> Self {
        let mut presenter = Self::new();
        presenter.screen = Some(screen);
        presenter
    }

    /// Options the panel starts out with.
    pub fn with_options(mut self, options: PanelOptions) -> Self {
        self.options = options;
        self
    }

    pub fn id(&self) -> PresenterId {
        self.id
    }

    pub fn screen(&self) -> Option<ScreenId> {
        self.screen
    }

    pub fn set_screen(&mut self, screen: Option<ScreenId>) {
        self.screen = screen;
    }

    pub fn options(&self) -> &PanelOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut PanelOptions {
        &mut self.options
    }

    pub fn dismiss_velocity(&self) -> f32 {
        self.dismiss_velocity
    }

    fn bound_screen(&self) -> Result<ScreenId, PanelError> {
        self.screen.ok_or(PanelError::NoBoundScreen)
    }

    /// Present the bound screen above `owner`.
    pub fn present(
        &self,
        host: &mut ModalHost,
        owner: ScreenId,
        animated: bool,
        now: Instant,
    ) -> Result<(), PanelError> {
        let screen = self.bound_screen()?;
        log::debug!("presenter {} presenting {} from {}", self.id, screen, owner);
        host.present(screen, owner, Box::new(self.clone()), animated, now)
    }

    /// The controller of the bound screen's panel, while it is presented.
    pub fn controller<'a>(
        &self,
        host: &'a mut ModalHost,
    ) -> Result<&'a mut PresentationController, PanelError> {
        let screen = self.bound_screen()?;
        host.panel_mut(screen).ok_or(PanelError::NotPresented(screen))
    }

    /// See [`PresentationController::set_needs_scroll_view_update`].
    pub fn set_needs_scroll_view_update(&self, host: &mut ModalHost) -> Result<(), PanelError> {
        self.controller(host)?.set_needs_scroll_view_update();
        Ok(())
    }

    /// See [`PresentationController::animate_changes`].
    pub fn animate_changes(
        &self,
        host: &mut ModalHost,
        now: Instant,
        changes: impl FnOnce(&mut PanelOptions),
    ) -> Result<Completion, PanelError> {
        Ok(self.controller(host)?.animate_changes(now, changes))
    }

    /// See [`PresentationController::layout_if_needed`].
    pub fn layout_if_needed(&self, host: &mut ModalHost) -> Result<(), PanelError> {
        self.controller(host)?.layout_if_needed();
        Ok(())
    }
}

impl TransitioningDelegate for PanelPresenter {
    fn presentation_controller(
        &self,
        presented: ScreenId,
        content: Rc<dyn PanelPresentable>,
        now: Instant,
    ) -> PresentationController {
        PresentationController::new(presented, self.id, content, self.options.clone(), now)
    }

    fn animator_for_presented(&self, motion: MotionPreferences) -> TransitionAnimator {
        TransitionAnimator::presenting(motion)
    }

    fn animator_for_dismissed(&self, motion: MotionPreferences) -> TransitionAnimator {
        TransitionAnimator::dismissing(self.dismiss_velocity, motion)
    }

    fn record_dismiss_velocity(&mut self, velocity: f32) {
        self.dismiss_velocity = velocity;
    }
}
