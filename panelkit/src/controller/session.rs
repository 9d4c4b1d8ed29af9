use sheetdom::ScrollHandle;

use crate::arbiter::ScrollOwner;
use crate::options::PanelOptions;

/// Where a presented panel is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelPhase {
    Idle,
    AnimatingPresent,
    Dragging,
    /// Returning to rest after an aborted drag.
    SpringingBack,
    /// A drag ended in a dismissal; waiting for the dismissal to start.
    Committed { velocity: f32 },
    AnimatingDismiss,
}

/// A drag-to-dismiss gesture in progress, tied to the scroll region that
/// was under the finger when it began.
#[derive(Debug, Clone)]
pub struct ScrollSession {
    owner: ScrollOwner,
    region: ScrollHandle,
    /// Panel translation when the gesture began.
    pub(super) base_translation: f32,
    /// Last vertical gesture translation seen, for per-event deltas.
    pub(super) last_translation_y: f32,
    /// Whether the region itself receives the drag's movement.
    pub(super) tracking: bool,
}

impl ScrollSession {
    pub(super) fn new(owner: ScrollOwner, region: ScrollHandle, base_translation: f32) -> Self {
        Self {
            owner,
            region,
            base_translation,
            last_translation_y: 0.0,
            tracking: false,
        }
    }

    pub fn owner(&self) -> ScrollOwner {
        self.owner
    }

    pub fn region(&self) -> &ScrollHandle {
        &self.region
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking
    }
}

/// Live state of one presented panel. Exists from the start of the
/// presentation transition until its dismissal transition has completed.
#[derive(Debug, Clone)]
pub struct PanelSession {
    pub(super) phase: PanelPhase,
    pub(super) drag_translation: f32,
    pub(super) dismiss_velocity: f32,
    pub(super) scroll: Option<ScrollSession>,
    pub(super) top_inset: f32,
    pub(super) header_height: f32,
    pub(super) extends_to_full_height: bool,
    pub(super) shows_header: bool,
}

impl PanelSession {
    pub(super) fn new(options: &PanelOptions, extends_to_full_height: bool) -> Self {
        let mut session = Self {
            phase: PanelPhase::AnimatingPresent,
            drag_translation: 0.0,
            dismiss_velocity: 0.0,
            scroll: None,
            top_inset: 0.0,
            header_height: 0.0,
            extends_to_full_height: false,
            shows_header: false,
        };
        session.sync_options(options, extends_to_full_height);
        session
    }

    pub(super) fn sync_options(&mut self, options: &PanelOptions, extends_to_full_height: bool) {
        self.extends_to_full_height = extends_to_full_height;
        self.top_inset = if extends_to_full_height {
            0.0
        } else {
            options.top_inset
        };
        self.shows_header = options.shows_header;
        self.header_height = if options.shows_header {
            options.header_height
        } else {
            0.0
        };
    }

    pub(super) fn set_phase(&mut self, phase: PanelPhase) {
        if self.phase != phase {
            log::debug!("panel phase {:?} -> {:?}", self.phase, phase);
            self.phase = phase;
        }
    }

    pub fn phase(&self) -> PanelPhase {
        self.phase
    }

    /// Current offset applied to the whole panel by dragging.
    pub fn drag_translation(&self) -> f32 {
        self.drag_translation
    }

    pub fn dismiss_velocity(&self) -> f32 {
        self.dismiss_velocity
    }

    pub fn scroll_session(&self) -> Option<&ScrollSession> {
        self.scroll.as_ref()
    }

    /// Which scroll region owns vertical motion during the current drag.
    pub fn active_scroll_region(&self) -> Option<ScrollOwner> {
        self.scroll.as_ref().map(ScrollSession::owner)
    }

    /// Gap between the top safe-area edge and the outer container.
    pub fn top_inset(&self) -> f32 {
        self.top_inset
    }

    /// Header height currently inset into the content; zero while hidden.
    pub fn header_height(&self) -> f32 {
        self.header_height
    }

    pub fn extends_to_full_height(&self) -> bool {
        self.extends_to_full_height
    }

    pub fn shows_header(&self) -> bool {
        self.shows_header
    }
}
