//! The capability contract presented content implements.

use std::cell::Cell;

use sheetdom::ScrollHandle;
use uuid::Uuid;

/// Unique identifier for a screen registered with a [`ModalHost`](crate::ModalHost).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ScreenId(Uuid);

impl ScreenId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ScreenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Content that can be shown in a panel.
///
/// Only [`content_height`](PanelPresentable::content_height) is required;
/// everything else has a default matching plain, non-scrolling content that
/// can always be dismissed.
pub trait PanelPresentable {
    /// Natural height of the fixed part of the content at the given width.
    ///
    /// When a [`scroll_region`](PanelPresentable::scroll_region) is supplied
    /// this excludes it; the region is laid out directly below this part and
    /// sized from its own content height.
    fn content_height(&self, width: f32) -> f32;

    /// A vertically scrolling region inside the content (a list, say) that
    /// the panel should cooperate with for sizing and swipe-to-dismiss.
    fn scroll_region(&self) -> Option<ScrollHandle> {
        None
    }

    /// Return `false` to (temporarily) block dismissal by drag or tap.
    fn can_be_dismissed(&self) -> bool {
        true
    }

    /// Take up all available height instead of sizing to content.
    fn extends_to_full_height(&self) -> bool {
        false
    }

    /// Whether the presenting screen should be dimmed.
    fn should_dim_presenter(&self) -> bool {
        true
    }

    /// Name used in log output.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Plain content with an adjustable fixed height.
///
/// Also serves as the stand-in for presenting screens, which don't need any
/// panel behavior.
#[derive(Debug)]
pub struct FixedContent {
    height: Cell<f32>,
    dismissible: Cell<bool>,
}

impl FixedContent {
    pub fn new(height: f32) -> Self {
        Self {
            height: Cell::new(height),
            dismissible: Cell::new(true),
        }
    }

    pub fn height(&self) -> f32 {
        self.height.get()
    }

    pub fn set_height(&self, height: f32) {
        self.height.set(height.max(0.0));
    }

    pub fn set_dismissible(&self, dismissible: bool) {
        self.dismissible.set(dismissible);
    }
}

impl PanelPresentable for FixedContent {
    fn content_height(&self, _width: f32) -> f32 {
        self.height.get()
    }

    fn can_be_dismissed(&self) -> bool {
        self.dismissible.get()
    }
}
