//! Panel configuration.

use serde::{Deserialize, Serialize};

/// Appearance and behavior of a presented panel.
///
/// Changes take effect on the controller's next layout pass. Missing fields
/// fall back to their defaults when deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelOptions {
    /// Opacity of the dimming layer behind the panel (0.0 - 1.0).
    pub dim_opacity: f32,

    /// Whether the header is shown above the content.
    pub shows_header: bool,

    /// Height of the header, also applied as a top inset to the content
    /// while the header is shown.
    pub header_height: f32,

    /// Radius of the panel's two top corners.
    pub corner_radius: f32,

    /// Gap between the top safe-area edge and the highest point the panel
    /// can reach.
    pub top_inset: f32,

    /// Fade the header divider in as content scrolls instead of always
    /// showing it.
    pub fade_header_while_scrolling: bool,

    /// Dim the presenting screen's tint while the panel is shown.
    pub should_adjust_presenter_tint_mode: bool,

    /// Take up all available height instead of sizing to content.
    pub extends_to_full_height: bool,
}

impl Default for PanelOptions {
    fn default() -> Self {
        Self {
            dim_opacity: 0.45,
            shows_header: false,
            header_height: 50.0,
            corner_radius: 16.0,
            top_inset: 10.0,
            fade_header_while_scrolling: true,
            should_adjust_presenter_tint_mode: true,
            extends_to_full_height: false,
        }
    }
}

impl PanelOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dim_opacity(mut self, opacity: f32) -> Self {
        self.dim_opacity = opacity.clamp(0.0, 1.0);
        self
    }

    /// Show the header at the given height.
    pub fn header(mut self, height: f32) -> Self {
        self.shows_header = true;
        self.header_height = height.max(0.0);
        self
    }

    pub fn corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius.max(0.0);
        self
    }

    pub fn top_inset(mut self, inset: f32) -> Self {
        self.top_inset = inset.max(0.0);
        self
    }

    pub fn fade_header_while_scrolling(mut self, fade: bool) -> Self {
        self.fade_header_while_scrolling = fade;
        self
    }

    pub fn adjust_presenter_tint(mut self, adjust: bool) -> Self {
        self.should_adjust_presenter_tint_mode = adjust;
        self
    }

    pub fn full_height(mut self) -> Self {
        self.extends_to_full_height = true;
        self
    }
}
