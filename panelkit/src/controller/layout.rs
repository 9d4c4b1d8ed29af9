use sheetdom::{HitMap, Insets, Rect, ScrollHandle, ScrollMetrics, Size};
use sheetdom::scroll::POINT_PRECISION;

use super::{PanelProperty, PresentationController};

/// The background extends this far below the screen so upward bounces
/// never reveal its bottom edge.
const BACKGROUND_BOTTOM_OUTSET: f32 = 200.0;
/// Scroll indicator top inset when no header is shown.
const INDICATOR_TOP_INSET: f32 = 8.0;
/// Scroll offset over which the header shadow fades in.
const HEADER_SHADOW_FADE_DISTANCE: f32 = 20.0;
/// Observer callbacks may trigger each other; this bounds one sync.
const MAX_SYNC_PASSES: usize = 8;

/// Sizing of the presented content against the room the panel has.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ContentMetrics {
    pub content_height: f32,
    pub available_height: f32,
    /// Space above the content that keeps short content bottom-aligned.
    pub top_inset_needed: f32,
}

impl ContentMetrics {
    pub fn compute(available_height: f32, content_height: f32) -> Self {
        let available_height = available_height.max(0.0);
        let content_height = content_height.max(0.0);
        Self {
            content_height,
            available_height,
            top_inset_needed: (available_height - content_height).max(0.0),
        }
    }

    pub fn exceeds_available(&self) -> bool {
        self.content_height > self.available_height
    }
}

/// Opacity of the divider below the header for a given scroll offset.
pub fn header_shadow_opacity(offset: f32) -> f32 {
    (offset / HEADER_SHADOW_FADE_DISTANCE).clamp(0.0, 1.0)
}

/// Layers of a presented panel, bottom to top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelLayer {
    Dimming,
    Background,
    Container,
    ContentScroll,
    Header,
}

/// Where everything is on screen at one instant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelViews {
    pub dimming: Rect,
    /// Effective alpha of the dimming layer's black.
    pub dim_alpha: f32,
    pub background: Rect,
    pub header: Rect,
    pub header_alpha: f32,
    pub header_shadow_opacity: f32,
    /// Outer scroll container.
    pub container: Rect,
    /// The presented content inside the container.
    pub content: Rect,
    /// Visible part of the content's scroll region.
    pub content_scroll: Option<Rect>,
    pub corner_radius: f32,
    pub opacity: f32,
    pub translation: f32,
}

/// Result of the last layout pass, before scroll offsets and translation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(super) struct Frames {
    pub container: Rect,
    pub presented_height: f32,
    pub header_inset: f32,
    pub fixed_height: f32,
    pub inner_height: Option<f32>,
}

impl PresentationController {
    /// Run layout and observer callbacks until nothing changes.
    pub(super) fn sync_scroll_observers(&mut self) {
        for _ in 0..MAX_SYNC_PASSES {
            if self.needs_layout {
                self.perform_layout();
            }
            let mut changed = false;
            if let Some((_, metrics)) = self.container_observer.poll() {
                self.container_scroll_did_update(metrics);
                changed = true;
            }
            if let Some((region, metrics)) = self.content_observer.poll() {
                self.content_scroll_did_update(&region, metrics);
                changed = true;
            }
            if !changed && !self.needs_layout {
                self.update_panel_top();
                return;
            }
        }
        log::warn!("scroll observers of {} did not settle", self.screen);
        self.update_panel_top();
    }

    pub(super) fn update_content_scroll_region(&mut self) {
        let region = self.content.scroll_region();
        let unchanged = match (&region, self.content_observer.region()) {
            (Some(new), Some(current)) => new.ptr_eq(current),
            (None, None) => true,
            _ => false,
        };
        if unchanged {
            return;
        }
        self.last_inner_content_height = None;
        self.background_bounce = 0.0;
        if region.is_none() {
            self.container_scroll.borrow_mut().always_bounce_vertical = true;
        }
        self.content_observer.observe(region);
    }

    fn perform_layout(&mut self) {
        self.needs_layout = false;
        let extends = self.extends_to_full_height();
        if let Some(session) = self.session.as_mut() {
            session.sync_options(&self.options, extends);
        }

        let top_inset = if extends { 0.0 } else { self.options.top_inset };
        let container_top = self.bounds.y + self.safe_area.top + top_inset;
        let container = Rect::new(
            self.bounds.x,
            container_top,
            self.bounds.width,
            (self.bounds.bottom() - container_top).max(0.0),
        );

        let header_inset = if self.options.shows_header {
            self.options.header_height
        } else {
            0.0
        };
        let fixed_height = self.content.content_height(container.width).max(0.0);
        let chrome = header_inset + fixed_height + self.safe_area.bottom + self.keyboard_inset();
        let available = container.height;

        let inner = self.content_observer.region().cloned();
        let (presented_height, inner_height) = match &inner {
            Some(region) => {
                let inner_content = region.borrow().content_size().height;
                self.last_inner_content_height = Some(inner_content);
                let natural = chrome + inner_content;
                let presented = if extends {
                    available
                } else {
                    natural.min(available)
                };
                let presented = presented.max(chrome);
                (presented, Some(presented - chrome))
            }
            None => {
                let presented = if extends { chrome.max(available) } else { chrome };
                (presented, None)
            }
        };

        self.frames = Frames {
            container,
            presented_height,
            header_inset,
            fixed_height,
            inner_height,
        };
        log::trace!(
            "layout {}: container {:?}, presented height {}",
            self.screen,
            container,
            presented_height
        );

        {
            let mut scroll = self.container_scroll.borrow_mut();
            scroll.set_frame(container);
            scroll.set_content_size(Size::new(container.width, presented_height));
        }
        self.update_content_scroll_frame();
    }

    /// Outer container changed: pin short content to the bottom and keep
    /// the indicator and header shadow in step.
    fn container_scroll_did_update(&mut self, metrics: ScrollMetrics) {
        self.metrics = ContentMetrics::compute(metrics.frame.height, metrics.content_size.height);
        let header_inset = if self.options.shows_header {
            self.options.header_height
        } else {
            INDICATOR_TOP_INSET
        };
        {
            let mut scroll = self.container_scroll.borrow_mut();
            scroll.set_content_inset(Insets::top(self.metrics.top_inset_needed));
            self.container_pan_scoped = scroll.content_exceeds_bounds();
            let overshoot = scroll.metrics().bounce_overshoot();
            scroll.indicator_insets = Insets::top(header_inset + overshoot);
        }
        self.update_content_scroll_frame();
        self.update_header_shadow();
    }

    /// Content's scroll region changed: decide which region scrolls and
    /// let the panel bounce along with it.
    fn content_scroll_did_update(&mut self, region: &ScrollHandle, metrics: ScrollMetrics) {
        let exceeds = metrics.content_exceeds_bounds();
        let overshoot = metrics.bounce_overshoot();
        {
            let mut inner = region.borrow_mut();
            inner.scroll_enabled = exceeds;
            inner.indicator_insets = Insets::top(INDICATOR_TOP_INSET + overshoot);
        }
        self.container_scroll.borrow_mut().always_bounce_vertical = !exceeds;

        let content_height = metrics.content_size.height;
        let resized = self
            .last_inner_content_height
            .is_none_or(|last| (last - content_height).abs() > POINT_PRECISION);
        if resized {
            log::trace!("content scroll height now {}", content_height);
            self.needs_layout = true;
        }
        self.background_bounce = overshoot;
        self.update_header_shadow();
    }

    /// Place the content's scroll region below the fixed part of the
    /// content, in screen coordinates.
    fn update_content_scroll_frame(&mut self) {
        let (Some(region), Some(height)) = (self.content_observer.region(), self.frames.inner_height)
        else {
            return;
        };
        let outer = self.container_scroll.metrics();
        let content_top = outer.frame.y - outer.content_offset;
        let frame = Rect::new(
            outer.frame.x,
            content_top + self.frames.header_inset + self.frames.fixed_height,
            outer.frame.width,
            height,
        );
        region.borrow_mut().set_frame(frame);
    }

    pub(super) fn update_header_shadow(&mut self) {
        if !self.options.fade_header_while_scrolling {
            self.header_shadow = 1.0;
            return;
        }
        let offset = match self.content_observer.region() {
            Some(region) => region.metrics().relative_offset(),
            None => self.container_scroll.metrics().relative_offset(),
        };
        self.header_shadow = header_shadow_opacity(offset);
    }

    fn update_panel_top(&mut self) {
        let outer = self.container_scroll.metrics();
        let content_top = outer.frame.y - outer.content_offset;
        let top = content_top.max(outer.frame.y);
        self.animations.retarget(PanelProperty::PanelTop, top);
    }

    /// Snapshot of the panel's layers at the controller's current time.
    pub fn views(&self) -> PanelViews {
        let now = self.now;
        let translation = self.animations.value(PanelProperty::Translation, now);
        let opacity = self.animations.value(PanelProperty::Opacity, now);
        let dim = self.animations.value(PanelProperty::DimAlpha, now);
        let panel_top = self.animations.value(PanelProperty::PanelTop, now);
        // Distance still to cover while a layout change animates; content
        // rides along with the background until it settles.
        let lag = panel_top - self.animations.target(PanelProperty::PanelTop);

        let outer = self.container_scroll.metrics();
        let width = outer.frame.width;
        let background_top = panel_top + self.background_bounce + translation;
        let background = Rect::new(
            outer.frame.x,
            background_top,
            width,
            (self.bounds.bottom() + BACKGROUND_BOTTOM_OUTSET - background_top).max(0.0),
        );
        let header = Rect::new(
            background.x,
            background.y,
            width,
            self.options.header_height,
        );
        let shift = translation + lag;
        let content_top = outer.frame.y - outer.content_offset + shift;
        let container = outer.frame.translated(0.0, shift);
        let content_scroll = self
            .content_observer
            .region()
            .and_then(|region| region.metrics().frame.translated(0.0, shift).intersection(&container));

        PanelViews {
            dimming: self.bounds,
            dim_alpha: self.options.dim_opacity * dim,
            background,
            header,
            header_alpha: if self.options.shows_header { 1.0 } else { 0.0 },
            header_shadow_opacity: self.header_shadow,
            container,
            content: Rect::new(outer.frame.x, content_top, width, self.frames.presented_height),
            content_scroll,
            corner_radius: self.options.corner_radius,
            opacity,
            translation,
        }
    }

    /// Hit regions of the panel as currently drawn.
    pub(super) fn hit_map(&self) -> HitMap<PanelLayer> {
        let views = self.views();
        let mut map = HitMap::new();
        map.push(PanelLayer::Dimming, views.dimming);
        map.push(PanelLayer::Background, views.background);
        map.push(PanelLayer::Container, views.container);
        if let Some(rect) = views.content_scroll {
            map.push(PanelLayer::ContentScroll, rect);
        }
        if self.options.shows_header {
            map.push(PanelLayer::Header, views.header);
        }
        map
    }

    /// Topmost layer under `point`.
    pub fn layer_at(&self, point: sheetdom::Point) -> Option<PanelLayer> {
        self.hit_map().hit_test(point)
    }
}
