//! Draggable, content-sized bottom panels with interactive dismissal.
//!
//! A [`PanelPresenter`] binds a screen to the panel presentation machinery.
//! The [`ModalHost`] retains whatever is on screen, owns the
//! [`PresentationController`] for the presented panel and routes pointer
//! input, ticks and transition completions to it.

pub mod animator;
pub mod arbiter;
pub mod controller;
pub mod coordinator;
pub mod error;
pub mod host;
pub mod logging;
pub mod observer;
pub mod options;
pub mod presentable;

pub use animator::{
    MotionPreferences, TransitionAnimator, TransitionContext, TransitionDirection, dismiss_duration,
};
pub use arbiter::{Claim, GestureArbiter, Recognizer, RegionState, ScrollOwner, TouchContext};
pub use controller::{
    ContentMetrics, PanelLayer, PanelPhase, PanelProperty, PanelRequest, PanelSession, PanelViews,
    PresentationController, ScrollSession, header_shadow_opacity,
};
pub use coordinator::{PanelPresenter, PresenterId, TransitioningDelegate};
pub use error::{LoggingError, PanelError};
pub use host::{HostEvent, ModalHost, TintMode};
pub use observer::ScrollCoordinationObserver;
pub use options::PanelOptions;
pub use presentable::{FixedContent, PanelPresentable, ScreenId};

pub mod prelude {
    pub use crate::animator::MotionPreferences;
    pub use crate::coordinator::PanelPresenter;
    pub use crate::host::{HostEvent, ModalHost};
    pub use crate::options::PanelOptions;
    pub use crate::presentable::{FixedContent, PanelPresentable, ScreenId};
    pub use sheetdom::{Insets, Point, Rect, ScrollHandle, Size};
}
