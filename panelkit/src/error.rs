//! Error types.

use thiserror::Error;

use crate::presentable::ScreenId;

/// Errors returned by presentation entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PanelError {
    /// `present` was called before a screen was bound to the presenter.
    #[error("presenter has no bound screen")]
    NoBoundScreen,

    /// The screen is not registered with the host.
    #[error("screen not registered: {0}")]
    ScreenNotFound(ScreenId),

    /// Another panel is already on screen. Panels don't stack.
    #[error("a panel is already presented: {0}")]
    AlreadyPresenting(ScreenId),

    /// The screen is registered but not currently presented as a panel.
    #[error("screen is not presented: {0}")]
    NotPresented(ScreenId),

    /// A screen cannot present itself.
    #[error("screen cannot present itself: {0}")]
    SelfPresentation(ScreenId),
}

/// Errors while installing the file logger.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("failed to open log file: {0}")]
    Io(#[from] std::io::Error),

    #[error("logger already installed: {0}")]
    AlreadyInstalled(#[from] log::SetLoggerError),
}
