//! UI layer for the desktop GUI: the app shell and the declarative widget mapping.

pub mod app;
pub mod widgets;

pub use app::{DeclarativeUiApp, ScreenSource, StartupConfig};
