//! Worker-thread side of the GUI: commands in, [`crate::controller::events::UiEvent`]s out.

pub mod commands;
pub mod runtime;
