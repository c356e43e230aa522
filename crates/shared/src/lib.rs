//! Wire model for server-driven declarative screens and the pure layout pass over it.

pub mod domain;
pub mod error;
pub mod layout;
pub mod protocol;
pub mod samples;
