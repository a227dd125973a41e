//! HTTP handlers, grouped by resource.

pub mod auth;
pub mod generate;
pub mod history;
pub mod settings;
