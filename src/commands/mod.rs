//! CLI front-ends shared by the `exochat` and `exoask` binaries.

pub mod ask;
pub mod chat;
pub mod config;
pub mod models;
pub mod relay;
/// Flag, environment, and profile resolution.
pub mod settings;
