//! Headless chat widget: message list, input box, and the controller that
//! ties UI events to retrievals.

/// Input box state and key handling.
pub mod composer;
/// Event-to-effect controller.
pub mod controller;
/// Message list.
pub mod transcript;
