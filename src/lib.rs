//! Kepler exoplanet chat assistant.
//!
//! Questions go either straight to the generative-language API through a
//! fallback chain of API versions and models ([`llm::retriever`]) or to a
//! backend proxy route ([`llm::relay`]). [`chat`] holds the headless widget
//! state the terminal front-end renders.

pub mod chat;
pub mod commands;
pub mod config;
pub mod llm;
pub mod logging;
