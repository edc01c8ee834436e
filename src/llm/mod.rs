//! Reply retrieval from a remote text-generation service.
//!
//! The direct variant ([`retriever`]) walks a fallback chain of API versions
//! and models; the proxy variant ([`relay`]) hands the message to a backend
//! route and relays whatever it answers.

pub(crate) mod attempt;
/// Generative-language REST client.
pub mod gemini;
/// Model discovery and ranking.
pub mod listing;
/// Backend-proxy message relay.
pub mod relay;
/// Fallback-chain answer retriever.
pub mod retriever;
#[cfg(test)]
pub(crate) mod scripted;
/// Shared data model and the service seam.
pub mod service;
