//! Perplexity Chat - streaming chat bridge for a side-panel UI.
//!
//! Relays user questions to the Perplexity chat-completion API, streams the
//! answer back as UI events, surfaces citations and keeps a short rolling
//! conversation context.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
