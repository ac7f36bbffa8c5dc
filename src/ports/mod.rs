//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the core and the outside world. Adapters implement these ports.
//!
//! - `CompletionProvider` - Streaming chat-completion transport
//! - `SecretStore` - API key storage
//! - `UiEventSink` - Delivery of UI events to the presentation layer

mod completion_provider;
mod secret_store;
mod ui_bridge;

pub use completion_provider::{
    ByteStream, ChatRequest, CompletionError, CompletionProvider, ProviderResponse,
};
pub use secret_store::{SecretStore, SecretStoreError, API_KEY_SECRET_ID};
pub use ui_bridge::{BridgeError, PanelCommand, UiEvent, UiEventSink};
