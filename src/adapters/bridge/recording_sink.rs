//! Recording sink for testing.
//!
//! Keeps every emitted event in order so tests can assert on the exact
//! sequence the presentation layer would have seen.
//!
//! # Panics
//!
//! Methods panic if the internal lock is poisoned. Test use only.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};

use crate::ports::{BridgeError, UiEvent, UiEventSink};

#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<UiEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all events emitted so far.
    pub fn events(&self) -> Vec<UiEvent> {
        self.events
            .lock()
            .expect("RecordingSink: events lock poisoned")
            .clone()
    }
}

#[async_trait]
impl UiEventSink for RecordingSink {
    async fn emit(&self, event: UiEvent) -> Result<(), BridgeError> {
        self.events
            .lock()
            .expect("RecordingSink: events lock poisoned")
            .push(event);
        Ok(())
    }
}
