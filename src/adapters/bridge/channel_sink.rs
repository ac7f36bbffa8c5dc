//! Channel sink - delivers UI events into a tokio mpsc channel.
//!
//! The receiving half is the event stream of a submission: it yields events
//! in production order and ends once the sink is dropped.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::ports::{BridgeError, UiEvent, UiEventSink};

#[derive(Debug, Clone)]
pub struct ChannelSink {
    sender: mpsc::Sender<UiEvent>,
}

impl ChannelSink {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    /// Creates a sink together with the receiver it feeds.
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<UiEvent>) {
        let (sender, receiver) = mpsc::channel(buffer);
        (Self::new(sender), receiver)
    }
}

#[async_trait]
impl UiEventSink for ChannelSink {
    async fn emit(&self, event: UiEvent) -> Result<(), BridgeError> {
        self.sender
            .send(event)
            .await
            .map_err(|_| BridgeError::Disconnected)
    }
}
