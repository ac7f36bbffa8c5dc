//! JSON-lines bridge - carries the panel protocol over a byte stream.
//!
//! Each inbound line is one `PanelCommand`, each outbound line one `UiEvent`.
//! The host binary runs it over stdin/stdout; tests use in-memory buffers.

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::application::ChatPanel;
use crate::ports::{
    BridgeError, CompletionProvider, PanelCommand, SecretStore, UiEvent, UiEventSink,
};

/// Writes UI events as newline-terminated JSON.
#[derive(Debug)]
pub struct JsonLinesSink<W> {
    writer: Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send> UiEventSink for JsonLinesSink<W> {
    async fn emit(&self, event: UiEvent) -> Result<(), BridgeError> {
        let mut line =
            serde_json::to_vec(&event).map_err(|e| BridgeError::Malformed(e.to_string()))?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await.map_err(io_error)?;
        writer.flush().await.map_err(io_error)
    }
}

fn io_error(e: std::io::Error) -> BridgeError {
    match e.kind() {
        std::io::ErrorKind::BrokenPipe => BridgeError::Disconnected,
        _ => BridgeError::Io(e.to_string()),
    }
}

/// Reads panel commands and answers them with UI events.
pub struct JsonLinesBridge<R, W> {
    reader: R,
    sink: JsonLinesSink<W>,
}

impl<R, W> JsonLinesBridge<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            sink: JsonLinesSink::new(writer),
        }
    }

    /// Consumes the bridge, returning the output writer.
    pub fn into_writer(self) -> W {
        self.sink.into_inner()
    }

    /// Serves commands until the input ends.
    ///
    /// Malformed lines are answered with an `error` event and skipped.
    /// Returns `Err` only if the input cannot be read.
    pub async fn run<P, S>(&mut self, panel: &mut ChatPanel<P, S>) -> Result<(), BridgeError>
    where
        P: CompletionProvider + ?Sized,
        S: SecretStore + ?Sized,
    {
        info!("Bridge listening for panel commands");
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let read = self
                .reader
                .read_until(b'\n', &mut buf)
                .await
                .map_err(|e| BridgeError::Io(e.to_string()))?;
            if read == 0 {
                break;
            }

            let line = match std::str::from_utf8(&buf) {
                Ok(line) => line.trim(),
                Err(e) => {
                    self.reject(BridgeError::Malformed(e.to_string())).await;
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            match serde_json::from_str::<PanelCommand>(line) {
                Ok(command) => {
                    debug!(?command, "Panel command received");
                    panel.handle(command, &self.sink).await;
                }
                Err(e) => self.reject(BridgeError::Malformed(e.to_string())).await,
            }
        }

        info!("Panel input closed");
        Ok(())
    }

    /// Answers an unusable line with an `error` event.
    async fn reject(&self, err: BridgeError) {
        warn!(error = %err, "Dropping panel message");
        if let Err(emit_error) = self.sink.emit(UiEvent::error_message(err.to_string())).await {
            warn!(error = %emit_error, "Failed to deliver UI event");
        }
    }
}
