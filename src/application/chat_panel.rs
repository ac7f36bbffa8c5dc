//! Chat panel controller - dispatches panel commands to a chat session.
//!
//! Owns the session, the selected model and access to the API key. Every
//! outcome is reported to the presentation layer through the event sink,
//! so `handle` never fails.

use secrecy::{ExposeSecret, SecretString};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::chat_session::{ChatError, ChatSession, SubmissionOutcome};
use crate::domain::models::{is_known_model, DEFAULT_MODEL};
use crate::ports::{
    CompletionProvider, PanelCommand, SecretStore, UiEvent, UiEventSink, API_KEY_SECRET_ID,
};

/// Controller for one chat panel.
pub struct ChatPanel<P: CompletionProvider + ?Sized, S: SecretStore + ?Sized> {
    session: ChatSession<P>,
    secrets: Arc<S>,
    model: String,
}

impl<P: CompletionProvider + ?Sized, S: SecretStore + ?Sized> ChatPanel<P, S> {
    pub fn new(session: ChatSession<P>, secrets: Arc<S>) -> Self {
        Self::with_model(session, secrets, DEFAULT_MODEL)
    }

    pub fn with_model(session: ChatSession<P>, secrets: Arc<S>, model: impl Into<String>) -> Self {
        Self {
            session,
            secrets,
            model: model.into(),
        }
    }

    /// Currently selected model.
    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn session(&self) -> &ChatSession<P> {
        &self.session
    }

    /// Handles one command from the presentation layer.
    ///
    /// Returns the outcome when the command was a submission that reached
    /// the endpoint.
    pub async fn handle(
        &mut self,
        command: PanelCommand,
        sink: &dyn UiEventSink,
    ) -> Option<SubmissionOutcome> {
        match command {
            PanelCommand::Submit { content } => self.submit(&content, sink).await,
            PanelCommand::SelectModel { content } => {
                self.select_model(content);
                None
            }
            PanelCommand::SetContext { .. } => {
                debug!("Ignoring setContext; turns are recorded on completion");
                None
            }
            PanelCommand::OpenChatWindow => {
                info!("Opening new chat window");
                self.session.reset();
                None
            }
            PanelCommand::WebviewError { content } => {
                error!(%content, "Panel reported an error");
                None
            }
        }
    }

    fn select_model(&mut self, model: String) {
        let model = model.trim();
        if model.is_empty() {
            warn!("Ignoring empty model selection");
            return;
        }
        if !is_known_model(model) {
            warn!(model, "Selected model is not in the catalog");
        }
        debug!(model, "Model selected");
        self.model = model.to_string();
    }

    async fn submit(&mut self, text: &str, sink: &dyn UiEventSink) -> Option<SubmissionOutcome> {
        if text.trim().is_empty() {
            debug!("Ignoring empty submission");
            return None;
        }

        let result = match self.api_key().await {
            Ok(api_key) => {
                self.session
                    .submit(text, &self.model, &api_key, sink)
                    .await
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                warn!(error = %e, "Submission failed");
                if let Err(emit_error) = sink.emit(UiEvent::error_message(e.to_string())).await {
                    warn!(error = %emit_error, "Failed to deliver UI event");
                }
                None
            }
        }
    }

    async fn api_key(&self) -> Result<SecretString, ChatError> {
        match self.secrets.get(API_KEY_SECRET_ID).await? {
            Some(key) if !key.expose_secret().trim().is_empty() => Ok(key),
            _ => Err(ChatError::MissingApiKey),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::bridge::RecordingSink;
    use crate::adapters::completion::{frames, MockCompletionProvider};
    use crate::adapters::secrets::InMemorySecretStore;
    use serde_json::json;

    fn panel_with(
        provider: &MockCompletionProvider,
        secrets: InMemorySecretStore,
    ) -> ChatPanel<MockCompletionProvider, InMemorySecretStore> {
        ChatPanel::new(
            ChatSession::new(Arc::new(provider.clone())),
            Arc::new(secrets),
        )
    }

    fn keyed() -> InMemorySecretStore {
        InMemorySecretStore::with_secret(API_KEY_SECRET_ID, "pplx-test")
    }

    fn submit(text: &str) -> PanelCommand {
        PanelCommand::Submit {
            content: text.to_string(),
        }
    }

    mod submit {
        use super::*;

        #[tokio::test]
        async fn uses_selected_model() {
            let provider = MockCompletionProvider::new();
            let mut panel = panel_with(&provider, keyed());
            let sink = RecordingSink::new();

            panel
                .handle(
                    PanelCommand::SelectModel {
                        content: "sonar-pro".to_string(),
                    },
                    &sink,
                )
                .await;
            let outcome = panel.handle(submit("hi"), &sink).await;

            assert!(matches!(outcome, Some(SubmissionOutcome::Completed(_))));
            assert_eq!(provider.get_calls()[0].model, "sonar-pro");
            assert_eq!(sink.events().last(), Some(&UiEvent::Complete));
        }

        #[tokio::test]
        async fn missing_key_reports_error_without_request() {
            let provider = MockCompletionProvider::new();
            let mut panel = panel_with(&provider, InMemorySecretStore::new());
            let sink = RecordingSink::new();

            let outcome = panel.handle(submit("hi"), &sink).await;

            assert!(outcome.is_none());
            assert_eq!(provider.call_count(), 0);
            assert_eq!(
                sink.events(),
                vec![UiEvent::error_message("API key not configured")]
            );
        }

        #[tokio::test]
        async fn blank_key_counts_as_missing() {
            let provider = MockCompletionProvider::new();
            let secrets = InMemorySecretStore::with_secret(API_KEY_SECRET_ID, "  ");
            let mut panel = panel_with(&provider, secrets);
            let sink = RecordingSink::new();

            panel.handle(submit("hi"), &sink).await;

            assert_eq!(provider.call_count(), 0);
        }

        #[tokio::test]
        async fn empty_text_is_ignored() {
            let provider = MockCompletionProvider::new();
            let mut panel = panel_with(&provider, keyed());
            let sink = RecordingSink::new();

            assert!(panel.handle(submit("   "), &sink).await.is_none());
            assert_eq!(provider.call_count(), 0);
            assert!(sink.events().is_empty());
        }

        #[tokio::test]
        async fn transport_failure_becomes_error_event() {
            let provider = MockCompletionProvider::new().with_connection_failure("refused");
            let mut panel = panel_with(&provider, keyed());
            let sink = RecordingSink::new();

            panel.handle(submit("hi"), &sink).await;

            match &sink.events()[..] {
                [UiEvent::Error { content }] => {
                    let message = content.as_str().unwrap();
                    assert!(message.starts_with("Failed to complete request:"));
                }
                other => panic!("unexpected events {other:?}"),
            }
        }
    }

    mod control {
        use super::*;

        #[tokio::test]
        async fn open_chat_window_starts_fresh_context() {
            let provider = MockCompletionProvider::new()
                .with_stream(vec![frames::content("a"), frames::stop(&[])]);
            let mut panel = panel_with(&provider, keyed());
            let sink = RecordingSink::new();

            panel.handle(submit("hi"), &sink).await;
            assert_eq!(panel.session().context().turn_count(), 1);

            panel.handle(PanelCommand::OpenChatWindow, &sink).await;
            assert!(panel.session().context().is_empty());
        }

        #[tokio::test]
        async fn set_context_does_not_touch_context() {
            let provider = MockCompletionProvider::new();
            let mut panel = panel_with(&provider, keyed());
            let sink = RecordingSink::new();

            panel
                .handle(
                    PanelCommand::SetContext {
                        prompt: Some("p".to_string()),
                        response: Some("r".to_string()),
                    },
                    &sink,
                )
                .await;

            assert!(panel.session().context().is_empty());
            assert!(sink.events().is_empty());
        }

        #[tokio::test]
        async fn unknown_model_is_still_selected() {
            let provider = MockCompletionProvider::new();
            let mut panel = panel_with(&provider, keyed());
            let sink = RecordingSink::new();

            panel
                .handle(
                    PanelCommand::SelectModel {
                        content: "custom-model".to_string(),
                    },
                    &sink,
                )
                .await;

            assert_eq!(panel.model(), "custom-model");
        }

        #[tokio::test]
        async fn empty_model_keeps_previous_selection() {
            let provider = MockCompletionProvider::new();
            let mut panel = panel_with(&provider, keyed());
            let sink = RecordingSink::new();

            panel
                .handle(
                    PanelCommand::SelectModel {
                        content: " ".to_string(),
                    },
                    &sink,
                )
                .await;

            assert_eq!(panel.model(), DEFAULT_MODEL);
        }

        #[tokio::test]
        async fn webview_error_is_only_logged() {
            let provider = MockCompletionProvider::new();
            let mut panel = panel_with(&provider, keyed());
            let sink = RecordingSink::new();

            let outcome = panel
                .handle(
                    PanelCommand::WebviewError {
                        content: json!({"message": "boom"}),
                    },
                    &sink,
                )
                .await;

            assert!(outcome.is_none());
            assert!(sink.events().is_empty());
        }
    }
}
