//! Chat session - drives one submission from request to finalized turn.
//!
//! A session owns its conversation context. Each `submit` builds the request
//! payload, feeds the response body through a `FrameParser`, forwards UI
//! events to the sink as they are produced, and on a normal stop appends the
//! finalized turn to the context.

use futures::StreamExt;
use secrecy::SecretString;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CompletionConfig;
use crate::domain::conversation::{ConversationContext, FinalizedAnswer, Message, ReasoningFilter};
use crate::domain::streaming::{FrameParser, StreamEvent, TerminalReason};
use crate::ports::{
    ChatRequest, CompletionProvider, ProviderResponse, SecretStoreError, UiEvent, UiEventSink,
};

/// Reason used when the consecutive parse-error cap is reached.
pub const TOO_MANY_MALFORMED_FRAMES: &str = "too many malformed frames";

/// Errors that end a submission without an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    #[error("API key not configured")]
    MissingApiKey,

    #[error("Failed to complete request: {0}")]
    Transport(String),

    #[error(transparent)]
    Secrets(#[from] SecretStoreError),
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// Normal stop; the turn was appended to the context.
    Completed(FinalizedAnswer),
    /// The endpoint answered with a non-success status.
    Rejected { status: u16 },
    /// The stream ended with a non-stop reason.
    Aborted { reason: String },
}

/// Settings for a chat session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatSessionConfig {
    /// Instruction sent as the first message of every request.
    pub system_prompt: String,
    /// Completed turns kept as context.
    pub context_turns: usize,
    /// Consecutive malformed frames tolerated before giving up.
    pub max_consecutive_parse_errors: u32,
}

impl Default for ChatSessionConfig {
    fn default() -> Self {
        Self::from(&CompletionConfig::default())
    }
}

impl From<&CompletionConfig> for ChatSessionConfig {
    fn from(config: &CompletionConfig) -> Self {
        Self {
            system_prompt: config.system_prompt.clone(),
            context_turns: config.context_turns,
            max_consecutive_parse_errors: config.max_consecutive_parse_errors,
        }
    }
}

/// Per-submission bookkeeping.
#[derive(Debug, Default)]
struct StreamProgress {
    text: String,
    citations: Vec<String>,
    consecutive_parse_errors: u32,
}

/// A conversation with the completion endpoint.
pub struct ChatSession<P: CompletionProvider + ?Sized> {
    provider: Arc<P>,
    context: ConversationContext,
    filter: ReasoningFilter,
    config: ChatSessionConfig,
}

impl<P: CompletionProvider + ?Sized> ChatSession<P> {
    /// Creates a session with default settings.
    pub fn new(provider: Arc<P>) -> Self {
        Self::with_config(provider, ChatSessionConfig::default())
    }

    /// Creates a session with custom settings.
    pub fn with_config(provider: Arc<P>, config: ChatSessionConfig) -> Self {
        Self {
            provider,
            context: ConversationContext::new(config.context_turns),
            filter: ReasoningFilter::new(),
            config,
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn config(&self) -> &ChatSessionConfig {
        &self.config
    }

    /// Forgets all prior turns.
    pub fn reset(&mut self) {
        self.context = ConversationContext::new(self.config.context_turns);
    }

    /// Sends `user_text` to `model` and streams the answer to `sink`.
    ///
    /// `Err` is returned only when the transport fails; every other outcome
    /// has already been reported to the sink when this returns.
    pub async fn submit(
        &mut self,
        user_text: &str,
        model: &str,
        api_key: &SecretString,
        sink: &dyn UiEventSink,
    ) -> Result<SubmissionOutcome, ChatError> {
        // 1. Build the payload
        let request = self.build_request(user_text, model);
        info!(
            model,
            context_turns = self.context.turn_count(),
            "Submitting chat request"
        );

        // 2. Send it
        let response = self
            .provider
            .stream_chat(&request, api_key)
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let mut body = match response {
            ProviderResponse::Streaming(body) => body,
            ProviderResponse::Rejected { status, body } => {
                warn!(status, "Chat request rejected");
                emit(sink, UiEvent::error_payload(body)).await;
                return Ok(SubmissionOutcome::Rejected { status });
            }
        };

        // 3. Drive the parser until a terminal event or end of body
        let mut parser = FrameParser::new();
        let mut progress = StreamProgress::default();

        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| ChatError::Transport(e.to_string()))?;
            for event in parser.push(&chunk) {
                if let Some(reason) = self.apply(event, &mut progress, sink).await {
                    return Ok(self.conclude(user_text, reason, progress, sink).await);
                }
            }
        }

        for event in parser.finish() {
            if let Some(reason) = self.apply(event, &mut progress, sink).await {
                return Ok(self.conclude(user_text, reason, progress, sink).await);
            }
        }

        // finish() always yields a terminal event; this is only reached if it did not
        Ok(self
            .conclude(user_text, TerminalReason::Stop, progress, sink)
            .await)
    }

    fn build_request(&self, user_text: &str, model: &str) -> ChatRequest {
        let mut messages = Vec::with_capacity(self.context.len() + 2);
        messages.push(Message::system(self.config.system_prompt.as_str()));
        messages.extend(self.context.snapshot());
        messages.push(Message::user(user_text));
        ChatRequest::streaming(model, messages)
    }

    /// Handles one parser event. Returns the terminal reason once the stream is over.
    async fn apply(
        &self,
        event: StreamEvent,
        progress: &mut StreamProgress,
        sink: &dyn UiEventSink,
    ) -> Option<TerminalReason> {
        match event {
            StreamEvent::ContentDelta(delta) => {
                progress.consecutive_parse_errors = 0;
                progress.text.push_str(&delta);
                emit(sink, UiEvent::stream(delta)).await;
                None
            }
            StreamEvent::CitationSnapshot(citations) => {
                progress.consecutive_parse_errors = 0;
                progress.citations = citations;
                None
            }
            StreamEvent::Terminal(reason) => Some(reason),
            StreamEvent::ParseError { line, cause } => {
                progress.consecutive_parse_errors += 1;
                warn!(
                    %line,
                    %cause,
                    consecutive = progress.consecutive_parse_errors,
                    "Malformed stream frame"
                );
                emit(
                    sink,
                    UiEvent::error_message(format!("Failed to parse stream frame: {}", cause)),
                )
                .await;

                if progress.consecutive_parse_errors >= self.config.max_consecutive_parse_errors {
                    Some(TerminalReason::Error(TOO_MANY_MALFORMED_FRAMES.to_string()))
                } else {
                    None
                }
            }
        }
    }

    async fn conclude(
        &mut self,
        user_text: &str,
        reason: TerminalReason,
        progress: StreamProgress,
        sink: &dyn UiEventSink,
    ) -> SubmissionOutcome {
        match reason {
            TerminalReason::Stop => {
                let answer = FinalizedAnswer::new(
                    self.filter.finalize(&progress.text),
                    progress.citations,
                );

                for citation in answer.citations_for_display() {
                    emit(sink, UiEvent::source(citation)).await;
                }

                self.context.append(user_text, answer.visible_text.as_str());
                emit(sink, UiEvent::Complete).await;

                debug!(
                    citations = answer.citations.len(),
                    context_turns = self.context.turn_count(),
                    "Chat response complete"
                );
                SubmissionOutcome::Completed(answer)
            }
            TerminalReason::Error(reason) => {
                warn!(%reason, "Chat stream ended abnormally");
                emit(sink, UiEvent::error_message(reason.as_str())).await;
                SubmissionOutcome::Aborted { reason }
            }
        }
    }
}

/// Delivers an event; a failed delivery is logged and otherwise ignored.
async fn emit(sink: &dyn UiEventSink, event: UiEvent) {
    if let Err(e) = sink.emit(event).await {
        warn!(error = %e, "Failed to deliver UI event");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::bridge::RecordingSink;
    use crate::adapters::completion::{frames, MockCompletionProvider, MockResponse};
    use crate::domain::conversation::Role;
    use serde_json::json;

    fn key() -> SecretString {
        SecretString::new("pplx-test".to_string())
    }

    fn session(provider: &MockCompletionProvider) -> ChatSession<MockCompletionProvider> {
        ChatSession::new(Arc::new(provider.clone()))
    }

    mod completed {
        use super::*;

        #[tokio::test]
        async fn streams_deltas_then_sources_then_complete() {
            let provider = MockCompletionProvider::new().with_stream(vec![
                frames::content("4"),
                frames::stop(&["a.com", "b.com"]),
            ]);
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            let outcome = session.submit("2+2?", "sonar", &key(), &sink).await.unwrap();

            assert_eq!(
                sink.events(),
                vec![
                    UiEvent::stream("4"),
                    UiEvent::source("b.com"),
                    UiEvent::source("a.com"),
                    UiEvent::Complete,
                ]
            );
            assert_eq!(
                outcome,
                SubmissionOutcome::Completed(FinalizedAnswer::new(
                    "4",
                    vec!["a.com".to_string(), "b.com".to_string()]
                ))
            );
            assert_eq!(
                session.context().snapshot(),
                vec![Message::user("2+2?"), Message::assistant("4")]
            );
        }

        #[tokio::test]
        async fn request_carries_system_context_and_user_message() {
            let provider = MockCompletionProvider::new()
                .with_stream(vec![frames::content("first"), frames::stop(&[])])
                .with_stream(vec![frames::content("second"), frames::stop(&[])]);
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            session.submit("one", "sonar", &key(), &sink).await.unwrap();
            session.submit("two", "sonar-pro", &key(), &sink).await.unwrap();

            let calls = provider.get_calls();
            assert_eq!(calls[1].model, "sonar-pro");
            assert!(calls[1].stream);
            assert_eq!(
                calls[1].messages,
                vec![
                    Message::system("Make sure you are correct!"),
                    Message::user("one"),
                    Message::assistant("first"),
                    Message::user("two"),
                ]
            );
        }

        #[tokio::test]
        async fn reasoning_is_streamed_but_not_stored() {
            let provider = MockCompletionProvider::new().with_stream(vec![
                frames::content("<think>hmm</think>"),
                frames::content("Answer"),
                frames::stop(&[]),
            ]);
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            let outcome = session.submit("q", "sonar-reasoning", &key(), &sink).await.unwrap();

            assert_eq!(sink.events()[0], UiEvent::stream("<think>hmm</think>"));
            match outcome {
                SubmissionOutcome::Completed(answer) => assert_eq!(answer.visible_text, "Answer"),
                other => panic!("expected completion, got {other:?}"),
            }
            let stored = session.context().snapshot();
            assert_eq!(stored[1].role(), Role::Assistant);
            assert_eq!(stored[1].content(), "Answer");
        }

        #[tokio::test]
        async fn earlier_citations_survive_frames_without_them() {
            let provider = MockCompletionProvider::new().with_stream(vec![
                frames::citations(&["x.com"]),
                frames::citations(&["y.com", "z.com"]),
                frames::content("answer"),
                frames::finish("stop"),
            ]);
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            let outcome = session.submit("q", "sonar", &key(), &sink).await.unwrap();

            assert_eq!(
                sink.events(),
                vec![
                    UiEvent::stream(""),
                    UiEvent::stream(""),
                    UiEvent::stream("answer"),
                    UiEvent::source("z.com"),
                    UiEvent::source("y.com"),
                    UiEvent::Complete,
                ]
            );
            match outcome {
                SubmissionOutcome::Completed(answer) => {
                    assert_eq!(answer.citations, vec!["y.com", "z.com"])
                }
                other => panic!("expected completion, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn end_of_body_without_stop_frame_completes() {
            let provider = MockCompletionProvider::new().with_stream(vec![frames::content("partial")]);
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            let outcome = session.submit("q", "sonar", &key(), &sink).await.unwrap();

            assert!(matches!(outcome, SubmissionOutcome::Completed(_)));
            assert_eq!(sink.events().last(), Some(&UiEvent::Complete));
            assert_eq!(session.context().turn_count(), 1);
        }

        #[tokio::test]
        async fn frames_split_across_chunks_are_reassembled() {
            let body = format!("{}{}", frames::content("héllo"), frames::stop(&[]));
            let bytes = body.into_bytes();
            let chunks = bytes.chunks(3).map(<[u8]>::to_vec).collect();
            let provider = MockCompletionProvider::new().with_chunks(chunks);
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            session.submit("q", "sonar", &key(), &sink).await.unwrap();

            assert_eq!(sink.events(), vec![UiEvent::stream("héllo"), UiEvent::Complete]);
        }
    }

    mod failures {
        use super::*;

        #[tokio::test]
        async fn rejection_emits_body_and_keeps_context() {
            let provider =
                MockCompletionProvider::new().with_rejection(401, json!({"error": "unauthorized"}));
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            let outcome = session.submit("q", "sonar", &key(), &sink).await.unwrap();

            assert_eq!(outcome, SubmissionOutcome::Rejected { status: 401 });
            assert_eq!(
                sink.events(),
                vec![UiEvent::error_payload(json!({"error": "unauthorized"}))]
            );
            assert!(session.context().is_empty());
        }

        #[tokio::test]
        async fn non_stop_finish_reason_aborts() {
            let provider = MockCompletionProvider::new()
                .with_stream(vec![frames::content("cut"), frames::finish("length")]);
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            let outcome = session.submit("q", "sonar", &key(), &sink).await.unwrap();

            assert_eq!(
                outcome,
                SubmissionOutcome::Aborted {
                    reason: "length".to_string()
                }
            );
            assert_eq!(
                sink.events(),
                vec![UiEvent::stream("cut"), UiEvent::error_message("length")]
            );
            assert!(session.context().is_empty());
        }

        #[tokio::test]
        async fn parse_error_is_reported_and_stream_continues() {
            let provider = MockCompletionProvider::new().with_stream(vec![
                "data: {not json\n".to_string(),
                frames::content("ok"),
                frames::stop(&[]),
            ]);
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            let outcome = session.submit("q", "sonar", &key(), &sink).await.unwrap();

            let events = sink.events();
            assert!(matches!(events[0], UiEvent::Error { .. }));
            assert_eq!(events[1], UiEvent::stream("ok"));
            assert_eq!(events[2], UiEvent::Complete);
            assert!(matches!(outcome, SubmissionOutcome::Completed(_)));
        }

        #[tokio::test]
        async fn consecutive_parse_errors_are_capped() {
            let provider = MockCompletionProvider::new().with_stream(vec![
                "data: {bad\n".to_string(),
                "data: {bad\n".to_string(),
                "data: {bad\n".to_string(),
                frames::content("never"),
            ]);
            let config = ChatSessionConfig {
                max_consecutive_parse_errors: 3,
                ..Default::default()
            };
            let mut session = ChatSession::with_config(Arc::new(provider), config);
            let sink = RecordingSink::new();

            let outcome = session.submit("q", "sonar", &key(), &sink).await.unwrap();

            assert_eq!(
                outcome,
                SubmissionOutcome::Aborted {
                    reason: TOO_MANY_MALFORMED_FRAMES.to_string()
                }
            );
            let events = sink.events();
            assert_eq!(events.len(), 4);
            assert_eq!(events[3], UiEvent::error_message(TOO_MANY_MALFORMED_FRAMES));
            assert!(!events.contains(&UiEvent::stream("never")));
        }

        #[tokio::test]
        async fn well_formed_frame_resets_parse_error_count() {
            let provider = MockCompletionProvider::new().with_stream(vec![
                "data: {bad\n".to_string(),
                frames::content("a"),
                "data: {bad\n".to_string(),
                frames::content("b"),
                frames::stop(&[]),
            ]);
            let config = ChatSessionConfig {
                max_consecutive_parse_errors: 2,
                ..Default::default()
            };
            let mut session = ChatSession::with_config(Arc::new(provider), config);
            let sink = RecordingSink::new();

            let outcome = session.submit("q", "sonar", &key(), &sink).await.unwrap();

            match outcome {
                SubmissionOutcome::Completed(answer) => assert_eq!(answer.visible_text, "ab"),
                other => panic!("expected completion, got {other:?}"),
            }
        }

        #[tokio::test]
        async fn connection_failure_is_transport_error() {
            let provider = MockCompletionProvider::new().with_connection_failure("refused");
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            let result = session.submit("q", "sonar", &key(), &sink).await;

            match result {
                Err(ChatError::Transport(message)) => assert!(message.contains("refused")),
                other => panic!("expected transport error, got {other:?}"),
            }
            assert!(sink.events().is_empty());
        }

        #[tokio::test]
        async fn mid_stream_failure_appends_nothing() {
            let provider = MockCompletionProvider::new().with_response(MockResponse::StreamThenFail {
                chunks: vec![frames::content("half").into_bytes()],
                message: "reset".to_string(),
            });
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            let result = session.submit("q", "sonar", &key(), &sink).await;

            assert!(matches!(result, Err(ChatError::Transport(_))));
            assert_eq!(sink.events(), vec![UiEvent::stream("half")]);
            assert!(session.context().is_empty());
        }

        #[tokio::test]
        async fn session_stays_usable_after_failure() {
            let provider = MockCompletionProvider::new()
                .with_connection_failure("refused")
                .with_stream(vec![frames::content("fine"), frames::stop(&[])]);
            let mut session = session(&provider);
            let sink = RecordingSink::new();

            assert!(session.submit("q", "sonar", &key(), &sink).await.is_err());
            let outcome = session.submit("q", "sonar", &key(), &sink).await.unwrap();

            assert!(matches!(outcome, SubmissionOutcome::Completed(_)));
        }
    }

    #[test]
    fn transport_error_message_is_descriptive() {
        let err = ChatError::Transport("connection failed: refused".to_string());
        assert_eq!(
            err.to_string(),
            "Failed to complete request: connection failed: refused"
        );
    }

    #[tokio::test]
    async fn reset_forgets_turns() {
        let provider = MockCompletionProvider::new();
        let mut session = session(&provider);
        let sink = RecordingSink::new();

        session.submit("q", "sonar", &key(), &sink).await.unwrap();
        assert_eq!(session.context().turn_count(), 1);

        session.reset();
        assert!(session.context().is_empty());
    }

    #[test]
    fn config_follows_completion_settings() {
        let completion = CompletionConfig {
            system_prompt: "Be brief.".to_string(),
            context_turns: 2,
            max_consecutive_parse_errors: 5,
            ..Default::default()
        };

        let config = ChatSessionConfig::from(&completion);
        assert_eq!(config.system_prompt, "Be brief.");
        assert_eq!(config.context_turns, 2);
        assert_eq!(config.max_consecutive_parse_errors, 5);
    }
}
