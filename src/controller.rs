//! Request lifecycle for one front-end
//!
//! A submit is three steps: `begin` validates and moves to `Loading`, the
//! pipeline future runs (possibly on a spawned task), and `finish` merges
//! the outcome into display state. `submit` chains them for callers that
//! can simply await.

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::conversation::ConversationStore;
use crate::error::SubmitError;
use crate::models::{DiagnosisResult, NewMessage, RequestState, SymptomQuery};
use crate::pipeline::{Pipeline, Variant};

pub const EMPTY_QUERY_MESSAGE: &str = "Please enter your symptoms";
pub const CHAT_FAILURE_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";
pub const ANALYZE_FAILURE_MESSAGE: &str = "An error occurred while analyzing symptoms";
pub const CHAT_SUCCESS_MESSAGE: &str = "Here's what I found:";

pub type Outcome = Result<DiagnosisResult, SubmitError>;

pub struct RequestController {
    pipeline: Pipeline,
    variant: Variant,
    state: RequestState,
    conversation: ConversationStore,
    current: Option<DiagnosisResult>,
}

impl RequestController {
    pub fn new(pipeline: Pipeline, variant: Variant) -> Self {
        Self {
            pipeline,
            variant,
            state: RequestState::default(),
            conversation: ConversationStore::new(),
            current: None,
        }
    }

    pub fn state(&self) -> &RequestState {
        &self.state
    }

    /// Read-only view of the log (chat variant)
    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    /// Latest result (single-shot variant)
    pub fn current(&self) -> Option<&DiagnosisResult> {
        self.current.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Validate input and enter `Loading`. No I/O happens here.
    pub fn begin(&mut self, raw: &str) -> Result<SymptomQuery, SubmitError> {
        if self.state.is_loading() {
            return Err(SubmitError::Busy);
        }

        let query = match SymptomQuery::parse(raw) {
            Ok(query) => query,
            Err(e) => {
                self.state = RequestState::error(EMPTY_QUERY_MESSAGE);
                return Err(e);
            }
        };

        self.state = RequestState::loading();
        match self.variant {
            Variant::Chat => {
                self.conversation.append(NewMessage::user(raw));
            }
            Variant::SingleShot => {
                self.current = None;
            }
        }
        Ok(query)
    }

    /// Merge a finished pipeline run into display state
    pub fn finish(&mut self, outcome: Outcome) {
        match outcome {
            Ok(diagnosis) => {
                info!(disease = %diagnosis.disease_info.disease, variant = ?self.variant, "request succeeded");
                self.state = RequestState::success();
                match self.variant {
                    Variant::Chat => {
                        self.conversation
                            .append(NewMessage::bot(CHAT_SUCCESS_MESSAGE, Some(diagnosis)));
                    }
                    Variant::SingleShot => {
                        self.current = Some(diagnosis);
                    }
                }
            }
            Err(e) => {
                warn!(error = %e, variant = ?self.variant, "request failed");
                match self.variant {
                    Variant::Chat => {
                        self.state = RequestState::error(CHAT_FAILURE_MESSAGE);
                        self.conversation.append(NewMessage::bot(CHAT_FAILURE_MESSAGE, None));
                    }
                    Variant::SingleShot => {
                        self.state = RequestState::error(ANALYZE_FAILURE_MESSAGE);
                    }
                }
            }
        }
    }

    /// Begin a request and run its pipeline on a background task.
    /// Returns `None` when the input was rejected.
    pub fn spawn(&mut self, raw: &str) -> Option<JoinHandle<Outcome>> {
        let query = self.begin(raw).ok()?;
        let pipeline = self.pipeline.clone();
        let variant = self.variant;
        Some(tokio::spawn(async move {
            pipeline
                .run(&query, variant)
                .await
                .map_err(SubmitError::from)
        }))
    }

    /// Run one full submit in place
    pub async fn submit(&mut self, raw: &str) {
        let query = match self.begin(raw) {
            Ok(query) => query,
            Err(_) => return,
        };
        let outcome = self
            .pipeline
            .run(&query, self.variant)
            .await
            .map_err(SubmitError::from);
        self.finish(outcome);
    }
}
