//! UI-agnostic state types
//!
//! Wire shapes returned by the diagnosis service, the canonical
//! `DiagnosisResult` both front-ends render, and the message/request state
//! the controller publishes.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::error::SubmitError;

/// A trimmed, non-empty symptom description. Only built through `parse`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymptomQuery(String);

impl SymptomQuery {
    pub fn parse(raw: &str) -> Result<Self, SubmitError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(SubmitError::Validation);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One ranked candidate from the `/predict` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiseaseMatch {
    pub disease: String,
    pub similarity: f64,
    #[serde(default)]
    pub workouts: Vec<String>,
    #[serde(default)]
    pub precautions: Vec<String>,
}

impl DiseaseMatch {
    /// Similarity as a display percentage, e.g. "87.5% match"
    pub fn match_label(&self) -> String {
        format!("{:.1}% match", self.similarity * 100.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiseaseInfo {
    pub disease: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub workout: Option<String>,
    #[serde(default)]
    pub precautions: Option<String>,
    #[serde(default)]
    pub diet: Option<String>,
}

/// Canonical diagnosis payload rendered by both screens.
///
/// `/diagnose` deserializes into this directly; `/predict` responses are
/// adapted through `From<PredictResponse>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisResult {
    #[serde(default)]
    pub symptoms: Vec<String>,
    pub disease_info: DiseaseInfo,
    #[serde(default)]
    pub additional_info: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wikipedia_image: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub top_diseases: Vec<DiseaseMatch>,
}

impl DiagnosisResult {
    pub fn has_match(&self) -> bool {
        !self.disease_info.disease.is_empty()
    }
}

/// Response body of `POST /predict`
#[derive(Debug, Clone, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub top_diseases: Vec<DiseaseMatch>,
}

impl From<PredictResponse> for DiagnosisResult {
    fn from(resp: PredictResponse) -> Self {
        let disease_info = resp
            .top_diseases
            .first()
            .map(|top| DiseaseInfo {
                disease: top.disease.clone(),
                description: None,
                workout: join_lines(&top.workouts),
                precautions: join_lines(&top.precautions),
                diet: None,
            })
            .unwrap_or_default();

        Self {
            symptoms: resp.symptoms,
            disease_info,
            additional_info: String::new(),
            wikipedia_image: None,
            top_diseases: resp.top_diseases,
        }
    }
}

fn join_lines(items: &[String]) -> Option<String> {
    if items.is_empty() {
        None
    } else {
        Some(items.join("\n"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

/// An entry in the conversation log. Immutable once appended.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u64,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Local>,
    pub diagnosis: Option<DiagnosisResult>,
}

/// A message before the store assigns its id
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub text: String,
    pub sender: Sender,
    pub diagnosis: Option<DiagnosisResult>,
}

impl NewMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            diagnosis: None,
        }
    }

    pub fn bot(text: impl Into<String>, diagnosis: Option<DiagnosisResult>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            diagnosis,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestState {
    pub phase: Phase,
    pub error_message: Option<String>,
}

impl RequestState {
    pub fn loading() -> Self {
        Self {
            phase: Phase::Loading,
            error_message: None,
        }
    }

    pub fn success() -> Self {
        Self {
            phase: Phase::Success,
            error_message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            phase: Phase::Error,
            error_message: Some(message.into()),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Loading
    }
}
