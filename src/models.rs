//! Core data models used throughout the question-answering pipeline.
//!
//! These types represent the passages, citations, and conversation turns
//! that flow between retrieval, context assembly, and the model call.
//! They are value objects: computed per call and owned by the caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A ranked passage returned from retrieval.
///
/// Results from one retrieval call are sorted descending by relevance;
/// ties appear in ascending (page, sentence ordinal) order.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    /// 1-based page number the sentence came from.
    pub page: usize,
    /// The matching sentence, trimmed.
    pub text: String,
    /// Relevance score in `[0.0, 1.0]`.
    pub relevance: f64,
}

/// A confidence-scored back-reference from an answer to a document page.
#[derive(Debug, Clone, Serialize)]
pub struct Citation {
    /// 1-based identifier within a single response.
    pub id: usize,
    /// 1-based page number, usable for scroll/highlight in a viewer.
    pub page_number: usize,
    /// First 100 characters of the source sentence, `...`-suffixed if longer.
    pub excerpt: String,
    /// Confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

/// Who authored a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
}

/// One turn of the conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl ChatTurn {
    /// Build a user turn stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Build an assistant turn stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An answer together with the citations derived from it.
#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    /// The model's answer, or a fixed fallback message on failure.
    pub content: String,
    /// At most 3 citations, in ranking order. Empty on any fallback path.
    pub citations: Vec<Citation>,
}
