// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across adapter traits and the memory core.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::RecallError;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the type of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Embedding,
    Completion,
    Transcription,
    Recorder,
}

/// The external model capabilities the core depends on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum Capability {
    Embedding,
    Completion,
    Transcription,
}

// --- Memory records ---

/// A single "item -> location" memory as owned by a store.
///
/// Callers always receive copies; the store keeps the canonical collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Store-assigned, strictly increasing identifier.
    pub id: i64,
    /// What was put away. Never empty.
    pub item_name: String,
    /// Where it was put. Never empty.
    pub location: String,
    /// Free-form notes.
    pub notes: Option<String>,
    /// Vector for semantic search. Absent until computed.
    pub embedding: Option<Vec<f32>>,
    /// Set once when the record is added.
    pub created_at: DateTime<Utc>,
    /// Refreshed on every mutation.
    pub updated_at: DateTime<Utc>,
}

impl MemoryRecord {
    /// Returns true if an embedding has been computed for this record.
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}

/// The mutable fields of a memory, used for both `add` and full-replace `update`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MemoryFields {
    pub item_name: String,
    pub location: String,
    pub notes: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

impl MemoryFields {
    /// Creates fields for an item and its location, with no notes or embedding.
    pub fn new(item_name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            item_name: item_name.into(),
            location: location.into(),
            notes: None,
            embedding: None,
        }
    }

    /// Sets the notes field.
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the embedding field.
    pub fn with_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Trims text fields and enforces the record invariant.
    ///
    /// `item_name` and `location` must be non-empty after trimming. Blank
    /// notes collapse to `None`.
    pub fn normalized(self) -> Result<Self, RecallError> {
        let item_name = self.item_name.trim().to_string();
        let location = self.location.trim().to_string();
        if item_name.is_empty() {
            return Err(RecallError::Validation(
                "item name must not be empty".to_string(),
            ));
        }
        if location.is_empty() {
            return Err(RecallError::Validation(
                "location must not be empty".to_string(),
            ));
        }
        let notes = self
            .notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        Ok(Self {
            item_name,
            location,
            notes,
            embedding: self.embedding,
        })
    }
}

impl From<&MemoryRecord> for MemoryFields {
    fn from(record: &MemoryRecord) -> Self {
        Self {
            item_name: record.item_name.clone(),
            location: record.location.clone(),
            notes: record.notes.clone(),
            embedding: record.embedding.clone(),
        }
    }
}

// --- Embedding types ---

/// Input for an embedding adapter.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

impl EmbeddingInput {
    /// Convenience constructor for a single text.
    pub fn single(text: impl Into<String>) -> Self {
        Self {
            texts: vec![text.into()],
        }
    }
}

/// Output from an embedding adapter. One vector per input text, in order.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
    pub dimensions: usize,
}

// --- Completion types ---

/// A single-prompt text completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Response from a completion adapter.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub text: String,
    pub model: String,
}

// --- Audio types ---

/// A finished recording, consumable by a transcription adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioHandle {
    pub path: PathBuf,
}

impl AudioHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_trims_and_drops_blank_notes() {
        let fields = MemoryFields::new("  Passport ", " Blue bag ")
            .with_notes("   ")
            .normalized()
            .unwrap();
        assert_eq!(fields.item_name, "Passport");
        assert_eq!(fields.location, "Blue bag");
        assert_eq!(fields.notes, None);
    }

    #[test]
    fn normalized_rejects_empty_item() {
        let err = MemoryFields::new("   ", "Drawer").normalized().unwrap_err();
        assert!(matches!(err, RecallError::Validation(m) if m.contains("item name")));
    }

    #[test]
    fn normalized_rejects_empty_location() {
        let err = MemoryFields::new("Keys", "").normalized().unwrap_err();
        assert!(matches!(err, RecallError::Validation(m) if m.contains("location")));
    }

    #[test]
    fn capability_displays_lowercase() {
        assert_eq!(Capability::Embedding.to_string(), "embedding");
        assert_eq!(Capability::Transcription.to_string(), "transcription");
    }

    #[test]
    fn fields_from_record_copies_everything() {
        let now = Utc::now();
        let record = MemoryRecord {
            id: 7,
            item_name: "Charger".into(),
            location: "Desk drawer".into(),
            notes: Some("white cable".into()),
            embedding: Some(vec![0.5, 0.5]),
            created_at: now,
            updated_at: now,
        };
        let fields = MemoryFields::from(&record);
        assert_eq!(fields.item_name, "Charger");
        assert_eq!(fields.notes.as_deref(), Some("white cable"));
        assert_eq!(fields.embedding, Some(vec![0.5, 0.5]));
        assert!(record.has_embedding());
    }
}
