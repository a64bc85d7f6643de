// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence encodings shared by both backends: embedding text and
//! timestamp handling.

use chrono::{DateTime, Duration, SecondsFormat, Timelike, Utc};
use recall_core::RecallError;
use tracing::warn;

/// Current time truncated to microsecond precision.
pub fn now_micros() -> DateTime<Utc> {
    truncate_micros(Utc::now())
}

fn truncate_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    let nanos = ts.nanosecond();
    ts.with_nanosecond(nanos - nanos % 1_000).unwrap_or(ts)
}

/// The `updated_at` value for a mutation of a record last touched at `previous`.
///
/// Always strictly greater than `previous`, even when the clock has not moved.
pub fn advance_timestamp(previous: DateTime<Utc>) -> DateTime<Utc> {
    now_micros().max(previous + Duration::microseconds(1))
}

/// Fixed-width text form (`YYYY-MM-DDTHH:MM:SS.ffffffZ`); lexical order is
/// chronological order.
pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, RecallError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(RecallError::storage)
}

/// Serializes an embedding as a JSON numeric array.
pub fn encode_embedding(embedding: &[f32]) -> Result<String, RecallError> {
    serde_json::to_string(embedding).map_err(RecallError::storage)
}

/// Parses a stored embedding.
pub fn parse_embedding(raw: &str) -> Result<Vec<f32>, RecallError> {
    serde_json::from_str(raw).map_err(|e| RecallError::MalformedEmbedding(e.to_string()))
}

/// Decodes a stored embedding column, treating unreadable values as absent.
pub fn decode_embedding(id: i64, raw: Option<&str>) -> Option<Vec<f32>> {
    let raw = raw?;
    match parse_embedding(raw) {
        Ok(embedding) => Some(embedding),
        Err(e) => {
            warn!(id, error = %e, "ignoring unreadable embedding");
            None
        }
    }
}
