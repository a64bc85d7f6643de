// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Answer prompt construction and user-facing messages.

use recall_core::MemoryRecord;

/// Shown when semantic search ranks nothing.
pub const NO_SEMANTIC_MATCHES: &str =
    "I couldn't find any matching memories. Try adding the item first.";

/// Shown when text search matches nothing.
pub const NO_TEXT_MATCHES: &str = "No memories found matching your search.";

/// Shown when a collaborator fails unexpectedly.
pub const SEARCH_FAILED: &str = "An error occurred while searching. Please try again.";

/// One line per memory: `- item: location (notes)`.
pub fn build_context<'a>(memories: impl IntoIterator<Item = &'a MemoryRecord>) -> String {
    memories
        .into_iter()
        .map(|m| match &m.notes {
            Some(notes) => format!("- {}: {} ({notes})", m.item_name, m.location),
            None => format!("- {}: {}", m.item_name, m.location),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "Based on these stored memories:\n{context}\n\nQuestion: {query}\n\n\
         Provide a clear, helpful answer about where the item is located. Be concise and direct."
    )
}
