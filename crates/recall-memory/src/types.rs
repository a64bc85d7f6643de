// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vector math and ranking result types.

use recall_core::MemoryRecord;

/// A memory with its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMemory {
    pub memory: MemoryRecord,
    pub score: f32,
}

/// Cosine similarity of two vectors.
///
/// Vectors of different length, empty vectors, and zero-norm vectors score
/// exactly `0.0`. The result is symmetric in its arguments.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let score = dot / (norm_a.sqrt() * norm_b.sqrt());
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(-1.0, 1.0) as f32
}

/// Text an embedding is computed from: `item location notes`, trimmed.
pub fn embedding_text(item_name: &str, location: &str, notes: Option<&str>) -> String {
    format!("{item_name} {location} {}", notes.unwrap_or_default())
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn identical_vectors_score_one() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0, 0.0]), 1.0);
    }

    #[test]
    fn orthogonal_vectors_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
    }

    #[test]
    fn opposite_vectors_score_minus_one() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), -1.0);
    }

    #[test]
    fn diagonal_scores_half_root_two() {
        let s = 0.5_f32.sqrt();
        let score = cosine_similarity(&[1.0, 0.0], &[s, s]);
        assert!((score - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn degenerate_inputs_score_zero() {
        assert_eq!(cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn embedding_text_joins_with_spaces() {
        assert_eq!(
            embedding_text("Passport", "Blue bag", Some("front pocket")),
            "Passport Blue bag front pocket"
        );
        assert_eq!(embedding_text("Passport", "Blue bag", None), "Passport Blue bag");
    }

    fn vector(len: usize) -> impl Strategy<Value = Vec<f32>> {
        prop::collection::vec(-100.0_f32..100.0, len)
    }

    proptest! {
        #[test]
        fn similarity_is_symmetric((a, b) in (1usize..32).prop_flat_map(|n| (vector(n), vector(n)))) {
            prop_assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
        }

        #[test]
        fn self_similarity_is_one(a in vector(8)) {
            prop_assume!(a.iter().any(|x| *x != 0.0));
            prop_assert!((cosine_similarity(&a, &a) - 1.0).abs() < 1e-6);
        }

        #[test]
        fn mismatched_lengths_score_zero(a in vector(3), b in vector(4)) {
            prop_assert_eq!(cosine_similarity(&a, &b), 0.0);
        }

        #[test]
        fn zero_vector_scores_zero(b in vector(5)) {
            prop_assert_eq!(cosine_similarity(&[0.0; 5], &b), 0.0);
            prop_assert_eq!(cosine_similarity(&b, &[0.0; 5]), 0.0);
        }

        #[test]
        fn score_stays_in_range((a, b) in (1usize..16).prop_flat_map(|n| (vector(n), vector(n)))) {
            let s = cosine_similarity(&a, &b);
            prop_assert!((-1.0..=1.0).contains(&s));
        }
    }
}
