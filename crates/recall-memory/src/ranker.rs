// SPDX-FileCopyrightText: 2026 Recall Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Linear-scan cosine ranking over stored embeddings.

use recall_config::model::SearchConfig;
use recall_core::MemoryRecord;

use crate::types::{ScoredMemory, cosine_similarity};

/// Scores candidates against a query vector and keeps the best `top_k`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityRanker {
    top_k: usize,
    threshold: Option<f32>,
}

impl Default for SimilarityRanker {
    fn default() -> Self {
        Self {
            top_k: Self::DEFAULT_TOP_K,
            threshold: None,
        }
    }
}

impl SimilarityRanker {
    pub const DEFAULT_TOP_K: usize = 5;

    /// A ranker with no similarity threshold.
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            threshold: None,
        }
    }

    /// Only results scoring strictly above `threshold` are kept.
    pub fn with_threshold(mut self, threshold: Option<f32>) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn from_config(config: &SearchConfig) -> Self {
        Self::new(config.top_k).with_threshold(config.effective_threshold())
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn threshold(&self) -> Option<f32> {
        self.threshold
    }

    /// Ranks `candidates` (given in store order) by similarity to `query`.
    ///
    /// Candidates without an embedding are dropped before scoring. Equal
    /// scores keep their relative store order, so ties go to the newer record.
    pub fn rank(&self, query: &[f32], candidates: Vec<MemoryRecord>) -> Vec<ScoredMemory> {
        if self.top_k == 0 {
            return Vec::new();
        }

        let mut scored: Vec<ScoredMemory> = candidates
            .into_iter()
            .filter_map(|memory| {
                let score = cosine_similarity(query, memory.embedding.as_deref()?);
                Some(ScoredMemory { memory, score })
            })
            .filter(|s| self.threshold.is_none_or(|t| s.score > t))
            .collect();

        // sort_by is stable.
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(self.top_k);
        scored
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64, embedding: Option<Vec<f32>>) -> MemoryRecord {
        let now = chrono::Utc::now();
        MemoryRecord {
            id,
            item_name: format!("item {id}"),
            location: "somewhere".into(),
            notes: None,
            embedding,
            created_at: now,
            updated_at: now,
        }
    }

    fn ids(results: &[ScoredMemory]) -> Vec<i64> {
        results.iter().map(|s| s.memory.id).collect()
    }

    #[test]
    fn exact_match_ranks_first_with_score_one() {
        let ranker = SimilarityRanker::default();
        let results = ranker.rank(
            &[1.0, 0.0, 0.0],
            vec![record(2, Some(vec![0.0, 1.0, 0.0])), record(1, Some(vec![1.0, 0.0, 0.0]))],
        );
        assert_eq!(results[0].memory.id, 1);
        assert_eq!(results[0].score, 1.0);
    }

    #[test]
    fn records_without_embedding_are_excluded() {
        let ranker = SimilarityRanker::default();
        let results = ranker.rank(&[1.0], vec![record(2, None), record(1, Some(vec![1.0]))]);
        assert_eq!(ids(&results), vec![1]);
    }

    #[test]
    fn ties_keep_store_order() {
        let ranker = SimilarityRanker::default();
        let s = 0.5_f32.sqrt();
        // Store order is newest first: 2 then 1.
        let results = ranker.rank(
            &[s, s],
            vec![record(2, Some(vec![0.0, 1.0])), record(1, Some(vec![1.0, 0.0]))],
        );
        assert_eq!(ids(&results), vec![2, 1]);
        assert_eq!(results[0].score, results[1].score);
        assert!((results[0].score - 0.7071).abs() < 1e-3);
    }

    #[test]
    fn truncates_to_top_k_in_descending_order() {
        let ranker = SimilarityRanker::new(2);
        let candidates = (1..=4)
            .map(|i| record(i, Some(vec![1.0, i as f32])))
            .collect();
        let results = ranker.rank(&[1.0, 0.0], candidates);
        assert_eq!(results.len(), 2);
        assert!(results[0].score >= results[1].score);
        assert_eq!(ids(&results), vec![1, 2]);
    }

    #[test]
    fn threshold_is_strict() {
        let ranker = SimilarityRanker::new(5).with_threshold(Some(0.0));
        let results = ranker.rank(
            &[1.0, 0.0],
            vec![record(1, Some(vec![0.0, 1.0])), record(2, Some(vec![1.0, 1.0]))],
        );
        assert_eq!(ids(&results), vec![2]);
    }

    #[test]
    fn no_threshold_keeps_negative_scores() {
        let ranker = SimilarityRanker::new(5);
        let results = ranker.rank(&[1.0, 0.0], vec![record(1, Some(vec![-1.0, 0.0]))]);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, -1.0);
    }

    #[test]
    fn mismatched_dimensions_fall_below_threshold() {
        let ranker = SimilarityRanker::new(5).with_threshold(Some(0.3));
        let results = ranker.rank(&[1.0, 0.0], vec![record(1, Some(vec![1.0, 0.0, 0.0]))]);
        assert!(results.is_empty());
    }

    #[test]
    fn zero_top_k_returns_nothing() {
        let ranker = SimilarityRanker::new(0);
        assert!(ranker.rank(&[1.0], vec![record(1, Some(vec![1.0]))]).is_empty());
    }

    #[test]
    fn from_config_uses_effective_threshold() {
        let mut config = SearchConfig::default();
        config.top_k = 7;
        let ranker = SimilarityRanker::from_config(&config);
        assert_eq!(ranker.top_k(), 7);
        assert_eq!(ranker.threshold(), Some(0.3));

        config.apply_threshold = false;
        assert_eq!(SimilarityRanker::from_config(&config).threshold(), None);
    }

    proptest::proptest! {
        #[test]
        fn never_exceeds_top_k_and_scores_descend(
            top_k in 0usize..6,
            vectors in proptest::collection::vec(proptest::collection::vec(-1.0_f32..1.0, 3), 0..12),
        ) {
            let candidates = vectors
                .into_iter()
                .enumerate()
                .map(|(i, v)| record(i as i64, Some(v)))
                .collect();
            let results = SimilarityRanker::new(top_k).rank(&[0.3, -0.2, 0.9], candidates);
            proptest::prop_assert!(results.len() <= top_k);
            for pair in results.windows(2) {
                proptest::prop_assert!(pair[0].score >= pair[1].score);
            }
        }
    }
}
