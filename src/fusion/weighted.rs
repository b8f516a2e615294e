//! Legacy weighted score combination.
//!
//! Normalizes each source's scores onto a shared scale and blends them with
//! configured weights. RRF superseded this as the default because raw-score
//! normalization is fragile across retrieval methods; the path is kept for
//! callers that disable both reranking and RRF.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::document::SearchResult;

/// Score normalization strategies for combining lexical and vector scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreNormalization {
    /// Use raw scores.
    None,
    /// Min-max normalization to [0, 1].
    MinMax,
    /// Z-score normalization.
    ZScore,
    /// Rank-based normalization (1.0 for rank 0, decreasing linearly).
    Rank,
}

/// Merger blending lexical and vector scores by weight.
#[derive(Debug, Clone)]
pub struct WeightedMerger {
    lexical_weight: f32,
    vector_weight: f32,
    normalization: ScoreNormalization,
}

impl WeightedMerger {
    /// Create a merger with the given weights and normalization strategy.
    pub fn new(lexical_weight: f32, vector_weight: f32, normalization: ScoreNormalization) -> Self {
        Self {
            lexical_weight,
            vector_weight,
            normalization,
        }
    }

    /// Merge the two per-source rankings into one weighted ranking.
    ///
    /// A document present in only one source contributes zero from the
    /// other. Output is sorted descending, truncated to `top_k`, ties kept
    /// in lexical-first first-appearance order.
    pub fn merge(
        &self,
        lexical: Vec<SearchResult>,
        vector: Vec<SearchResult>,
        top_k: usize,
    ) -> Vec<SearchResult> {
        let lexical_scores = self.normalize(&lexical);
        let vector_scores = self.normalize(&vector);

        let mut merged: Vec<SearchResult> = Vec::new();
        let mut positions: AHashMap<String, usize> = AHashMap::new();

        for (result, normalized) in lexical.into_iter().zip(lexical_scores) {
            positions.insert(result.document.id.clone(), merged.len());
            let mut entry = result;
            entry.score = normalized * self.lexical_weight;
            merged.push(entry);
        }

        for (result, normalized) in vector.into_iter().zip(vector_scores) {
            let contribution = normalized * self.vector_weight;
            match positions.get(&result.document.id) {
                Some(&position) => merged[position].score += contribution,
                None => {
                    positions.insert(result.document.id.clone(), merged.len());
                    let mut entry = result;
                    entry.score = contribution;
                    merged.push(entry);
                }
            }
        }

        merged.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(top_k);
        merged
    }

    fn normalize(&self, results: &[SearchResult]) -> Vec<f32> {
        let scores: Vec<f32> = results.iter().map(|r| r.score).collect();
        match self.normalization {
            ScoreNormalization::None => scores,
            ScoreNormalization::MinMax => {
                let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
                let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
                if scores.is_empty() || (max - min).abs() < f32::EPSILON {
                    vec![1.0; scores.len()]
                } else {
                    scores.iter().map(|s| (s - min) / (max - min)).collect()
                }
            }
            ScoreNormalization::ZScore => {
                if scores.is_empty() {
                    return scores;
                }
                let mean = scores.iter().sum::<f32>() / scores.len() as f32;
                let variance =
                    scores.iter().map(|s| (s - mean).powi(2)).sum::<f32>() / scores.len() as f32;
                let std_dev = variance.sqrt();
                if std_dev < f32::EPSILON {
                    vec![0.0; scores.len()]
                } else {
                    scores.iter().map(|s| (s - mean) / std_dev).collect()
                }
            }
            ScoreNormalization::Rank => {
                let n = scores.len();
                (0..n).map(|rank| 1.0 - rank as f32 / n as f32).collect()
            }
        }
    }
}
