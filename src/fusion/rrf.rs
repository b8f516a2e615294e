//! Reciprocal Rank Fusion.

use ahash::AHashMap;

use crate::document::SearchResult;

/// Standard RRF constant. Larger values flatten the advantage of top ranks.
pub const DEFAULT_RRF_K: f32 = 60.0;

/// Fuse multiple independently-ranked lists into one ranking.
///
/// Each result at 0-indexed rank `r` of an input list contributes
/// `1 / (k + r + 1)` to its document's cumulative score; contributions are
/// summed per document id across lists, so the order in which lists are
/// supplied does not affect the outcome. Ties keep first-appearance order.
/// Empty input lists are skipped; if every list is empty the output is
/// empty.
pub fn rrf_fuse(lists: Vec<Vec<SearchResult>>, rrf_k: f32, top_k: usize) -> Vec<SearchResult> {
    let mut fused: Vec<SearchResult> = Vec::new();
    let mut positions: AHashMap<String, usize> = AHashMap::new();

    for list in lists {
        for (rank, result) in list.into_iter().enumerate() {
            let contribution = 1.0 / (rrf_k + rank as f32 + 1.0);
            match positions.get(&result.document.id) {
                Some(&position) => {
                    fused[position].score += contribution;
                }
                None => {
                    positions.insert(result.document.id.clone(), fused.len());
                    let mut entry = result;
                    entry.score = contribution;
                    fused.push(entry);
                }
            }
        }
    }

    for result in &mut fused {
        let score = result.score;
        result.annotate("rrf_score", score as f64);
    }

    // First-appearance order is the tie-break; a stable sort preserves it.
    fused.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    fused.truncate(top_k);
    fused
}
