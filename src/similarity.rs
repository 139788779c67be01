use rayon::prelude::*;

/// One ranked similarity hit. The distance is Euclidean, in the scaled
/// style-dimension space, and is returned so callers can see how close a
/// match really is.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarPlayer {
    pub name: String,
    pub distance: f64,
}

/// Rank candidates by ascending Euclidean distance to the query.
///
/// Query and candidates must already be reduced and standardized with the
/// same fitted scaler; distances over unscaled or differently-scaled vectors
/// are meaningless. The query is assumed to be one of the candidates (looked
/// up from the same table): the nearest result is dropped as the self-match,
/// and at most `top_n` of the rest are returned. Ties keep row order, so an
/// exact-duplicate candidate at distance zero can be the one dropped
/// instead of the query's own row.
pub fn rank_candidates(
    query: &[f64],
    candidates: &[Vec<f64>],
    names: &[String],
    top_n: usize,
) -> Vec<SimilarPlayer> {
    debug_assert_eq!(candidates.len(), names.len());

    let mut ranked: Vec<(usize, f64)> = candidates
        .par_iter()
        .enumerate()
        .map(|(idx, candidate)| (idx, euclidean(query, candidate)))
        .collect();
    ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .skip(1)
        .take(top_n)
        .map(|(idx, distance)| SimilarPlayer {
            name: names[idx].clone(),
            distance,
        })
        .collect()
}

pub fn euclidean(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y) * (x - y))
        .sum::<f64>()
        .sqrt()
}
