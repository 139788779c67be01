use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::StyleError;

pub const DEFAULT_N_CLUSTERS: usize = 6;
pub const DEFAULT_N_INIT: usize = 10;
pub const DEFAULT_MAX_ITER: usize = 300;
pub const DEFAULT_SEED: u64 = 42;

/// Convergence tolerance on relative inertia improvement per iteration.
const TOL: f64 = 1e-4;

#[derive(Debug, Clone, Copy)]
pub struct KMeansConfig {
    pub n_clusters: usize,
    pub n_init: usize,
    pub max_iter: usize,
    pub seed: u64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            n_clusters: DEFAULT_N_CLUSTERS,
            n_init: DEFAULT_N_INIT,
            max_iter: DEFAULT_MAX_ITER,
            seed: DEFAULT_SEED,
        }
    }
}

/// Fitted centroid model. `predict` is the only inference operation: nearest
/// centroid under Euclidean distance in the standardized dimension space,
/// exact ties broken by lowest index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeansModel {
    pub centroids: Vec<Vec<f64>>,
    pub inertia: f64,
}

impl KMeansModel {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    pub fn dims(&self) -> usize {
        self.centroids.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn predict_one(&self, point: &[f64]) -> usize {
        nearest_centroid(point, &self.centroids).0
    }

    pub fn predict(&self, matrix: &[Vec<f64>]) -> Vec<usize> {
        matrix.iter().map(|row| self.predict_one(row)).collect()
    }
}

/// Lloyd's algorithm with k-means++ seeding. Runs `n_init` independently
/// seeded restarts and keeps the lowest-inertia result; deterministic for a
/// fixed `seed`.
pub fn fit(data: &[Vec<f64>], cfg: &KMeansConfig) -> Result<KMeansModel, StyleError> {
    if cfg.n_clusters == 0 {
        return Err(StyleError::Configuration(
            "n_clusters must be at least 1".to_string(),
        ));
    }
    if cfg.n_init == 0 {
        return Err(StyleError::Configuration(
            "n_init must be at least 1".to_string(),
        ));
    }
    if data.len() < cfg.n_clusters {
        return Err(StyleError::Configuration(format!(
            "cannot fit {} clusters on {} rows",
            cfg.n_clusters,
            data.len()
        )));
    }
    let dims = data[0].len();
    if dims == 0 || data.iter().any(|row| row.len() != dims) {
        return Err(StyleError::Configuration(
            "cluster input must be a non-ragged matrix with at least one column".to_string(),
        ));
    }

    let mut best: Option<KMeansModel> = None;
    for run in 0..cfg.n_init {
        let mut rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(run as u64));
        let init = plus_plus_init(data, cfg.n_clusters, &mut rng);
        let (centroids, inertia) = lloyd(data, init, cfg.max_iter);
        let better = best.as_ref().map(|b| inertia < b.inertia).unwrap_or(true);
        if better {
            best = Some(KMeansModel { centroids, inertia });
        }
    }

    Ok(best.expect("n_init >= 1 produces at least one run"))
}

fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    let mut best_idx = 0;
    let mut best_dist = f64::INFINITY;
    for (idx, centroid) in centroids.iter().enumerate() {
        let d = distance_sq(point, centroid);
        if d < best_dist {
            best_dist = d;
            best_idx = idx;
        }
    }
    (best_idx, best_dist)
}

fn distance_sq(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// k-means++: first centroid uniform, each further centroid sampled with
/// probability proportional to squared distance from the nearest chosen one.
fn plus_plus_init(data: &[Vec<f64>], k: usize, rng: &mut StdRng) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(data[rng.gen_range(0..data.len())].clone());

    let mut weights: Vec<f64> = data
        .iter()
        .map(|p| distance_sq(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = weights.iter().sum();
        let next = if total > 0.0 {
            let mut target = rng.gen_range(0.0..total);
            let mut chosen = data.len() - 1;
            for (idx, w) in weights.iter().enumerate() {
                if target < *w {
                    chosen = idx;
                    break;
                }
                target -= w;
            }
            chosen
        } else {
            // Every remaining point coincides with a centroid.
            rng.gen_range(0..data.len())
        };

        centroids.push(data[next].clone());
        for (w, p) in weights.iter_mut().zip(data) {
            let d = distance_sq(p, centroids.last().expect("just pushed"));
            if d < *w {
                *w = d;
            }
        }
    }

    centroids
}

fn lloyd(data: &[Vec<f64>], mut centroids: Vec<Vec<f64>>, max_iter: usize) -> (Vec<Vec<f64>>, f64) {
    let k = centroids.len();
    let dims = data[0].len();
    let mut assignments = vec![usize::MAX; data.len()];
    let mut inertia = f64::INFINITY;

    for _ in 0..max_iter {
        let mut new_inertia = 0.0;
        let mut changed = false;
        for (idx, point) in data.iter().enumerate() {
            let (cluster, dist) = nearest_centroid(point, &centroids);
            new_inertia += dist;
            if assignments[idx] != cluster {
                assignments[idx] = cluster;
                changed = true;
            }
        }

        let converged = !changed
            || (inertia.is_finite() && (inertia - new_inertia).abs() <= TOL * inertia.max(1.0));
        inertia = new_inertia;
        if converged {
            break;
        }

        let mut sums = vec![vec![0.0; dims]; k];
        let mut counts = vec![0usize; k];
        for (point, &cluster) in data.iter().zip(&assignments) {
            counts[cluster] += 1;
            for (s, v) in sums[cluster].iter_mut().zip(point) {
                *s += v;
            }
        }
        for cluster in 0..k {
            if counts[cluster] > 0 {
                for s in &mut sums[cluster] {
                    *s /= counts[cluster] as f64;
                }
                centroids[cluster] = std::mem::take(&mut sums[cluster]);
            } else {
                // Reseed an emptied cluster from the farthest point; keeps
                // the run deterministic under the outer seed.
                centroids[cluster] = farthest_point(data, &centroids);
            }
        }
    }

    (centroids, inertia)
}

fn farthest_point(data: &[Vec<f64>], centroids: &[Vec<f64>]) -> Vec<f64> {
    let mut best = 0;
    let mut best_dist = -1.0;
    for (idx, point) in data.iter().enumerate() {
        let (_, d) = nearest_centroid(point, centroids);
        if d > best_dist {
            best_dist = d;
            best = idx;
        }
    }
    data[best].clone()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blobs() -> Vec<Vec<f64>> {
        // Three well-separated 2-D blobs, 5 points each.
        let mut out = Vec::new();
        for (cx, cy) in [(0.0, 0.0), (10.0, 10.0), (-10.0, 8.0)] {
            for step in 0..5 {
                let off = step as f64 * 0.1;
                out.push(vec![cx + off, cy - off]);
            }
        }
        out
    }

    #[test]
    fn fit_separates_obvious_blobs() {
        let data = blobs();
        let cfg = KMeansConfig {
            n_clusters: 3,
            ..KMeansConfig::default()
        };
        let model = fit(&data, &cfg).expect("fit");
        assert_eq!(model.k(), 3);

        let labels = model.predict(&data);
        for chunk in labels.chunks(5) {
            assert!(chunk.iter().all(|l| l == &chunk[0]));
        }
        let mut distinct = labels.clone();
        distinct.sort_unstable();
        distinct.dedup();
        assert_eq!(distinct.len(), 3);
    }

    #[test]
    fn fit_is_deterministic_for_a_fixed_seed() {
        let data = blobs();
        let cfg = KMeansConfig {
            n_clusters: 3,
            seed: 42,
            ..KMeansConfig::default()
        };
        let a = fit(&data, &cfg).expect("fit a");
        let b = fit(&data, &cfg).expect("fit b");
        assert_eq!(a.centroids, b.centroids);
        assert_eq!(a.inertia, b.inertia);
    }

    #[test]
    fn predict_is_stable_across_calls() {
        let data = blobs();
        let model = fit(
            &data,
            &KMeansConfig {
                n_clusters: 3,
                ..KMeansConfig::default()
            },
        )
        .expect("fit");
        let point = vec![9.8, 10.1];
        let first = model.predict_one(&point);
        for _ in 0..10 {
            assert_eq!(model.predict_one(&point), first);
        }
    }

    #[test]
    fn exact_tie_goes_to_lowest_index() {
        let model = KMeansModel {
            centroids: vec![vec![-1.0, 0.0], vec![1.0, 0.0]],
            inertia: 0.0,
        };
        // Equidistant from both centroids.
        assert_eq!(model.predict_one(&[0.0, 5.0]), 0);
    }

    #[test]
    fn too_few_rows_is_a_configuration_error() {
        let err = fit(
            &[vec![0.0], vec![1.0]],
            &KMeansConfig {
                n_clusters: 6,
                ..KMeansConfig::default()
            },
        )
        .unwrap_err();
        assert!(matches!(err, StyleError::Configuration(_)));
    }

    #[test]
    fn duplicate_points_still_fit() {
        let data = vec![vec![1.0, 1.0]; 8];
        let model = fit(
            &data,
            &KMeansConfig {
                n_clusters: 2,
                ..KMeansConfig::default()
            },
        )
        .expect("fit on duplicates");
        assert_eq!(model.k(), 2);
        assert!(model.inertia.abs() < 1e-12);
    }
}
