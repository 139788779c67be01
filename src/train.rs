use std::path::PathBuf;

use crate::artifacts;
use crate::dimensions::DimensionTable;
use crate::error::StyleError;
use crate::kmeans::{self, KMeansConfig};
use crate::labels::ClusterLabelMap;
use crate::scaler::StandardScaler;
use crate::table::PlayerTable;

/// How many example members to record per cluster in the training summary.
const SAMPLE_PLAYERS_PER_CLUSTER: usize = 5;

#[derive(Debug, Clone)]
pub struct TrainConfig {
    pub data_path: PathBuf,
    pub out_dir: PathBuf,
    pub n_clusters: usize,
    pub n_init: usize,
    pub seed: u64,
}

impl TrainConfig {
    pub fn new(data_path: PathBuf, out_dir: PathBuf) -> Self {
        let defaults = KMeansConfig::default();
        Self {
            data_path,
            out_dir,
            n_clusters: defaults.n_clusters,
            n_init: defaults.n_init,
            seed: defaults.seed,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClusterStats {
    pub cluster_id: usize,
    pub label: String,
    pub count: usize,
    pub avg_overall: Option<f64>,
    /// Mean unscaled value per style dimension over the cluster's members.
    pub style_profile: Vec<(String, f64)>,
    pub sample_players: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub rows: usize,
    pub inertia: f64,
    pub out_dir: PathBuf,
    pub stats: Vec<ClusterStats>,
}

/// One-shot offline training run: reduce the whole dataset, fit the scaler
/// and cluster model, compute per-cluster statistics, persist the artifact
/// set. The fitted scaler state is the one the artifacts carry; nothing is
/// refit at inference time.
pub fn train(cfg: &TrainConfig) -> Result<TrainOutcome, StyleError> {
    eprintln!("[INFO] loading dataset {}", cfg.data_path.display());
    let table = PlayerTable::from_csv_path(&cfg.data_path)?;
    if table.is_empty() {
        return Err(StyleError::Configuration(format!(
            "dataset {} has no rows",
            cfg.data_path.display()
        )));
    }
    eprintln!(
        "[INFO] loaded {} players with {} columns",
        table.len(),
        table.columns().len()
    );

    let dimensions = DimensionTable::canonical().clone();
    let active = active_dimensions(&dimensions, &table);
    for dim in &dimensions.dimensions {
        if active.iter().any(|a| a == &dim.name) {
            let present = dim
                .candidates
                .iter()
                .filter(|c| table.has_column(c))
                .count();
            eprintln!("[INFO] dimension {:12} using {} attributes", dim.name, present);
        } else {
            eprintln!(
                "[WARN] dimension {:12} has no source columns, defaulting to 50.0",
                dim.name
            );
        }
    }

    let features = dimensions.reduce_table(&table);
    let scaler = StandardScaler::fit(&features)?;
    let scaled = scaler.transform_matrix(&features);

    let kmeans_cfg = KMeansConfig {
        n_clusters: cfg.n_clusters,
        n_init: cfg.n_init,
        seed: cfg.seed,
        ..KMeansConfig::default()
    };
    let model = kmeans::fit(&scaled, &kmeans_cfg)?;
    eprintln!(
        "[INFO] fitted {} clusters, inertia {:.2}",
        model.k(),
        model.inertia
    );

    let labels = ClusterLabelMap::for_clusters(model.k())?;
    let assignments = model.predict(&scaled);
    let stats = cluster_stats(&table, &dimensions, &features, &assignments, &labels)?;

    artifacts::write_model_artifacts(
        &cfg.out_dir,
        &scaler,
        &model,
        &labels,
        &dimensions,
        active,
        table.len(),
        cfg.n_init,
        cfg.seed,
    )?;
    eprintln!("[INFO] artifacts written to {}", cfg.out_dir.display());

    Ok(TrainOutcome {
        rows: table.len(),
        inertia: model.inertia,
        out_dir: cfg.out_dir.clone(),
        stats,
    })
}

fn active_dimensions(dimensions: &DimensionTable, table: &PlayerTable) -> Vec<String> {
    dimensions
        .dimensions
        .iter()
        .filter(|d| d.candidates.iter().any(|c| table.has_column(c)))
        .map(|d| d.name.clone())
        .collect()
}

fn cluster_stats(
    table: &PlayerTable,
    dimensions: &DimensionTable,
    features: &[Vec<f64>],
    assignments: &[usize],
    labels: &ClusterLabelMap,
) -> Result<Vec<ClusterStats>, StyleError> {
    let name_col = table.primary_name_column();
    let mut out = Vec::with_capacity(labels.len());

    for cluster_id in 0..labels.len() {
        let members: Vec<usize> = assignments
            .iter()
            .enumerate()
            .filter_map(|(row, &c)| (c == cluster_id).then_some(row))
            .collect();

        let mut profile_sums = vec![0.0; dimensions.len()];
        let mut overall_sum = 0.0;
        let mut overall_n = 0usize;
        for &row in &members {
            for (s, v) in profile_sums.iter_mut().zip(&features[row]) {
                *s += v;
            }
            if let Some(overall) = table.numeric(row, "overall") {
                overall_sum += overall;
                overall_n += 1;
            }
        }

        let style_profile = dimensions
            .dimensions
            .iter()
            .zip(&profile_sums)
            .map(|(dim, sum)| {
                let mean = if members.is_empty() {
                    0.0
                } else {
                    sum / members.len() as f64
                };
                (dim.name.clone(), mean)
            })
            .collect();

        let sample_players = name_col
            .map(|col| {
                members
                    .iter()
                    .take(SAMPLE_PLAYERS_PER_CLUSTER)
                    .map(|&row| table.value_at(row, col).unwrap_or_default().to_string())
                    .collect()
            })
            .unwrap_or_default();

        out.push(ClusterStats {
            cluster_id,
            label: labels.label_for(cluster_id)?.to_string(),
            count: members.len(),
            avg_overall: (overall_n > 0).then(|| overall_sum / overall_n as f64),
            style_profile,
            sample_players,
        });
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_stats_cover_every_cluster() {
        let table = PlayerTable::from_rows(
            &["short_name", "overall"],
            &[&["A", "80"], &["B", "70"], &["C", "60"], &["D", ""]],
        );
        let dimensions = DimensionTable::canonical().clone();
        let features = dimensions.reduce_table(&table);
        let assignments = vec![0, 1, 0, 1];
        let labels = ClusterLabelMap::for_clusters(2).unwrap();

        let stats = cluster_stats(&table, &dimensions, &features, &assignments, &labels)
            .expect("stats");
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].sample_players, vec!["A", "C"]);
        assert_eq!(stats[0].avg_overall, Some(70.0));
        // D has no overall value; B alone contributes.
        assert_eq!(stats[1].avg_overall, Some(70.0));
        assert_eq!(stats[0].style_profile.len(), 6);
    }
}
