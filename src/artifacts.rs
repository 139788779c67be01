use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dimensions::DimensionTable;
use crate::error::StyleError;
use crate::kmeans::KMeansModel;
use crate::labels::ClusterLabelMap;
use crate::scaler::StandardScaler;
use crate::similarity::{self, SimilarPlayer};
use crate::table::PlayerTable;

pub const ARTIFACT_VERSION: u32 = 1;

pub const SCALER_FILE: &str = "scaler.json";
pub const KMEANS_FILE: &str = "kmeans.json";
pub const LABELS_FILE: &str = "cluster_labels.json";
pub const DIMENSIONS_FILE: &str = "dimension_table.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScalerArtifact {
    pub version: u32,
    pub generated_at: String,
    pub scaler: StandardScaler,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KMeansArtifact {
    pub version: u32,
    pub generated_at: String,
    pub n_clusters: usize,
    pub n_init: usize,
    pub seed: u64,
    pub inertia: f64,
    #[serde(default)]
    pub train_rows: usize,
    pub centroids: Vec<Vec<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelsArtifact {
    pub version: u32,
    pub labels: ClusterLabelMap,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DimensionsArtifact {
    pub version: u32,
    pub table: DimensionTable,
    /// Dimensions that had at least one source column in the training data;
    /// purely informational for operators inspecting a trained model.
    #[serde(default)]
    pub active_dimensions: Vec<String>,
}

impl KMeansArtifact {
    pub fn into_model(self) -> KMeansModel {
        KMeansModel {
            centroids: self.centroids,
            inertia: self.inertia,
        }
    }
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Atomic JSON write: temp file in the same directory, then rename.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), StyleError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).map_err(|source| StyleError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let raw = serde_json::to_string_pretty(value).map_err(|source| StyleError::ArtifactFormat {
        path: path.to_path_buf(),
        source,
    })?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, raw).map_err(|source| StyleError::Io {
        path: tmp.clone(),
        source,
    })?;
    fs::rename(&tmp, path).map_err(|source| StyleError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StyleError> {
    if !path.exists() {
        return Err(StyleError::MissingArtifact {
            path: path.to_path_buf(),
        });
    }
    let raw = fs::read_to_string(path).map_err(|source| StyleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| StyleError::ArtifactFormat {
        path: path.to_path_buf(),
        source,
    })
}

fn check_version(version: u32, path: &Path) -> Result<(), StyleError> {
    if version != ARTIFACT_VERSION {
        return Err(StyleError::InconsistentModel(format!(
            "{} has artifact version {} (expected {})",
            path.display(),
            version,
            ARTIFACT_VERSION
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct StylePrediction {
    pub cluster_id: usize,
    pub style: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProfile {
    pub name: String,
    pub age: Option<f64>,
    pub overall: Option<f64>,
    pub positions: Option<String>,
    pub cluster_id: usize,
    pub style: String,
}

/// Everything inference needs, loaded once and immutable afterwards.
///
/// Deliberately a plain value rather than process-global state: concurrent
/// readers share a `&ModelBundle` without locking, tests hold several
/// bundles side by side, and a hot reload is an atomic swap of a fully
/// loaded replacement.
#[derive(Debug, Clone)]
pub struct ModelBundle {
    dimensions: DimensionTable,
    scaler: StandardScaler,
    model: KMeansModel,
    labels: ClusterLabelMap,
    players: PlayerTable,
    /// Every table row reduced and scaled once at load; reused by every
    /// similarity query.
    candidate_vectors: Vec<Vec<f64>>,
}

impl ModelBundle {
    /// Load all persisted artifacts plus the candidate table, refusing to
    /// construct on any structural inconsistency. A bundle that loads is a
    /// bundle that can serve.
    pub fn load(model_dir: &Path, data_path: &Path) -> Result<Self, StyleError> {
        let scaler: ScalerArtifact = read_json(&model_dir.join(SCALER_FILE))?;
        check_version(scaler.version, &model_dir.join(SCALER_FILE))?;

        let kmeans: KMeansArtifact = read_json(&model_dir.join(KMEANS_FILE))?;
        check_version(kmeans.version, &model_dir.join(KMEANS_FILE))?;

        let labels: LabelsArtifact = read_json(&model_dir.join(LABELS_FILE))?;
        check_version(labels.version, &model_dir.join(LABELS_FILE))?;

        let dims: DimensionsArtifact = read_json(&model_dir.join(DIMENSIONS_FILE))?;
        check_version(dims.version, &model_dir.join(DIMENSIONS_FILE))?;

        let players = PlayerTable::from_csv_path(data_path)?;

        Self::from_parts(
            dims.table,
            scaler.scaler,
            kmeans.into_model(),
            labels.labels,
            players,
        )
    }

    pub fn from_parts(
        dimensions: DimensionTable,
        scaler: StandardScaler,
        model: KMeansModel,
        labels: ClusterLabelMap,
        players: PlayerTable,
    ) -> Result<Self, StyleError> {
        dimensions.validate()?;
        labels.check_cardinality(model.k())?;
        if scaler.dims() != dimensions.len() {
            return Err(StyleError::InconsistentModel(format!(
                "scaler has {} columns but dimension table has {}",
                scaler.dims(),
                dimensions.len()
            )));
        }
        if model.dims() != dimensions.len() {
            return Err(StyleError::InconsistentModel(format!(
                "centroids have {} columns but dimension table has {}",
                model.dims(),
                dimensions.len()
            )));
        }

        let candidate_vectors = scaler.transform_matrix(&dimensions.reduce_table(&players));

        Ok(Self {
            dimensions,
            scaler,
            model,
            labels,
            players,
            candidate_vectors,
        })
    }

    pub fn dimensions(&self) -> &DimensionTable {
        &self.dimensions
    }

    pub fn players(&self) -> &PlayerTable {
        &self.players
    }

    pub fn cluster_count(&self) -> usize {
        self.model.k()
    }

    /// list-all-styles.
    pub fn styles(&self) -> &ClusterLabelMap {
        &self.labels
    }

    /// predict-style-from-attributes. Attribute values must be finite and
    /// within [0, 100]; anything else is rejected, uniformly, before the
    /// reducer sees the record. Missing attributes are fine (the reducer's
    /// default policy absorbs them).
    pub fn predict_style(
        &self,
        attributes: &HashMap<String, f64>,
    ) -> Result<StylePrediction, StyleError> {
        validate_attributes(attributes)?;
        let reduced = self.dimensions.reduce_record(attributes);
        let scaled = self.scaler.transform_vec(&reduced);
        let cluster_id = self.model.predict_one(&scaled);
        let style = self.labels.label_for(cluster_id)?.to_string();
        Ok(StylePrediction { cluster_id, style })
    }

    /// find-similar-players. Name matching is case-insensitive substring
    /// over the prioritized name columns; candidate names come from the
    /// column the query matched.
    pub fn similar_players(
        &self,
        player_name: &str,
        top_n: usize,
    ) -> Result<Vec<SimilarPlayer>, StyleError> {
        let hit = self.players.find_player(player_name)?;
        let query = &self.candidate_vectors[hit.row];
        let names = self.players.names_from_column(hit.name_column);
        Ok(similarity::rank_candidates(
            query,
            &self.candidate_vectors,
            &names,
            top_n,
        ))
    }

    /// get-player-profile: identifying metadata plus predicted style.
    pub fn player_profile(&self, player_name: &str) -> Result<PlayerProfile, StyleError> {
        let hit = self.players.find_player(player_name)?;
        let cluster_id = self.model.predict_one(&self.candidate_vectors[hit.row]);
        let style = self.labels.label_for(cluster_id)?.to_string();

        let name = self
            .players
            .value_at(hit.row, hit.name_column)
            .unwrap_or_default()
            .to_string();
        let positions = ["player_positions", "positions"]
            .iter()
            .find_map(|c| self.players.value(hit.row, c))
            .map(|p| p.to_string());

        Ok(PlayerProfile {
            name,
            age: self.players.numeric(hit.row, "age"),
            overall: self.players.numeric(hit.row, "overall"),
            positions,
            cluster_id,
            style,
        })
    }
}

fn validate_attributes(attributes: &HashMap<String, f64>) -> Result<(), StyleError> {
    for (name, value) in attributes {
        if !value.is_finite() || *value < 0.0 || *value > 100.0 {
            return Err(StyleError::InvalidInput(format!(
                "attribute '{name}' = {value} outside [0, 100]"
            )));
        }
    }
    Ok(())
}

/// Persist one trained model's full artifact set.
pub fn write_model_artifacts(
    dir: &Path,
    scaler: &StandardScaler,
    model: &KMeansModel,
    labels: &ClusterLabelMap,
    dimensions: &DimensionTable,
    active_dimensions: Vec<String>,
    train_rows: usize,
    n_init: usize,
    seed: u64,
) -> Result<(), StyleError> {
    let generated_at = now_rfc3339();
    write_json(
        &dir.join(SCALER_FILE),
        &ScalerArtifact {
            version: ARTIFACT_VERSION,
            generated_at: generated_at.clone(),
            scaler: scaler.clone(),
        },
    )?;
    write_json(
        &dir.join(KMEANS_FILE),
        &KMeansArtifact {
            version: ARTIFACT_VERSION,
            generated_at: generated_at.clone(),
            n_clusters: model.k(),
            n_init,
            seed,
            inertia: model.inertia,
            train_rows,
            centroids: model.centroids.clone(),
        },
    )?;
    write_json(
        &dir.join(LABELS_FILE),
        &LabelsArtifact {
            version: ARTIFACT_VERSION,
            labels: labels.clone(),
        },
    )?;
    write_json(
        &dir.join(DIMENSIONS_FILE),
        &DimensionsArtifact {
            version: ARTIFACT_VERSION,
            table: dimensions.clone(),
            active_dimensions,
        },
    )
}
