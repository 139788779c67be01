use serde::{Deserialize, Serialize};

use crate::error::StyleError;

/// Human-authored interpretation of the 6 clusters, curated once against the
/// training data. Not derived from the data: if K or the dataset changes,
/// these need to be re-validated by a person before shipping.
pub const CURATED_STYLE_LABELS: [&str; 6] = [
    "Creative Playmaker",
    "Ball Winning Midfielder",
    "Explosive Winger",
    "Target Man",
    "Defensive Center Back",
    "Box-to-Box Midfielder",
];

/// Index -> style-name mapping, written at training time and read-only
/// afterwards. The join key between the numeric model and human-facing
/// labels; cardinality must match the model's centroid count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterLabelMap {
    labels: Vec<String>,
}

impl ClusterLabelMap {
    pub fn new(labels: Vec<String>) -> Result<Self, StyleError> {
        if labels.is_empty() {
            return Err(StyleError::Configuration(
                "label map has no entries".to_string(),
            ));
        }
        if let Some(idx) = labels.iter().position(|l| l.trim().is_empty()) {
            return Err(StyleError::Configuration(format!(
                "label map entry {idx} is empty"
            )));
        }
        Ok(Self { labels })
    }

    /// Label map for a k-cluster model: curated names while they last, then
    /// generic placeholders for any extra clusters.
    pub fn for_clusters(k: usize) -> Result<Self, StyleError> {
        let labels = (0..k)
            .map(|idx| {
                CURATED_STYLE_LABELS
                    .get(idx)
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| format!("Cluster {idx}"))
            })
            .collect();
        Self::new(labels)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label_for(&self, index: usize) -> Result<&str, StyleError> {
        self.labels
            .get(index)
            .map(|l| l.as_str())
            .ok_or(StyleError::UnknownCluster {
                index,
                k: self.labels.len(),
            })
    }

    pub fn entries(&self) -> impl Iterator<Item = (usize, &str)> {
        self.labels.iter().enumerate().map(|(i, l)| (i, l.as_str()))
    }

    /// Guard against serving a label map persisted for a different model.
    pub fn check_cardinality(&self, centroid_count: usize) -> Result<(), StyleError> {
        if self.labels.len() != centroid_count {
            return Err(StyleError::InconsistentModel(format!(
                "label map has {} entries but model has {} centroids",
                self.labels.len(),
                centroid_count
            )));
        }
        Ok(())
    }
}
