//! Player style clustering: reduces raw skill attributes to six style
//! dimensions, assigns a playing-style label via a fitted centroid model,
//! and ranks players by style similarity. Training is offline and one-shot;
//! inference runs against an immutable, artifact-loaded [`ModelBundle`].

pub mod artifacts;
pub mod dimensions;
pub mod error;
pub mod kmeans;
pub mod labels;
pub mod scaler;
pub mod similarity;
pub mod table;
pub mod train;

pub use artifacts::{ModelBundle, PlayerProfile, StylePrediction};
pub use error::StyleError;
