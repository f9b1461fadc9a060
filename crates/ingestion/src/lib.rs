//! Glider mission ingestion library.
//!
//! Turns pyglider gridfiles into mission and profile records and answers the
//! reporting queries built on top of them.
//!
//! # Architecture
//!
//! - [`MissionIngester`] reads a [`gridfile::GliderDataset`], derives distance,
//!   depth and variable summaries, and replaces the stored mission through a
//!   [`storage::MissionStore`]
//! - [`distance`] holds the planar track-distance approximation
//! - [`reporting`] provides read-only totals and tables

pub mod config;
pub mod distance;
pub mod error;
mod ingester;
pub mod metadata;
pub mod reporting;

// Re-exports
pub use config::{present_variables, VariableSpec, TARGET_VARIABLES};
pub use distance::{leg_distance_m, total_distance, track_distance_m};
pub use error::{IngestionError, Result};
pub use ingester::{
    build_mission, profile_totals, IngestOptions, IngestOutcome, IngestionResult, MissionIngester,
};
pub use metadata::{max_depth_per_profile, mission_header, mission_key, MissionHeader};
pub use reporting::{MissionRow, MissionTotals, DEFAULT_RECENT_WINDOW};
