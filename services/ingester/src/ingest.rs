//! Batch ingestion of gridfiles found below a root directory.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use gridfile::NetCdfGridFile;
use ingestion::{IngestOptions, IngestOutcome, IngestionError, MissionIngester};
use storage::MissionStore;
use tracing::{error, info, instrument, warn};

use crate::sources::{expected_profiles, find_gridfiles};

/// Counts for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub found: usize,
    pub ingested: usize,
    pub blocked: usize,
    pub skipped: usize,
}

/// Drives the mission ingester over a directory tree.
pub struct IngestionPipeline {
    ingester: MissionIngester,
}

impl IngestionPipeline {
    pub fn new(store: Arc<dyn MissionStore>) -> Self {
        Self {
            ingester: MissionIngester::new(store),
        }
    }

    /// Ingest near-real-time gridfiles, estimating each mission's total
    /// profile count from its raw dive files.
    #[instrument(skip(self), fields(root = %root.display()))]
    pub async fn ingest_nrt(&self, root: &Path) -> Result<BatchSummary> {
        info!("Adding NRT profiles");
        let summary = self
            .ingest_all(root, |file| {
                let expected = expected_profiles(file);
                if expected.is_none() {
                    warn!(
                        file = %file.display(),
                        "No numbered rawnc files; using the transmitted profile count"
                    );
                }
                IngestOptions::nrt(expected)
            })
            .await?;
        info!(ingested = summary.ingested, "Added all NRT profiles");
        Ok(summary)
    }

    /// Ingest completed-mission gridfiles.
    #[instrument(skip(self), fields(root = %root.display()))]
    pub async fn ingest_complete(&self, root: &Path) -> Result<BatchSummary> {
        info!("Adding complete missions");
        let summary = self.ingest_all(root, |_| IngestOptions::complete()).await?;
        info!(ingested = summary.ingested, "Added all complete missions");
        Ok(summary)
    }

    async fn ingest_all<F>(&self, root: &Path, options_for: F) -> Result<BatchSummary>
    where
        F: Fn(&Path) -> IngestOptions,
    {
        let files = find_gridfiles(root);
        info!(count = files.len(), "Found gridfiles");

        let mut summary = BatchSummary {
            found: files.len(),
            ..Default::default()
        };

        for file in &files {
            let options = options_for(file);
            match self.ingest_file(file, options).await {
                Ok(IngestOutcome::Blocked) => summary.blocked += 1,
                Ok(_) => summary.ingested += 1,
                Err(FileFailure::Abort(e)) => {
                    return Err(e).with_context(|| format!("Storage failure on {}", file.display()));
                }
                Err(FileFailure::Skip(e)) => {
                    error!(file = %file.display(), error = %e, "Skipping gridfile");
                    summary.skipped += 1;
                }
            }
        }

        Ok(summary)
    }

    async fn ingest_file(
        &self,
        file: &Path,
        options: IngestOptions,
    ) -> std::result::Result<IngestOutcome, FileFailure> {
        let dataset = NetCdfGridFile::open(file)
            .map_err(|e| FileFailure::Skip(IngestionError::from(e)))?;

        let result = self
            .ingester
            .ingest(&dataset, options)
            .await
            .map_err(FileFailure::from)?;

        info!(
            file = %file.display(),
            glider = result.mission.glider,
            mission = result.mission.mission,
            outcome = ?result.outcome,
            "Processed gridfile"
        );
        Ok(result.outcome)
    }
}

enum FileFailure {
    /// The file could not be ingested; the batch continues
    Skip(IngestionError),
    /// Storage is failing; the batch stops
    Abort(IngestionError),
}

impl From<IngestionError> for FileFailure {
    fn from(e: IngestionError) -> Self {
        if e.is_storage() {
            FileFailure::Abort(e)
        } else {
            FileFailure::Skip(e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storage::{MemoryMissionStore, MissionKey};
    use test_utils::{
        assert_approx_eq, synthetic_depth_sum, temp_test_dir, write_gridfile,
        write_synthetic_gridfile, MissionDir,
    };

    fn pipeline() -> (MemoryMissionStore, IngestionPipeline) {
        let store = MemoryMissionStore::new();
        let pipeline = IngestionPipeline::new(Arc::new(store.clone()));
        (store, pipeline)
    }

    #[tokio::test]
    async fn test_nrt_uses_rawnc_dive_count() {
        let root = temp_test_dir();
        let mission = MissionDir::create(root.path(), "SEA063/M44").unwrap();
        write_synthetic_gridfile(&mission.gridfiles_dir().join("grid.nc"), 63, 44, 10).unwrap();
        mission.add_dives(63, 44, &[1, 2, 10]).unwrap();

        let (store, pipeline) = pipeline();
        let summary = pipeline.ingest_nrt(root.path()).await.unwrap();

        assert_eq!(summary.found, 1);
        assert_eq!(summary.ingested, 1);

        let stored = store.find_mission(MissionKey::new(63, 44)).await.unwrap().unwrap();
        assert_eq!(stored.total_profiles, 20);
        assert_approx_eq!(stored.total_depth, synthetic_depth_sum(10) * 20.0 / 9.0, 1e-9);
        assert!(!stored.is_complete);
        assert_eq!(store.profile_count().await, 10);
    }

    #[tokio::test]
    async fn test_nrt_without_dives_uses_actual_count() {
        let root = temp_test_dir();
        let mission = MissionDir::create(root.path(), "SEA063/M44").unwrap();
        write_synthetic_gridfile(&mission.gridfiles_dir().join("grid.nc"), 63, 44, 6).unwrap();

        let (store, pipeline) = pipeline();
        pipeline.ingest_nrt(root.path()).await.unwrap();

        let stored = store.find_mission(MissionKey::new(63, 44)).await.unwrap().unwrap();
        assert_eq!(stored.total_profiles, 6);
    }

    #[tokio::test]
    async fn test_bad_file_is_skipped() {
        let root = temp_test_dir();
        let good = MissionDir::create(root.path(), "SEA063/M44").unwrap();
        write_synthetic_gridfile(&good.gridfiles_dir().join("grid.nc"), 63, 44, 4).unwrap();

        let broken = MissionDir::create(root.path(), "SEA069/M12").unwrap();
        broken.add_gridfile("not_netcdf.nc").unwrap();

        let missing_attr = MissionDir::create(root.path(), "SEA070/M3").unwrap();
        let dataset = test_utils::synthetic_mission(70, 3, 4).without_attribute("sea_name");
        write_gridfile(&missing_attr.gridfiles_dir().join("grid.nc"), &dataset).unwrap();

        let (store, pipeline) = pipeline();
        let summary = pipeline.ingest_complete(root.path()).await.unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                found: 3,
                ingested: 1,
                blocked: 0,
                skipped: 2,
            }
        );
        assert_eq!(store.mission_count().await, 1);
    }

    #[tokio::test]
    async fn test_complete_then_nrt_is_blocked() {
        let complete_root = temp_test_dir();
        let nrt_root = temp_test_dir();

        let done = MissionDir::create(complete_root.path(), "SEA063/M44").unwrap();
        write_synthetic_gridfile(&done.gridfiles_dir().join("grid.nc"), 63, 44, 10).unwrap();

        let partial = MissionDir::create(nrt_root.path(), "SEA063/M44").unwrap();
        write_synthetic_gridfile(&partial.gridfiles_dir().join("grid.nc"), 63, 44, 4).unwrap();
        partial.add_dives(63, 44, &[2]).unwrap();

        let (store, pipeline) = pipeline();
        pipeline.ingest_complete(complete_root.path()).await.unwrap();
        let summary = pipeline.ingest_nrt(nrt_root.path()).await.unwrap();

        assert_eq!(summary.blocked, 1);
        let stored = store.find_mission(MissionKey::new(63, 44)).await.unwrap().unwrap();
        assert!(stored.is_complete);
        assert_eq!(stored.total_profiles, 10);
    }
}
