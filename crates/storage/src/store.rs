//! The storage seam used by ingestion and reporting.

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};
use crate::models::{GliderMission, MissionKey, PipelineMission, Profile, Stat};

/// Persistence for missions, profiles and their auxiliary records.
///
/// Implementations must keep at most one mission per [`MissionKey`], and
/// [`MissionStore::replace_mission`] must apply as one unit: readers never see
/// a mission without its profiles or profiles without their mission.
#[async_trait]
pub trait MissionStore: Send + Sync {
    /// Find the mission for a glider deployment.
    async fn find_mission(&self, key: MissionKey) -> StorageResult<Option<GliderMission>>;

    /// Replace any existing mission (and all of its profiles) for the same key.
    ///
    /// Profiles are inserted in bulk; the returned mission carries their ids
    /// ordered by profile number.
    async fn replace_mission(
        &self,
        mission: GliderMission,
        profiles: Vec<Profile>,
    ) -> StorageResult<GliderMission>;

    /// Delete a mission and its profiles. Returns whether a mission existed.
    async fn delete_mission(&self, key: MissionKey) -> StorageResult<bool>;

    async fn list_missions(&self) -> StorageResult<Vec<GliderMission>>;

    /// Profiles of one mission ordered by profile number.
    async fn mission_profiles(&self, key: MissionKey) -> StorageResult<Vec<Profile>>;

    async fn list_profiles(&self) -> StorageResult<Vec<Profile>>;

    async fn find_stat(&self, name: &str) -> StorageResult<Option<Stat>>;

    async fn upsert_stat(&self, stat: Stat) -> StorageResult<()>;

    async fn pipeline_missions(&self, yml: bool) -> StorageResult<Vec<PipelineMission>>;

    async fn upsert_pipeline_mission(&self, record: PipelineMission) -> StorageResult<()>;
}

/// Reject profiles that do not belong to `mission`.
pub(crate) fn check_profiles(mission: &GliderMission, profiles: &[Profile]) -> StorageResult<()> {
    let key = mission.key();
    match profiles.iter().find(|p| p.key() != key) {
        Some(stray) => Err(StorageError::InvalidRecord(format!(
            "profile {} of {} cannot be stored under {}",
            stray.number,
            stray.key(),
            key
        ))),
        None => Ok(()),
    }
}
