//! In-memory mission store.
//!
//! Holds every record behind a single `RwLock`, so a replace takes one write
//! lock for the whole delete-and-insert sequence. Used by tests and dry runs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::error::StorageResult;
use crate::models::{GliderMission, MissionKey, PipelineMission, Profile, Stat};
use crate::store::{check_profiles, MissionStore};

#[derive(Default)]
struct MemoryState {
    missions: BTreeMap<MissionKey, GliderMission>,
    profiles: HashMap<Uuid, Profile>,
    stats: HashMap<String, f64>,
    pipeline: BTreeMap<MissionKey, bool>,
}

impl MemoryState {
    fn remove_profiles(&mut self, key: MissionKey) -> usize {
        let before = self.profiles.len();
        self.profiles.retain(|_, p| p.key() != key);
        before - self.profiles.len()
    }

    fn ordered_profiles(&self, key: MissionKey) -> Vec<Profile> {
        let mut profiles: Vec<Profile> = self
            .profiles
            .values()
            .filter(|p| p.key() == key)
            .cloned()
            .collect();
        profiles.sort_by_key(|p| p.number);
        profiles
    }
}

/// Mission store backed by process memory.
#[derive(Clone, Default)]
pub struct MemoryMissionStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryMissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored missions.
    pub async fn mission_count(&self) -> usize {
        self.state.read().await.missions.len()
    }

    /// Number of stored profiles across all missions.
    pub async fn profile_count(&self) -> usize {
        self.state.read().await.profiles.len()
    }
}

#[async_trait]
impl MissionStore for MemoryMissionStore {
    async fn find_mission(&self, key: MissionKey) -> StorageResult<Option<GliderMission>> {
        Ok(self.state.read().await.missions.get(&key).cloned())
    }

    async fn replace_mission(
        &self,
        mut mission: GliderMission,
        profiles: Vec<Profile>,
    ) -> StorageResult<GliderMission> {
        check_profiles(&mission, &profiles)?;
        let key = mission.key();
        let mut state = self.state.write().await;

        let removed = state.remove_profiles(key);
        state.missions.remove(&key);
        debug!(mission = %key, removed_profiles = removed, "Cleared previous mission records");

        for profile in profiles {
            state.profiles.insert(profile.id, profile);
        }
        mission.profile_ids = state.ordered_profiles(key).iter().map(|p| p.id).collect();
        state.missions.insert(key, mission.clone());

        Ok(mission)
    }

    async fn delete_mission(&self, key: MissionKey) -> StorageResult<bool> {
        let mut state = self.state.write().await;
        state.remove_profiles(key);
        Ok(state.missions.remove(&key).is_some())
    }

    async fn list_missions(&self) -> StorageResult<Vec<GliderMission>> {
        Ok(self.state.read().await.missions.values().cloned().collect())
    }

    async fn mission_profiles(&self, key: MissionKey) -> StorageResult<Vec<Profile>> {
        Ok(self.state.read().await.ordered_profiles(key))
    }

    async fn list_profiles(&self) -> StorageResult<Vec<Profile>> {
        let state = self.state.read().await;
        let mut profiles: Vec<Profile> = state.profiles.values().cloned().collect();
        profiles.sort_by_key(|p| (p.glider, p.mission, p.number));
        Ok(profiles)
    }

    async fn find_stat(&self, name: &str) -> StorageResult<Option<Stat>> {
        let state = self.state.read().await;
        Ok(state.stats.get(name).map(|&value| Stat {
            name: name.to_string(),
            value,
        }))
    }

    async fn upsert_stat(&self, stat: Stat) -> StorageResult<()> {
        self.state.write().await.stats.insert(stat.name, stat.value);
        Ok(())
    }

    async fn pipeline_missions(&self, yml: bool) -> StorageResult<Vec<PipelineMission>> {
        let state = self.state.read().await;
        Ok(state
            .pipeline
            .iter()
            .filter(|(_, &flag)| flag == yml)
            .map(|(key, &flag)| PipelineMission {
                glider: key.glider,
                mission: key.mission,
                yml: flag,
            })
            .collect())
    }

    async fn upsert_pipeline_mission(&self, record: PipelineMission) -> StorageResult<()> {
        let key = MissionKey::new(record.glider, record.mission);
        self.state.write().await.pipeline.insert(key, record.yml);
        Ok(())
    }
}
