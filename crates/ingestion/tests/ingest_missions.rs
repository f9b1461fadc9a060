//! End-to-end ingestion against the in-memory store.

use std::sync::Arc;

use gridfile::GliderDataset;
use ingestion::{IngestOptions, IngestOutcome, IngestionError, MissionIngester};
use storage::{MemoryMissionStore, MissionKey, MissionStore};
use test_utils::{
    assert_approx_eq, assert_position_approx_eq, attr_names, mission_along_track,
    synthetic_depth_sum, synthetic_max_depth, synthetic_mission, LON_STEP, TRACK_LATITUDE,
};

fn ingester() -> (MemoryMissionStore, MissionIngester) {
    let store = MemoryMissionStore::new();
    let ingester = MissionIngester::new(Arc::new(store.clone()));
    (store, ingester)
}

#[tokio::test]
async fn test_reingest_replaces_mission_and_profiles() {
    let (store, ingester) = ingester();
    let dataset = synthetic_mission(63, 44, 10);

    let first = ingester
        .ingest(&dataset, IngestOptions::nrt(None))
        .await
        .unwrap();
    let second = ingester
        .ingest(&dataset, IngestOptions::nrt(None))
        .await
        .unwrap();

    assert_eq!(first.outcome, IngestOutcome::Created);
    assert_eq!(second.outcome, IngestOutcome::Replaced);
    assert_eq!(store.mission_count().await, 1);
    assert_eq!(store.profile_count().await, 10);

    // profile ids are regenerated on every replace
    assert_ne!(first.mission.profile_ids, second.mission.profile_ids);

    let stored = store
        .find_mission(MissionKey::new(63, 44))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, second.mission);
}

#[tokio::test]
async fn test_profile_ids_follow_profile_order() {
    let (store, ingester) = ingester();
    let result = ingester
        .ingest(&synthetic_mission(63, 44, 6), IngestOptions::nrt(None))
        .await
        .unwrap();

    let profiles = store.mission_profiles(MissionKey::new(63, 44)).await.unwrap();
    let ordered_ids: Vec<_> = profiles.iter().map(|p| p.id).collect();
    assert_eq!(result.mission.profile_ids, ordered_ids);

    for (i, profile) in profiles.iter().enumerate() {
        assert_eq!(profile.number, i as i64);
        assert_eq!(profile.max_depth, Some(synthetic_max_depth(i)));
        assert_position_approx_eq!(
            (profile.lon, profile.lat),
            (17.0 + LON_STEP * i as f64, TRACK_LATITUDE),
            1e-9
        );
    }
}

#[tokio::test]
async fn test_mission_summary_fields() {
    let (_store, ingester) = ingester();
    let dataset = synthetic_mission(63, 44, 10);
    let result = ingester
        .ingest(&dataset, IngestOptions::nrt(None))
        .await
        .unwrap();
    let mission = result.mission;

    assert_eq!(mission.key(), MissionKey::new(63, 44));
    assert_eq!(mission.sea_name, "Baltic");
    assert_eq!(mission.wmo_id, "6801573");
    assert_eq!(mission.variables, vec!["oxygen", "chlorophyll", "adcp"]);
    assert_eq!(mission.profile_indices, dataset.profile_index().unwrap());
    assert_eq!(mission.total_profiles, 10);
    assert_approx_eq!(mission.total_depth, synthetic_depth_sum(10), 1e-9);
    assert_approx_eq!(mission.total_distance_m, 9.0 * LON_STEP * 111_000.0, 1e-6);
    assert_eq!(mission.duration(), chrono::Duration::hours(27));
    assert!(!mission.is_complete);
}

#[tokio::test]
async fn test_complete_mission_blocks_nrt_overwrite() {
    let (store, ingester) = ingester();

    let complete = ingester
        .ingest(&synthetic_mission(63, 44, 10), IngestOptions::complete())
        .await
        .unwrap();
    assert!(complete.mission.is_complete);

    let blocked = ingester
        .ingest(&synthetic_mission(63, 44, 4), IngestOptions::nrt(Some(40)))
        .await
        .unwrap();

    assert_eq!(blocked.outcome, IngestOutcome::Blocked);
    assert_eq!(blocked.mission, complete.mission);
    assert_eq!(store.profile_count().await, 10);

    let stored = store
        .find_mission(MissionKey::new(63, 44))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored, complete.mission);
}

#[tokio::test]
async fn test_complete_mission_can_be_reingested_as_complete() {
    let (store, ingester) = ingester();

    ingester
        .ingest(&synthetic_mission(63, 44, 10), IngestOptions::complete())
        .await
        .unwrap();
    let again = ingester
        .ingest(&synthetic_mission(63, 44, 12), IngestOptions::complete())
        .await
        .unwrap();

    assert_eq!(again.outcome, IngestOutcome::Replaced);
    assert_eq!(again.mission.total_profiles, 12);
    assert_eq!(store.profile_count().await, 12);
}

#[tokio::test]
async fn test_nrt_overrides_profile_total_and_extrapolates_depth() {
    let (store, ingester) = ingester();

    let result = ingester
        .ingest(&synthetic_mission(63, 44, 10), IngestOptions::nrt(Some(20)))
        .await
        .unwrap();

    let summed = synthetic_depth_sum(10);
    assert_eq!(result.mission.total_profiles, 20);
    assert_approx_eq!(result.mission.total_depth, summed * 20.0 / 9.0, 1e-9);
    // only the transmitted profiles are stored
    assert_eq!(store.profile_count().await, 10);
}

#[tokio::test]
async fn test_missing_attribute_is_fatal_and_stores_nothing() {
    let (store, ingester) = ingester();
    let dataset = synthetic_mission(63, 44, 5).without_attribute(attr_names::PROJECT_URL);

    let err = ingester
        .ingest(&dataset, IngestOptions::nrt(None))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestionError::GridFile(_)));
    assert!(!err.is_storage());
    assert_eq!(store.mission_count().await, 0);
    assert_eq!(store.profile_count().await, 0);
}

#[tokio::test]
async fn test_mismatched_arrays_are_rejected() {
    let (store, ingester) = ingester();
    let mut dataset = synthetic_mission(63, 44, 5);
    dataset.latitude = Some(vec![57.0; 4]);

    let err = ingester
        .ingest(&dataset, IngestOptions::nrt(None))
        .await
        .unwrap_err();

    assert!(matches!(err, IngestionError::InconsistentDataset(_)));
    assert_eq!(store.mission_count().await, 0);
}

#[tokio::test]
async fn test_empty_dataset_is_rejected() {
    let (_store, ingester) = ingester();
    let err = ingester
        .ingest(&synthetic_mission(63, 44, 0), IngestOptions::nrt(None))
        .await
        .unwrap_err();
    assert!(matches!(err, IngestionError::MissingMetadata(_)));
}

#[tokio::test]
async fn test_distance_over_equatorial_track() {
    let (_store, ingester) = ingester();
    // (lon, lat): (0, 0) -> (1, 0) -> (1, 1)
    let dataset = mission_along_track(1, 1, &[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);

    let result = ingester
        .ingest(&dataset, IngestOptions::nrt(None))
        .await
        .unwrap();

    assert_approx_eq!(result.mission.total_distance_m, 222_000.0, 1e-6);
}

#[tokio::test]
async fn test_missions_are_independent() {
    let (store, ingester) = ingester();

    ingester
        .ingest(&synthetic_mission(63, 44, 5), IngestOptions::nrt(None))
        .await
        .unwrap();
    ingester
        .ingest(&synthetic_mission(69, 12, 7), IngestOptions::nrt(None))
        .await
        .unwrap();
    ingester
        .ingest(&synthetic_mission(63, 44, 6), IngestOptions::nrt(None))
        .await
        .unwrap();

    assert_eq!(store.mission_count().await, 2);
    assert_eq!(store.profile_count().await, 13);
}
