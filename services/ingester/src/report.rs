//! JSON reports over stored missions.

use anyhow::{bail, Context, Result};
use chrono::TimeDelta;
use clap::Subcommand;
use ingestion::reporting;
use serde_json::{json, Value};
use storage::MissionStore;

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Report {
    /// Profiles, gliders, time at sea and distance across all missions
    Totals,
    /// One row per mission
    Missions,
    /// One row per profile
    Profiles,
    /// Missions whose last profile is within the recent window
    Recent {
        /// Window length in days
        #[arg(long, default_value_t = reporting::DEFAULT_RECENT_WINDOW.num_days())]
        days: i64,
    },
    /// Value of a named statistic
    Stat { name: String },
    /// Missions recorded in the processing pipeline
    Pipeline {
        /// Only missions configured via yml
        #[arg(long)]
        yml: bool,
    },
    /// A single mission and its profiles
    Mission { glider: i64, mission: i64 },
}

/// Run a report and return it as JSON.
pub async fn run(store: &dyn MissionStore, report: &Report) -> Result<Value> {
    let value = match report {
        Report::Totals => serde_json::to_value(reporting::totals(store).await?)?,
        Report::Missions => serde_json::to_value(reporting::missions_table(store).await?)?,
        Report::Profiles => serde_json::to_value(reporting::profiles_table(store).await?)?,
        Report::Recent { days } => {
            if *days < 0 {
                bail!("--days must not be negative, got {}", days);
            }
            let window = TimeDelta::try_days(*days)
                .with_context(|| format!("--days {} is out of range", days))?;
            serde_json::to_value(reporting::recent_missions(store, window).await?)?
        }
        Report::Stat { name } => json!({
            "name": name,
            "value": reporting::stat(store, name).await?,
        }),
        Report::Pipeline { yml } => {
            serde_json::to_value(reporting::pipeline_missions(store, *yml).await?)?
        }
        Report::Mission { glider, mission } => json!({
            "mission": reporting::select_mission(store, *glider, *mission).await?,
            "profiles": reporting::mission_profiles(store, *glider, *mission).await?,
        }),
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use ingestion::{IngestOptions, MissionIngester};
    use storage::{MemoryMissionStore, Stat};
    use test_utils::synthetic_mission;

    async fn store_with_mission() -> MemoryMissionStore {
        let store = MemoryMissionStore::new();
        MissionIngester::new(Arc::new(store.clone()))
            .ingest(&synthetic_mission(63, 44, 5), IngestOptions::complete())
            .await
            .unwrap();
        store
    }

    #[tokio::test]
    async fn test_totals_report() {
        let store = store_with_mission().await;
        let value = run(&store, &Report::Totals).await.unwrap();

        assert_eq!(value["total_profiles"], 5);
        assert_eq!(value["glider_count"], 1);
        assert_eq!(value["total_time"], "12 hours, 0 minutes");
    }

    #[tokio::test]
    async fn test_mission_report_includes_profiles() {
        let store = store_with_mission().await;
        let value = run(&store, &Report::Mission { glider: 63, mission: 44 })
            .await
            .unwrap();

        assert_eq!(value["mission"]["sea_name"], "Baltic");
        assert_eq!(value["profiles"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_recent_report_window() {
        let store = store_with_mission().await;

        let value = run(&store, &Report::Recent { days: 3 }).await.unwrap();
        assert!(value.as_array().unwrap().is_empty());

        let value = run(&store, &Report::Recent { days: 365_000 }).await.unwrap();
        assert_eq!(value.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_recent_report_rejects_bad_days() {
        let store = store_with_mission().await;

        assert!(run(&store, &Report::Recent { days: i64::MAX }).await.is_err());
        assert!(run(&store, &Report::Recent { days: -1 }).await.is_err());
    }

    #[tokio::test]
    async fn test_stat_report() {
        let store = MemoryMissionStore::new();
        store
            .upsert_stat(Stat {
                name: "dives".to_string(),
                value: 12.0,
            })
            .await
            .unwrap();

        let value = run(&store, &Report::Stat { name: "dives".to_string() })
            .await
            .unwrap();
        assert_eq!(value, json!({"name": "dives", "value": 12.0}));

        let missing = run(&store, &Report::Stat { name: "absent".to_string() }).await;
        assert!(missing.is_err());
    }
}
