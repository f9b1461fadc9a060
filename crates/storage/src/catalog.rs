//! Mission catalog using PostgreSQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{StorageError, StorageResult};
use crate::models::{BoundingBox, GliderMission, MissionKey, PipelineMission, Profile, Stat};
use crate::store::{check_profiles, MissionStore};

/// Rows per bulk profile insert. Eight binds per row keeps a batch well under
/// the PostgreSQL limit of 65535 bind parameters.
const PROFILE_INSERT_BATCH: usize = 1000;

const MISSION_COLUMNS: &str = "glider, mission, lon_min, lon_max, lat_min, lat_max, \
     start_time, end_time, sea_name, project, project_url, wmo_id, \
     variables, profile_indices, profile_ids, \
     total_profiles, total_distance_m, total_depth, is_complete";

const PROFILE_COLUMNS: &str = "id, glider, mission, number, lon, lat, time, max_depth";

/// Database connection pool and mission catalog operations.
#[derive(Clone)]
pub struct MissionCatalog {
    pool: PgPool,
}

impl MissionCatalog {
    /// Create a new catalog connection from database URL.
    pub async fn connect(database_url: &str) -> StorageResult<Self> {
        let options = database_url
            .parse::<PgConnectOptions>()
            .map_err(|e| StorageError::DatabaseError(format!("Invalid database URL: {}", e)))?;
        Self::connect_with(options).await
    }

    /// Create a new catalog connection from explicit connection options.
    pub async fn connect_with(options: PgConnectOptions) -> StorageResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Connection failed: {}", e)))?;

        Ok(Self { pool })
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> StorageResult<()> {
        // Split SQL statements and execute them individually
        for statement in SCHEMA_SQL.split(';') {
            let trimmed = statement.trim();
            if !trimmed.is_empty() {
                sqlx::query(trimmed)
                    .execute(&self.pool)
                    .await
                    .map_err(|e| StorageError::MigrationError(e.to_string()))?;
            }
        }

        info!("Mission catalog schema ready");
        Ok(())
    }
}

#[async_trait]
impl MissionStore for MissionCatalog {
    async fn find_mission(&self, key: MissionKey) -> StorageResult<Option<GliderMission>> {
        let row = sqlx::query_as::<_, MissionRow>(&format!(
            "SELECT {} FROM glider_missions WHERE glider = $1 AND mission = $2",
            MISSION_COLUMNS
        ))
        .bind(key.glider)
        .bind(key.mission)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| r.into()))
    }

    async fn replace_mission(
        &self,
        mut mission: GliderMission,
        profiles: Vec<Profile>,
    ) -> StorageResult<GliderMission> {
        check_profiles(&mission, &profiles)?;
        let key = mission.key();
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM profiles WHERE glider = $1 AND mission = $2")
            .bind(key.glider)
            .bind(key.mission)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Delete failed: {}", e)))?
            .rows_affected();

        sqlx::query("DELETE FROM glider_missions WHERE glider = $1 AND mission = $2")
            .bind(key.glider)
            .bind(key.mission)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Delete failed: {}", e)))?;

        debug!(mission = %key, removed_profiles = removed, "Cleared previous mission records");

        sqlx::query(&format!(
            "INSERT INTO glider_missions ({}) VALUES \
             ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, \
              $11, $12, $13, $14, $15, $16, $17, $18, $19)",
            MISSION_COLUMNS
        ))
        .bind(mission.glider)
        .bind(mission.mission)
        .bind(mission.bbox.lon_min)
        .bind(mission.bbox.lon_max)
        .bind(mission.bbox.lat_min)
        .bind(mission.bbox.lat_max)
        .bind(mission.start)
        .bind(mission.end)
        .bind(&mission.sea_name)
        .bind(&mission.project)
        .bind(&mission.project_url)
        .bind(&mission.wmo_id)
        .bind(&mission.variables)
        .bind(&mission.profile_indices)
        .bind(Vec::<Uuid>::new())
        .bind(mission.total_profiles)
        .bind(mission.total_distance_m)
        .bind(mission.total_depth)
        .bind(mission.is_complete)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Insert failed: {}", e)))?;

        for chunk in profiles.chunks(PROFILE_INSERT_BATCH) {
            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new(format!("INSERT INTO profiles ({}) ", PROFILE_COLUMNS));
            builder.push_values(chunk, |mut row, profile| {
                row.push_bind(profile.id)
                    .push_bind(profile.glider)
                    .push_bind(profile.mission)
                    .push_bind(profile.number)
                    .push_bind(profile.lon)
                    .push_bind(profile.lat)
                    .push_bind(profile.time)
                    .push_bind(profile.max_depth);
            });
            builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(|e| StorageError::DatabaseError(format!("Insert failed: {}", e)))?;
        }

        let profile_ids = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM profiles WHERE glider = $1 AND mission = $2 ORDER BY number",
        )
        .bind(key.glider)
        .bind(key.mission)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Query failed: {}", e)))?;

        sqlx::query(
            "UPDATE glider_missions SET profile_ids = $3 WHERE glider = $1 AND mission = $2",
        )
        .bind(key.glider)
        .bind(key.mission)
        .bind(&profile_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Update failed: {}", e)))?;

        tx.commit().await?;

        mission.profile_ids = profile_ids;
        Ok(mission)
    }

    async fn delete_mission(&self, key: MissionKey) -> StorageResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM profiles WHERE glider = $1 AND mission = $2")
            .bind(key.glider)
            .bind(key.mission)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Delete failed: {}", e)))?;

        let result = sqlx::query("DELETE FROM glider_missions WHERE glider = $1 AND mission = $2")
            .bind(key.glider)
            .bind(key.mission)
            .execute(&mut *tx)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Delete failed: {}", e)))?;

        tx.commit().await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_missions(&self) -> StorageResult<Vec<GliderMission>> {
        let rows = sqlx::query_as::<_, MissionRow>(&format!(
            "SELECT {} FROM glider_missions ORDER BY glider, mission",
            MISSION_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn mission_profiles(&self, key: MissionKey) -> StorageResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE glider = $1 AND mission = $2 ORDER BY number",
            PROFILE_COLUMNS
        ))
        .bind(key.glider)
        .bind(key.mission)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn list_profiles(&self) -> StorageResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles ORDER BY glider, mission, number",
            PROFILE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows.into_iter().map(|r| r.into()).collect())
    }

    async fn find_stat(&self, name: &str) -> StorageResult<Option<Stat>> {
        let row = sqlx::query_as::<_, StatRow>("SELECT name, value FROM stats WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(row.map(|r| Stat {
            name: r.name,
            value: r.value,
        }))
    }

    async fn upsert_stat(&self, stat: Stat) -> StorageResult<()> {
        sqlx::query(
            "INSERT INTO stats (name, value) VALUES ($1, $2) \
             ON CONFLICT (name) DO UPDATE SET value = EXCLUDED.value",
        )
        .bind(&stat.name)
        .bind(stat.value)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Insert failed: {}", e)))?;

        Ok(())
    }

    async fn pipeline_missions(&self, yml: bool) -> StorageResult<Vec<PipelineMission>> {
        let rows = sqlx::query_as::<_, PipelineRow>(
            "SELECT glider, mission, yml FROM pipeline_missions \
             WHERE yml = $1 ORDER BY glider, mission",
        )
        .bind(yml)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Query failed: {}", e)))?;

        Ok(rows
            .into_iter()
            .map(|r| PipelineMission {
                glider: r.glider,
                mission: r.mission,
                yml: r.yml,
            })
            .collect())
    }

    async fn upsert_pipeline_mission(&self, record: PipelineMission) -> StorageResult<()> {
        sqlx::query(
            "INSERT INTO pipeline_missions (glider, mission, yml) VALUES ($1, $2, $3) \
             ON CONFLICT (glider, mission) DO UPDATE SET yml = EXCLUDED.yml",
        )
        .bind(record.glider)
        .bind(record.mission)
        .bind(record.yml)
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::DatabaseError(format!("Insert failed: {}", e)))?;

        Ok(())
    }
}

/// Internal row type for mission queries.
#[derive(FromRow)]
struct MissionRow {
    glider: i64,
    mission: i64,
    lon_min: f64,
    lon_max: f64,
    lat_min: f64,
    lat_max: f64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    sea_name: String,
    project: String,
    project_url: String,
    wmo_id: String,
    variables: Vec<String>,
    profile_indices: Vec<i64>,
    profile_ids: Vec<Uuid>,
    total_profiles: i64,
    total_distance_m: f64,
    total_depth: f64,
    is_complete: bool,
}

impl From<MissionRow> for GliderMission {
    fn from(row: MissionRow) -> Self {
        GliderMission {
            glider: row.glider,
            mission: row.mission,
            bbox: BoundingBox::new(row.lon_min, row.lon_max, row.lat_min, row.lat_max),
            start: row.start_time,
            end: row.end_time,
            sea_name: row.sea_name,
            project: row.project,
            project_url: row.project_url,
            wmo_id: row.wmo_id,
            variables: row.variables,
            profile_indices: row.profile_indices,
            profile_ids: row.profile_ids,
            total_profiles: row.total_profiles,
            total_distance_m: row.total_distance_m,
            total_depth: row.total_depth,
            is_complete: row.is_complete,
        }
    }
}

#[derive(FromRow)]
struct ProfileRow {
    id: Uuid,
    glider: i64,
    mission: i64,
    number: i64,
    lon: f64,
    lat: f64,
    time: DateTime<Utc>,
    max_depth: Option<f64>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            glider: row.glider,
            mission: row.mission,
            number: row.number,
            lon: row.lon,
            lat: row.lat,
            time: row.time,
            max_depth: row.max_depth,
        }
    }
}

#[derive(FromRow)]
struct StatRow {
    name: String,
    value: f64,
}

#[derive(FromRow)]
struct PipelineRow {
    glider: i64,
    mission: i64,
    yml: bool,
}

/// Database schema SQL.
const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS glider_missions (
    glider BIGINT NOT NULL,
    mission BIGINT NOT NULL,
    lon_min DOUBLE PRECISION NOT NULL,
    lon_max DOUBLE PRECISION NOT NULL,
    lat_min DOUBLE PRECISION NOT NULL,
    lat_max DOUBLE PRECISION NOT NULL,
    start_time TIMESTAMPTZ NOT NULL,
    end_time TIMESTAMPTZ NOT NULL,
    sea_name TEXT NOT NULL,
    project TEXT NOT NULL,
    project_url TEXT NOT NULL,
    wmo_id TEXT NOT NULL,
    variables TEXT[] NOT NULL DEFAULT '{}',
    profile_indices BIGINT[] NOT NULL DEFAULT '{}',
    profile_ids UUID[] NOT NULL DEFAULT '{}',
    total_profiles BIGINT NOT NULL,
    total_distance_m DOUBLE PRECISION NOT NULL,
    total_depth DOUBLE PRECISION NOT NULL,
    is_complete BOOLEAN NOT NULL DEFAULT FALSE,

    PRIMARY KEY (glider, mission)
);

CREATE INDEX IF NOT EXISTS idx_glider_missions_end_time ON glider_missions(end_time DESC);

CREATE TABLE IF NOT EXISTS profiles (
    id UUID PRIMARY KEY,
    glider BIGINT NOT NULL,
    mission BIGINT NOT NULL,
    number BIGINT NOT NULL,
    lon DOUBLE PRECISION NOT NULL,
    lat DOUBLE PRECISION NOT NULL,
    time TIMESTAMPTZ NOT NULL,
    max_depth DOUBLE PRECISION,

    UNIQUE(glider, mission, number),
    FOREIGN KEY (glider, mission) REFERENCES glider_missions(glider, mission) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_profiles_mission ON profiles(glider, mission, number);

CREATE TABLE IF NOT EXISTS stats (
    name TEXT PRIMARY KEY,
    value DOUBLE PRECISION NOT NULL
);

CREATE TABLE IF NOT EXISTS pipeline_missions (
    glider BIGINT NOT NULL,
    mission BIGINT NOT NULL,
    yml BOOLEAN NOT NULL DEFAULT FALSE,

    PRIMARY KEY (glider, mission)
);
"#;
