//! Storage abstractions for glider mission records.
//!
//! Provides:
//! - [`MissionStore`], the seam used by ingestion and reporting
//! - [`MissionCatalog`], the PostgreSQL implementation
//! - [`MemoryMissionStore`], an in-memory implementation for tests and dry runs

pub mod catalog;
pub mod error;
pub mod memory;
pub mod models;
pub mod store;

pub use catalog::MissionCatalog;
pub use error::{StorageError, StorageResult};
pub use memory::MemoryMissionStore;
pub use models::{BoundingBox, GliderMission, MissionKey, PipelineMission, Profile, Stat};
pub use store::MissionStore;
