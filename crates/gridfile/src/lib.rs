//! Reader for pyglider depth-gridded glider mission files.
//!
//! A gridfile holds one column per profile along `time` and one row per depth
//! bin along `depth`. Mission ingestion only needs a few global attributes and
//! per-profile arrays, so access goes through the [`GliderDataset`] trait:
//!
//! - [`NetCdfGridFile`] reads files on disk through libnetcdf
//! - [`MemoryDataset`] holds decoded arrays, mainly for tests
//!
//! # Implementation Notes
//!
//! Time axes follow CF conventions (`seconds since 1970-01-01T00:00:00Z`) and
//! are normalized to nanoseconds since the Unix epoch, see [`time`].

pub mod dataset;
pub mod error;
pub mod memory;
pub mod native;
pub mod time;

pub use dataset::{AttributeValue, GliderDataset, PressureGrid};
pub use error::{GridFileError, GridFileResult};
pub use memory::MemoryDataset;
pub use native::{silence_hdf5_errors, NetCdfGridFile};
pub use time::{nanos_to_datetime, TimeUnits};
