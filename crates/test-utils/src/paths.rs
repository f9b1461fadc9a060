//! On-disk mission directory layouts for tests.
//!
//! The ingester expects one directory per mission:
//!
//! ```text
//! <root>/<mission>/gridfiles/<name>.nc
//! <root>/<mission>/rawnc/<prefix>.<dive>.nc
//! ```
//!
//! Files created here are empty; they exist for discovery and dive counting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Creates a temporary directory for test output.
///
/// The directory is automatically cleaned up when the returned `TempDir` is dropped.
pub fn temp_test_dir() -> tempfile::TempDir {
    tempfile::Builder::new()
        .prefix("glider_test_")
        .tempdir()
        .expect("Failed to create temporary test directory")
}

/// Raw dive file name in the pyglider `rawnc` style, e.g. `sea063.0044.gli.sub.00012.nc`.
pub fn rawnc_file_name(glider: i64, mission: i64, dive: u32) -> String {
    format!("sea{:03}.{:04}.gli.sub.{:05}.nc", glider, mission, dive)
}

/// One mission directory below a test root.
#[derive(Debug, Clone)]
pub struct MissionDir {
    pub path: PathBuf,
}

impl MissionDir {
    /// Create `<root>/<name>/` with empty `gridfiles/` and `rawnc/` subdirectories.
    pub fn create(root: &Path, name: &str) -> io::Result<Self> {
        let path = root.join(name);
        fs::create_dir_all(path.join("gridfiles"))?;
        fs::create_dir_all(path.join("rawnc"))?;
        Ok(Self { path })
    }

    pub fn gridfiles_dir(&self) -> PathBuf {
        self.path.join("gridfiles")
    }

    pub fn rawnc_dir(&self) -> PathBuf {
        self.path.join("rawnc")
    }

    /// Add an empty file under `gridfiles/` and return its path.
    pub fn add_gridfile(&self, file_name: &str) -> io::Result<PathBuf> {
        let path = self.gridfiles_dir().join(file_name);
        fs::write(&path, b"")?;
        Ok(path)
    }

    /// Add an empty file under `rawnc/` and return its path.
    pub fn add_rawnc(&self, file_name: &str) -> io::Result<PathBuf> {
        let path = self.rawnc_dir().join(file_name);
        fs::write(&path, b"")?;
        Ok(path)
    }

    /// Add one raw dive file per dive number.
    pub fn add_dives(&self, glider: i64, mission: i64, dives: &[u32]) -> io::Result<()> {
        for &dive in dives {
            self.add_rawnc(&rawnc_file_name(glider, mission, dive))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rawnc_file_name() {
        assert_eq!(rawnc_file_name(63, 44, 12), "sea063.0044.gli.sub.00012.nc");
    }

    #[test]
    fn test_mission_dir_layout() {
        let root = temp_test_dir();
        let mission = MissionDir::create(root.path(), "SEA063_M44").unwrap();
        let grid = mission.add_gridfile("mission_grid.nc").unwrap();
        mission.add_dives(63, 44, &[1, 2, 3]).unwrap();

        assert!(grid.exists());
        assert!(grid.ends_with("SEA063_M44/gridfiles/mission_grid.nc"));
        assert_eq!(fs::read_dir(mission.rawnc_dir()).unwrap().count(), 3);
    }
}
