//! Gridfile discovery and NRT profile-count estimation.
//!
//! Missions are laid out as
//!
//! ```text
//! <mission>/gridfiles/<name>.nc
//! <mission>/rawnc/<prefix>.<dive>.nc
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Find every `*gridfiles/*.nc` file below `root`, sorted by path.
pub fn find_gridfiles(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!(root = %root.display(), error = %e, "Skipping unreadable path");
                continue;
            }
        };

        if entry.file_type().is_file() && is_gridfile(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    debug!(root = %root.display(), count = files.len(), "Found gridfiles");
    files
}

fn is_gridfile(path: &Path) -> bool {
    let in_gridfiles_dir = path
        .parent()
        .and_then(|dir| dir.file_name())
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with("gridfiles"));

    in_gridfiles_dir && has_nc_extension(path)
}

fn has_nc_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "nc")
}

/// Dive number of a raw dive file: the second-to-last dot-separated token.
///
/// Returns `None` when that token is missing or not an integer.
pub fn dive_number(file_name: &str) -> Option<i64> {
    let mut tokens = file_name.rsplit('.');
    tokens.next()?;
    tokens.next()?.parse().ok()
}

/// Highest dive number among the `*.nc` files in `rawnc_dir`.
pub fn max_dive_number(rawnc_dir: &Path) -> Option<i64> {
    let entries = match fs::read_dir(rawnc_dir) {
        Ok(entries) => entries,
        Err(e) => {
            debug!(dir = %rawnc_dir.display(), error = %e, "No rawnc directory");
            return None;
        }
    };

    entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| has_nc_extension(path))
        .filter_map(|path| path.file_name()?.to_str().and_then(dive_number))
        .max()
}

/// `rawnc` directory belonging to the mission of `gridfile`.
pub fn rawnc_dir_for(gridfile: &Path) -> Option<PathBuf> {
    let mission_dir = gridfile.parent()?.parent()?;
    Some(mission_dir.join("rawnc"))
}

/// Expected profile count for an in-progress mission.
///
/// Each dive yields two profiles, so this is twice the highest dive number
/// transmitted so far.
pub fn expected_profiles(gridfile: &Path) -> Option<i64> {
    max_dive_number(&rawnc_dir_for(gridfile)?).map(|dive| 2 * dive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_utils::{rawnc_file_name, temp_test_dir, MissionDir};

    #[test]
    fn test_dive_number() {
        assert_eq!(dive_number("sea063.0044.gli.sub.00012.nc"), Some(12));
        assert_eq!(dive_number("sea063.44.pld1.raw.7.nc"), Some(7));
        assert_eq!(dive_number("dive.nc"), None);
        assert_eq!(dive_number("nodots"), None);
        assert_eq!(dive_number("sea063.0044.gli.sub.final.nc"), None);
    }

    #[test]
    fn test_max_dive_skips_non_numeric_names() {
        let root = temp_test_dir();
        let mission = MissionDir::create(root.path(), "SEA063_M44").unwrap();
        mission.add_dives(63, 44, &[3, 41, 17]).unwrap();
        mission.add_rawnc("sea063.0044.gli.sub.latest.nc").unwrap();
        mission.add_rawnc("notes.txt").unwrap();
        mission.add_rawnc(&rawnc_file_name(63, 44, 99).replace(".nc", ".bak")).unwrap();

        assert_eq!(max_dive_number(&mission.rawnc_dir()), Some(41));
    }

    #[test]
    fn test_max_dive_missing_dir() {
        let root = temp_test_dir();
        assert_eq!(max_dive_number(&root.path().join("rawnc")), None);
    }

    #[test]
    fn test_expected_profiles_doubles_max_dive() {
        let root = temp_test_dir();
        let mission = MissionDir::create(root.path(), "SEA063_M44").unwrap();
        let grid = mission.add_gridfile("mission_grid_nrt.nc").unwrap();
        mission.add_dives(63, 44, &[1, 2, 10]).unwrap();

        assert_eq!(expected_profiles(&grid), Some(20));
    }

    #[test]
    fn test_expected_profiles_without_dives() {
        let root = temp_test_dir();
        let mission = MissionDir::create(root.path(), "SEA063_M44").unwrap();
        let grid = mission.add_gridfile("mission_grid_nrt.nc").unwrap();

        assert_eq!(expected_profiles(&grid), None);
    }

    #[test]
    fn test_find_gridfiles() {
        let root = temp_test_dir();
        let a = MissionDir::create(root.path(), "SEA063/M44").unwrap();
        let b = MissionDir::create(root.path(), "SEA069/M12").unwrap();
        a.add_gridfile("mission_grid.nc").unwrap();
        b.add_gridfile("mission_grid.nc").unwrap();
        b.add_gridfile("readme.txt").unwrap();
        a.add_dives(63, 44, &[1]).unwrap();

        let nrt_dir = root.path().join("SEA070/M1/nrt_gridfiles");
        fs::create_dir_all(&nrt_dir).unwrap();
        fs::write(nrt_dir.join("grid.nc"), b"").unwrap();

        let found = find_gridfiles(root.path());
        assert_eq!(found.len(), 3);
        assert!(found.windows(2).all(|w| w[0] <= w[1]));
        assert!(found.iter().all(|p| p.extension().unwrap() == "nc"));
        assert!(!found.iter().any(|p| p.to_string_lossy().contains("rawnc")));
    }

    #[test]
    fn test_find_gridfiles_missing_root() {
        let root = temp_test_dir();
        assert!(find_gridfiles(&root.path().join("absent")).is_empty());
    }
}
