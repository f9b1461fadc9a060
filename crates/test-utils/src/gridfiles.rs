//! Write in-memory datasets to disk as pyglider-style gridfiles.

use std::path::Path;

use gridfile::{AttributeValue, GliderDataset, MemoryDataset};

/// Fill value used for invalid pressure cells.
pub const PRESSURE_FILL: f64 = -999.0;

const TIME_UNITS: &str = "seconds since 1970-01-01T00:00:00Z";

/// Write `dataset` to `path` with `(depth, time)` dimensions.
///
/// Missing arrays are skipped, so an incomplete dataset produces an
/// incomplete file. NaN pressure cells are written as [`PRESSURE_FILL`].
/// Extra variables are written as zero-filled `(depth, time)` grids.
pub fn write_gridfile(path: &Path, dataset: &MemoryDataset) -> Result<(), netcdf::Error> {
    let n_time = dataset.profile_index.as_ref().map_or(0, Vec::len);
    let n_depth = dataset.depth.as_ref().map_or(0, Vec::len);

    let mut file = netcdf::create(path)?;
    file.add_dimension("time", n_time)?;
    file.add_dimension("depth", n_depth)?;

    for (name, value) in &dataset.attributes {
        match value {
            AttributeValue::Text(text) => file.add_attribute(name, text.as_str())?,
            AttributeValue::Number(number) => file.add_attribute(name, *number)?,
        };
    }

    if let Some(values) = &dataset.profile_index {
        let values: Vec<f64> = values.iter().map(|&v| v as f64).collect();
        put_series(&mut file, "profile_index", &values)?;
    }
    if let Some(values) = &dataset.longitude {
        put_series(&mut file, "longitude", values)?;
    }
    if let Some(values) = &dataset.latitude {
        put_series(&mut file, "latitude", values)?;
    }
    if let Some(values) = &dataset.time_ns {
        let seconds: Vec<f64> = values.iter().map(|&ns| ns as f64 / 1e9).collect();
        let mut var = file.add_variable::<f64>("time", &["time"])?;
        var.put_attribute("units", TIME_UNITS)?;
        var.put_values(&seconds, ..)?;
    }
    if let Some(values) = &dataset.depth {
        let mut var = file.add_variable::<f64>("depth", &["depth"])?;
        var.put_values(values, ..)?;
    }
    if let Some(grid) = &dataset.pressure {
        let values: Vec<f64> = grid
            .values
            .iter()
            .map(|&v| if v.is_finite() { v } else { PRESSURE_FILL })
            .collect();
        let mut var = file.add_variable::<f64>("pressure", &["depth", "time"])?;
        var.set_fill_value(PRESSURE_FILL)?;
        var.put_values(&values, ..)?;
    }

    for name in &dataset.extra_variables {
        let zeros = vec![0.0_f64; n_depth * n_time];
        let mut var = file.add_variable::<f64>(name, &["depth", "time"])?;
        var.put_values(&zeros, ..)?;
    }

    Ok(())
}

fn put_series(file: &mut netcdf::FileMut, name: &str, values: &[f64]) -> Result<(), netcdf::Error> {
    let mut var = file.add_variable::<f64>(name, &["time"])?;
    var.put_values(values, ..)?;
    Ok(())
}

/// Write a synthetic mission gridfile and return the dataset that was written.
pub fn write_synthetic_gridfile(
    path: &Path,
    glider: i64,
    mission: i64,
    n_profiles: usize,
) -> Result<MemoryDataset, netcdf::Error> {
    let dataset = crate::synthetic_mission(glider, mission, n_profiles);
    write_gridfile(path, &dataset)?;
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridfile::NetCdfGridFile;

    #[test]
    fn test_written_gridfile_reads_back() {
        let dir = crate::temp_test_dir();
        let path = dir.path().join("SEA063_M44_grid.nc");
        let written = write_synthetic_gridfile(&path, 63, 44, 5).unwrap();

        let file = NetCdfGridFile::open(&path).unwrap();
        assert_eq!(file.i64_attribute("glider_serial").unwrap(), 63);
        assert_eq!(file.profile_index().unwrap(), written.profile_index().unwrap());
        assert_eq!(file.time_ns().unwrap(), written.time_ns().unwrap());
        assert_eq!(file.longitude().unwrap(), written.longitude().unwrap());

        let grid = file.pressure().unwrap();
        assert_eq!((grid.n_depth, grid.n_time), (crate::DEPTH_BINS, 5));
        assert!(grid.is_valid(0, 0));
        assert!(!grid.is_valid(1, 0));
    }
}
