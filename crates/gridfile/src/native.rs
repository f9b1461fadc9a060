//! Native gridfile reading using the netcdf library.
//!
//! pyglider writes gridfiles with dimensions `(depth, time)` where each `time`
//! column is one profile. Variables are read as `f64`; libnetcdf converts the
//! stored numeric type on read. `_FillValue` cells become NaN.

use std::path::{Path, PathBuf};
use std::sync::Once;

use tracing::debug;

use crate::dataset::{AttributeValue, GliderDataset, PressureGrid};
use crate::error::{GridFileError, GridFileResult};
use crate::time::TimeUnits;

/// Silence HDF5's automatic error printing to stderr.
///
/// The HDF5 C library prints verbose error messages to stderr even when errors
/// are handled gracefully by the Rust code (e.g., when checking for optional
/// attributes that don't exist).
///
/// **Important**: Call this function early in your program's startup (e.g., in main())
/// before any HDF5/NetCDF operations occur.
pub fn silence_hdf5_errors() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        // SAFETY: H5Eset_auto2 is thread-safe and we're passing null pointers
        // to disable error output, which is a documented valid use.
        unsafe {
            hdf5_metno_sys::h5e::H5Eset_auto2(
                hdf5_metno_sys::h5e::H5E_DEFAULT,
                None,
                std::ptr::null_mut(),
            );
        }
    });
}

/// An opened pyglider gridfile.
pub struct NetCdfGridFile {
    path: PathBuf,
    file: netcdf::File,
}

impl std::fmt::Debug for NetCdfGridFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NetCdfGridFile")
            .field("path", &self.path)
            .finish()
    }
}

impl NetCdfGridFile {
    /// Open a gridfile from disk.
    pub fn open<P: AsRef<Path>>(path: P) -> GridFileResult<Self> {
        silence_hdf5_errors();

        let path = path.as_ref().to_path_buf();
        let file = netcdf::open(&path).map_err(|e| {
            GridFileError::InvalidFormat(format!("Failed to open {}: {}", path.display(), e))
        })?;

        debug!(path = %path.display(), "Opened gridfile");
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn variable(&self, name: &str) -> GridFileResult<netcdf::Variable<'_>> {
        self.file
            .variable(name)
            .ok_or_else(|| GridFileError::MissingData(format!("{} variable", name)))
    }

    /// Read a variable as `f64`, replacing fill values with NaN.
    fn read_f64(&self, name: &str) -> GridFileResult<Vec<f64>> {
        let var = self.variable(name)?;
        let mut values: Vec<f64> = var
            .get_values(..)
            .map_err(|e| GridFileError::InvalidFormat(format!("Failed to read {}: {}", name, e)))?;

        if let Some(fill) = get_f64_attr(&var, "_FillValue") {
            for v in values.iter_mut() {
                if *v == fill {
                    *v = f64::NAN;
                }
            }
        }
        Ok(values)
    }
}

impl GliderDataset for NetCdfGridFile {
    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        if !self.file.attributes().any(|attr| attr.name() == name) {
            return None;
        }
        let value = self.file.attribute(name)?.value().ok()?;
        convert_attr(value)
    }

    fn variable_names(&self) -> Vec<String> {
        self.file.variables().map(|v| v.name()).collect()
    }

    fn profile_index(&self) -> GridFileResult<Vec<i64>> {
        self.read_f64("profile")
            .or_else(|_| self.read_f64("profile_index"))?
            .into_iter()
            .map(|v| {
                if v.is_finite() {
                    Ok(v as i64)
                } else {
                    Err(GridFileError::InvalidFormat(
                        "profile index contains fill values".to_string(),
                    ))
                }
            })
            .collect()
    }

    fn longitude(&self) -> GridFileResult<Vec<f64>> {
        self.read_f64("longitude")
    }

    fn latitude(&self) -> GridFileResult<Vec<f64>> {
        self.read_f64("latitude")
    }

    fn time_ns(&self) -> GridFileResult<Vec<i64>> {
        let var = self.variable("time")?;
        let units = get_text_attr(&var, "units")
            .ok_or_else(|| GridFileError::MissingData("time units attribute".to_string()))?;
        let units = TimeUnits::parse(&units)?;

        self.read_f64("time")?
            .into_iter()
            .map(|v| units.to_nanos(v))
            .collect()
    }

    fn depth(&self) -> GridFileResult<Vec<f64>> {
        self.read_f64("depth")
    }

    fn pressure(&self) -> GridFileResult<PressureGrid> {
        let var = self.variable("pressure")?;
        let dims: Vec<(String, usize)> = var
            .dimensions()
            .iter()
            .map(|d| (d.name(), d.len()))
            .collect();

        let values = self.read_f64("pressure")?;

        match dims.as_slice() {
            [(first, n_first), (_, n_second)] if first == "time" => {
                PressureGrid::from_time_major(*n_first, *n_second, &values)
            }
            [(_, n_depth), (_, n_time)] => PressureGrid::new(*n_depth, *n_time, values),
            _ => Err(GridFileError::InvalidFormat(format!(
                "pressure must be 2-D, found dimensions {:?}",
                dims
            ))),
        }
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn convert_attr(value: netcdf::AttributeValue) -> Option<AttributeValue> {
    match value {
        netcdf::AttributeValue::Str(s) => Some(AttributeValue::Text(s)),
        netcdf::AttributeValue::Strs(mut list) if !list.is_empty() => {
            Some(AttributeValue::Text(list.swap_remove(0)))
        }
        other => f64::try_from(other).ok().map(AttributeValue::Number),
    }
}

/// Check if a variable has an attribute with the given name.
/// This avoids HDF5 error spam when checking for optional attributes.
fn has_attr(var: &netcdf::Variable, name: &str) -> bool {
    var.attributes().any(|attr| attr.name() == name)
}

/// Helper to get f64 attribute.
fn get_f64_attr(var: &netcdf::Variable, name: &str) -> Option<f64> {
    if !has_attr(var, name) {
        return None;
    }
    let attr_value = var.attribute_value(name)?.ok()?;
    f64::try_from(attr_value).ok()
}

fn get_text_attr(var: &netcdf::Variable, name: &str) -> Option<String> {
    if !has_attr(var, name) {
        return None;
    }
    match var.attribute_value(name)?.ok()? {
        netcdf::AttributeValue::Str(s) => Some(s),
        _ => None,
    }
}
