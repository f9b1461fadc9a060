//! In-memory gridded dataset.
//!
//! Used by tests and by callers that already hold decoded arrays.

use std::collections::BTreeMap;

use crate::dataset::{AttributeValue, GliderDataset, PressureGrid};
use crate::error::{GridFileError, GridFileResult};

#[derive(Debug, Clone, Default)]
pub struct MemoryDataset {
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Extra data variables beyond the coordinate arrays (e.g. sensor names)
    pub extra_variables: Vec<String>,
    pub profile_index: Option<Vec<i64>>,
    pub longitude: Option<Vec<f64>>,
    pub latitude: Option<Vec<f64>>,
    pub time_ns: Option<Vec<i64>>,
    pub depth: Option<Vec<f64>>,
    pub pressure: Option<PressureGrid>,
}

impl MemoryDataset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn without_attribute(mut self, name: &str) -> Self {
        self.attributes.remove(name);
        self
    }

    pub fn with_variable(mut self, name: &str) -> Self {
        self.extra_variables.push(name.to_string());
        self
    }

    pub fn with_profile_index(mut self, values: Vec<i64>) -> Self {
        self.profile_index = Some(values);
        self
    }

    pub fn with_positions(mut self, longitude: Vec<f64>, latitude: Vec<f64>) -> Self {
        self.longitude = Some(longitude);
        self.latitude = Some(latitude);
        self
    }

    pub fn with_time_ns(mut self, values: Vec<i64>) -> Self {
        self.time_ns = Some(values);
        self
    }

    pub fn with_depth(mut self, values: Vec<f64>) -> Self {
        self.depth = Some(values);
        self
    }

    pub fn with_pressure(mut self, grid: PressureGrid) -> Self {
        self.pressure = Some(grid);
        self
    }
}

fn missing(name: &str) -> GridFileError {
    GridFileError::MissingData(format!("{} variable", name))
}

impl GliderDataset for MemoryDataset {
    fn attribute(&self, name: &str) -> Option<AttributeValue> {
        self.attributes.get(name).cloned()
    }

    fn variable_names(&self) -> Vec<String> {
        let coords = [
            ("profile", self.profile_index.is_some()),
            ("longitude", self.longitude.is_some()),
            ("latitude", self.latitude.is_some()),
            ("time", self.time_ns.is_some()),
            ("depth", self.depth.is_some()),
            ("pressure", self.pressure.is_some()),
        ];
        coords
            .iter()
            .filter(|(_, present)| *present)
            .map(|(name, _)| name.to_string())
            .chain(self.extra_variables.iter().cloned())
            .collect()
    }

    fn profile_index(&self) -> GridFileResult<Vec<i64>> {
        self.profile_index.clone().ok_or_else(|| missing("profile"))
    }

    fn longitude(&self) -> GridFileResult<Vec<f64>> {
        self.longitude.clone().ok_or_else(|| missing("longitude"))
    }

    fn latitude(&self) -> GridFileResult<Vec<f64>> {
        self.latitude.clone().ok_or_else(|| missing("latitude"))
    }

    fn time_ns(&self) -> GridFileResult<Vec<i64>> {
        self.time_ns.clone().ok_or_else(|| missing("time"))
    }

    fn depth(&self) -> GridFileResult<Vec<f64>> {
        self.depth.clone().ok_or_else(|| missing("depth"))
    }

    fn pressure(&self) -> GridFileResult<PressureGrid> {
        self.pressure.clone().ok_or_else(|| missing("pressure"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_attribute_missing() {
        let ds = MemoryDataset::new().with_attribute("glider_serial", "63");
        assert_eq!(ds.i64_attribute("glider_serial").unwrap(), 63);
        let err = ds.i64_attribute("deployment_id").unwrap_err();
        assert!(matches!(err, GridFileError::MissingData(_)));
    }

    #[test]
    fn test_variable_names_include_extras() {
        let ds = MemoryDataset::new()
            .with_depth(vec![0.0, 1.0])
            .with_variable("chlorophyll");
        assert_eq!(ds.variable_names(), vec!["depth", "chlorophyll"]);
    }

    #[test]
    fn test_missing_variable_errors() {
        let ds = MemoryDataset::new();
        assert!(matches!(ds.pressure(), Err(GridFileError::MissingData(_))));
    }
}
