//! The narrow reader interface consumed by mission ingestion.
//!
//! A gridfile has one column per profile along the `time` dimension and one row
//! per depth bin along the `depth` dimension. Only the handful of fields the
//! ingestion transform needs are exposed here.

use crate::error::{GridFileError, GridFileResult};

/// A global attribute value.
///
/// pyglider writes most identifiers as text (`glider_serial: "63"`), but older
/// files carry them as numbers, so integer lookups accept both.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Number(f64),
}

impl AttributeValue {
    /// Interpret the value as text.
    pub fn as_text(&self) -> String {
        match self {
            AttributeValue::Text(s) => s.clone(),
            AttributeValue::Number(n) if n.fract() == 0.0 => format!("{}", *n as i64),
            AttributeValue::Number(n) => n.to_string(),
        }
    }

    /// Interpret the value as a float, parsing text if needed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Number(n) => Some(*n),
            AttributeValue::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Interpret the value as an integer, parsing text if needed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Number(n) if n.fract() == 0.0 => Some(*n as i64),
            AttributeValue::Number(_) => None,
            AttributeValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Number(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value as f64)
    }
}

/// Pressure values laid out depth-major: `values[depth * n_time + time]`.
///
/// Fill values are already replaced by NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct PressureGrid {
    pub n_depth: usize,
    pub n_time: usize,
    pub values: Vec<f64>,
}

impl PressureGrid {
    pub fn new(n_depth: usize, n_time: usize, values: Vec<f64>) -> GridFileResult<Self> {
        if values.len() != n_depth * n_time {
            return Err(GridFileError::InvalidFormat(format!(
                "pressure grid has {} values, expected {}x{}",
                values.len(),
                n_depth,
                n_time
            )));
        }
        Ok(Self {
            n_depth,
            n_time,
            values,
        })
    }

    /// Build a grid from `[time][depth]` ordered data.
    pub fn from_time_major(n_time: usize, n_depth: usize, values: &[f64]) -> GridFileResult<Self> {
        if values.len() != n_depth * n_time {
            return Err(GridFileError::InvalidFormat(format!(
                "pressure grid has {} values, expected {}x{}",
                values.len(),
                n_time,
                n_depth
            )));
        }
        let mut transposed = vec![f64::NAN; values.len()];
        for t in 0..n_time {
            for d in 0..n_depth {
                transposed[d * n_time + t] = values[t * n_depth + d];
            }
        }
        Self::new(n_depth, n_time, transposed)
    }

    pub fn get(&self, depth: usize, time: usize) -> f64 {
        self.values[depth * self.n_time + time]
    }

    /// A cell counts as a valid reading when it is finite.
    pub fn is_valid(&self, depth: usize, time: usize) -> bool {
        self.get(depth, time).is_finite()
    }
}

/// Read access to one gridded glider mission.
pub trait GliderDataset {
    /// Look up a global attribute.
    fn attribute(&self, name: &str) -> Option<AttributeValue>;

    /// Names of all data variables in the file.
    fn variable_names(&self) -> Vec<String>;

    /// Profile index per time column.
    fn profile_index(&self) -> GridFileResult<Vec<i64>>;

    fn longitude(&self) -> GridFileResult<Vec<f64>>;

    fn latitude(&self) -> GridFileResult<Vec<f64>>;

    /// Timestamps per time column, nanoseconds since the Unix epoch.
    fn time_ns(&self) -> GridFileResult<Vec<i64>>;

    /// The depth axis in meters.
    fn depth(&self) -> GridFileResult<Vec<f64>>;

    fn pressure(&self) -> GridFileResult<PressureGrid>;

    /// Required global attribute.
    fn required_attribute(&self, name: &str) -> GridFileResult<AttributeValue> {
        self.attribute(name)
            .ok_or_else(|| GridFileError::MissingData(format!("global attribute '{}'", name)))
    }

    fn text_attribute(&self, name: &str) -> GridFileResult<String> {
        Ok(self.required_attribute(name)?.as_text())
    }

    fn f64_attribute(&self, name: &str) -> GridFileResult<f64> {
        let value = self.required_attribute(name)?;
        value.as_f64().ok_or_else(|| {
            GridFileError::InvalidFormat(format!("attribute '{}' is not numeric: {:?}", name, value))
        })
    }

    fn i64_attribute(&self, name: &str) -> GridFileResult<i64> {
        let value = self.required_attribute(name)?;
        value.as_i64().ok_or_else(|| {
            GridFileError::InvalidFormat(format!("attribute '{}' is not an integer: {:?}", name, value))
        })
    }
}
