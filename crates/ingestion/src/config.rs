//! Ingestion configuration for sensor variable filtering.
//!
//! Defines which gridfile variables are recorded on a mission and the display
//! names they are stored under.

use std::collections::HashSet;

/// Allow-list entry for a sensor variable to record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableSpec {
    /// Variable name in the gridfile (e.g., "oxygen_concentration")
    pub name: &'static str,
    /// Stored name, when it differs from the gridfile name
    pub display_name: Option<&'static str>,
}

impl VariableSpec {
    pub fn display(&self) -> &'static str {
        self.display_name.unwrap_or(self.name)
    }
}

/// Sensor variables recorded on a mission, in display order.
pub const TARGET_VARIABLES: &[VariableSpec] = &[
    VariableSpec {
        name: "oxygen_concentration",
        display_name: Some("oxygen"),
    },
    VariableSpec {
        name: "chlorophyll",
        display_name: None,
    },
    VariableSpec {
        name: "turbidity",
        display_name: None,
    },
    VariableSpec {
        name: "phycocyanin",
        display_name: None,
    },
    VariableSpec {
        name: "backscatter",
        display_name: None,
    },
    VariableSpec {
        name: "cdom",
        display_name: None,
    },
    VariableSpec {
        name: "down_irradiance_380",
        display_name: Some("irradiance"),
    },
    VariableSpec {
        name: "ad2cp_heading",
        display_name: Some("adcp"),
    },
];

/// Display names of the target variables present in a dataset.
pub fn present_variables<S: AsRef<str>>(dataset_variables: &[S]) -> Vec<String> {
    let present: HashSet<&str> = dataset_variables.iter().map(|v| v.as_ref()).collect();
    TARGET_VARIABLES
        .iter()
        .filter(|spec| present.contains(spec.name))
        .map(|spec| spec.display().to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_present_variables_renames() {
        let vars = [
            "time",
            "ad2cp_heading",
            "oxygen_concentration",
            "down_irradiance_380",
            "temperature",
        ];
        assert_eq!(present_variables(&vars), vec!["oxygen", "irradiance", "adcp"]);
    }

    #[test]
    fn test_present_variables_keeps_plain_names() {
        let vars = ["cdom", "chlorophyll", "turbidity"];
        assert_eq!(
            present_variables(&vars),
            vec!["chlorophyll", "turbidity", "cdom"]
        );
    }

    #[test]
    fn test_present_variables_empty() {
        let vars: [&str; 3] = ["time", "depth", "pressure"];
        assert!(present_variables(&vars).is_empty());
    }
}
