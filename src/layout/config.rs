//! Configuration for the layout engine

use serde::{Deserialize, Serialize};

use super::error::LayoutError;

/// Configuration options for layout computation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Maximum number of solve passes per container before the last result is accepted
    pub max_iterations: usize,

    /// Place widgets whose anchors are already known without the solver
    pub direct_resolution: bool,

    /// Estimate wrap-content bounds from independent groups of children
    pub grouping: bool,

    /// Minimum number of children before grouping is attempted
    pub grouping_min_children: usize,

    /// Retry unsatisfiable required relations at the strongest soft strength
    pub solver_demotion: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_iterations: 8,
            direct_resolution: true,
            grouping: true,
            grouping_min_children: 3,
            solver_demotion: true,
        }
    }
}

impl LayoutConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the iteration cap of the solve loop
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Enable or disable direct resolution
    pub fn with_direct_resolution(mut self, enabled: bool) -> Self {
        self.direct_resolution = enabled;
        self
    }

    /// Enable or disable the grouping pass
    pub fn with_grouping(mut self, enabled: bool) -> Self {
        self.grouping = enabled;
        self
    }

    /// Enable or disable demotion of unsatisfiable required relations
    pub fn with_solver_demotion(mut self, enabled: bool) -> Self {
        self.solver_demotion = enabled;
        self
    }

    /// Read a configuration from TOML; missing keys take their defaults
    pub fn from_toml_str(source: &str) -> Result<Self, LayoutError> {
        let config: LayoutConfig = toml::from_str(source)?;
        if config.max_iterations == 0 {
            return Err(LayoutError::config("max_iterations must be at least 1"));
        }
        Ok(config)
    }

    /// Write the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, LayoutError> {
        Ok(toml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = LayoutConfig::default();
        assert_eq!(config.max_iterations, 8);
        assert!(config.direct_resolution);
        assert!(config.grouping);
        assert_eq!(config.grouping_min_children, 3);
        assert!(config.solver_demotion);
    }

    #[test]
    fn test_builder_pattern() {
        let config = LayoutConfig::new()
            .with_max_iterations(3)
            .with_grouping(false)
            .with_direct_resolution(false);

        assert_eq!(config.max_iterations, 3);
        assert!(!config.grouping);
        assert!(!config.direct_resolution);
        assert_eq!(LayoutConfig::new().with_max_iterations(0).max_iterations, 1);
    }

    #[test]
    fn test_toml_round_trip() {
        let config = LayoutConfig::new().with_max_iterations(4).with_solver_demotion(false);
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("max_iterations = 4"));
        assert_eq!(LayoutConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = LayoutConfig::from_toml_str("grouping = false").unwrap();
        assert!(!config.grouping);
        assert_eq!(config.max_iterations, 8);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(LayoutConfig::from_toml_str("max_iterations = \"many\"").is_err());
        assert!(LayoutConfig::from_toml_str("max_iterations = 0").is_err());
    }
}
