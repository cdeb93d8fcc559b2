//! Builder Configuration
//!
//! Switches that change which nodes the builder creates. Configuration is
//! plain data; it can be built in code or read from JSON.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Which kind of evaluation the graph is built for.
///
/// Visibility flags of bases and collections are read per mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvalMode {
    #[default]
    Viewport,
    Render,
}

/// Builder configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuilderConfig {
    /// Evaluation mode of the graph.
    pub eval_mode: EvalMode,

    /// The graph drives the interactive session. Only the active graph
    /// writes evaluated state back to the original data-blocks.
    pub is_active: bool,

    /// Log node counts after every build.
    pub log_stats: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            eval_mode: EvalMode::Viewport,
            is_active: true,
            log_stats: false,
        }
    }
}

impl BuilderConfig {
    /// Configuration for a final render graph.
    pub fn render() -> Self {
        Self {
            eval_mode: EvalMode::Render,
            is_active: false,
            ..Self::default()
        }
    }

    /// Parse configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_use_defaults() {
        let config = BuilderConfig::from_json(r#"{ "eval_mode": "render" }"#).unwrap();
        assert_eq!(config.eval_mode, EvalMode::Render);
        assert!(config.is_active);
        assert!(!config.log_stats);
    }

    #[test]
    fn invalid_mode_is_rejected() {
        let err = BuilderConfig::from_json(r#"{ "eval_mode": "offline" }"#).unwrap_err();
        assert!(err.to_string().starts_with("invalid builder configuration"));
    }
}
