//! Export configuration
//!
//! The collaborator hands these scalars in, typically parsed from a TOML
//! table in its project manifest. Defaults match the long-standing
//! exporter property defaults.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExportConfig {
    /// Maximum bone weights kept per vertex.
    pub weights_per_vertex_max: usize,
    /// Influence counts are zero-padded up to a multiple of this.
    pub weights_per_vertex_mod: usize,
    /// Maximum distinct bones a draw group may reference.
    pub max_bones_per_group: usize,
    /// Squared error bound for translation tracks.
    pub approx_err_translation: f64,
    /// Squared error bound for rotation tracks.
    pub approx_err_rotation: f64,
    /// Squared error bound for scale tracks.
    pub approx_err_scale: f64,
    /// Also write the pretty-printed tree beside the binary output.
    pub text_output: bool,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            weights_per_vertex_max: 8,
            weights_per_vertex_mod: 4,
            max_bones_per_group: 12,
            approx_err_translation: 0.0005,
            approx_err_rotation: 0.0005,
            approx_err_scale: 0.0005,
            text_output: false,
        }
    }
}

impl ExportConfig {
    /// Parse from a TOML string and validate.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: ExportConfig =
            toml::from_str(s).context("Failed to parse export configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<()> {
        if self.weights_per_vertex_mod == 0 {
            bail!("weights_per_vertex_mod must be at least 1");
        }
        if self.max_bones_per_group == 0 {
            bail!("max_bones_per_group must be at least 1");
        }
        if self.approx_err_translation < 0.0
            || self.approx_err_rotation < 0.0
            || self.approx_err_scale < 0.0
        {
            bail!("approximation error bounds must be non-negative");
        }
        Ok(())
    }
}
