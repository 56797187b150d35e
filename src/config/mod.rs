//! Pipeline configuration
//!
//! Defaults are the fixed constants the pipeline contract names: 80/20
//! split, seed 42, 500 solver iterations, always-promote. A YAML file can
//! override them for the `run` command; standalone stage commands take the
//! same knobs as flags.

mod cli;

pub use cli::{
    parse_args, Cli, Command, EvaluateArgs, PolicyArg, PromoteArgs, RunArgs, SplitArgs, TrainArgs,
};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::TrainConfig;
use crate::promote::PolicyKind;
use crate::split::SplitConfig;

/// Full pipeline configuration
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Splitter settings
    pub split: SplitConfig,
    /// Trainer solver settings
    pub train: TrainConfig,
    /// Promotion policy
    pub policy: PolicyKind,
}

impl PipelineConfig {
    /// Validate all sections
    pub fn validate(&self) -> Result<()> {
        self.split.validate()?;
        self.train.validate()?;
        Ok(())
    }

    /// Parse a YAML document
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::from_yaml_str(&text)
    }
}
