use std::path::Path;

use anyhow::{Context as _, Result};
use log::info;
use pipeline_config::PipelineConfig;
use serde::{Deserialize, Serialize};
use tokio::fs;

pub mod pipeline_config;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
pub struct Config {
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Loads the configuration at `path`, falling back to the defaults when
    /// the file doesn't exist.
    pub async fn read_or_default(path: &Path) -> Result<Self> {
        if fs::try_exists(path)
            .await
            .with_context(|| format!("Cannot check whether {} exists", path.display()))?
        {
            info!("Loading configuration from '{}'", path.display());
            Self::load_from_file(path).await
        } else {
            info!(
                "No configuration found at '{}', using defaults",
                path.display()
            );
            Ok(Self::default())
        }
    }

    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).await.with_context(|| {
            format!(
                "Cannot load configuration from disk from {}",
                path.display()
            )
        })?;

        let config = serde_yaml::from_str(&contents).context("Failed to parse configuration")?;

        Ok(config)
    }

    pub async fn write(&self, path: &Path) -> Result<()> {
        let contents = serde_yaml::to_string(&self).context("Failed to serialize configuration")?;

        fs::write(path, contents)
            .await
            .context("Failed to write configuration to disk")
    }
}
