use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::paging::PagingDefaults;

pub const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_LISTEN: &str = "0.0.0.0:8080";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_listen")]
    pub listen: String,

    #[serde(default)]
    pub paging: PagingDefaults,

    /// JSON seed for the chat store, relative to the config directory.
    #[serde(default)]
    pub data_path: Option<String>,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            paging: PagingDefaults::default(),
            data_path: None,
            base_path: PathBuf::new(),
        }
    }
}

impl Config {
    fn validate(&self) -> anyhow::Result<()> {
        if self.listen.trim().is_empty() {
            bail!("listen address must not be empty");
        }

        let paging = &self.paging;
        if paging.default_page_size == 0 {
            bail!("paging.default_page_size must be greater than 0");
        }
        match paging.max_page_size {
            Some(0) => bail!("paging.max_page_size must be greater than 0"),
            Some(max) if max < paging.default_page_size => bail!(
                "paging.max_page_size ({max}) must not be below paging.default_page_size ({})",
                paging.default_page_size
            ),
            _ => {}
        }

        Ok(())
    }

    pub fn load_with(base_path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let base_path = base_path.as_ref();
        let path = base_path.join(CONFIG_FILE);

        // create new if does not exist
        if !path.exists() {
            log::info!("creating default config at {}", path.display());
            std::fs::create_dir_all(base_path)?;
            std::fs::write(&path, serde_yml::to_string(&Self::default())?)?;
        }

        let config_str = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config: Self = serde_yml::from_str(&config_str)
            .with_context(|| format!("config {} is malformed", path.display()))?;

        config.base_path = base_path.to_path_buf();
        config.validate()?;

        // resave in case defaults were filled in
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_str = serde_yml::to_string(&self)?;
        std::fs::write(self.base_path.join(CONFIG_FILE), config_str)?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Seed file location resolved against the config directory.
    pub fn data_file(&self) -> Option<PathBuf> {
        self.data_path
            .as_ref()
            .map(|data_path| self.base_path.join(data_path))
    }
}
