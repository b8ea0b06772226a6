use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::key::Key;

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct SwarmConfig {
    #[serde(default)]
    pub paths: Paths,
    #[serde(default, rename = "group")]
    pub groups: Vec<GroupConfig>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Paths {
    #[serde(default = "default_ocf_resource_agents")]
    pub ocf_resource_agents: PathBuf,
    #[serde(default = "default_lsb_service")]
    pub lsb_service: String,
}

/// One `[[group]]` entry: members that form a single class in `dimension`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct GroupConfig {
    pub dimension: Key,
    pub members: Vec<String>,
}

impl Default for Paths {
    fn default() -> Self {
        Self {
            ocf_resource_agents: default_ocf_resource_agents(),
            lsb_service: default_lsb_service(),
        }
    }
}

fn default_ocf_resource_agents() -> PathBuf {
    PathBuf::from("/usr/lib/ocf")
}

fn default_lsb_service() -> String {
    "service".to_string()
}

impl SwarmConfig {
    /// Load the config file. A missing file yields the defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// OCF root with a leading `~/` expanded to the home directory.
    pub fn ocf_root(&self) -> PathBuf {
        expand_home(&self.paths.ocf_resource_agents)
    }
}

fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}
