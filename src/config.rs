//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::sites::Site;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// CSV file written at the end of the run
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Root directory for downloaded images (one subdirectory per site)
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Lower bound of the pause after each request, in milliseconds
    #[serde(default = "default_delay_min_ms")]
    pub delay_min_ms: u64,

    /// Upper bound of the pause after each request, in milliseconds
    #[serde(default = "default_delay_max_ms")]
    pub delay_max_ms: u64,

    /// Retries on 500/502/503/504 and transport failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// First retry backoff; doubled on every further retry
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,

    /// Timeout for image downloads
    #[serde(default = "default_image_timeout_secs")]
    pub image_timeout_secs: u64,

    /// Images of this size or smaller are discarded
    #[serde(default = "default_min_image_bytes")]
    pub min_image_bytes: usize,

    /// Caps the number of listing pages visited per board
    #[serde(default)]
    pub max_pages: Option<u32>,

    /// Sites to crawl, in order
    #[serde(default = "default_sites")]
    pub sites: Vec<Site>,
}

fn default_output() -> PathBuf {
    PathBuf::from("notices.csv")
}

fn default_image_dir() -> PathBuf {
    PathBuf::from("notice_images")
}

fn default_user_agent() -> String {
    "Mozilla/5.0".to_string()
}

fn default_delay_min_ms() -> u64 {
    500
}

fn default_delay_max_ms() -> u64 {
    1200
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_ms() -> u64 {
    1000
}

fn default_image_timeout_secs() -> u64 {
    10
}

fn default_min_image_bytes() -> usize {
    1024
}

fn default_sites() -> Vec<Site> {
    Site::all().to_vec()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: default_output(),
            image_dir: default_image_dir(),
            user_agent: default_user_agent(),
            delay_min_ms: default_delay_min_ms(),
            delay_max_ms: default_delay_max_ms(),
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            image_timeout_secs: default_image_timeout_secs(),
            min_image_bytes: default_min_image_bytes(),
            max_pages: None,
            sites: default_sites(),
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("univ-notice-crawler").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(output) = std::env::var("NOTICE_OUTPUT") {
            self.output = PathBuf::from(output);
        }

        if let Ok(dir) = std::env::var("NOTICE_IMAGE_DIR") {
            self.image_dir = PathBuf::from(dir);
        }

        if let Ok(pages) = std::env::var("NOTICE_MAX_PAGES") {
            if let Ok(p) = pages.parse() {
                self.max_pages = Some(p);
            }
        }

        self
    }

    pub fn image_timeout(&self) -> Duration {
        Duration::from_secs(self.image_timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}
