use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

/// Environment variable that overrides the itinerary file location.
pub const DATA_FILE_ENV: &str = "ITINERARY_DATA_FILE";

pub const DATA_FILE_NAME: &str = "db.json";

/// Settings for the local HTTP server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 49152,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// data_file = "/home/me/trips/db.json"
///
/// [server]
/// bind = "127.0.0.1"
/// port = 49152
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Where the itinerary document lives. Platform data dir when unset.
    #[serde(default)]
    pub data_file: Option<PathBuf>,

    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }

    /// Default itinerary location: `db.json` in the platform data directory.
    pub fn default_data_file() -> Result<PathBuf> {
        Ok(project_dirs()?.data_dir().join(DATA_FILE_NAME))
    }

    /// Resolve the itinerary file: CLI flag > env var > config file > default.
    pub fn resolve_data_file(&self, cli: Option<&Path>) -> Result<PathBuf> {
        self.resolve_data_file_with(cli, std::env::var_os(DATA_FILE_ENV))
    }

    fn resolve_data_file_with(&self, cli: Option<&Path>, env: Option<OsString>) -> Result<PathBuf> {
        if let Some(path) = cli {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = env.filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        if let Some(path) = &self.data_file {
            return Ok(path.clone());
        }
        Self::default_data_file()
    }

    /// `bind:port`, ready for a socket address parse.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "itinerary", "itinerary-cli")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}
