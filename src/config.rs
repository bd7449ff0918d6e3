//! Runtime configuration: an optional TOML file merged with command line
//! overrides. Every field has a default so the program runs with no file at
//! all.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use directories::ProjectDirs;
use serde::Deserialize;

use crate::api::DEFAULT_ENDPOINT;

/// Application name used for the config and data directories.
const APP_NAME: &str = "artwork-table";
const CONFIG_FILE_NAME: &str = "config.toml";
const DEFAULT_ROWS_PER_PAGE: u32 = 10;
const DEFAULT_ROWS_OPTIONS: [u32; 4] = [5, 10, 20, 50];
const DEFAULT_LOG_FILTER: &str = "artwork_table=info";

#[derive(Parser, Debug, Default)]
#[command(name = "artwork-table")]
#[command(about = "Browse Art Institute of Chicago artworks and keep a selection across pages")]
pub struct Cli {
    /// Path to a TOML config file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Artworks endpoint to query
    #[arg(long)]
    pub endpoint: Option<String>,
    /// Rows per page
    #[arg(long)]
    pub rows: Option<u32>,
    /// 1-based page to open first
    #[arg(long)]
    pub page: Option<u32>,
    /// Directory for log files
    #[arg(long)]
    pub log_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub table: TableConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    /// Request timeout. No timeout when unset.
    pub timeout_secs: Option<u64>,
    /// Sent as `AIC-User-Agent` when present.
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct TableConfig {
    pub rows_per_page: u32,
    pub rows_per_page_options: Vec<u32>,
    pub start_page: u32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Where log files go. Falls back to the platform data directory.
    pub directory: Option<PathBuf>,
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            timeout_secs: None,
            user_agent: None,
        }
    }
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            rows_per_page: DEFAULT_ROWS_PER_PAGE,
            rows_per_page_options: DEFAULT_ROWS_OPTIONS.to_vec(),
            start_page: 1,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: None,
            filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl Config {
    /// Resolve the configuration for this run. An explicit `--config` path
    /// must exist; the default location is optional.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Self::from_file(path)?,
            None => match default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => Self::default(),
            },
        };
        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn apply_cli(&mut self, cli: &Cli) {
        if let Some(endpoint) = &cli.endpoint {
            self.api.endpoint = endpoint.clone();
        }
        if let Some(rows) = cli.rows {
            self.table.rows_per_page = rows;
        }
        if let Some(page) = cli.page {
            self.table.start_page = page;
        }
        if let Some(dir) = &cli.log_dir {
            self.log.directory = Some(dir.clone());
        }
    }

    /// Reject values the table cannot work with. A page size missing from the
    /// options list is added so the rows-per-page cycle can reach it again.
    pub fn validate(&mut self) -> Result<()> {
        if self.api.endpoint.trim().is_empty() {
            bail!("api.endpoint must not be empty");
        }
        if self.table.rows_per_page == 0 {
            bail!("table.rows_per_page must be greater than zero");
        }
        if self.table.start_page == 0 {
            bail!("table.start_page starts at 1");
        }
        if self.table.rows_per_page_options.contains(&0) {
            bail!("table.rows_per_page_options must not contain zero");
        }

        let options = &mut self.table.rows_per_page_options;
        if !options.contains(&self.table.rows_per_page) {
            options.push(self.table.rows_per_page);
        }
        options.sort_unstable();
        options.dedup();
        Ok(())
    }

    /// Directory log files are written to.
    pub fn log_directory(&self) -> PathBuf {
        self.log
            .directory
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_local_dir().join("logs")))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("", "", APP_NAME)
}

/// `<config dir>/artwork-table/config.toml` on the current platform.
pub fn default_config_path() -> Option<PathBuf> {
    project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
