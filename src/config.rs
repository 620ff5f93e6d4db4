use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_BIND: &str = "127.0.0.1:8000";
pub const BASE_URL_ENV: &str = "SUPPORT_TRIAGE_BASE_URL";

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Where the email store lives, e.g. `http://localhost:8000`.
    pub base_url: Option<String>,
    /// Per-request timeout; unset means requests never time out.
    pub request_timeout_secs: Option<u64>,
    pub log_file: Option<String>,
    /// Listen address for `serve`.
    pub bind: Option<String>,
    /// JSON fixture for `serve`.
    pub fixture_path: Option<String>,
}

fn config_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow!("no config dir available"))?
        .join("support_triage"))
}

pub fn config_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("config.toml");
    Ok(p)
}

pub fn default_log_path() -> Result<PathBuf> {
    let mut p = config_dir()?;
    fs::create_dir_all(&p)?;
    p.push("support_triage.log");
    Ok(p)
}

/// A loaded config plus where it came from, so the caller can log it once
/// logging is set up.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedConfig {
    pub config: Config,
    pub path: PathBuf,
    /// True when the file was missing and a template was written instead.
    pub template_written: bool,
}

pub fn load_config() -> Result<LoadedConfig> {
    load_config_from(&config_path()?)
}

/// Reads the config at `path`. A missing file is replaced by a template
/// and its defaults are used for this run.
pub fn load_config_from(path: &Path) -> Result<LoadedConfig> {
    if !path.exists() {
        let sample = Config {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            ..Config::default()
        };
        let tom = toml::to_string_pretty(&sample)?;
        fs::write(path, tom)
            .map_err(|e| anyhow!("cannot write template config {}: {e}", path.display()))?;
        return Ok(LoadedConfig {
            config: sample,
            path: path.to_path_buf(),
            template_written: true,
        });
    }
    let s = fs::read_to_string(path)?;
    let cfg: Config =
        toml::from_str(&s).map_err(|e| anyhow!("invalid config {}: {e}", path.display()))?;
    Ok(LoadedConfig {
        config: cfg,
        path: path.to_path_buf(),
        template_written: false,
    })
}

/// Picks the store URL: CLI flag, then `SUPPORT_TRIAGE_BASE_URL`, then the
/// config file, then the local default.
pub fn resolve_base_url(cfg: &Config, cli: Option<&str>) -> Result<String> {
    let env = std::env::var(BASE_URL_ENV).ok();
    pick_base_url(cfg, cli, env.as_deref())
}

fn pick_base_url(cfg: &Config, cli: Option<&str>, env: Option<&str>) -> Result<String> {
    let raw = cli
        .or(env.filter(|s| !s.trim().is_empty()))
        .or(cfg.base_url.as_deref())
        .unwrap_or(DEFAULT_BASE_URL)
        .trim();
    let url = Url::parse(raw).map_err(|e| anyhow!("invalid base url '{raw}': {e}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow!("base url '{raw}' must be http or https"));
    }
    Ok(raw.to_string())
}

pub fn request_timeout(cfg: &Config) -> Option<Duration> {
    cfg.request_timeout_secs
        .filter(|s| *s > 0)
        .map(Duration::from_secs)
}

pub fn resolve_log_path(cfg: &Config) -> Result<PathBuf> {
    if let Some(p) = &cfg.log_file {
        Ok(PathBuf::from(p))
    } else {
        default_log_path()
    }
}
