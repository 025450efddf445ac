use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::error;

const DEFAULT_PORT: u16 = 4310;
const DEFAULT_PROBE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_PROBE_CONCURRENCY: usize = 4;
const DEFAULT_CONFIG_FILE: &str = "sitepulse.toml";

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "site_url is required — pass --site-url, set SITEPULSE_SITE_URL, \
         or add site_url to sitepulse.toml"
    )]
    MissingSiteUrl,
    #[error("site_url '{0}' must start with http:// or https://")]
    InvalidSiteUrl(String),
}

// ─── TOML config file ─────────────────────────────────────────────────────────

/// `sitepulse.toml` — all fields are optional overrides.
/// Priority: CLI / env var  >  TOML  >  built-in default.
#[derive(Deserialize, Default)]
struct TomlConfig {
    /// Base URL of the scanned site, e.g. "https://www.example.org".
    site_url: Option<String>,
    /// Health endpoint port (default: 4310).
    port: Option<u16>,
    /// Bind address for the health endpoint (default: "127.0.0.1").
    bind_address: Option<String>,
    /// Log level filter string, e.g. "debug", "info,sitepulse=trace" (default: "info").
    log: Option<String>,
    /// Log output format: "pretty" (default, human-readable) | "json" (structured for log aggregators).
    log_format: Option<String>,
    /// Token appended to every probe URL as the APP_PASSWORD query parameter.
    /// Omit when the site is reachable without credentials.
    auth_token: Option<String>,
    /// Per-probe timeout in seconds (default: 30).
    probe_timeout_secs: Option<u64>,
    /// How many probes may be in flight at once; 1 = strictly sequential (default: 4).
    probe_concurrency: Option<usize>,
    /// Named singleton pages: state name → page ID in the CMS.
    /// Example: `[page_states]` with `maintenance = 12`.
    page_states: Option<BTreeMap<String, u64>>,
}

fn load_toml(path: &Path) -> Option<TomlConfig> {
    let contents = std::fs::read_to_string(path).ok()?;
    match toml::from_str::<TomlConfig>(&contents) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            error!(path = %path.display(), err = %e, "failed to parse config file — using defaults");
            None
        }
    }
}

// ─── ScannerConfig ────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ScannerConfig {
    /// Base URL of the scanned site, trailing slash stripped.
    pub site_url: String,
    pub port: u16,
    pub bind_address: String,
    pub log: String,
    /// "pretty" (default) | "json" (structured for Loki/Elasticsearch).
    pub log_format: String,
    /// Appended to every probe URL as APP_PASSWORD. None = no credentials.
    pub auth_token: Option<String>,
    pub probe_timeout_secs: u64,
    pub probe_concurrency: usize,
    /// Named singleton pages: state name → page ID. Iteration order is the
    /// enumeration order of the `State {name}` probe rows.
    pub page_states: BTreeMap<String, u64>,
}

impl ScannerConfig {
    /// Build config from CLI/env args + optional TOML file.
    ///
    /// Priority (highest to lowest):
    ///   1. CLI / env — passed as `Some(value)` from clap
    ///   2. TOML file at `--config` (default: ./sitepulse.toml)
    ///   3. Built-in defaults
    pub fn new(
        site_url: Option<String>,
        port: Option<u16>,
        bind_address: Option<String>,
        log: Option<String>,
        config_path: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let path = config_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        let toml = load_toml(&path).unwrap_or_default();

        let site_url = site_url
            .or(toml.site_url)
            .ok_or(ConfigError::MissingSiteUrl)?;
        let site_url = normalize_site_url(&site_url)?;

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let bind_address = bind_address
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let log_format = std::env::var("SITEPULSE_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let auth_token = std::env::var("SITEPULSE_AUTH_TOKEN")
            .ok()
            .filter(|t| !t.is_empty())
            .or(toml.auth_token);

        let probe_timeout_secs = toml
            .probe_timeout_secs
            .unwrap_or(DEFAULT_PROBE_TIMEOUT_SECS);
        let probe_concurrency = toml
            .probe_concurrency
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_PROBE_CONCURRENCY);

        let page_states = toml.page_states.unwrap_or_default();

        Ok(Self {
            site_url,
            port,
            bind_address,
            log,
            log_format,
            auth_token,
            probe_timeout_secs,
            probe_concurrency,
            page_states,
        })
    }

    /// State names in enumeration order.
    pub fn page_state_names(&self) -> Vec<String> {
        self.page_states.keys().cloned().collect()
    }
}

fn normalize_site_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        return Err(ConfigError::InvalidSiteUrl(raw.to_string()));
    }
    Ok(trimmed.to_string())
}

// ─── Tests ────────────────────────────────────────────────────────────────────
