use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use url::Url;

// ---------------------------------------------------------------------------
// ScoutFileConfig: file-based config loader (recycle-scout.json) with env-var fallback
// ---------------------------------------------------------------------------

pub const ENV_CONFIG_PATH: &str = "RECYCLE_SCOUT_CONFIG";
pub const ENV_SEARCH_TERM: &str = "RECYCLE_SCOUT_SEARCH_TERM";
pub const ENV_ZIP_CODE: &str = "RECYCLE_SCOUT_ZIP_CODE";
pub const ENV_RADIUS: &str = "RECYCLE_SCOUT_RADIUS";
pub const ENV_MIN_RESULTS: &str = "RECYCLE_SCOUT_MIN_RESULTS";
pub const ENV_MAX_RESULTS: &str = "RECYCLE_SCOUT_MAX_RESULTS";
pub const ENV_OUTPUT: &str = "RECYCLE_SCOUT_OUTPUT";
pub const ENV_BASE_URL: &str = "RECYCLE_SCOUT_BASE_URL";
pub const ENV_DEBUG_HTML: &str = "RECYCLE_SCOUT_DEBUG_HTML";
pub const ENV_PAGE_LOAD_TIMEOUT_SECS: &str = "RECYCLE_SCOUT_PAGE_LOAD_TIMEOUT_SECS";
pub const ENV_SETTLE_MS: &str = "RECYCLE_SCOUT_SETTLE_MS";
pub const ENV_CHROME_EXECUTABLE: &str = "CHROME_EXECUTABLE";

pub const DEFAULT_SEARCH_TERM: &str = "Electronics";
pub const DEFAULT_ZIP_CODE: &str = "10001";
pub const DEFAULT_RADIUS: &str = "100";
pub const DEFAULT_MIN_RESULTS: usize = 3;
pub const DEFAULT_OUTPUT: &str = "recycling_facilities.csv";
pub const DEFAULT_BASE_URL: &str = "https://search.earth911.com/";
pub const DEFAULT_DEBUG_HTML: &str = "debug_page_source.html";
pub const DEFAULT_PAGE_LOAD_TIMEOUT_SECS: u64 = 45;
pub const DEFAULT_SETTLE_MS: u64 = 8000;

/// Mirrors `recycle-scout.json`. Every field is optional; absent fields fall
/// back to the matching `RECYCLE_SCOUT_*` env var, then to the built-in default.
#[derive(serde::Deserialize, Default, Clone, Debug)]
pub struct ScoutFileConfig {
    /// What to search for, e.g. `Electronics` or `Batteries`.
    pub search_term: Option<String>,
    pub zip_code: Option<String>,
    /// Search radius in miles, passed through verbatim as `list_filter`.
    pub radius: Option<String>,
    /// Below this many records the container fallback runs. Default: 3.
    pub min_results: Option<usize>,
    /// Records kept in the export. Default: same as `min_results`.
    pub max_results: Option<usize>,
    /// `.json` selects JSON export; anything else is CSV.
    pub output_path: Option<String>,
    pub base_url: Option<String>,
    /// Where to dump the fetched HTML. An empty string disables the dump.
    pub debug_html_path: Option<String>,
    pub page_load_timeout_secs: Option<u64>,
    /// Sleep after navigation so client-side rendering can finish.
    pub settle_ms: Option<u64>,
    pub chrome_executable: Option<String>,
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: FromStr>(key: &str) -> Option<T> {
    env_string(key).and_then(|v| v.parse().ok())
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ScoutFileConfig {
    /// Search term: JSON field → `RECYCLE_SCOUT_SEARCH_TERM` → `Electronics`.
    pub fn resolve_search_term(&self) -> String {
        non_empty(&self.search_term)
            .or_else(|| env_string(ENV_SEARCH_TERM))
            .unwrap_or_else(|| DEFAULT_SEARCH_TERM.to_string())
    }

    pub fn resolve_zip_code(&self) -> String {
        non_empty(&self.zip_code)
            .or_else(|| env_string(ENV_ZIP_CODE))
            .unwrap_or_else(|| DEFAULT_ZIP_CODE.to_string())
    }

    pub fn resolve_radius(&self) -> String {
        non_empty(&self.radius)
            .or_else(|| env_string(ENV_RADIUS))
            .unwrap_or_else(|| DEFAULT_RADIUS.to_string())
    }

    pub fn resolve_min_results(&self) -> usize {
        self.min_results
            .or_else(|| env_parse(ENV_MIN_RESULTS))
            .unwrap_or(DEFAULT_MIN_RESULTS)
    }

    /// Max records: JSON field → `RECYCLE_SCOUT_MAX_RESULTS` → resolved `min_results`.
    pub fn resolve_max_results(&self) -> usize {
        self.max_results
            .or_else(|| env_parse(ENV_MAX_RESULTS))
            .unwrap_or_else(|| self.resolve_min_results())
    }

    pub fn resolve_output_path(&self) -> PathBuf {
        non_empty(&self.output_path)
            .or_else(|| env_string(ENV_OUTPUT))
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT))
    }

    pub fn resolve_base_url(&self) -> String {
        non_empty(&self.base_url)
            .or_else(|| env_string(ENV_BASE_URL))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
    }

    /// Debug dump path. An explicit empty string in the file, or `0`/`off`/`false`
    /// in `RECYCLE_SCOUT_DEBUG_HTML`, disables the dump.
    pub fn resolve_debug_html_path(&self) -> Option<PathBuf> {
        if let Some(p) = &self.debug_html_path {
            let p = p.trim();
            return (!p.is_empty()).then(|| PathBuf::from(p));
        }
        if let Ok(v) = std::env::var(ENV_DEBUG_HTML) {
            let v = v.trim();
            if v.is_empty() || matches!(v.to_ascii_lowercase().as_str(), "0" | "off" | "false" | "no") {
                return None;
            }
            return Some(PathBuf::from(v));
        }
        Some(PathBuf::from(DEFAULT_DEBUG_HTML))
    }

    pub fn resolve_page_load_timeout_secs(&self) -> u64 {
        self.page_load_timeout_secs
            .or_else(|| env_parse(ENV_PAGE_LOAD_TIMEOUT_SECS))
            .unwrap_or(DEFAULT_PAGE_LOAD_TIMEOUT_SECS)
    }

    pub fn resolve_settle_ms(&self) -> u64 {
        self.settle_ms
            .or_else(|| env_parse(ENV_SETTLE_MS))
            .unwrap_or(DEFAULT_SETTLE_MS)
    }

    /// Browser override: JSON field → `CHROME_EXECUTABLE`. Only returned when the path exists.
    pub fn resolve_chrome_executable(&self) -> Option<String> {
        non_empty(&self.chrome_executable)
            .or_else(|| env_string(ENV_CHROME_EXECUTABLE))
            .filter(|p| Path::new(p).exists())
    }

    pub fn resolve(&self) -> ScoutConfig {
        ScoutConfig {
            search_term: self.resolve_search_term(),
            zip_code: self.resolve_zip_code(),
            radius: self.resolve_radius(),
            min_results: self.resolve_min_results(),
            max_results: self.resolve_max_results(),
            output_path: self.resolve_output_path(),
            base_url: self.resolve_base_url(),
            debug_html_path: self.resolve_debug_html_path(),
            page_load_timeout_secs: self.resolve_page_load_timeout_secs(),
            settle_ms: self.resolve_settle_ms(),
            chrome_executable: self.resolve_chrome_executable(),
        }
    }
}

/// Load `recycle-scout.json` from standard locations.
///
/// Search order (first found wins):
/// 1. `RECYCLE_SCOUT_CONFIG` env var path
/// 2. `./recycle-scout.json`
/// 3. `~/.recycle-scout/config.json`
///
/// Missing file → `ScoutFileConfig::default()` (silent, all env-var fallbacks apply).
/// Parse error → log a warning, return `ScoutFileConfig::default()`.
pub fn load_file_config() -> ScoutFileConfig {
    let mut candidates = vec![PathBuf::from("recycle-scout.json")];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".recycle-scout").join("config.json"));
    }
    if let Ok(env_path) = std::env::var(ENV_CONFIG_PATH) {
        candidates.insert(0, PathBuf::from(env_path));
    }

    for path in &candidates {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        return parse_file_config(&contents, path);
    }

    ScoutFileConfig::default()
}

fn parse_file_config(contents: &str, path: &Path) -> ScoutFileConfig {
    match serde_json::from_str::<ScoutFileConfig>(contents) {
        Ok(cfg) => {
            tracing::info!("recycle-scout config loaded from {}", path.display());
            cfg
        }
        Err(e) => {
            tracing::warn!(
                "recycle-scout config parse error at {}: {} (using defaults)",
                path.display(),
                e
            );
            ScoutFileConfig::default()
        }
    }
}

// ---------------------------------------------------------------------------

/// Fully resolved run configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScoutConfig {
    pub search_term: String,
    pub zip_code: String,
    pub radius: String,
    pub min_results: usize,
    pub max_results: usize,
    pub output_path: PathBuf,
    pub base_url: String,
    pub debug_html_path: Option<PathBuf>,
    pub page_load_timeout_secs: u64,
    pub settle_ms: u64,
    pub chrome_executable: Option<String>,
}

impl Default for ScoutConfig {
    fn default() -> Self {
        Self {
            search_term: DEFAULT_SEARCH_TERM.to_string(),
            zip_code: DEFAULT_ZIP_CODE.to_string(),
            radius: DEFAULT_RADIUS.to_string(),
            min_results: DEFAULT_MIN_RESULTS,
            max_results: DEFAULT_MIN_RESULTS,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            base_url: DEFAULT_BASE_URL.to_string(),
            debug_html_path: Some(PathBuf::from(DEFAULT_DEBUG_HTML)),
            page_load_timeout_secs: DEFAULT_PAGE_LOAD_TIMEOUT_SECS,
            settle_ms: DEFAULT_SETTLE_MS,
            chrome_executable: None,
        }
    }
}

impl ScoutConfig {
    /// `<base_url>?what=<term>&where=<zip>&list_filter=<radius>`
    pub fn search_url(&self) -> Result<Url> {
        Url::parse_with_params(
            &self.base_url,
            &[
                ("what", self.search_term.as_str()),
                ("where", self.zip_code.as_str()),
                ("list_filter", self.radius.as_str()),
            ],
        )
        .with_context(|| format!("invalid base url: {}", self.base_url))
    }

    pub fn validate(&self) -> Result<()> {
        if self.min_results == 0 {
            return Err(anyhow!("min_results must be at least 1"));
        }
        if self.max_results == 0 {
            return Err(anyhow!("max_results must be at least 1"));
        }
        if self.search_term.trim().is_empty() {
            return Err(anyhow!("search_term must not be empty"));
        }
        self.search_url().map(|_| ())
    }
}
