// Configuration loading and parsing (hoopscout.toml, credentials.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Environment variable that overrides `kenpom_api_key` from credentials.toml.
pub const API_KEY_ENV: &str = "KENPOM_API_KEY";

/// Environment variable pointing at the directory holding `config/` and `defaults/`.
pub const HOME_ENV: &str = "HOOPSCOUT_HOME";

const MIN_SEASON: u16 = 2002;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub season: u16,
    pub team: TrackedTeam,
    pub ratings: ProviderSettings,
    pub games: ProviderSettings,
    pub cache: CacheTtls,
    pub logging: LoggingConfig,
    pub credentials: CredentialsConfig,
}

// ---------------------------------------------------------------------------
// hoopscout.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire hoopscout.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SettingsFile {
    season: SeasonSection,
    team: TrackedTeam,
    ratings: ProviderSettings,
    games: ProviderSettings,
    #[serde(default)]
    cache: CacheTtls,
    #[serde(default)]
    logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct SeasonSection {
    year: u16,
}

/// The team whose perspective post-game and season reports are written from.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackedTeam {
    /// Name as it appears in the ratings provider (`TeamName`).
    pub name: String,
    /// Team id in the game-event provider.
    pub espn_id: String,
    /// Conference short code in the ratings provider (`ConfShort`).
    pub conference: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ProviderSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Time-to-live per cached dataset, in seconds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheTtls {
    pub ratings_secs: u64,
    pub static_secs: u64,
    pub fanmatch_secs: u64,
    pub scoreboard_secs: u64,
    pub schedule_secs: u64,
    pub box_score_secs: u64,
}

impl Default for CacheTtls {
    fn default() -> Self {
        CacheTtls {
            ratings_secs: 1800,
            static_secs: 86_400,
            fanmatch_secs: 3600,
            scoreboard_secs: 300,
            schedule_secs: 1800,
            box_score_secs: 3600,
        }
    }
}

impl CacheTtls {
    /// Season tables that move during the day (ratings, four factors, misc, point distribution).
    pub fn ratings(&self) -> Duration {
        Duration::from_secs(self.ratings_secs)
    }

    /// Tables that change at most daily (teams, conferences, height, archive).
    pub fn static_tables(&self) -> Duration {
        Duration::from_secs(self.static_secs)
    }

    /// Prediction feed and conference ratings.
    pub fn fanmatch(&self) -> Duration {
        Duration::from_secs(self.fanmatch_secs)
    }

    pub fn scoreboard(&self) -> Duration {
        Duration::from_secs(self.scoreboard_secs)
    }

    pub fn schedule(&self) -> Duration {
        Duration::from_secs(self.schedule_secs)
    }

    pub fn box_score(&self) -> Duration {
        Duration::from_secs(self.box_score_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub dir: String,
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            dir: "logs".into(),
            filter: "hoopscout=info,warn".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// credentials.toml structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Default)]
pub struct CredentialsConfig {
    pub kenpom_api_key: Option<String>,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/hoopscout.toml` and
/// (optionally) `config/credentials.toml`, relative to `base_dir`.
///
/// Does not copy defaults and ignores the environment; `load_config()` does both.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- hoopscout.toml (required) ---
    let settings_path = config_dir.join("hoopscout.toml");
    let settings_text = read_file(&settings_path)?;
    let settings: SettingsFile =
        toml::from_str(&settings_text).map_err(|e| ConfigError::ParseError {
            path: settings_path.clone(),
            source: e,
        })?;

    // --- credentials.toml (optional) ---
    let credentials_path = config_dir.join("credentials.toml");
    let credentials = if credentials_path.exists() {
        let cred_text = read_file(&credentials_path)?;
        toml::from_str(&cred_text).map_err(|e| ConfigError::ParseError {
            path: credentials_path.clone(),
            source: e,
        })?
    } else {
        CredentialsConfig::default()
    };

    let config = Config {
        season: settings.season.year,
        team: settings.team,
        ratings: settings.ratings,
        games: settings.games,
        cache: settings.cache,
        logging: settings.logging,
        credentials,
    };

    validate(&config)?;
    debug!(path = %settings_path.display(), "configuration loaded");

    Ok(config)
}

/// Ensure all config files exist by copying missing ones from `defaults/`.
/// Returns the list of files that were copied. Skips `.example` files.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.exists() {
        if !config_dir.exists() {
            return Err(ConfigError::DefaultsCopyError {
                message: format!(
                    "neither defaults/ nor config/ directory found in {}; \
                     set {HOME_ENV} or run from the project root",
                    base_dir.display()
                ),
            });
        }
        return Ok(vec![]);
    }

    std::fs::create_dir_all(&config_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to create config directory: {e}"),
    })?;

    let entries = std::fs::read_dir(&defaults_dir).map_err(|e| ConfigError::DefaultsCopyError {
        message: format!("failed to read defaults directory: {e}"),
    })?;

    let mut copied = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to read defaults entry: {e}"),
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = path.file_name() else {
            continue;
        };
        if file_name.to_str().is_some_and(|n| n.ends_with(".example")) {
            continue;
        }

        let target = config_dir.join(file_name);
        if target.exists() {
            continue;
        }
        std::fs::copy(&path, &target).map_err(|e| ConfigError::DefaultsCopyError {
            message: format!("failed to copy {} to {}: {e}", path.display(), target.display()),
        })?;
        copied.push(target);
    }

    Ok(copied)
}

/// Pick the directory that holds `config/` and `defaults/`.
///
/// Order: `$HOOPSCOUT_HOME`, the current directory when it already has
/// `config/` or `defaults/`, then the platform config directory.
pub fn resolve_base_dir() -> Result<PathBuf, ConfigError> {
    if let Ok(home) = std::env::var(HOME_ENV) {
        if !home.trim().is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    if cwd.join("config").is_dir() || cwd.join("defaults").is_dir() {
        return Ok(cwd);
    }

    directories::ProjectDirs::from("", "", "hoopscout")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or(ConfigError::FileNotFound { path: cwd })
}

/// Convenience wrapper: resolves the base directory, copies defaults,
/// loads the files and applies the `KENPOM_API_KEY` override.
pub fn load_config() -> Result<Config, ConfigError> {
    let base = resolve_base_dir()?;
    ensure_config_files(&base)?;
    let mut config = load_config_from(&base)?;
    if let Ok(key) = std::env::var(API_KEY_ENV) {
        apply_api_key_override(&mut config, &key);
    }
    Ok(config)
}

/// An empty override is ignored so a blank variable does not erase a file key.
pub fn apply_api_key_override(config: &mut Config, key: &str) {
    let key = key.trim();
    if !key.is_empty() {
        config.credentials.kenpom_api_key = Some(key.to_string());
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.season < MIN_SEASON {
        return Err(ConfigError::ValidationError {
            field: "season.year".into(),
            message: format!("must be {MIN_SEASON} or later, got {}", config.season),
        });
    }

    let text_fields: &[(&str, &str)] = &[
        ("team.name", config.team.name.as_str()),
        ("team.espn_id", config.team.espn_id.as_str()),
        ("team.conference", config.team.conference.as_str()),
        ("ratings.base_url", config.ratings.base_url.as_str()),
        ("games.base_url", config.games.base_url.as_str()),
    ];
    for (name, val) in text_fields {
        if val.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must not be empty".into(),
            });
        }
    }

    let c = &config.cache;
    let positive_fields: &[(&str, u64)] = &[
        ("ratings.timeout_secs", config.ratings.timeout_secs),
        ("games.timeout_secs", config.games.timeout_secs),
        ("cache.ratings_secs", c.ratings_secs),
        ("cache.static_secs", c.static_secs),
        ("cache.fanmatch_secs", c.fanmatch_secs),
        ("cache.scoreboard_secs", c.scoreboard_secs),
        ("cache.schedule_secs", c.schedule_secs),
        ("cache.box_score_secs", c.box_score_secs),
    ];
    for (name, val) in positive_fields {
        if *val == 0 {
            return Err(ConfigError::ValidationError {
                field: name.to_string(),
                message: "must be > 0".into(),
            });
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
