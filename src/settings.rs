//! Monitor configuration: thresholds, scale factor, anchors and the lexicon.
//!
//! Sources, first hit wins:
//! 1) `$FED_MONITOR_CONFIG` / `$FED_LEXICON_PATH` (must exist when set)
//! 2) `config/monitor.toml` / `config/lexicon.json` relative to the CWD
//! 3) built-in defaults
//!
//! Loaded once at process start (`init`) into immutable process-wide state;
//! `global()` falls back to the built-in defaults when `init` never ran.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::error::ConfigError;
use crate::extract::AnchorSet;
use crate::lexicon::Lexicon;
use crate::pipeline::AlertPolicy;
use crate::scoring::ScoringCfg;
use crate::shift::ShiftThresholds;

pub const DEFAULT_MONITOR_CONFIG_PATH: &str = "config/monitor.toml";
pub const DEFAULT_LEXICON_PATH: &str = "config/lexicon.json";

pub const ENV_MONITOR_CONFIG_PATH: &str = "FED_MONITOR_CONFIG";
pub const ENV_LEXICON_PATH: &str = "FED_LEXICON_PATH";

static GLOBAL: OnceCell<Settings> = OnceCell::new();

/// `config/monitor.toml`. Every section and field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    pub scoring: ScoringCfg,
    pub shift: ShiftThresholds,
    pub alerts: AlertPolicy,
    pub anchors: AnchorSet,
}

impl MonitorConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: MonitorConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()?;
        self.shift.validate()
    }
}

/// Configuration the analysis core runs with.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: MonitorConfig,
    pub lexicon: Lexicon,
}

impl Settings {
    pub fn new(config: MonitorConfig, lexicon: Lexicon) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config, lexicon })
    }

    pub fn builtin() -> Self {
        Self {
            config: MonitorConfig::default(),
            lexicon: Lexicon::builtin().clone(),
        }
    }

    /// Resolve both files via env → default path → built-in.
    pub fn from_env() -> Result<Self, ConfigError> {
        let config = match resolve_path(ENV_MONITOR_CONFIG_PATH, DEFAULT_MONITOR_CONFIG_PATH)? {
            Some(p) => {
                info!(target: "settings", path = %p.display(), "loading monitor config");
                MonitorConfig::from_path(&p)?
            }
            None => MonitorConfig::default(),
        };
        let lexicon = match resolve_path(ENV_LEXICON_PATH, DEFAULT_LEXICON_PATH)? {
            Some(p) => {
                info!(target: "settings", path = %p.display(), "loading lexicon");
                Lexicon::from_path(&p)?
            }
            None => Lexicon::builtin().clone(),
        };
        info!(
            target: "settings",
            terms = lexicon.len(),
            scale = config.scoring.scale,
            slight = config.shift.slight,
            moderate = config.shift.moderate,
            significant = config.shift.significant,
            "settings ready"
        );
        Self::new(config, lexicon)
    }
}

fn resolve_path(env_key: &str, default: &str) -> Result<Option<PathBuf>, ConfigError> {
    if let Ok(p) = std::env::var(env_key) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return Ok(Some(pb));
        }
        return Err(ConfigError::Io {
            path: pb.display().to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{env_key} points to a non-existent path"),
            ),
        });
    }
    let pb = PathBuf::from(default);
    Ok(pb.exists().then_some(pb))
}

/// Install process-wide settings. The first call wins; later calls return the
/// already-installed value.
pub fn init(settings: Settings) -> &'static Settings {
    GLOBAL.get_or_init(|| settings)
}

/// Process-wide settings (built-in defaults if `init` was never called).
pub fn global() -> &'static Settings {
    GLOBAL.get_or_init(Settings::builtin)
}
