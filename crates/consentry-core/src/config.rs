use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub banner: BannerConfig,
    #[serde(default)]
    pub consent: ConsentConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            general: GeneralConfig::default(),
            banner: BannerConfig::default(),
            consent: ConsentConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Data directory path
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerConfig {
    /// Class selector for the banner container
    #[serde(default = "default_banner_selector")]
    pub selector: String,
    /// Class selector for the control elements inside the banner
    #[serde(default = "default_control_selector")]
    pub control_selector: String,
    /// Marker class toggled to show/hide the banner
    #[serde(default = "default_active_class")]
    pub active_class: String,
}

impl Default for BannerConfig {
    fn default() -> Self {
        Self {
            selector: default_banner_selector(),
            control_selector: default_control_selector(),
            active_class: default_active_class(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsentConfig {
    /// Name of the persisted consent record
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// Record time-to-live in days
    #[serde(default = "default_ttl_days")]
    pub ttl_days: u32,
    /// Hostname used for the purge scope variants on rejection
    #[serde(default)]
    pub hostname: Option<String>,
}

impl Default for ConsentConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            ttl_days: default_ttl_days(),
            hostname: None,
        }
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("consentry")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_banner_selector() -> String {
    ".c-cookies".to_string()
}

fn default_control_selector() -> String {
    ".c-btn".to_string()
}

fn default_active_class() -> String {
    "is-active".to_string()
}

fn default_cookie_name() -> String {
    "cookieConsent".to_string()
}

fn default_ttl_days() -> u32 {
    7
}

impl AppConfig {
    /// Load configuration from file, falling back to defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content =
            toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/consentry/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("consentry")
            .join("config.toml")
    }

    /// Get the cookie database file path
    pub fn database_path(&self) -> PathBuf {
        self.data_dir().join("consentry.db")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }
}

fn expand_tilde(path: &std::path::Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}
