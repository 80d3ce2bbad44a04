//! TOML-based configuration for Cicada.
//!
//! Supports a config file (cicada.toml) with environment variable expansion.
//!
//! Example configuration:
//! ```toml
//! [service]
//! namespace = "com.example.odata"
//! container_name = "Container"
//! service_root = "${CICADA_SERVICE_ROOT}"
//! root_package = "com.example"
//!
//! [paging]
//! max_page_size = 100
//! delegate_skip = false
//! delegate_top = false
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::catalog::CatalogConfig;
use crate::pipeline::PagingPolicy;

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Schema and container naming.
    pub service: ServiceSettings,

    /// Page-size ceiling and slicing delegation.
    pub paging: PagingSettings,
}

/// Service naming.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServiceSettings {
    /// Default schema namespace.
    pub namespace: String,

    /// Entity container name.
    pub container_name: String,

    /// Service root URL (supports ${ENV_VAR} expansion).
    pub service_root: String,

    /// Scope hint handed to type discovery.
    pub root_package: Option<String>,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            namespace: "com.example.odata".to_string(),
            container_name: "Container".to_string(),
            service_root: "http://localhost:8080/odata".to_string(),
            root_package: None,
        }
    }
}

/// Paging policy.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PagingSettings {
    /// Largest page returned by a collection read.
    pub max_page_size: usize,

    /// `$skip` is applied by the backend.
    pub delegate_skip: bool,

    /// `$top` is applied by the backend.
    pub delegate_top: bool,
}

impl Default for PagingSettings {
    fn default() -> Self {
        Self {
            max_page_size: 100,
            delegate_skip: false,
            delegate_top: false,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings and expand environment variables in string values.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let mut settings: Settings = toml::from_str(content)?;
        settings.service.namespace = expand_env_vars(&settings.service.namespace)?;
        settings.service.container_name = expand_env_vars(&settings.service.container_name)?;
        settings.service.service_root = expand_env_vars(&settings.service.service_root)?;
        if let Some(root_package) = &settings.service.root_package {
            settings.service.root_package = Some(expand_env_vars(root_package)?);
        }
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `CICADA_CONFIG`
    /// 2. `./cicada.toml`
    /// 3. `~/.config/cicada/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        if let Ok(path) = env::var("CICADA_CONFIG") {
            return Self::from_file(&path);
        }

        let local_config = PathBuf::from("cicada.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("cicada").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        Ok(Settings::default())
    }

    /// Reject settings no service can run with.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.service.namespace.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "service.namespace must not be empty".to_string(),
            ));
        }
        if self.service.container_name.trim().is_empty() {
            return Err(SettingsError::InvalidConfig(
                "service.container_name must not be empty".to_string(),
            ));
        }
        if self.paging.max_page_size == 0 {
            return Err(SettingsError::InvalidConfig(
                "paging.max_page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig::new(&self.service.namespace, &self.service.container_name)
            .with_service_root(&self.service.service_root)
            .with_max_page_size(self.paging.max_page_size)
            .with_root_package(self.service.root_package.as_deref())
    }

    pub fn paging_policy(&self) -> PagingPolicy {
        PagingPolicy {
            max_page_size: self.paging.max_page_size,
            delegate_skip: self.paging.delegate_skip,
            delegate_top: self.paging.delegate_top,
        }
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let mut var_name = String::new();
        if chars.next_if_eq(&'{').is_some() {
            for ch in chars.by_ref() {
                if ch == '}' {
                    break;
                }
                var_name.push(ch);
            }
        } else {
            // $VAR ends at the first non-alphanumeric, non-underscore character
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                var_name.push(ch);
            }
            if var_name.is_empty() {
                result.push('$');
                continue;
            }
        }

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
