//! Configuration module for Cicada.
//!
//! Handles the service settings file and environment variable expansion.

mod settings;

pub use settings::{expand_env_vars, PagingSettings, ServiceSettings, Settings, SettingsError};
