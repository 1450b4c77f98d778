//! Application settings loading from binder.toml and environment variables.
//!
//! This module provides functionality to load the application configuration from
//! an optional TOML file, with environment variables taking precedence for the
//! settings an operator most often overrides. Remote catalog sync stays disabled
//! unless both an endpoint URL and an API key are configured.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Default path of the bundled catalog seed file.
const DEFAULT_CATALOG_PATH: &str = "data/catalog.csv";

/// Top-level application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Connection URL of the `SQLite` database
    pub database_url: String,
    /// Path to the CSV file used to seed the card catalog on first run
    pub catalog_path: String,
    /// Remote catalog sync settings, absent when sync is not configured
    pub sync: Option<SyncSettings>,
}

/// Settings for the optional remote catalog endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncSettings {
    /// Base URL of the remote catalog service
    pub url: String,
    /// API key sent with every catalog request
    pub api_key: String,
}

/// Structure of the optional binder.toml file.
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    /// Overrides the default catalog seed path
    catalog_path: Option<String>,
    /// Remote sync section, absent when sync is not configured
    sync: Option<SyncSettings>,
}

/// Parses a binder.toml file at the given path.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML syntax is invalid.
fn load_file_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse binder.toml: {e}"),
    })
}

/// Loads the application configuration.
///
/// Reads `binder.toml` from the working directory when present, then applies
/// environment overrides: `DATABASE_URL` for the database, `CATALOG_PATH` for
/// the seed file, and `SYNC_URL` / `SYNC_API_KEY` for the remote endpoint.
/// A missing binder.toml is not an error; a malformed one is.
///
/// # Errors
/// Returns an error if binder.toml exists but cannot be parsed.
pub fn load_app_configuration() -> Result<AppConfig> {
    let file = if Path::new("binder.toml").exists() {
        load_file_config("binder.toml")?
    } else {
        FileConfig::default()
    };

    let database_url = super::database::get_database_url();

    let catalog_path = std::env::var("CATALOG_PATH")
        .ok()
        .or(file.catalog_path)
        .unwrap_or_else(|| DEFAULT_CATALOG_PATH.to_string());

    // Env vars configure sync as a pair; otherwise fall back to the file section
    let sync = match (std::env::var("SYNC_URL"), std::env::var("SYNC_API_KEY")) {
        (Ok(url), Ok(api_key)) => Some(SyncSettings { url, api_key }),
        _ => file.sync,
    };

    Ok(AppConfig {
        database_url,
        catalog_path,
        sync,
    })
}
