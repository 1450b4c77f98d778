/// Database configuration and connection management
pub mod database;

/// Application settings loading from binder.toml and environment variables
pub mod settings;
