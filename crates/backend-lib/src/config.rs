// ============================
// scribe-backend-lib/src/config.rs
// ============================
//! Configuration management.
use anyhow::Result;
use figment::{
    providers::{Env, Format, Json, Toml, Yaml},
    Figment,
};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;

/// Application settings
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Database URL (sqlite path or `sqlite::memory:`)
    pub database_url: String,
    /// Log level
    pub log_level: String,
    /// Mark cookies `Secure` (true in production deployments)
    pub secure_cookies: bool,
    /// Google OAuth client settings
    pub google: GoogleSettings,
}

/// Credentials and callback for the Google OAuth client
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleSettings {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret
    pub client_secret: String,
    /// Registered callback URL
    pub redirect_uri: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().expect("static addr"),
            database_url: "sqlite://data/scribe.db".to_string(),
            log_level: "info".to_string(),
            secure_cookies: false,
            google: GoogleSettings::default(),
        }
    }
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: "http://localhost:3000/login/google/callback".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from config files and environment variables
    pub fn load() -> Result<Self> {
        let settings = Figment::new()
            .merge(Toml::file("config.toml"))
            .merge(Yaml::file("config.yaml"))
            .merge(Json::file("config.json"))
            .merge(Env::prefixed("SCRIBE_").split("__"))
            .extract()?;

        Ok(settings)
    }

    /// Load settings from an explicit TOML file, still honoring the env overrides
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let settings = Figment::new()
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed("SCRIBE_").split("__"))
            .extract()?;

        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_locally_without_secure_cookies() {
        let settings = Settings::default();
        assert_eq!(settings.bind_addr.port(), 3000);
        assert!(!settings.secure_cookies);
        assert!(settings.google.client_id.is_empty());
    }
}
