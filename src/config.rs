use serde::Deserialize;
use std::path::PathBuf;
use thiserror::Error;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port to listen on
    pub port: u16,
    /// Externally reachable base URL, used for the sign-in callback
    pub public_url: String,
    /// Base URL of the hosted document store
    pub store_url: String,
    /// Document (bin) id in the store
    pub store_bin: Option<String>,
    /// Store credential, sent as X-Master-Key
    pub store_key: Option<String>,
    /// Base URL of the identity provider; sign-in is disabled without it
    pub auth_url: Option<String>,
    /// Origin allowed to call the API from a browser
    pub cors_origin: Option<String>,
    /// How long sessions live, in minutes
    pub session_expiry_minutes: u64,
    /// Mark session cookies `Secure` (requires HTTPS)
    pub secure_cookies: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            public_url: "http://localhost:8080".to_string(),
            store_url: "https://api.jsonbin.io/v3".to_string(),
            store_bin: None,
            store_key: None,
            auth_url: None,
            cors_origin: None,
            session_expiry_minutes: 60 * 24 * 30,
            secure_cookies: false,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        // Start with defaults
        let mut config = Self::default();

        // Try to load from config file
        let path = config_path.unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        config.apply_env(|name| std::env::var(name).ok());

        Ok(config)
    }

    /// Default config file path: ~/.config/liftlog/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("liftlog")
            .join("config.yaml")
    }

    /// Applies `LIFTLOG_*` overrides from an environment lookup.
    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(port) = var("LIFTLOG_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => {
                    tracing::warn!("Invalid LIFTLOG_PORT '{}', keeping {}", port, self.port)
                }
            }
        }
        if let Some(url) = var("LIFTLOG_PUBLIC_URL") {
            self.public_url = url;
        }
        if let Some(url) = var("LIFTLOG_STORE_URL") {
            self.store_url = url;
        }
        if let Some(bin) = var("LIFTLOG_STORE_BIN") {
            self.store_bin = Some(bin);
        }
        if let Some(key) = var("LIFTLOG_STORE_KEY") {
            self.store_key = Some(key);
        }
        if let Some(url) = var("LIFTLOG_AUTH_URL") {
            self.auth_url = Some(url);
        }
        if let Some(origin) = var("LIFTLOG_CORS_ORIGIN") {
            self.cors_origin = Some(origin);
        }
        if let Some(minutes) = var("LIFTLOG_SESSION_EXPIRY_MINUTES") {
            match minutes.parse() {
                Ok(minutes) => self.session_expiry_minutes = minutes,
                Err(_) => tracing::warn!(
                    "Invalid LIFTLOG_SESSION_EXPIRY_MINUTES '{}', keeping {}",
                    minutes,
                    self.session_expiry_minutes
                ),
            }
        }
        if let Some(flag) = var("LIFTLOG_SECURE_COOKIES") {
            self.secure_cookies = flag == "1" || flag.eq_ignore_ascii_case("true");
        }
    }

    /// Logs what a partially configured server will refuse to do.
    pub fn warn_if_incomplete(&self) {
        if self.store_bin.is_none() || self.store_key.is_none() {
            tracing::warn!("No store_bin/store_key configured - all log operations will fail");
        }
        if self.auth_url.is_none() {
            tracing::warn!("No auth_url configured - sign-in is disabled");
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {}", .0.display(), .1)]
    ReadError(PathBuf, #[source] std::io::Error),
    #[error("Failed to parse config file '{}': {}", .0.display(), .1)]
    ParseError(PathBuf, #[source] serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_url, "https://api.jsonbin.io/v3");
        assert!(config.store_bin.is_none());
        assert!(config.auth_url.is_none());
        assert!(!config.secure_cookies);
    }

    #[test]
    fn test_load_no_file_uses_defaults() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("nonexistent.yaml");

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "port: 9000").unwrap();
        writeln!(file, "store_bin: 6501aa00bin").unwrap();
        writeln!(file, "store_key: secret").unwrap();
        writeln!(file, "auth_url: https://auth.example.com").unwrap();

        let config = Config::load(Some(config_path)).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.store_bin.as_deref(), Some("6501aa00bin"));
        assert_eq!(config.store_key.as_deref(), Some("secret"));
        assert_eq!(config.auth_url.as_deref(), Some("https://auth.example.com"));
        // Unset fields keep their defaults
        assert_eq!(config.public_url, "http://localhost:8080");
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();

        config.apply_env(|name| match name {
            "LIFTLOG_PORT" => Some("9090".to_string()),
            "LIFTLOG_STORE_BIN" => Some("abc123".to_string()),
            "LIFTLOG_CORS_ORIGIN" => Some("http://localhost:5173".to_string()),
            "LIFTLOG_SECURE_COOKIES" => Some("true".to_string()),
            _ => None,
        });

        assert_eq!(config.port, 9090);
        assert_eq!(config.store_bin.as_deref(), Some("abc123"));
        assert_eq!(config.cors_origin.as_deref(), Some("http://localhost:5173"));
        assert!(config.secure_cookies);
    }

    #[test]
    fn test_invalid_port_is_ignored() {
        let mut config = Config::default();

        config.apply_env(|name| match name {
            "LIFTLOG_PORT" => Some("not-a-port".to_string()),
            _ => None,
        });

        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_secure_cookies_forms() {
        for (value, expected) in [("1", true), ("true", true), ("TRUE", true), ("0", false)] {
            let mut config = Config::default();
            config.apply_env(|name| match name {
                "LIFTLOG_SECURE_COOKIES" => Some(value.to_string()),
                _ => None,
            });
            assert_eq!(config.secure_cookies, expected, "value {value:?}");
        }
    }

    #[test]
    fn test_invalid_yaml_error() {
        let temp_dir = tempdir().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        let mut file = std::fs::File::create(&config_path).unwrap();
        writeln!(file, "invalid: yaml: content: [").unwrap();

        let result = Config::load(Some(config_path));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_unreadable_file_error() {
        let temp_dir = tempdir().unwrap();

        // A directory exists but cannot be read as a file.
        let result = Config::load(Some(temp_dir.path().to_path_buf()));
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
