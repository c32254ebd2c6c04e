//! Application configuration.
//!
//! Values come from the environment (a `.env` file is loaded first when
//! present) and fall back to the defaults below.

use std::env;

/// Base URL of the remote upload service.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Fixed path the file is posted to, relative to the API URL.
pub const DEFAULT_UPLOAD_PATH: &str = "/uploads";

/// Port of the built-in HTTP server.
pub const DEFAULT_PORT: u16 = 3000;

/// Maximum accepted file size (5 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 5 * 1024 * 1024;

/// Runtime settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_url: String,
    pub upload_path: String,
    pub port: u16,
    pub max_file_size: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            upload_path: DEFAULT_UPLOAD_PATH.to_string(),
            port: DEFAULT_PORT,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl Settings {
    /// Load from `ROSTERLOAD_*` environment variables.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup. Unparseable numbers keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_url: lookup("ROSTERLOAD_API_URL").unwrap_or(defaults.api_url),
            upload_path: lookup("ROSTERLOAD_UPLOAD_PATH").unwrap_or(defaults.upload_path),
            port: lookup("ROSTERLOAD_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            max_file_size: lookup("ROSTERLOAD_MAX_FILE_SIZE")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.max_file_size),
        }
    }

    /// Absolute URL of the upload endpoint.
    pub fn upload_url(&self) -> String {
        format!(
            "{}/{}",
            self.api_url.trim_end_matches('/'),
            self.upload_path.trim_start_matches('/')
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_lookup(|_| None);
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.upload_url(), "http://localhost:8000/uploads");
    }

    #[test]
    fn test_overrides_and_bad_numbers() {
        let vars: HashMap<&str, &str> = [
            ("ROSTERLOAD_API_URL", "https://prl.example.com/api/"),
            ("ROSTERLOAD_PORT", "not-a-port"),
            ("ROSTERLOAD_MAX_FILE_SIZE", "1024"),
        ]
        .into_iter()
        .collect();
        let settings = Settings::from_lookup(|k| vars.get(k).map(|v| v.to_string()));

        assert_eq!(settings.upload_url(), "https://prl.example.com/api/uploads");
        assert_eq!(settings.port, DEFAULT_PORT);
        assert_eq!(settings.max_file_size, 1024);
    }
}
