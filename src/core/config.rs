//! Process-wide configuration, loaded once at startup.
//!
//! Everything comes from environment variables, with an optional `.env`
//! file in the working directory filling in values the real environment
//! does not already set. The resulting struct is passed by reference into
//! each component's constructor; nothing reads the environment afterwards.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::errors::ApiError;

pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// API key for the embedding and generation services.
    pub api_key: String,
    /// Base URL of the OpenAI-compatible API.
    pub api_base_url: String,
    pub embedding_model: String,
    pub chat_model: String,
    /// SQLite database path for the search server's vector store.
    pub db_path: PathBuf,
    pub log_dir: PathBuf,
    /// Timeout applied to every outbound HTTP request.
    pub http_timeout: Duration,
    pub port: u16,
}

impl AppConfig {
    /// Load configuration from the environment, reading `.env` first.
    ///
    /// The API key is validated here so a missing key fails before any
    /// network call is attempted.
    pub fn from_env() -> Result<Self, ApiError> {
        load_env();

        let api_key = env::var("OPENAI_API_KEY").unwrap_or_default();
        if api_key.trim().is_empty() {
            return Err(ApiError::Auth(
                "OPENAI_API_KEY is not set; set it in the environment or a .env file".to_string(),
            ));
        }

        let api_base_url = env_or("OPENAI_BASE_URL", DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();
        let timeout_secs = env::var("RECALL_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|val| val.parse::<u64>().ok())
            .unwrap_or(30);
        let port = env::var("PORT")
            .ok()
            .and_then(|val| val.parse::<u16>().ok())
            .unwrap_or(8000);

        Ok(AppConfig {
            api_key,
            api_base_url,
            embedding_model: env_or("RECALL_EMBEDDING_MODEL", DEFAULT_EMBEDDING_MODEL),
            chat_model: env_or("RECALL_CHAT_MODEL", DEFAULT_CHAT_MODEL),
            db_path: PathBuf::from(env_or("RECALL_DB_PATH", "recall.db")),
            log_dir: PathBuf::from(env_or("RECALL_LOG_DIR", "logs")),
            http_timeout: Duration::from_secs(timeout_secs),
            port,
        })
    }
}

/// Load `.env` from the working directory, if present.
pub fn load_env() {
    load_env_file(".env");
}

fn env_or(key: &str, default: &str) -> String {
    match env::var(key) {
        Ok(val) if !val.trim().is_empty() => val,
        _ => default.to_string(),
    }
}

/// Load `KEY=VALUE` lines from a dotenv-style file into the environment.
///
/// Existing environment variables always win. Missing file is not an error.
fn load_env_file(path: &str) {
    let Ok(contents) = fs::read_to_string(path) else {
        return;
    };

    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        let key = key.trim();
        let value = value.trim().trim_matches('"').trim_matches('\'');
        if key.is_empty() || env::var_os(key).is_some() {
            continue;
        }
        env::set_var(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn env_file_does_not_override_existing_vars() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.env");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "# comment").unwrap();
        writeln!(file, "RECALL_TEST_EXISTING=from_file").unwrap();
        writeln!(file, "RECALL_TEST_FRESH=\"quoted value\"").unwrap();

        env::set_var("RECALL_TEST_EXISTING", "from_env");
        load_env_file(path.to_str().unwrap());

        assert_eq!(env::var("RECALL_TEST_EXISTING").unwrap(), "from_env");
        assert_eq!(env::var("RECALL_TEST_FRESH").unwrap(), "quoted value");

        env::remove_var("RECALL_TEST_EXISTING");
        env::remove_var("RECALL_TEST_FRESH");
    }
}
