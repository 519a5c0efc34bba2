use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

const DEFAULT_PORT: u16 = 4600;
const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-2025-04-14";
const DEFAULT_USER_ID: &str = "local";
const DEFAULT_ACTIVITY_LIMIT: i64 = 10;

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

/// `{data_dir}/config.toml` — all fields are optional overrides.
#[derive(Debug, Default, Deserialize)]
struct TomlConfig {
    port: Option<u16>,
    bind_address: Option<String>,
    log: Option<String>,
    log_format: Option<String>,
    user_id: Option<String>,
    analysis_url: Option<String>,
    openai_api_url: Option<String>,
    openai_api_key: Option<String>,
    openai_model: Option<String>,
    activity_limit: Option<i64>,
}

fn load_toml(data_dir: &Path) -> Option<TomlConfig> {
    let path = data_dir.join("config.toml");
    let text = std::fs::read_to_string(&path).ok()?;
    match toml::from_str(&text) {
        Ok(cfg) => Some(cfg),
        Err(e) => {
            warn!("ignoring malformed {}: {e}", path.display());
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Bind address for the REST server (default: 127.0.0.1).
    pub bind_address: String,
    pub data_dir: PathBuf,
    pub log: String,
    /// "pretty" (default) | "json".
    pub log_format: String,
    /// Owner of the session mirror; activities are attributed to it.
    pub user_id: String,
    /// Where the insight client posts `{tasks}`. None = this daemon's own
    /// analysis route.
    pub analysis_url: Option<String>,
    /// Upstream chat-completions endpoint the analysis proxy forwards to.
    pub openai_api_url: String,
    /// `OPENAI_API_KEY` env var or config.toml. None = analysis route
    /// answers 500 until configured.
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    /// How many recent activities the initial load pulls.
    pub activity_limit: i64,
}

impl Config {
    /// Resolution order per field:
    ///   1. CLI flag / env var
    ///   2. TOML file at `{data_dir}/config.toml`
    ///   3. built-in default
    pub fn new(
        port: Option<u16>,
        data_dir: Option<PathBuf>,
        log: Option<String>,
        bind_address: Option<String>,
    ) -> Self {
        let data_dir = data_dir.unwrap_or_else(default_data_dir);
        let toml = load_toml(&data_dir).unwrap_or_default();

        let port = port.or(toml.port).unwrap_or(DEFAULT_PORT);
        let log = log.or(toml.log).unwrap_or_else(|| "info".to_string());

        let bind_address = bind_address
            .or(std::env::var("TASKDECK_BIND").ok().filter(|s| !s.is_empty()))
            .or(toml.bind_address)
            .unwrap_or_else(default_bind_address);

        let log_format = std::env::var("TASKDECK_LOG_FORMAT")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.log_format)
            .unwrap_or_else(|| "pretty".to_string());

        let user_id = std::env::var("TASKDECK_USER")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.user_id)
            .unwrap_or_else(|| DEFAULT_USER_ID.to_string());

        let analysis_url = std::env::var("TASKDECK_ANALYSIS_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.analysis_url);

        let openai_api_url = std::env::var("TASKDECK_OPENAI_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.openai_api_url)
            .unwrap_or_else(|| DEFAULT_OPENAI_API_URL.to_string());

        let openai_api_key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.openai_api_key);

        let openai_model = std::env::var("TASKDECK_OPENAI_MODEL")
            .ok()
            .filter(|s| !s.is_empty())
            .or(toml.openai_model)
            .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

        let activity_limit = toml.activity_limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);

        Self {
            port,
            bind_address,
            data_dir,
            log,
            log_format,
            user_id,
            analysis_url,
            openai_api_url,
            openai_api_key,
            openai_model,
            activity_limit,
        }
    }

    /// The URL the insight client posts to — explicit override or this
    /// daemon's own analysis route.
    pub fn effective_analysis_url(&self) -> String {
        self.analysis_url.clone().unwrap_or_else(|| {
            format!("http://127.0.0.1:{}/api/v1/analysis", self.port)
        })
    }
}

fn default_data_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join("Library")
                .join("Application Support")
                .join("taskdeck");
        }
    }
    #[cfg(target_os = "linux")]
    {
        if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("taskdeck");
        }
        if let Ok(home) = std::env::var("HOME") {
            return PathBuf::from(home)
                .join(".local")
                .join("share")
                .join("taskdeck");
        }
    }
    #[cfg(target_os = "windows")]
    {
        if let Ok(appdata) = std::env::var("APPDATA") {
            return PathBuf::from(appdata).join("taskdeck");
        }
    }
    PathBuf::from(".taskdeck")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_without_toml() {
        let dir = std::env::temp_dir().join("taskdeck-config-test-none");
        let cfg = Config::new(None, Some(dir), None, Some("127.0.0.1".into()));
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.log, "info");
        assert_eq!(cfg.openai_model, DEFAULT_OPENAI_MODEL);
        assert_eq!(
            cfg.effective_analysis_url(),
            format!("http://127.0.0.1:{DEFAULT_PORT}/api/v1/analysis")
        );
    }

    #[test]
    fn explicit_args_win() {
        let dir = std::env::temp_dir().join("taskdeck-config-test-args");
        let cfg = Config::new(Some(9999), Some(dir), Some("debug".into()), None);
        assert_eq!(cfg.port, 9999);
        assert_eq!(cfg.log, "debug");
    }
}
