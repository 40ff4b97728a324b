use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::debug;

const DEFAULT_CONFIG_FILES: &[&str] = &[
    "tubechat.toml",
    "config/tubechat.toml",
    "../tubechat.toml",
    "../config/tubechat.toml",
];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub stores: StoreConfig,
}

/// Connection settings for the chat backend.
///
/// ```
/// use tubechat_config::ApiConfig;
///
/// let api = ApiConfig::default();
/// assert_eq!(api.base_url, "http://localhost:8000/api/v1");
/// assert_eq!(api.request_timeout_seconds, 30);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_base_url")]
    pub base_url: String,
    #[serde(default = "ApiConfig::default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl ApiConfig {
    fn default_base_url() -> String {
        "http://localhost:8000/api/v1".to_string()
    }

    const fn default_request_timeout() -> u64 {
        30
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: Self::default_base_url(),
            request_timeout_seconds: Self::default_request_timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// User whose chats the console lists and creates.
    #[serde(default = "SessionConfig::default_user_id")]
    pub user_id: i64,
}

impl SessionConfig {
    const fn default_user_id() -> i64 {
        1
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            user_id: Self::default_user_id(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Queue mutating store operations so only one is in flight per store.
    #[serde(default = "StoreConfig::default_serialize_operations")]
    pub serialize_operations: bool,
}

impl StoreConfig {
    const fn default_serialize_operations() -> bool {
        true
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            serialize_operations: Self::default_serialize_operations(),
        }
    }
}

/// Load the client configuration by combining defaults, files, and environment overrides.
///
/// ```
/// use tubechat_config::load;
///
/// std::env::remove_var("TUBECHAT_CONFIG");
///
/// let config = load().expect("configuration should load with defaults");
/// assert!(!config.api.base_url.is_empty());
/// ```
pub fn load() -> anyhow::Result<AppConfig> {
    let defaults = AppConfig::default();

    let request_timeout =
        i64::try_from(defaults.api.request_timeout_seconds).unwrap_or(i64::MAX);

    let mut builder = config::Config::builder()
        .set_default("api.base_url", defaults.api.base_url.clone())?
        .set_default("api.request_timeout_seconds", request_timeout)?
        .set_default("session.user_id", defaults.session.user_id)?
        .set_default(
            "stores.serialize_operations",
            defaults.stores.serialize_operations,
        )?;

    let environment_overrides = config::Environment::with_prefix("TUBECHAT").separator("__");

    let mut config_file_attached = false;

    if let Ok(path) = std::env::var("TUBECHAT_CONFIG") {
        builder = builder.add_source(config::File::from(PathBuf::from(&path)));
        config_file_attached = true;
        debug!(path = %path, "loading configuration via TUBECHAT_CONFIG");
    } else if let Ok(cwd) = std::env::current_dir() {
        let fallback = DEFAULT_CONFIG_FILES
            .iter()
            .map(|candidate| cwd.join(candidate))
            .find(|path| path.exists());

        if let Some(path) = fallback {
            debug!(path = %path.display(), "loading configuration file");
            builder = builder.add_source(config::File::from(path));
            config_file_attached = true;
        }
    }

    if !config_file_attached {
        debug!("no configuration file found, relying on defaults and environment overrides");
    }

    builder = builder.add_source(environment_overrides);

    let cfg = builder.build().context("unable to build configuration")?;

    let config = cfg
        .try_deserialize::<AppConfig>()
        .context("invalid configuration")?;

    validate(&config)?;

    debug!(?config, "loaded client configuration");
    Ok(config)
}

fn validate(config: &AppConfig) -> anyhow::Result<()> {
    ensure!(
        !config.api.base_url.trim().is_empty(),
        "invalid configuration: api.base_url must not be empty"
    );
    ensure!(
        config.api.request_timeout_seconds > 0,
        "invalid configuration: api.request_timeout_seconds must be positive"
    );
    Ok(())
}
