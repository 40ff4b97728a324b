use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;
use tubechat_config::AppConfig;
use tubechat_stores::{ChatStore, ConcurrencyPolicy, ContentStore};
use tubechat_transport::HttpApiClient;

pub mod telemetry {
    use anyhow::Result;
    use tracing::Level;
    use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

    pub fn init_tracing() -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        let subscriber = SubscriberBuilder::default()
            .with_max_level(Level::DEBUG)
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .finish();

        tracing::subscriber::set_global_default(subscriber)
            .map_err(|error| anyhow::anyhow!("failed to set tracing subscriber: {error}"))
    }
}

pub type ContentStoreHandle = Arc<ContentStore<HttpApiClient>>;
pub type ChatStoreHandle = Arc<ChatStore<HttpApiClient>>;

/// Stores wired to the configured backend, built once at startup.
#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub content: ContentStoreHandle,
    pub chat: ChatStoreHandle,
}

impl AppContext {
    pub fn initialise(config: &AppConfig) -> Result<Self> {
        let client = HttpApiClient::new(&config.api).context("failed to build api client")?;
        let policy = ConcurrencyPolicy::from_serialize_flag(config.stores.serialize_operations);

        let content = Arc::new(ContentStore::with_policy(client.clone(), policy));
        let chat = Arc::new(ChatStore::with_policy(client, policy));

        info!(
            base_url = %config.api.base_url,
            user_id = config.session.user_id,
            ?policy,
            "app context ready"
        );

        Ok(Self {
            config: config.clone(),
            content,
            chat,
        })
    }

    pub fn user_id(&self) -> i64 {
        self.config.session.user_id
    }

    /// Release the stores. Requests still in flight elsewhere keep their own handles.
    pub fn shutdown(self) {
        let contents = self.content.contents().len();
        let chats = self.chat.chats().len();
        info!(contents, chats, "app context shut down");
    }
}

pub async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(?error, "failed to listen for shutdown signal");
    }
    info!("shutdown signal received");
}
