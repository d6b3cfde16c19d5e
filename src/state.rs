use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::rate_limit::VoteRateLimiter;
use crate::clients::anilist::AnilistClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{MetadataService, PollService, SeaOrmPollService};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// Reused across HTTP-based services to enable connection pooling.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent("Anipool/1.0")
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<RwLock<Config>>,

    pub store: Store,

    pub anilist: Arc<AnilistClient>,

    pub poll_service: Arc<dyn PollService>,

    pub metadata: Arc<MetadataService>,

    pub rate_limiter: VoteRateLimiter,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let http_client = build_shared_http_client(config.general.anilist_timeout_seconds)?;
        let anilist = Arc::new(AnilistClient::with_shared_client(http_client));

        let poll_service =
            Arc::new(SeaOrmPollService::new(store.clone())) as Arc<dyn PollService>;
        let metadata = Arc::new(MetadataService::new(anilist.clone()));
        let rate_limiter = VoteRateLimiter::new(&config.rate_limit);

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            store,
            anilist,
            poll_service,
            metadata,
            rate_limiter,
        })
    }

    pub async fn config(&self) -> Config {
        self.config.read().await.clone()
    }
}
