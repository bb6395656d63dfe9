use std::{sync::Arc, time::Duration};

use anyhow::Context;
use mongodb::{bson::doc, Client};
use tracing::info;

use crate::accounts::jwt::JwtKeys;
use crate::accounts::repo::MongoUserStore;
use crate::accounts::service::AccountService;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub accounts: AccountService,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let client = Client::with_uri_str(&config.mongodb_uri)
            .await
            .context("connect to mongodb")?;
        let db = client.database(&config.mongodb_db);
        // Fail at startup, not on the first request.
        db.run_command(doc! { "ping": 1 })
            .await
            .context("ping mongodb")?;
        let store = MongoUserStore::init(&db)
            .await
            .context("prepare users collection")?;
        info!(db = %config.mongodb_db, "connected to mongodb");

        let accounts = AccountService::new(
            Arc::new(store),
            JwtKeys::new(&config.jwt),
            Duration::from_secs(config.store_timeout_secs),
        );

        Ok(Self::from_parts(accounts, config))
    }

    pub fn from_parts(accounts: AccountService, config: Arc<AppConfig>) -> Self {
        Self { accounts, config }
    }
}
