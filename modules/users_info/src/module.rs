use std::sync::Arc;

use anyhow::Context;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use tracing::{debug, info};

use crate::api::rest::routes;
use crate::config::UsersInfoConfig;
use crate::contract::client::UsersInfoApi;
use crate::domain::ports::{Clock, SystemClock};
use crate::domain::service::{Service, ServiceConfig};
use crate::gateways::local::UsersInfoLocalClient;
use crate::gateways::observed::{ObservedUsersClient, OperationObserver, TracingObserver};
use crate::infra::storage::migrations::Migrator;
use crate::infra::storage::sea_orm_repo::SeaOrmUsersRepository;

/// Wired users_info module: storage adapter, domain service and the observed client
/// that both the REST layer and in-process consumers talk to.
#[derive(Clone)]
pub struct UsersInfo {
    client: Arc<dyn UsersInfoApi>,
}

impl UsersInfo {
    /// Apply migrations and wire the module with the tracing observer.
    pub async fn init(db: DatabaseConnection, cfg: &UsersInfoConfig) -> anyhow::Result<Self> {
        info!("Initializing users_info module");
        debug!(
            "Loaded users_info config: default_page_size={}, max_page_size={}",
            cfg.default_page_size, cfg.max_page_size
        );

        Self::migrate(&db).await?;
        Ok(Self::wire(db, cfg, Arc::new(TracingObserver)))
    }

    pub async fn migrate(db: &DatabaseConnection) -> anyhow::Result<()> {
        info!("Running users_info database migrations");
        Migrator::up(db, None)
            .await
            .context("users_info migrations failed")?;
        info!("Users database migrations completed successfully");
        Ok(())
    }

    /// Wire repository (infra) to domain service (port) and wrap the local client
    /// with `observer`. Expects the schema to exist already.
    pub fn wire(
        db: DatabaseConnection,
        cfg: &UsersInfoConfig,
        observer: Arc<dyn OperationObserver>,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let repo = SeaOrmUsersRepository::with_clock(db, clock.clone());
        let service = Service::with_clock(Arc::new(repo), clock, ServiceConfig::from(cfg));

        let local: Arc<dyn UsersInfoApi> = Arc::new(UsersInfoLocalClient::new(Arc::new(service)));
        let client: Arc<dyn UsersInfoApi> = Arc::new(ObservedUsersClient::new(local, observer));
        Self { client }
    }

    pub fn client(&self) -> Arc<dyn UsersInfoApi> {
        self.client.clone()
    }

    pub fn register_rest(&self, router: axum::Router) -> axum::Router {
        info!("Registering users_info REST routes");
        routes::register_routes(router, self.client.clone())
    }
}
