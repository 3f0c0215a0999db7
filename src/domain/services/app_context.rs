#[cfg(test)]
#[path = "app_context_test.rs"]
mod tests;

use std::path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use anyhow::Result;
use tokio::sync::mpsc;

use super::gateway::build_http_client;
use super::AuthService;
use super::Gateway;
use super::PoiService;
use super::RouteDraft;
use super::RouteService;
use super::SessionContext;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Event;
use crate::domain::models::Notice;
use crate::domain::models::StorageName;
use crate::domain::models::Vehicle;
use crate::infrastructure::storage::StorageManager;
use crate::infrastructure::storage::StoreBox;

/// Everything a command needs, built once per run and passed down.
pub struct AppContext {
    pub session: Arc<SessionContext>,
    pub gateway: Arc<Gateway>,
    pub auth: AuthService,
    pub pois: PoiService,
    pub routes: RouteService,
    tx: mpsc::UnboundedSender<Event>,
}

impl AppContext {
    pub fn new(
        store: StoreBox,
        base_url: &str,
        timeout: Duration,
        tx: mpsc::UnboundedSender<Event>,
    ) -> Result<AppContext> {
        let session = Arc::new(SessionContext::new(store));
        let http = build_http_client(timeout)?;
        let gateway = Arc::new(Gateway::new(
            base_url,
            http,
            Arc::clone(&session),
            tx.clone(),
        ));

        return Ok(AppContext {
            auth: AuthService::new(Arc::clone(&gateway)),
            pois: PoiService::new(Arc::clone(&gateway)),
            routes: RouteService::new(Arc::clone(&gateway)),
            session,
            gateway,
            tx,
        });
    }

    pub fn from_config(tx: mpsc::UnboundedSender<Event>) -> Result<AppContext> {
        let storage_name = Config::get(ConfigKey::Storage);
        let storage = StorageName::parse(storage_name.to_string())
            .ok_or_else(|| return anyhow!("Unknown storage '{storage_name}'"))?;
        let store = StorageManager::get(
            storage,
            path::PathBuf::from(Config::get(ConfigKey::StorageFile)),
        )?;

        return AppContext::new(
            store,
            &Config::get(ConfigKey::ApiUrl),
            Config::request_timeout()?,
            tx,
        );
    }

    /// Vehicle configured for new drafts, falling back to the default.
    pub fn default_vehicle() -> Vehicle {
        return Vehicle::parse(&Config::get(ConfigKey::Vehicle)).unwrap_or_default();
    }

    pub fn draft(&self, vehicle: Vehicle) -> RouteDraft {
        return RouteDraft::new(vehicle, self.tx.clone());
    }

    pub fn notify(&self, notice: Notice) -> Result<()> {
        return self.gateway.notify(notice);
    }

    pub fn emit(&self, event: Event) -> Result<()> {
        return self.gateway.emit(event);
    }
}
