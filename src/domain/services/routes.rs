#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;

use super::encode_path;
use super::Gateway;
use super::PendingRequest;
use crate::domain::models::ComputeRequest;
use crate::domain::models::ComputedRoute;
use crate::domain::models::NewRoute;
use crate::domain::models::Notice;
use crate::domain::models::RouteFilter;
use crate::domain::models::RoutePage;
use crate::domain::models::RoutePatch;
use crate::domain::models::SavedRoute;

pub struct RouteService {
    gateway: Arc<Gateway>,
}

impl RouteService {
    pub fn new(gateway: Arc<Gateway>) -> RouteService {
        return RouteService { gateway };
    }

    pub async fn compute(&self, body: &ComputeRequest) -> Result<Option<ComputedRoute>> {
        let req = PendingRequest::post("/routes/compute").with_json(body)?;
        return self.gateway.perform_json::<ComputedRoute>(&req).await;
    }

    pub async fn list(&self, filter: &RouteFilter) -> Result<Option<RoutePage>> {
        let req = PendingRequest::get("/routes").with_query(filter.to_pairs());
        return self.gateway.perform_json::<RoutePage>(&req).await;
    }

    pub async fn create(&self, body: &NewRoute) -> Result<Option<SavedRoute>> {
        let req = PendingRequest::post("/routes").with_json(body)?;
        return self.gateway.perform_json::<SavedRoute>(&req).await;
    }

    pub async fn get(&self, id: &str) -> Result<Option<SavedRoute>> {
        let req = PendingRequest::get(&encode_path(&["routes", id.trim()])?);
        return self.gateway.perform_json::<SavedRoute>(&req).await;
    }

    pub async fn update(&self, id: &str, patch: &RoutePatch) -> Result<Option<SavedRoute>> {
        if patch.is_empty() {
            self.gateway
                .notify(Notice::warning("Nothing to update, pass a name, visibility or vehicle."))?;
            return Ok(None);
        }

        let req = PendingRequest::patch(&encode_path(&["routes", id.trim()])?).with_json(patch)?;
        return self.gateway.perform_json::<SavedRoute>(&req).await;
    }

    /// Returns `true` once the server confirmed the deletion.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let req = PendingRequest::delete(&encode_path(&["routes", id.trim()])?);
        let res = self.gateway.perform(&req).await?;

        return Ok(res.is_some());
    }
}
