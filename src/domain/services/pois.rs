#[cfg(test)]
#[path = "pois_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;

use super::encode_path;
use super::Gateway;
use super::PendingRequest;
use crate::domain::models::CategoryList;
use crate::domain::models::Poi;
use crate::domain::models::PoiPage;
use crate::domain::models::PoiQuery;

pub struct PoiService {
    gateway: Arc<Gateway>,
}

impl PoiService {
    pub fn new(gateway: Arc<Gateway>) -> PoiService {
        return PoiService { gateway };
    }

    pub async fn search(&self, query: &PoiQuery) -> Result<Option<PoiPage>> {
        let req = PendingRequest::get("/pois").with_query(query.to_pairs());
        return self.gateway.perform_json::<PoiPage>(&req).await;
    }

    pub async fn get(&self, id: &str) -> Result<Option<Poi>> {
        let req = PendingRequest::get(&encode_path(&["pois", id.trim()])?);
        return self.gateway.perform_json::<Poi>(&req).await;
    }

    pub async fn categories(&self) -> Result<Option<CategoryList>> {
        let req = PendingRequest::get("/pois/categories");
        return self.gateway.perform_json::<CategoryList>(&req).await;
    }
}
