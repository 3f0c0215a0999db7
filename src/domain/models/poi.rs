use serde_derive::Deserialize;
use serde_derive::Serialize;

#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Poi {
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub description: Option<String>,
    pub location: Coordinates,
    #[serde(default)]
    pub properties: serde_json::Value,
}

/// Filters for `GET /pois`. Proximity search only applies when both `lat` and
/// `lon` are set.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PoiQuery {
    pub q: Option<String>,
    pub category: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub radius: Option<f64>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl PoiQuery {
    pub fn text(q: &str) -> PoiQuery {
        return PoiQuery {
            q: Some(q.to_string()),
            ..PoiQuery::default()
        };
    }

    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![];
        if let Some(q) = &self.q {
            pairs.push(("q".to_string(), q.to_string()));
        }
        if let Some(category) = &self.category {
            pairs.push(("category".to_string(), category.to_string()));
        }
        if let (Some(lat), Some(lon)) = (self.lat, self.lon) {
            pairs.push(("lat".to_string(), lat.to_string()));
            pairs.push(("lon".to_string(), lon.to_string()));
            if let Some(radius) = self.radius {
                pairs.push(("radius".to_string(), radius.to_string()));
            }
        }
        if let Some(limit) = self.limit {
            pairs.push(("limit".to_string(), limit.to_string()));
        }
        if let Some(offset) = self.offset {
            pairs.push(("offset".to_string(), offset.to_string()));
        }

        return pairs;
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoiPage {
    pub count: u32,
    pub total: u32,
    pub results: Vec<Poi>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryList {
    pub count: u32,
    pub categories: Vec<String>,
}
