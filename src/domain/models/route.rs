#[cfg(test)]
#[path = "route_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

use super::Coordinates;
use super::Poi;

#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    PartialEq,
    Eq,
    EnumIter,
    EnumVariantNames,
    strum::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Vehicle {
    #[default]
    Car,
    Bike,
    Foot,
}

impl Vehicle {
    pub fn parse(text: &str) -> Option<Vehicle> {
        return Vehicle::iter().find(|e| return e.to_string() == text);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<&Poi> for Waypoint {
    fn from(poi: &Poi) -> Waypoint {
        return Waypoint {
            id: poi.id.to_string(),
            name: poi.name.to_string(),
            lat: poi.location.lat,
            lon: poi.location.lon,
        };
    }
}

impl Waypoint {
    pub fn coordinates(&self) -> Coordinates {
        return Coordinates {
            lat: self.lat,
            lon: self.lon,
        };
    }
}

/// GeoJSON LineString. Coordinates are `[lon, lat]` pairs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: Vec<Vec<f64>>,
}

/// A stop in a compute request. The server resolves POI ids itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Location {
    Poi {
        #[serde(rename = "poiId")]
        poi_id: String,
    },
    Point(Coordinates),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComputeRequest {
    pub locations: Vec<Location>,
    pub vehicle: Vehicle,
}

impl ComputeRequest {
    pub fn through(waypoints: &[Waypoint], vehicle: Vehicle) -> ComputeRequest {
        return ComputeRequest {
            locations: waypoints
                .iter()
                .map(|e| return Location::Point(e.coordinates()))
                .collect(),
            vehicle,
        };
    }

    pub fn between_pois(ids: &[String], vehicle: Vehicle) -> ComputeRequest {
        return ComputeRequest {
            locations: ids
                .iter()
                .map(|e| {
                    return Location::Poi {
                        poi_id: e.trim().to_string(),
                    };
                })
                .collect(),
            vehicle,
        };
    }
}

/// A stop as the server resolved it. POI stops carry their id and name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedLocation {
    pub poi_id: Option<String>,
    pub name: Option<String>,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedRoute {
    pub geometry: Option<Geometry>,
    pub distance_meters: f64,
    pub duration_millis: u64,
    pub vehicle: Vehicle,
    pub algorithm: Option<String>,
    pub format: Option<String>,
    #[serde(default)]
    pub locations: Vec<ResolvedLocation>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoiRef {
    pub poi_id: Option<String>,
    pub name: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedRoute {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub public: bool,
    pub vehicle: Option<Vehicle>,
    pub owner_id: Option<String>,
    #[serde(default)]
    pub poi_sequence: Vec<PoiRef>,
    pub geometry: Option<Geometry>,
    pub encoded_polyline: Option<String>,
    pub distance_meters: Option<f64>,
    pub duration_millis: Option<u64>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoutePage {
    pub count: u32,
    pub total: u32,
    pub results: Vec<SavedRoute>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRoute {
    pub name: String,
    pub public: bool,
    pub poi_sequence: Vec<String>,
    pub geometry: Geometry,
    pub distance_meters: f64,
    pub duration_millis: u64,
    pub vehicle: Vehicle,
}

impl NewRoute {
    /// Everything needed to save `route`, or the reason it cannot be saved.
    pub fn from_computed(
        name: &str,
        public: bool,
        poi_sequence: Vec<String>,
        route: &ComputedRoute,
    ) -> Result<NewRoute, String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("A route name is required.".to_string());
        }

        let geometry = match &route.geometry {
            Some(geometry) => geometry.clone(),
            None => {
                return Err("The computed route has no geometry to save, compute it again.".to_string());
            }
        };

        return Ok(NewRoute {
            name: name.to_string(),
            public,
            poi_sequence,
            geometry,
            distance_meters: route.distance_meters,
            duration_millis: route.duration_millis,
            vehicle: route.vehicle,
        });
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle: Option<Vehicle>,
}

impl RoutePatch {
    pub fn is_empty(&self) -> bool {
        return self.name.is_none() && self.public.is_none() && self.vehicle.is_none();
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RouteFilter {
    pub owner_id: Option<String>,
    pub public: Option<bool>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl RouteFilter {
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![];
        if let Some(owner_id) = &self.owner_id {
            pairs.push(("ownerId".to_string(), owner_id.to_string()));
        }
        if let Some(public) = self.public {
            pairs.push(("public".to_string(), public.to_string()));
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

pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        return format!("{meters:.0} m");
    }

    return format!("{:.1} km", meters / 1000.0);
}

pub fn format_duration(millis: u64) -> String {
    let minutes = (millis + 30_000) / 60_000;
    if minutes < 60 {
        return format!("{minutes} min");
    }

    return format!("{} h {} min", minutes / 60, minutes % 60);
}
