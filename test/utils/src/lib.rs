use serde_json::json;
use serde_json::Value;

pub fn user_fixture() -> Value {
    return json!({
        "id": "7d4f4a1e-55b1-4b8e-9a51-0f0c2b6f5e11",
        "username": "johndoe",
        "email": "john@example.com",
        "rateLimit": 60,
        "createdAt": "2024-05-01T09:30:00+00:00"
    });
}

pub fn auth_fixture(access_token: &str, refresh_token: &str) -> Value {
    return json!({
        "message": "Login successful",
        "user": user_fixture(),
        "access_token": access_token,
        "refresh_token": refresh_token
    });
}

pub fn poi_fixture(id: &str, name: &str, lat: f64, lon: f64) -> Value {
    return json!({
        "id": id,
        "name": name,
        "category": "beach",
        "description": null,
        "location": {
            "lat": lat,
            "lon": lon
        },
        "properties": {}
    });
}

pub fn computed_route_fixture() -> Value {
    return json!({
        "vehicle": "car",
        "algorithm": "shortest",
        "format": "geojson",
        "locations": [
            { "poiId": "poi-1", "name": "Glyfada Beach", "lat": 39.6243, "lon": 19.9217 },
            { "lat": 39.7915, "lon": 19.7003 }
        ],
        "geometry": {
            "type": "LineString",
            "coordinates": [[19.9217, 39.6243], [19.8104, 39.7012], [19.7003, 39.7915]]
        },
        "distanceMeters": 31415.9,
        "durationMillis": 1860000
    });
}

pub fn saved_route_fixture(id: &str, name: &str) -> Value {
    return json!({
        "id": id,
        "name": name,
        "public": false,
        "vehicle": "car",
        "ownerId": "7d4f4a1e-55b1-4b8e-9a51-0f0c2b6f5e11",
        "poiSequence": [
            { "poiId": "poi-1", "name": "Glyfada Beach" },
            { "poiId": "poi-2", "name": "Paleokastritsa" }
        ],
        "geometry": {
            "type": "LineString",
            "coordinates": [[19.9217, 39.6243], [19.7003, 39.7915]]
        },
        "encodedPolyline": null,
        "distanceMeters": 31415.9,
        "durationMillis": 1860000,
        "createdAt": "2024-05-02T10:00:00+00:00",
        "updatedAt": "2024-05-02T10:00:00+00:00"
    });
}
