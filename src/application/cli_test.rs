use std::time::Duration;

use anyhow::Result;
use mockito::Matcher;
use serde_json::json;
use test_utils::computed_route_fixture;
use tokio::sync::mpsc;

use super::build;
use super::compute_route;
use super::poi_query;
use super::route_patch;
use crate::domain::models::Event;
use crate::domain::models::Notice;
use crate::domain::models::PoiQuery;
use crate::domain::models::RoutePatch;
use crate::domain::models::Vehicle;
use crate::domain::services::AppContext;
use crate::infrastructure::storage::memory::MemoryStore;

#[test]
fn it_builds_a_valid_command() {
    build().debug_assert();
}

#[test]
fn it_collects_search_arguments() -> Result<()> {
    let matches = build().try_get_matches_from(vec![
        "waymark", "pois", "search", "old", "fort", "--lat", "39.62", "--lon", "19.92",
        "--radius", "500", "--limit", "5",
    ])?;
    let search_matches = matches
        .subcommand_matches("pois")
        .and_then(|e| return e.subcommand_matches("search"))
        .unwrap();

    assert_eq!(
        poi_query(search_matches),
        PoiQuery {
            q: Some("old fort".to_string()),
            category: None,
            lat: Some(39.62),
            lon: Some(19.92),
            radius: Some(500.0),
            limit: Some(5),
            offset: None,
        }
    );
    return Ok(());
}

#[test]
fn it_accepts_southern_coordinates() -> Result<()> {
    let matches = build().try_get_matches_from(vec![
        "waymark", "pois", "search", "--category", "beach", "--lat", "-33.86", "--lon", "151.21",
    ])?;
    let search_matches = matches
        .subcommand_matches("pois")
        .and_then(|e| return e.subcommand_matches("search"))
        .unwrap();

    let query = poi_query(search_matches);
    assert_eq!(query.q, None);
    assert_eq!(query.category, Some("beach".to_string()));
    assert_eq!(query.lat, Some(-33.86));
    return Ok(());
}

#[test]
fn it_requires_both_coordinates() {
    let res = build().try_get_matches_from(vec!["waymark", "pois", "search", "--lat", "39.62"]);
    assert!(res.is_err());
}

#[test]
fn it_collects_route_patches() -> Result<()> {
    let matches = build().try_get_matches_from(vec![
        "waymark", "routes", "update", "r1", "--name", " Coast ", "--private", "--mode", "foot",
    ])?;
    let update_matches = matches
        .subcommand_matches("routes")
        .and_then(|e| return e.subcommand_matches("update"))
        .unwrap();

    assert_eq!(
        route_patch(update_matches),
        RoutePatch {
            name: Some("Coast".to_string()),
            public: Some(false),
            vehicle: Some(Vehicle::Foot),
        }
    );
    return Ok(());
}

#[test]
fn it_rejects_conflicting_visibility() {
    let res = build().try_get_matches_from(vec![
        "waymark", "routes", "update", "r1", "--public", "--private",
    ]);
    assert!(res.is_err());
}

#[test]
fn it_needs_two_pois_to_compute() {
    let res = build().try_get_matches_from(vec!["waymark", "routes", "compute", "poi-1"]);
    assert!(res.is_err());
}

#[test]
fn it_rejects_unknown_vehicles() {
    let res = build().try_get_matches_from(vec!["waymark", "plan", "--vehicle", "boat"]);
    assert!(res.is_err());
}

#[tokio::test]
async fn it_computes_routes_from_poi_ids_in_one_request() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    let lookups = server
        .mock("GET", Matcher::Regex("^/api/v1/pois".to_string()))
        .expect(0)
        .create_async()
        .await;
    let compute = server
        .mock("POST", "/api/v1/routes/compute")
        .match_body(Matcher::PartialJson(json!({
            "locations": [{ "poiId": "poi-1" }, { "poiId": "poi-2" }]
        })))
        .with_status(200)
        .with_body(computed_route_fixture().to_string())
        .expect(1)
        .create_async()
        .await;

    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let ctx = AppContext::new(
        Box::<MemoryStore>::default(),
        &format!("{}/api/v1", server.url()),
        Duration::from_millis(2000),
        tx,
    )?;
    let matches = build().try_get_matches_from(vec![
        "waymark", "routes", "compute", "poi-1", "poi-2", "--save", "Corfu coast",
    ])?;
    let compute_matches = matches
        .subcommand_matches("routes")
        .and_then(|e| return e.subcommand_matches("compute"))
        .unwrap();

    compute_route(&ctx, compute_matches).await?;

    lookups.assert_async().await;
    compute.assert_async().await;
    assert_eq!(
        rx.try_recv()?,
        Event::Notice(Notice::warning("Log in to save routes."))
    );
    return Ok(());
}
