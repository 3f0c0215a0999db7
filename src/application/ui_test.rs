use std::time::Duration;

use anyhow::Result;
use serde_json::json;
use test_utils::computed_route_fixture;
use test_utils::poi_fixture;
use test_utils::saved_route_fixture;
use test_utils::user_fixture;
use tokio::sync::mpsc;
use tokio::sync::watch;

use super::format_computed_route;
use super::format_draft;
use super::format_notice;
use super::format_poi_details;
use super::format_poi_page;
use super::format_route_stops;
use super::format_saved_route_details;
use super::format_user;
use super::start;
use super::Reconciler;
use super::RenderBarrier;
use crate::domain::models::ComputedRoute;
use crate::domain::models::Event;
use crate::domain::models::KeyValueStore;
use crate::domain::models::Notice;
use crate::domain::models::Poi;
use crate::domain::models::PoiPage;
use crate::domain::models::RouteFilter;
use crate::domain::models::SessionState;
use crate::domain::models::User;
use crate::domain::models::Vehicle;
use crate::domain::services::AppContext;
use crate::domain::services::RouteDraft;
use crate::infrastructure::storage::memory::MemoryStore;

#[test]
fn it_formats_notices() {
    insta::assert_snapshot!(format_notice(&Notice::info("Logged out.")), @"info: Logged out.");
    insta::assert_snapshot!(
        format_notice(&Notice::rate_limited("", Some(30))),
        @"rate limited: Rate limited. Retry after 30 seconds."
    );
    insta::assert_snapshot!(format_notice(&Notice::error("Route not found")), @"error: Route not found");
}

#[test]
fn it_only_renders_unexplained_session_loss() {
    let mut reconciler = Reconciler::default();

    assert_eq!(
        reconciler.apply(&Event::SessionChanged(SessionState::Anonymous)),
        None
    );
    assert_eq!(
        reconciler.apply(&Event::SessionChanged(SessionState::Authenticated)),
        None
    );
    assert_eq!(
        reconciler.apply(&Event::SessionChanged(SessionState::Anonymous)),
        Some("You are no longer logged in.".to_string())
    );

    reconciler.apply(&Event::SessionChanged(SessionState::Authenticated));
    assert_eq!(
        reconciler.apply(&Event::Notice(Notice::warning("Careful"))),
        Some("warning: Careful".to_string())
    );
    assert_eq!(
        reconciler.apply(&Event::SessionChanged(SessionState::Anonymous)),
        None
    );
}

#[test]
fn it_renders_output_and_drafts() {
    let mut reconciler = Reconciler::default();
    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let draft = RouteDraft::new(Vehicle::Foot, tx);

    assert_eq!(
        reconciler.apply(&Event::Output("Plan a route.".to_string())),
        Some("Plan a route.".to_string())
    );
    assert_eq!(
        reconciler.apply(&Event::DraftChanged(draft.snapshot())),
        Some("No waypoints yet, search and add some. Vehicle: foot".to_string())
    );
    assert_eq!(reconciler.apply(&Event::Checkpoint(1)), None);
}

#[tokio::test]
async fn it_reports_an_expired_session_once() -> Result<()> {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/v1/routes")
        .match_query(mockito::Matcher::Any)
        .with_status(401)
        .create_async()
        .await;
    server
        .mock("POST", "/api/v1/auth/refresh")
        .with_status(401)
        .create_async()
        .await;

    let store = Box::<MemoryStore>::default();
    store.set("accessToken", "stale")?;
    store.set("refreshToken", "refresh-1")?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    let ctx = AppContext::new(
        store,
        &format!("{}/api/v1", server.url()),
        Duration::from_millis(2000),
        tx,
    )?;
    ctx.session.hydrate().await?;
    ctx.session.set_user(serde_json::from_value(user_fixture())?).await;

    let mut reconciler = Reconciler::default();
    reconciler.apply(&Event::SessionChanged(SessionState::Authenticated));

    assert_eq!(ctx.routes.list(&RouteFilter::default()).await?, None);

    let mut lines = vec![];
    while let Ok(event) = rx.try_recv() {
        if let Some(line) = reconciler.apply(&event) {
            lines.push(line);
        }
    }
    assert_eq!(
        lines,
        vec!["error: Your session has expired. Please log in again.".to_string()]
    );
    return Ok(());
}

#[tokio::test]
async fn it_acknowledges_checkpoints_after_earlier_events() -> Result<()> {
    let (tx, rx) = mpsc::unbounded_channel::<Event>();
    let (rendered_tx, rendered_rx) = watch::channel(0);
    let renderer = tokio::spawn(start(rx, rendered_tx));

    let mut barrier = RenderBarrier::new(tx.clone(), rendered_rx.clone());
    tx.send(Event::Notice(Notice::info("first")))?;
    barrier.wait().await?;
    assert_eq!(*rendered_rx.borrow(), 1);

    barrier.wait().await?;
    assert_eq!(*rendered_rx.borrow(), 2);

    drop(barrier);
    drop(tx);
    renderer.await??;
    return Ok(());
}

#[test]
fn it_formats_users() -> Result<()> {
    let user: User = serde_json::from_value(user_fixture())?;
    insta::assert_snapshot!(format_user(&user), @r###"
    Username: johndoe
    ID: 7d4f4a1e-55b1-4b8e-9a51-0f0c2b6f5e11
    Email: john@example.com
    Rate limit: 60 requests/minute
    Member since: 2024-05-01
    "###);
    return Ok(());
}

#[test]
fn it_formats_poi_pages() -> Result<()> {
    let page: PoiPage = serde_json::from_value(json!({
        "count": 2,
        "total": 14,
        "results": [
            poi_fixture("poi-1", "Glyfada Beach", 39.6243, 19.9217),
            poi_fixture("poi-2", "Paleokastritsa", 39.7915, 19.7003)
        ]
    }))?;
    insta::assert_snapshot!(format_poi_page(&page), @r###"
    Showing 2 of 14 results.
    1. Glyfada Beach (beach) [poi-1] 39.62430, 19.92170
    2. Paleokastritsa (beach) [poi-2] 39.79150, 19.70030
    "###);

    let empty: PoiPage = serde_json::from_value(json!({ "count": 0, "total": 0, "results": [] }))?;
    insta::assert_snapshot!(format_poi_page(&empty), @"No points of interest found.");
    return Ok(());
}

#[test]
fn it_formats_poi_details() -> Result<()> {
    let mut value = poi_fixture("poi-1", "Glyfada Beach", 39.6243, 19.9217);
    value["description"] = json!("Sandy beach on the west coast.");
    value["properties"] = json!({ "lifeguard": "yes" });
    let poi: Poi = serde_json::from_value(value)?;

    insta::assert_snapshot!(format_poi_details(&poi), @r###"
    Glyfada Beach
    ID: poi-1
    Location: 39.62430, 19.92170
    Category: beach
    Description: Sandy beach on the west coast.
    lifeguard: yes
    "###);
    return Ok(());
}

#[test]
fn it_formats_routes() -> Result<()> {
    let route = serde_json::from_value(saved_route_fixture("r1", "Corfu coast"))?;
    insta::assert_snapshot!(format_saved_route_details(&route), @r###"
    Corfu coast [r1] private, car, 31.4 km, 31 min, 2 stops
      1. Glyfada Beach [poi-1]
      2. Paleokastritsa [poi-2]
    Last updated: 2024-05-02
    "###);

    let computed = serde_json::from_value(computed_route_fixture())?;
    insta::assert_snapshot!(format_computed_route(&computed), @"car route: 31.4 km, 31 min");
    return Ok(());
}

#[test]
fn it_formats_drafts() -> Result<()> {
    let (tx, _rx) = mpsc::unbounded_channel::<Event>();
    let mut draft = RouteDraft::new(Vehicle::Bike, tx);
    insta::assert_snapshot!(format_draft(&draft.snapshot()), @"No waypoints yet, search and add some. Vehicle: bike");

    let poi: Poi = serde_json::from_value(poi_fixture("poi-1", "Glyfada Beach", 39.6243, 19.9217))?;
    draft.add_waypoint(&poi)?;
    insta::assert_snapshot!(format_draft(&draft.snapshot()), @r###"
    Waypoints (bike):
      1. Glyfada Beach [poi-1]
    No route computed yet.
    "###);
    return Ok(());
}

#[test]
fn it_formats_route_stops() -> Result<()> {
    let route: ComputedRoute = serde_json::from_value(computed_route_fixture())?;

    insta::assert_snapshot!(format_route_stops(&route), @r###"
      1. Glyfada Beach [poi-1]
      2. 39.79150, 19.70030
    car route: 31.4 km, 31 min
    "###);
    return Ok(());
}
