#[cfg(test)]
#[path = "route_draft_test.rs"]
mod tests;

use anyhow::Result;
use tokio::sync::mpsc;

use super::RouteService;
use super::SessionContext;
use crate::domain::models::ComputeRequest;
use crate::domain::models::ComputedRoute;
use crate::domain::models::DraftSnapshot;
use crate::domain::models::Event;
use crate::domain::models::NewRoute;
use crate::domain::models::Notice;
use crate::domain::models::Poi;
use crate::domain::models::SavedRoute;
use crate::domain::models::Vehicle;
use crate::domain::models::Waypoint;

/// Client side route being assembled waypoint by waypoint. Lives only as long
/// as the planner that owns it.
pub struct RouteDraft {
    waypoints: Vec<Waypoint>,
    route: Option<ComputedRoute>,
    vehicle: Vehicle,
    tx: mpsc::UnboundedSender<Event>,
}

impl RouteDraft {
    pub fn new(vehicle: Vehicle, tx: mpsc::UnboundedSender<Event>) -> RouteDraft {
        return RouteDraft {
            waypoints: vec![],
            route: None,
            vehicle,
            tx,
        };
    }

    pub fn waypoints(&self) -> &[Waypoint] {
        return &self.waypoints;
    }

    pub fn route(&self) -> Option<&ComputedRoute> {
        return self.route.as_ref();
    }

    pub fn vehicle(&self) -> Vehicle {
        return self.vehicle;
    }

    pub fn snapshot(&self) -> DraftSnapshot {
        return DraftSnapshot {
            waypoints: self.waypoints.clone(),
            vehicle: self.vehicle,
            route: self.route.clone(),
        };
    }

    fn notify(&self, notice: Notice) -> Result<()> {
        self.tx.send(Event::Notice(notice))?;
        return Ok(());
    }

    /// Any edit makes a cached computation stale.
    fn changed(&mut self) -> Result<()> {
        if self.route.take().is_some() {
            tracing::debug!("discarded computed route");
        }
        self.tx.send(Event::DraftChanged(self.snapshot()))?;

        return Ok(());
    }

    pub fn add_waypoint(&mut self, poi: &Poi) -> Result<bool> {
        if self.waypoints.iter().any(|e| return e.id == poi.id) {
            self.notify(Notice::warning(&format!(
                "{} is already part of the route.",
                poi.name
            )))?;
            return Ok(false);
        }

        self.waypoints.push(Waypoint::from(poi));
        self.changed()?;

        return Ok(true);
    }

    pub fn remove_waypoint(&mut self, index: usize) -> Result<Option<Waypoint>> {
        if index >= self.waypoints.len() {
            self.notify(Notice::warning(&format!(
                "There is no waypoint #{}.",
                index + 1
            )))?;
            return Ok(None);
        }

        let waypoint = self.waypoints.remove(index);
        self.changed()?;

        return Ok(Some(waypoint));
    }

    pub fn set_vehicle(&mut self, vehicle: Vehicle) -> Result<()> {
        if self.vehicle == vehicle {
            return Ok(());
        }

        self.vehicle = vehicle;
        self.changed()?;

        return Ok(());
    }

    pub fn clear(&mut self) -> Result<()> {
        self.waypoints.clear();
        self.changed()?;

        return Ok(());
    }

    pub async fn compute_route(&mut self, routes: &RouteService) -> Result<bool> {
        if self.waypoints.len() < 2 {
            self.notify(Notice::warning(
                "Add at least two waypoints to compute a route.",
            ))?;
            return Ok(false);
        }

        let body = ComputeRequest::through(&self.waypoints, self.vehicle);
        let route = match routes.compute(&body).await? {
            Some(route) => route,
            None => return Ok(false),
        };

        tracing::debug!(
            distance_meters = route.distance_meters,
            duration_millis = route.duration_millis,
            "route computed"
        );
        self.route = Some(route);
        self.tx.send(Event::DraftChanged(self.snapshot()))?;

        return Ok(true);
    }

    pub async fn save_route(
        &mut self,
        name: &str,
        public: bool,
        session: &SessionContext,
        routes: &RouteService,
    ) -> Result<Option<SavedRoute>> {
        if session.user().await.is_none() {
            self.notify(Notice::warning("Log in to save routes."))?;
            return Ok(None);
        }

        let route = match &self.route {
            Some(route) => route,
            None => {
                self.notify(Notice::warning("Compute a route before saving it."))?;
                return Ok(None);
            }
        };

        let poi_sequence = self.waypoints.iter().map(|e| return e.id.to_string()).collect();
        let body = match NewRoute::from_computed(name, public, poi_sequence, route) {
            Ok(body) => body,
            Err(problem) => {
                self.notify(Notice::warning(&problem))?;
                return Ok(None);
            }
        };

        let saved = match routes.create(&body).await? {
            Some(saved) => saved,
            None => return Ok(None),
        };

        self.notify(Notice::info(&format!("Saved route \"{}\".", saved.name)))?;
        self.clear()?;

        return Ok(Some(saved));
    }
}
