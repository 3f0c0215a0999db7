use super::ComputedRoute;
use super::Notice;
use super::SessionState;
use super::Vehicle;
use super::Waypoint;

/// The part of a route draft that gets rendered.
#[derive(Clone, Debug, PartialEq)]
pub struct DraftSnapshot {
    pub waypoints: Vec<Waypoint>,
    pub vehicle: Vehicle,
    pub route: Option<ComputedRoute>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Notice(Notice),
    SessionChanged(SessionState),
    DraftChanged(DraftSnapshot),
    /// Command output, printed on stdout in order with everything else.
    Output(String),
    /// Marks a point the renderer reports back once everything before it is
    /// on screen.
    Checkpoint(u64),
}
