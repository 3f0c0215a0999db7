#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;

use std::mem;

use anyhow::Result;
use chrono::DateTime;
use tokio::sync::mpsc;
use tokio::sync::watch;
use yansi::Paint;

use crate::domain::models::format_distance;
use crate::domain::models::format_duration;
use crate::domain::models::ComputedRoute;
use crate::domain::models::DraftSnapshot;
use crate::domain::models::Event;
use crate::domain::models::Notice;
use crate::domain::models::NoticeKind;
use crate::domain::models::Poi;
use crate::domain::models::PoiPage;
use crate::domain::models::SavedRoute;
use crate::domain::models::SessionState;
use crate::domain::models::User;

/// Tracks what the user has already been shown so state changes are only
/// rendered when they actually change something.
#[derive(Default)]
pub struct Reconciler {
    session: Option<SessionState>,
    /// The event right before was a notice, which already told the user what
    /// happened to their session.
    after_notice: bool,
}

impl Reconciler {
    /// Returns the line to show for `event`, if any.
    pub fn apply(&mut self, event: &Event) -> Option<String> {
        let after_notice = mem::replace(&mut self.after_notice, false);

        match event {
            Event::Notice(notice) => {
                self.after_notice = true;
                return Some(format_notice(notice));
            }
            Event::SessionChanged(state) => {
                let previous = self.session.replace(*state);
                if previous == Some(SessionState::Authenticated)
                    && *state == SessionState::Anonymous
                    && !after_notice
                {
                    return Some("You are no longer logged in.".to_string());
                }

                return None;
            }
            Event::DraftChanged(draft) => {
                return Some(format_draft(draft));
            }
            Event::Output(text) => {
                return Some(text.to_string());
            }
            Event::Checkpoint(_) => {
                return None;
            }
        }
    }
}

pub fn format_notice(notice: &Notice) -> String {
    let label = match notice.kind {
        NoticeKind::Info => "info",
        NoticeKind::Warning => "warning",
        NoticeKind::RateLimited => "rate limited",
        NoticeKind::Error => "error",
    };

    return format!("{label}: {}", notice.text);
}

fn is_output(event: &Event) -> bool {
    return matches!(event, Event::DraftChanged(_) | Event::Output(_));
}

fn paint(event: &Event, line: String) -> Paint<String> {
    let kind = match event {
        Event::Notice(notice) => notice.kind,
        _ => return Paint::new(line).dimmed(),
    };

    return match kind {
        NoticeKind::Info => Paint::green(line),
        NoticeKind::Warning => Paint::yellow(line),
        NoticeKind::RateLimited => Paint::magenta(line).bold(),
        NoticeKind::Error => Paint::red(line),
    };
}

/// Renders events until every sender is gone. Output goes to stdout, notices
/// to stderr so command output stays pipeable. Each checkpoint is reported on
/// `rendered` once everything sent before it has been written.
pub async fn start(
    mut rx: mpsc::UnboundedReceiver<Event>,
    rendered: watch::Sender<u64>,
) -> Result<()> {
    let mut reconciler = Reconciler::default();

    while let Some(event) = rx.recv().await {
        if let Event::Checkpoint(mark) = &event {
            rendered.send_replace(*mark);
            continue;
        }
        if let Event::Notice(notice) = &event {
            if notice.is_failure() {
                tracing::warn!(kind = %notice.kind, text = %notice.text, "notice");
            }
        }

        if let Some(line) = reconciler.apply(&event) {
            if is_output(&event) {
                println!("{line}");
            } else {
                eprintln!("{}", paint(&event, line));
            }
        }
    }

    return Ok(());
}

/// Lets a caller wait until the renderer has written everything it was sent,
/// so an interactive prompt never lands in the middle of pending output.
pub struct RenderBarrier {
    tx: mpsc::UnboundedSender<Event>,
    rendered: watch::Receiver<u64>,
    mark: u64,
}

impl RenderBarrier {
    pub fn new(tx: mpsc::UnboundedSender<Event>, rendered: watch::Receiver<u64>) -> RenderBarrier {
        return RenderBarrier {
            tx,
            rendered,
            mark: 0,
        };
    }

    pub async fn wait(&mut self) -> Result<()> {
        self.mark += 1;
        let mark = self.mark;

        self.tx.send(Event::Checkpoint(mark))?;
        self.rendered.wait_for(|e| return *e >= mark).await?;

        return Ok(());
    }
}

fn format_date(text: &str) -> String {
    return match DateTime::parse_from_rfc3339(text) {
        Ok(date) => date.format("%Y-%m-%d").to_string(),
        Err(_) => text.to_string(),
    };
}

pub fn format_user(user: &User) -> String {
    let mut lines = vec![
        format!("Username: {}", user.username),
        format!("ID: {}", user.id),
    ];
    if let Some(email) = &user.email {
        lines.push(format!("Email: {email}"));
    }
    if let Some(rate_limit) = user.rate_limit {
        lines.push(format!("Rate limit: {rate_limit} requests/minute"));
    }
    if let Some(created_at) = &user.created_at {
        lines.push(format!("Member since: {}", format_date(created_at)));
    }

    return lines.join("\n");
}

pub fn format_poi(position: usize, poi: &Poi) -> String {
    let category = poi
        .category
        .as_ref()
        .map(|e| return format!(" ({e})"))
        .unwrap_or_default();

    return format!(
        "{position}. {}{category} [{}] {:.5}, {:.5}",
        poi.name, poi.id, poi.location.lat, poi.location.lon
    );
}

pub fn format_poi_page(page: &PoiPage) -> String {
    if page.results.is_empty() {
        return "No points of interest found.".to_string();
    }

    let mut lines = vec![format!(
        "Showing {} of {} results.",
        page.count, page.total
    )];
    for (idx, poi) in page.results.iter().enumerate() {
        lines.push(format_poi(idx + 1, poi));
    }

    return lines.join("\n");
}

pub fn format_poi_details(poi: &Poi) -> String {
    let mut lines = vec![
        poi.name.to_string(),
        format!("ID: {}", poi.id),
        format!(
            "Location: {:.5}, {:.5}",
            poi.location.lat, poi.location.lon
        ),
    ];
    if let Some(category) = &poi.category {
        lines.push(format!("Category: {category}"));
    }
    if let Some(description) = &poi.description {
        lines.push(format!("Description: {description}"));
    }
    if let Some(properties) = poi.properties.as_object() {
        for (key, value) in properties {
            let value = match value.as_str() {
                Some(text) => text.to_string(),
                None => value.to_string(),
            };
            lines.push(format!("{key}: {value}"));
        }
    }

    return lines.join("\n");
}

pub fn format_computed_route(route: &ComputedRoute) -> String {
    return format!(
        "{} route: {}, {}",
        route.vehicle,
        format_distance(route.distance_meters),
        format_duration(route.duration_millis)
    );
}

pub fn format_saved_route(route: &SavedRoute) -> String {
    let mut parts = vec![if route.public { "public" } else { "private" }.to_string()];
    if let Some(vehicle) = route.vehicle {
        parts.push(vehicle.to_string());
    }
    if let Some(distance) = route.distance_meters {
        parts.push(format_distance(distance));
    }
    if let Some(duration) = route.duration_millis {
        parts.push(format_duration(duration));
    }
    parts.push(format!("{} stops", route.poi_sequence.len()));

    return format!("{} [{}] {}", route.name, route.id, parts.join(", "));
}

pub fn format_saved_route_details(route: &SavedRoute) -> String {
    let mut lines = vec![format_saved_route(route)];
    for (idx, stop) in route.poi_sequence.iter().enumerate() {
        let name = stop.name.as_deref().unwrap_or("Unnamed stop");
        match &stop.poi_id {
            Some(id) => lines.push(format!("  {}. {name} [{id}]", idx + 1)),
            None => lines.push(format!("  {}. {name}", idx + 1)),
        }
    }
    if let Some(updated_at) = &route.updated_at {
        lines.push(format!("Last updated: {}", format_date(updated_at)));
    }

    return lines.join("\n");
}

pub fn format_route_stops(route: &ComputedRoute) -> String {
    let mut lines = vec![];
    for (idx, location) in route.locations.iter().enumerate() {
        let line = match (&location.name, &location.poi_id) {
            (Some(name), Some(id)) => format!("  {}. {name} [{id}]", idx + 1),
            _ => format!("  {}. {:.5}, {:.5}", idx + 1, location.lat, location.lon),
        };
        lines.push(line);
    }
    lines.push(format_computed_route(route));

    return lines.join("\n");
}

pub fn format_draft(draft: &DraftSnapshot) -> String {
    if draft.waypoints.is_empty() {
        return format!(
            "No waypoints yet, search and add some. Vehicle: {}",
            draft.vehicle
        );
    }

    let mut lines = vec![format!("Waypoints ({}):", draft.vehicle)];
    for (idx, waypoint) in draft.waypoints.iter().enumerate() {
        lines.push(format!("  {}. {} [{}]", idx + 1, waypoint.name, waypoint.id));
    }
    match &draft.route {
        Some(route) => lines.push(format_computed_route(route)),
        None => lines.push("No route computed yet.".to_string()),
    }

    return lines.join("\n");
}
