#[cfg(test)]
#[path = "planner_test.rs"]
mod tests;

use anyhow::Result;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use strum::VariantNames;

use super::ui;
use crate::domain::models::plan_help_text;
use crate::domain::models::Event;
use crate::domain::models::Notice;
use crate::domain::models::PlanCommand;
use crate::domain::models::Poi;
use crate::domain::models::PoiQuery;
use crate::domain::models::Vehicle;
use crate::domain::services::AppContext;
use crate::domain::services::RouteDraft;

const SEARCH_LIMIT: u32 = 10;

pub struct Planner {
    pub draft: RouteDraft,
    /// Results of the last search, addressable by their 1-based position.
    pub results: Vec<Poi>,
}

impl Planner {
    pub fn new(ctx: &AppContext) -> Planner {
        return Planner {
            draft: ctx.draft(AppContext::default_vehicle()),
            results: vec![],
        };
    }
}

pub async fn search(ctx: &AppContext, planner: &mut Planner, text: &str) -> Result<()> {
    let query = PoiQuery {
        limit: Some(SEARCH_LIMIT),
        ..PoiQuery::text(text)
    };

    if let Some(page) = ctx.pois.search(&query).await? {
        ctx.emit(Event::Output(ui::format_poi_page(&page)))?;
        planner.results = page.results;
    }

    return Ok(());
}

/// Adds the search result at `index`.
pub fn add_result(ctx: &AppContext, planner: &mut Planner, index: usize) -> Result<()> {
    let poi = match planner.results.get(index) {
        Some(poi) => poi.clone(),
        None => {
            ctx.notify(Notice::warning(&format!(
                "There is no search result #{}.",
                index + 1
            )))?;
            return Ok(());
        }
    };

    planner.draft.add_waypoint(&poi)?;

    return Ok(());
}

pub async fn add_poi(ctx: &AppContext, planner: &mut Planner, id: &str) -> Result<()> {
    let poi = match ctx.pois.get(id).await? {
        Some(poi) => poi,
        None => return Ok(()),
    };

    planner.draft.add_waypoint(&poi)?;

    return Ok(());
}

pub fn remove(planner: &mut Planner, index: usize) -> Result<()> {
    planner.draft.remove_waypoint(index)?;

    return Ok(());
}

pub fn set_vehicle(ctx: &AppContext, planner: &mut Planner, text: &str) -> Result<()> {
    let vehicle = match Vehicle::parse(&text.to_lowercase()) {
        Some(vehicle) => vehicle,
        None => {
            ctx.notify(Notice::warning(&format!(
                "Unknown vehicle '{text}', use one of {}.",
                Vehicle::VARIANTS.join(", ")
            )))?;
            return Ok(());
        }
    };

    planner.draft.set_vehicle(vehicle)?;

    return Ok(());
}

pub async fn compute(ctx: &AppContext, planner: &mut Planner) -> Result<()> {
    planner.draft.compute_route(&ctx.routes).await?;

    return Ok(());
}

pub async fn save(ctx: &AppContext, planner: &mut Planner, name: &str, public: bool) -> Result<()> {
    if let Some(route) = planner
        .draft
        .save_route(name, public, &ctx.session, &ctx.routes)
        .await?
    {
        ctx.emit(Event::Output(ui::format_saved_route(&route)))?;
    }

    return Ok(());
}

/// Runs one planner command. Returns `false` once the user asked to leave.
pub async fn execute(ctx: &AppContext, planner: &mut Planner, cmd: &PlanCommand) -> Result<bool> {
    if cmd.is_quit() {
        return Ok(false);
    }

    if cmd.is_help() {
        ctx.emit(Event::Output(plan_help_text()))?;
    } else if cmd.is_search() {
        search(ctx, planner, &cmd.text()).await?;
    } else if cmd.is_add() {
        match cmd.position() {
            Some(index) => add_result(ctx, planner, index)?,
            None => add_poi(ctx, planner, &cmd.args[0]).await?,
        }
    } else if cmd.is_remove() {
        match cmd.position() {
            Some(index) => remove(planner, index)?,
            None => ctx.notify(Notice::warning("Pass the number of the waypoint to remove."))?,
        }
    } else if cmd.is_list() {
        ctx.emit(Event::Output(ui::format_draft(&planner.draft.snapshot())))?;
    } else if cmd.is_vehicle() {
        set_vehicle(ctx, planner, &cmd.args[0])?;
    } else if cmd.is_compute() {
        compute(ctx, planner).await?;
    } else if cmd.is_save() {
        save(ctx, planner, &cmd.text(), cmd.has_flag("--public")).await?;
    } else if cmd.is_clear() {
        planner.draft.clear()?;
    }

    return Ok(true);
}

pub async fn start(ctx: &AppContext, barrier: &mut ui::RenderBarrier) -> Result<()> {
    let mut planner = Planner::new(ctx);
    let theme = ColorfulTheme::default();

    ctx.emit(Event::Output(
        "Plan a route. Type help for the list of commands, quit to leave.".to_string(),
    ))?;

    loop {
        barrier.wait().await?;
        let line = Input::<String>::with_theme(&theme)
            .with_prompt(format!(
                "plan ({}, {} stops)",
                planner.draft.vehicle(),
                planner.draft.waypoints().len()
            ))
            .allow_empty(true)
            .interact_text()?;

        if line.trim().is_empty() {
            continue;
        }

        let cmd = match PlanCommand::parse(&line) {
            Some(cmd) => cmd,
            None => {
                ctx.notify(Notice::warning(
                    "Unknown command, type help for the list of commands.",
                ))?;
                continue;
            }
        };

        if !execute(ctx, &mut planner, &cmd).await? {
            break;
        }
    }

    return Ok(());
}
