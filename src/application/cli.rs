#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgGroup;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use dialoguer::Input;
use dialoguer::Password;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::sync::watch;
use yansi::Paint;

use super::planner;
use super::ui;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::plan_help_text;
use crate::domain::models::ComputeRequest;
use crate::domain::models::Event;
use crate::domain::models::NewRoute;
use crate::domain::models::Notice;
use crate::domain::models::PoiQuery;
use crate::domain::models::RouteFilter;
use crate::domain::models::RoutePatch;
use crate::domain::models::StorageName;
use crate::domain::models::Vehicle;
use crate::domain::services::AppContext;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn version_text() -> String {
    return format!(
        "Version: {}\nCommit: {}",
        env!("CARGO_PKG_VERSION"),
        option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown")
    );
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn arg_username() -> Arg {
    return Arg::new("username")
        .short('u')
        .long("username")
        .env("WAYMARK_USERNAME")
        .num_args(1)
        .help("Account username. Prompted for when omitted.");
}

fn arg_password() -> Arg {
    return Arg::new("password")
        .long("password")
        .env("WAYMARK_PASSWORD")
        .hide_env_values(true)
        .num_args(1)
        .help("Account password. Prompted for when omitted.");
}

fn arg_route_id() -> Arg {
    return Arg::new("id")
        .help("Route ID")
        .required(true)
        .num_args(1);
}

fn subcommand_login() -> Command {
    return Command::new("login")
        .about("Log in and store credentials for later commands.")
        .arg(arg_username())
        .arg(arg_password());
}

fn subcommand_register() -> Command {
    return Command::new("register")
        .about("Create an account and log in with it.")
        .arg(arg_username())
        .arg(
            Arg::new("email")
                .short('e')
                .long("email")
                .num_args(1)
                .help("Account email. Prompted for when omitted."),
        )
        .arg(arg_password());
}

fn subcommand_pois() -> Command {
    return Command::new("pois")
        .about("Search and inspect points of interest.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("search")
                .about("Search points of interest by text, category, or proximity.")
                .arg(
                    Arg::new("text")
                        .help("Text to search for in names and descriptions.")
                        .num_args(0..)
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("category")
                        .long("category")
                        .num_args(1)
                        .help("Only return points of interest in this category."),
                )
                .arg(
                    Arg::new("lat")
                        .long("lat")
                        .num_args(1)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .requires("lon")
                        .help("Latitude to search around."),
                )
                .arg(
                    Arg::new("lon")
                        .long("lon")
                        .num_args(1)
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f64))
                        .requires("lat")
                        .help("Longitude to search around."),
                )
                .arg(
                    Arg::new("radius")
                        .long("radius")
                        .num_args(1)
                        .value_parser(value_parser!(f64))
                        .requires("lat")
                        .help("Search radius in meters around --lat/--lon."),
                )
                .arg(arg_limit())
                .arg(arg_offset()),
        )
        .subcommand(
            Command::new("get")
                .about("Show a single point of interest.")
                .arg(Arg::new("id").help("POI ID").required(true).num_args(1)),
        )
        .subcommand(Command::new("categories").about("List all point of interest categories."));
}

fn arg_limit() -> Arg {
    return Arg::new("limit")
        .long("limit")
        .num_args(1)
        .value_parser(value_parser!(u32))
        .help("Maximum number of results.");
}

fn arg_offset() -> Arg {
    return Arg::new("offset")
        .long("offset")
        .num_args(1)
        .value_parser(value_parser!(u32))
        .help("Number of results to skip.");
}

fn subcommand_routes() -> Command {
    return Command::new("routes")
        .about("Compute routes and manage your saved routes.")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("compute")
                .about("Compute a route through two or more points of interest, in order.")
                .arg(
                    Arg::new("poi-ids")
                        .help("POI IDs to visit")
                        .required(true)
                        .num_args(2..)
                        .action(ArgAction::Append),
                )
                .arg(
                    Arg::new("save")
                        .long("save")
                        .num_args(1)
                        .help("Save the computed route under this name."),
                )
                .arg(
                    Arg::new("public")
                        .long("public")
                        .action(ArgAction::SetTrue)
                        .requires("save")
                        .help("Make the saved route visible to everyone."),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List saved routes.")
                .arg(
                    Arg::new("mine")
                        .long("mine")
                        .action(ArgAction::SetTrue)
                        .help("Only list your own routes."),
                )
                .arg(
                    Arg::new("public")
                        .long("public")
                        .action(ArgAction::SetTrue)
                        .help("Only list public routes."),
                )
                .arg(arg_limit())
                .arg(arg_offset()),
        )
        .subcommand(
            Command::new("get")
                .about("Show a saved route.")
                .arg(arg_route_id()),
        )
        .subcommand(
            Command::new("update")
                .about("Rename a saved route or change its visibility or travel mode.")
                .arg(arg_route_id())
                .arg(
                    Arg::new("name")
                        .long("name")
                        .num_args(1)
                        .help("New route name."),
                )
                .arg(Arg::new("public").long("public").action(ArgAction::SetTrue).help("Make the route public."))
                .arg(Arg::new("private").long("private").action(ArgAction::SetTrue).help("Make the route private."))
                .arg(
                    Arg::new("mode")
                        .long("mode")
                        .num_args(1)
                        .help("New travel mode.")
                        .value_parser(PossibleValuesParser::new(Vehicle::VARIANTS)),
                )
                .group(ArgGroup::new("visibility").args(["public", "private"])),
        )
        .subcommand(
            Command::new("delete")
                .about("Delete a saved route.")
                .arg(arg_route_id())
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Skip the confirmation prompt."),
                ),
        );
}

pub fn build() -> Command {
    let commands_text = plan_help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("PLAN COMMANDS:") {
                return Paint::new(line).underline().bold().to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!("{}\n\n{}", env!("CARGO_PKG_DESCRIPTION"), version_text());

    return Command::new("waymark")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(true)
        .subcommand(subcommand_login())
        .subcommand(subcommand_register())
        .subcommand(Command::new("logout").about("Forget stored credentials."))
        .subcommand(Command::new("whoami").about("Show the logged in account."))
        .subcommand(subcommand_pois())
        .subcommand(subcommand_routes())
        .subcommand(Command::new("plan").about("Interactively build, compute, and save a route."))
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .arg(
            Arg::new(ConfigKey::ApiUrl.to_string())
                .long(ConfigKey::ApiUrl.to_string())
                .env("WAYMARK_API_URL")
                .num_args(1)
                .help(format!("Base URL of the Waymark API, including the version prefix. [default: {}]", Config::default(ConfigKey::ApiUrl)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("WAYMARK_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::RequestTimeout.to_string())
                .long(ConfigKey::RequestTimeout.to_string())
                .env("WAYMARK_REQUEST_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds before giving up on an API request. [default: {}]", Config::default(ConfigKey::RequestTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Storage.to_string())
                .long(ConfigKey::Storage.to_string())
                .env("WAYMARK_STORAGE")
                .num_args(1)
                .help(format!("Where login credentials are kept between runs. [default: {}]", Config::default(ConfigKey::Storage)))
                .value_parser(PossibleValuesParser::new(StorageName::VARIANTS))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::StorageFile.to_string())
                .long(ConfigKey::StorageFile.to_string())
                .env("WAYMARK_STORAGE_FILE")
                .num_args(1)
                .help(format!("Path to the credentials file used by file storage. [default: {}]", Config::default(ConfigKey::StorageFile)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Vehicle.to_string())
                .long(ConfigKey::Vehicle.to_string())
                .env("WAYMARK_VEHICLE")
                .num_args(1)
                .help(format!("Vehicle used to compute routes. [default: {}]", Config::default(ConfigKey::Vehicle)))
                .value_parser(PossibleValuesParser::new(Vehicle::VARIANTS))
                .global(true),
        );
}

fn prompt_text(matches: &ArgMatches, id: &str, prompt: &str) -> Result<String> {
    if let Some(val) = matches.get_one::<String>(id) {
        return Ok(val.to_string());
    }

    let res = Input::<String>::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .interact_text()?;

    return Ok(res);
}

fn prompt_password(matches: &ArgMatches, confirm: bool) -> Result<String> {
    if let Some(val) = matches.get_one::<String>("password") {
        return Ok(val.to_string());
    }

    let theme = ColorfulTheme::default();
    let mut prompt = Password::with_theme(&theme).with_prompt("Password");
    if confirm {
        prompt = prompt.with_confirmation("Repeat password", "Passwords do not match.");
    }

    return Ok(prompt.interact()?);
}

/// Collects the query for `pois search` from its arguments.
pub fn poi_query(matches: &ArgMatches) -> PoiQuery {
    let text = matches
        .get_many::<String>("text")
        .map(|e| {
            return e
                .map(|e| return e.as_str())
                .collect::<Vec<&str>>()
                .join(" ");
        })
        .filter(|e| return !e.trim().is_empty());

    return PoiQuery {
        q: text,
        category: matches.get_one::<String>("category").cloned(),
        lat: matches.get_one::<f64>("lat").copied(),
        lon: matches.get_one::<f64>("lon").copied(),
        radius: matches.get_one::<f64>("radius").copied(),
        limit: matches.get_one::<u32>("limit").copied(),
        offset: matches.get_one::<u32>("offset").copied(),
    };
}

/// Collects the patch for `routes update` from its arguments.
pub fn route_patch(matches: &ArgMatches) -> RoutePatch {
    let mut public = None;
    if matches.get_flag("public") {
        public = Some(true);
    } else if matches.get_flag("private") {
        public = Some(false);
    }

    return RoutePatch {
        name: matches
            .get_one::<String>("name")
            .map(|e| return e.trim().to_string())
            .filter(|e| return !e.is_empty()),
        public,
        vehicle: matches
            .get_one::<String>("mode")
            .and_then(|e| return Vehicle::parse(e)),
    };
}

async fn run_pois(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("search", search_matches)) => {
            if let Some(page) = ctx.pois.search(&poi_query(search_matches)).await? {
                println!("{}", ui::format_poi_page(&page));
            }
        }
        Some(("get", get_matches)) => {
            let id = get_matches
                .get_one::<String>("id")
                .ok_or_else(|| return anyhow!("Missing POI ID"))?;
            if let Some(poi) = ctx.pois.get(id).await? {
                println!("{}", ui::format_poi_details(&poi));
            }
        }
        Some(("categories", _)) => {
            if let Some(res) = ctx.pois.categories().await? {
                println!("{}", res.categories.join("\n"));
            }
        }
        _ => {
            subcommand_pois().print_long_help()?;
        }
    }

    return Ok(());
}

async fn compute_route(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let ids = matches
        .get_many::<String>("poi-ids")
        .map(|e| return e.cloned().collect::<Vec<String>>())
        .unwrap_or_default();

    let body = ComputeRequest::between_pois(&ids, AppContext::default_vehicle());
    let route = match ctx.routes.compute(&body).await? {
        Some(route) => route,
        None => return Ok(()),
    };
    println!("{}", ui::format_route_stops(&route));

    let name = match matches.get_one::<String>("save") {
        Some(name) => name,
        None => return Ok(()),
    };
    if ctx.session.user().await.is_none() {
        ctx.notify(Notice::warning("Log in to save routes."))?;
        return Ok(());
    }

    let poi_sequence = ids.iter().map(|e| return e.trim().to_string()).collect();
    let body = match NewRoute::from_computed(name, matches.get_flag("public"), poi_sequence, &route) {
        Ok(body) => body,
        Err(problem) => {
            ctx.notify(Notice::warning(&problem))?;
            return Ok(());
        }
    };
    if let Some(saved) = ctx.routes.create(&body).await? {
        ctx.notify(Notice::info(&format!("Saved route \"{}\".", saved.name)))?;
        println!("{}", ui::format_saved_route(&saved));
    }

    return Ok(());
}

async fn list_routes(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    let mut filter = RouteFilter {
        limit: matches.get_one::<u32>("limit").copied(),
        offset: matches.get_one::<u32>("offset").copied(),
        ..RouteFilter::default()
    };
    if matches.get_flag("public") {
        filter.public = Some(true);
    }
    if matches.get_flag("mine") {
        match ctx.session.user().await {
            Some(user) => filter.owner_id = Some(user.id),
            None => {
                ctx.notify(Notice::warning("Log in to list your own routes."))?;
                return Ok(());
            }
        }
    }

    let page = match ctx.routes.list(&filter).await? {
        Some(page) => page,
        None => return Ok(()),
    };

    if page.results.is_empty() {
        println!("No routes found.");
        return Ok(());
    }

    println!("Showing {} of {} routes.", page.count, page.total);
    for route in page.results.iter() {
        println!("{}", ui::format_saved_route(route));
    }

    return Ok(());
}

async fn run_routes(ctx: &AppContext, matches: &ArgMatches) -> Result<()> {
    match matches.subcommand() {
        Some(("compute", compute_matches)) => {
            compute_route(ctx, compute_matches).await?;
        }
        Some(("list", list_matches)) => {
            list_routes(ctx, list_matches).await?;
        }
        Some(("get", get_matches)) => {
            let id = get_matches
                .get_one::<String>("id")
                .ok_or_else(|| return anyhow!("Missing route ID"))?;
            if let Some(route) = ctx.routes.get(id).await? {
                println!("{}", ui::format_saved_route_details(&route));
            }
        }
        Some(("update", update_matches)) => {
            let id = update_matches
                .get_one::<String>("id")
                .ok_or_else(|| return anyhow!("Missing route ID"))?;
            if let Some(route) = ctx.routes.update(id, &route_patch(update_matches)).await? {
                println!("{}", ui::format_saved_route(&route));
            }
        }
        Some(("delete", delete_matches)) => {
            let id = delete_matches
                .get_one::<String>("id")
                .ok_or_else(|| return anyhow!("Missing route ID"))?;

            if !delete_matches.get_flag("yes") {
                let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                    .with_prompt(format!("Delete route {id}?"))
                    .default(false)
                    .interact()?;
                if !confirmed {
                    return Ok(());
                }
            }

            if ctx.routes.delete(id).await? {
                ctx.notify(Notice::info(&format!("Deleted route {id}.")))?;
            }
        }
        _ => {
            subcommand_routes().print_long_help()?;
        }
    }

    return Ok(());
}

async fn run(
    ctx: &AppContext,
    name: &str,
    matches: &ArgMatches,
    barrier: &mut ui::RenderBarrier,
) -> Result<()> {
    match name {
        "login" => {
            let username = prompt_text(matches, "username", "Username")?;
            let password = prompt_password(matches, false)?;
            ctx.auth.login(&username, &password).await?;
            return Ok(());
        }
        "register" => {
            let username = prompt_text(matches, "username", "Username")?;
            let email = prompt_text(matches, "email", "Email")?;
            let password = prompt_password(matches, true)?;
            ctx.auth.register(&username, &email, &password).await?;
            return Ok(());
        }
        "logout" => {
            ctx.auth.logout().await?;
            return Ok(());
        }
        _ => {}
    }

    ctx.auth.restore().await?;
    tracing::debug!(
        state = %ctx.session.state().await,
        command = name,
        "session restored"
    );

    match name {
        "whoami" => match ctx.session.user().await {
            Some(user) => {
                println!("{}", ui::format_user(&user));
            }
            None => {
                ctx.notify(Notice::info("You are not logged in."))?;
            }
        },
        "pois" => run_pois(ctx, matches).await?,
        "routes" => run_routes(ctx, matches).await?,
        "plan" => planner::start(ctx, barrier).await?,
        _ => {
            build().print_long_help()?;
        }
    }

    return Ok(());
}

pub async fn parse(tx: mpsc::UnboundedSender<Event>, rendered: watch::Receiver<u64>) -> Result<()> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
            }
            _ => {
                subcommand_config().print_long_help()?;
            }
        },
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
        }
        Some((name, subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            let mut barrier = ui::RenderBarrier::new(tx.clone(), rendered);
            let ctx = AppContext::from_config(tx)?;
            run(&ctx, name, subcmd_matches, &mut barrier).await?;
        }
        None => {
            build().print_long_help()?;
        }
    }

    return Ok(());
}
