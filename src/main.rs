#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;

use anyhow::Error;
use tokio::sync::mpsc;
use tokio::sync::watch;
use yansi::Paint;

use crate::application::cli;
use crate::application::ui;
use crate::domain::models::Event;

fn handle_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Waymark has failed with the following app version and error.\n\nVersion: {}\nCommit: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }

    process::exit(1);
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let debug_log_dir = env::var("WAYMARK_LOG_DIR").unwrap_or_else(|_| {
        return dirs::cache_dir()
            .unwrap_or_else(env::temp_dir)
            .join("waymark")
            .to_string_lossy()
            .to_string();
    });

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, _guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("waymark")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();
    let (rendered_tx, rendered_rx) = watch::channel(0);
    let ui_future = tokio::spawn(ui::start(event_rx, rendered_tx));

    // The renderer stops once the last sender, owned by the command, is gone.
    let res = cli::parse(event_tx, rendered_rx).await;
    let ui_res = ui_future.await;

    if let Err(err) = res {
        handle_error(err);
        return;
    }
    match ui_res {
        Ok(Err(err)) => handle_error(err),
        Err(err) => handle_error(err.into()),
        Ok(Ok(())) => {}
    }

    drop(_guard);
    process::exit(0);
}
