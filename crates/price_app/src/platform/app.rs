use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use chrono::Utc;
use clap::Parser;
use price_core::{price_view, KeyGate, Route};
use price_engine::{FetchController, PriceFetcher, ReqwestFetcher};
use price_logging::{price_error, price_info};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::logging::{self, LogDestination};
use super::{config, render};

/// Shows cryptocurrency prices. Type a route per line on stdin to navigate
/// (`/`, `/coin/BTC`); `q` quits.
#[derive(Debug, Parser)]
#[command(name = "price_watch", version)]
struct Args {
    /// Configuration file (RON). Defaults to ./price_watch.ron when present.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Route to open first.
    #[arg(long, default_value = "/")]
    route: String,
    /// Where logs go. `file` writes ./price_watch.log.
    #[arg(long, value_enum, default_value_t = LogDestination::Terminal)]
    log_to: LogDestination,
    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    log_level: Option<String>,
}

pub fn run_app() -> ExitCode {
    let args = Args::parse();
    let level = args
        .log_level
        .as_deref()
        .and_then(price_logging::parse_level)
        .unwrap_or_else(price_logging::default_level);
    logging::initialize(args.log_to, level);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            price_error!("{err:#}");
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let config = config::load(args.config.as_deref()).context("loading configuration")?;
    let quote = config.fetch_settings().quote;
    let fetcher = ReqwestFetcher::new(config.fetch_settings())
        .map_err(|err| anyhow!("building HTTP client: {err}"))?;

    // One thread: the controller and every fetch task share it.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    runtime.block_on(navigate(Arc::new(fetcher), Route::parse(&args.route), &quote))
}

async fn navigate(
    fetcher: Arc<dyn PriceFetcher>,
    initial: Route,
    quote: &str,
) -> anyhow::Result<()> {
    let mut controller = FetchController::new(fetcher);
    let mut gate = KeyGate::new();
    let mut route = initial;
    price_info!("Starting at {}", route.path());
    follow(&mut controller, &mut gate, &route);
    draw(&route, &mut controller, quote)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let in_flight = controller.is_in_flight();
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("reading stdin")? else {
                    break;
                };
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if matches!(line, "q" | "quit" | "exit") {
                    break;
                }
                route = Route::parse(line);
                follow(&mut controller, &mut gate, &route);
                draw(&route, &mut controller, quote)?;
            }
            progressed = controller.next_completion(), if in_flight => {
                if progressed && controller.consume_dirty() {
                    draw(&route, &mut controller, quote)?;
                }
            }
        }
    }

    controller.dispose();
    price_info!("Bye");
    Ok(())
}

/// Forwards the route's key only when it differs from the last one.
fn follow(controller: &mut FetchController, gate: &mut KeyGate, route: &Route) {
    let key = route.request_key();
    if gate.changed(&key) {
        controller.on_key_change(key);
    }
}

fn draw(route: &Route, controller: &mut FetchController, quote: &str) -> anyhow::Result<()> {
    controller.consume_dirty();
    let view = price_view(route, controller.state());
    let mut stdout = std::io::stdout().lock();
    for line in render::render(&route.path(), &view, quote, Utc::now()) {
        writeln!(stdout, "{line}").context("writing to stdout")?;
    }
    stdout.flush().context("writing to stdout")?;
    Ok(())
}
