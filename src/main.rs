//! CLI entry point for the GZM vehicle monitor.
//!
//! Fetches the live vehicle list of the GZM (Upper Silesia) public transport
//! network, charts how many vehicles run on each line and lists the vehicles
//! of selected lines.

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use gzm_monitor::{
    app::App,
    cache::SnapshotCache,
    fetch::{BasicClient, FEED_URL},
    output::{append_counts, render_view, render_warning, view_json},
    stats::count_by_line,
};
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "gzm_monitor")]
#[command(about = "Live vehicle counts and listings for GZM public transport", long_about = None)]
struct Cli {
    /// Vehicle feed endpoint
    #[arg(long, global = true, env = "GZM_FEED_URL", default_value = FEED_URL)]
    url: String,

    /// How long a fetched snapshot is reused, in seconds
    #[arg(long, global = true, env = "GZM_CACHE_TTL_SECS", default_value_t = 60)]
    cache_ttl_secs: u64,

    /// HTTP request timeout, in seconds
    #[arg(long, global = true, default_value_t = 30)]
    timeout_secs: u64,

    /// Width of the longest bar in the chart
    #[arg(long, global = true, default_value_t = 40)]
    chart_width: usize,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch once and print the chart and vehicle table
    Show {
        /// Comma-separated line labels, e.g. "6, 19, M1"
        #[arg(short, long, default_value = "")]
        lines: String,

        /// Print the view as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Keep the view open; type line filters on stdin, ":r" to refresh, ":q" to quit
    Watch {
        /// Initial comma-separated line filter
        #[arg(short, long, default_value = "")]
        lines: String,

        /// Re-request the snapshot every X seconds
        #[arg(short = 'r', long, default_value_t = 60)]
        refresh_secs: u64,
    },
    /// Append the current per-line vehicle counts to a CSV file
    Export {
        /// CSV file to append results to
        #[arg(short, long, default_value = "line_counts.csv")]
        output: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    let _file_guard = init_tracing()?;

    let cli = Cli::parse();

    let client = BasicClient::with_timeout(Duration::from_secs(cli.timeout_secs))?;
    let cache = SnapshotCache::new(client, cli.url, Duration::from_secs(cli.cache_ttl_secs));

    match cli.command {
        Commands::Show { lines, json } => show(&cache, lines, json, cli.chart_width).await?,
        Commands::Watch {
            lines,
            refresh_secs,
        } => watch(&cache, lines, refresh_secs, cli.chart_width).await?,
        Commands::Export { output } => export(&cache, &output).await?,
    }

    Ok(())
}

/// Logging setup: colored stderr + JSON rolling log file.
fn init_tracing() -> Result<WorkerGuard> {
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/gzm_monitor.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("gzm_monitor.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(file_guard)
}

#[tracing::instrument(skip(cache, chart_width), fields(url = cache.url()))]
async fn show(
    cache: &SnapshotCache<BasicClient>,
    lines: String,
    json: bool,
    chart_width: usize,
) -> Result<()> {
    let mut app = App::new(lines);
    let result = cache.get().await;
    let failed = result.is_err();
    app.apply_fetch(result);

    let view = app.view();
    if json {
        println!("{}", view_json(&view)?);
    } else {
        print!("{}", render_view(&view, chart_width));
    }

    if failed {
        bail!("vehicle feed unavailable");
    }
    Ok(())
}

#[tracing::instrument(skip(cache), fields(url = cache.url()))]
async fn export(cache: &SnapshotCache<BasicClient>, output: &str) -> Result<()> {
    let snapshot = match cache.get().await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            print!("{}", render_warning(&e.to_string()));
            bail!("vehicle feed unavailable");
        }
    };
    let counts = count_by_line(&snapshot.vehicles);
    append_counts(output, snapshot.fetched_at, &counts)?;
    info!(output, lines = counts.len(), "Line counts exported");
    Ok(())
}

/// Interactive loop over an [`App`]: stdin lines set the filter, the
/// snapshot is re-requested through the cache on every tick.
#[tracing::instrument(skip(cache, chart_width), fields(url = cache.url()))]
async fn watch(
    cache: &SnapshotCache<BasicClient>,
    lines: String,
    refresh_secs: u64,
    chart_width: usize,
) -> Result<()> {
    let mut app = App::new(lines);
    app.apply_fetch(cache.get().await);
    redraw(&app, chart_width);

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(Duration::from_secs(refresh_secs.max(1)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await; // first tick completes immediately

    loop {
        tokio::select! {
            line = input.next_line() => {
                let Some(line) = line? else { break };
                match line.trim() {
                    ":q" | ":quit" => break,
                    ":r" | ":refresh" => app.apply_fetch(cache.get().await),
                    ":r!" => {
                        cache.invalidate().await;
                        app.apply_fetch(cache.get().await);
                    }
                    _ => {
                        debug!(filter = %line, "Filter changed");
                        app.set_filter(line);
                    }
                }
            }
            _ = ticker.tick() => app.apply_fetch(cache.get().await),
        }
        redraw(&app, chart_width);
    }

    info!("Watch finished");
    Ok(())
}

fn redraw(app: &App, chart_width: usize) {
    // clear screen, cursor home
    print!("\x1B[2J\x1B[H");
    print!("{}", render_view(&app.view(), chart_width));
    println!("\nfilter> {}", app.filter());
}
