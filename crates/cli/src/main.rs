//! StacScout CLI - Browse STAC satellite-imagery catalogs

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use stacscout_cloud::blocking::SessionControllerBlocking;
use stacscout_cloud::{Catalog, ClientOptions, Geocoder, SessionController};
use stacscout_core::detail::ItemDetail;
use stacscout_core::models::SortDirection;
use stacscout_core::query::SearchForm;
use stacscout_core::session::SearchSession;

// ─── CLI structure ──────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "stacscout")]
#[command(
    author,
    version,
    about = "Search and inspect STAC satellite-imagery catalogs",
    long_about = None
)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Catalog: "eopf" or a STAC API root URL
    #[arg(long, global = true, default_value = "eopf")]
    catalog: String,

    /// Geocoder search endpoint (Nominatim-compatible)
    #[arg(long, global = true)]
    geocoder: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    timeout: u64,

    /// Retries on transient network failures
    #[arg(long, global = true, default_value = "3")]
    retries: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog's collections and their display colors
    Collections,
    /// Search items and show the filtered result set
    Search(SearchArgs),
    /// Resolve a place name to a bounding box
    Geocode {
        /// Place name, e.g. "Innsbruck"
        query: String,
    },
}

#[derive(clap::Args)]
struct SearchArgs {
    /// Comma separated collection ids
    #[arg(short, long, value_delimiter = ',', required = true)]
    collections: Vec<String>,

    /// Bounding box "west, south, east, north"
    #[arg(short, long, default_value = stacscout_core::query::DEFAULT_BBOX)]
    bbox: String,

    /// Place name to geocode instead of --bbox
    #[arg(short, long)]
    place: Option<String>,

    /// Start date (YYYY-MM-DD), default one year ago
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD), default today
    #[arg(long)]
    end: Option<String>,

    /// Sort direction on acquisition time
    #[arg(long, default_value = "desc")]
    sort: SortArg,

    /// Page size
    #[arg(short, long, default_value = "50")]
    limit: u32,

    /// Number of pages to fetch (first page plus "load more")
    #[arg(long, default_value = "1")]
    pages: usize,

    /// Cloud cover ceiling in percent
    #[arg(long)]
    max_cloud: Option<f64>,

    /// Narrow the time window: first day to show (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,

    /// Narrow the time window: last day to show (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,

    /// Print the detail view of this item id
    #[arg(long)]
    show: Option<String>,

    /// Output format
    #[arg(long, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum SortArg {
    Asc,
    Desc,
}

impl From<SortArg> for SortDirection {
    fn from(s: SortArg) -> Self {
        match s {
            SortArg::Asc => SortDirection::Asc,
            SortArg::Desc => SortDirection::Desc,
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

// ─── Helpers ────────────────────────────────────────────────────────────

fn setup_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}

fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn options(cli: &Cli) -> ClientOptions {
    ClientOptions {
        request_timeout: Duration::from_secs(cli.timeout),
        max_retries: cli.retries,
        ..ClientOptions::default()
    }
}

fn controller(cli: &Cli) -> Result<SessionControllerBlocking> {
    let catalog = Catalog::from_str_or_url(&cli.catalog);
    let options = options(cli);
    let inner = match &cli.geocoder {
        Some(url) => {
            let geocoder = Geocoder::new(url.clone(), &options)?;
            SessionController::with_geocoder(catalog, options, geocoder)?
        }
        None => SessionController::new(catalog, options)?,
    };
    Ok(SessionControllerBlocking::from_controller(inner)?)
}

/// Milliseconds at 00:00:00 UTC (or 23:59:59.999 with `end_of_day`).
fn day_millis(date: &str, end_of_day: bool) -> Result<i64> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date: {date}"))?;
    let time = if end_of_day {
        day.and_hms_milli_opt(23, 59, 59, 999)
    } else {
        day.and_hms_opt(0, 0, 0)
    }
    .context("Invalid time of day")?;
    Ok(time.and_utc().timestamp_millis())
}

fn format_day(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".into())
}

// ─── Rendering ──────────────────────────────────────────────────────────

fn print_results(session: &SearchSession) {
    println!("{}", session.summary());
    if session.visible().is_empty() {
        println!("No results found.");
        return;
    }

    let f = session.filter();
    println!(
        "Showing {} of {} (cloud <= {:.0}%, {} .. {})",
        session.visible().len(),
        session.items().len(),
        f.max_cloud_cover_percent,
        format_day(f.time_window_start_millis),
        format_day(f.time_window_end_millis),
    );
    println!();

    for item in session.visible() {
        println!(
            "  {} {:<16} {:<22} {:>6} {:<12} {}",
            session.registry().color_for(&item.collection_id),
            format_day(item.timestamp_millis),
            item.collection_id,
            item.cloud_cover_percent
                .map(|c| format!("{c:.1}%"))
                .unwrap_or_else(|| "-".into()),
            item.platform.as_deref().unwrap_or("sat"),
            item.id,
        );
    }

    let histogram = session.histogram();
    let max = histogram.max_count().max(1);
    println!();
    println!("Timeline ({} days):", histogram.len());
    for bucket in histogram.buckets() {
        let width = (bucket.count * 40).div_ceil(max);
        println!("  {}  {:<40} {}", bucket.day, "#".repeat(width), bucket.count);
    }

    println!();
    println!("Map layers:");
    for layer in session.map().layers() {
        println!(
            "  {} {:<22} {} footprints",
            layer.color,
            layer.collection_id,
            layer.shapes.len()
        );
    }
    if let Some([w, s, e, n]) = session.map().bounds() {
        println!("  extent: {w:.4}, {s:.4}, {e:.4}, {n:.4}");
    }

    if session.has_more() {
        println!();
        println!("More results available (use --pages).");
    }
}

fn print_detail(detail: &ItemDetail) {
    println!();
    println!("{}", detail.id);
    println!("  collection: {} ({})", detail.collection_id, detail.collection_color);
    println!("  acquired:   {}", detail.datetime);
    println!("  browser:    {}", detail.browser_url);
    for entry in &detail.metadata {
        println!("  {:<12} {}", entry.label, entry.value);
    }
    if !detail.assets.is_empty() {
        println!("  assets:");
        for asset in &detail.assets {
            println!("    {:<16} {:<28} {}", asset.key, asset.media_type, asset.href);
        }
    }
}

// ─── Commands ───────────────────────────────────────────────────────────

fn run_collections(cli: &Cli) -> Result<()> {
    let mut ctl = controller(cli)?;
    let pb = spinner("Loading collections...");
    let loaded = ctl.load_collections();
    pb.finish_and_clear();

    let loaded = loaded.context("Failed to load collections")?;
    for c in &loaded {
        println!("{} {:<28} {}", c.color, c.id, c.title);
    }
    info!("{} collections", loaded.len());
    Ok(())
}

fn run_geocode(cli: &Cli, query: &str) -> Result<()> {
    let ctl = controller(cli)?;
    let pb = spinner("Locating...");
    let hit = ctl.geocode(query);
    pb.finish_and_clear();

    let hit = hit.context("Geocoding failed")?;
    println!("Found: {}", hit.label);
    println!("{}", hit.bbox_text());
    Ok(())
}

fn run_search(cli: &Cli, args: &SearchArgs) -> Result<()> {
    let mut ctl = controller(cli)?;

    // Colors are cosmetic: a failed listing is reported and the search goes on.
    let pb = spinner("Loading collections...");
    let collections = ctl.load_collections();
    pb.finish_and_clear();
    if let Err(e) = collections {
        warn!("{e}");
    }

    let bbox = match &args.place {
        Some(place) => {
            let hit = ctl.geocode(place).context("Geocoding failed")?;
            info!("Found: {} ({})", hit.label, hit.bbox_text());
            hit.bbox_text()
        }
        None => args.bbox.clone(),
    };

    let defaults = SearchForm::with_default_dates(Utc::now().date_naive());
    let form = SearchForm::default()
        .collections(args.collections.iter().cloned())
        .bbox(&bbox)
        .dates(
            args.start.as_deref().unwrap_or(&defaults.start_date),
            args.end.as_deref().unwrap_or(&defaults.end_date),
        )
        .sort(args.sort.into())
        .limit(args.limit);

    let pb = spinner("Searching...");
    let searched = ctl.submit(&form).and_then(|_| ctl.load_pages(args.pages));
    pb.finish_and_clear();
    searched.context("Search failed")?;

    let session = ctl.session_mut();
    if let Some(max) = args.max_cloud {
        session.set_max_cloud_cover(max);
    }
    if let Some(from) = &args.from {
        session.set_time_window_start(day_millis(from, false)?);
    }
    if let Some(to) = &args.to {
        session.set_time_window_end(day_millis(to, true)?);
    }

    let session = ctl.session();
    let detail = match &args.show {
        Some(id) => Some(
            session
                .select(id)
                .with_context(|| format!("Item {id} is not in the result set"))?,
        ),
        None => None,
    };

    match args.format {
        OutputFormat::Json => {
            let layers: Vec<_> = session.map().layers().collect();
            let doc = serde_json::json!({
                "summary": session.summary(),
                "session": session.snapshot(),
                "histogram": session.histogram(),
                "layers": layers,
                "detail": detail,
            });
            println!("{}", serde_json::to_string_pretty(&doc)?);
        }
        OutputFormat::Text => {
            print_results(session);
            if let Some(detail) = &detail {
                print_detail(detail);
            }
        }
    }
    Ok(())
}

// ─── Main ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match &cli.command {
        Commands::Collections => run_collections(&cli),
        Commands::Geocode { query } => run_geocode(&cli, query),
        Commands::Search(args) => run_search(&cli, args),
    }
}
