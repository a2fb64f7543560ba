//! CLI binary for vidscout.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use vidscout::config::parse_region;
use vidscout::{AppConfig, credentials};
use vidscout_search::{
    KeyPool, ProgressCallback, ResultOrder, SearchReport, SearchRequest, YouTubeClient,
};

/// vidscout: find recent videos across regions with a rotating key pool.
#[derive(Parser)]
#[command(name = "vidscout", version, about)]
struct Cli {
    /// Path to TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Key set file, one key per line.
    #[arg(short, long, global = true)]
    keys: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for recent videos.
    Search {
        /// Keyword to search for. May be empty when searching channels.
        #[arg(short = 'q', long, default_value = "")]
        keyword: String,

        /// Only include videos published within this many days.
        #[arg(short, long)]
        days: Option<u32>,

        /// Region to search, `CC` or `CC=translated keyword`. Repeatable.
        #[arg(short, long = "region")]
        regions: Vec<String>,

        /// Channel id to search instead of regions. Repeatable.
        #[arg(long = "channel")]
        channels: Vec<String>,

        /// Result ordering.
        #[arg(long, value_enum)]
        order: Option<OrderArg>,

        /// Print the full report as JSON.
        #[arg(long)]
        json: bool,
    },

    /// List the configured keys (masked).
    Keys,

    /// Write a default configuration file.
    InitConfig {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OrderArg {
    Views,
    Newest,
}

impl From<OrderArg> for ResultOrder {
    fn from(order: OrderArg) -> Self {
        match order {
            OrderArg::Views => ResultOrder::Views,
            OrderArg::Newest => ResultOrder::Newest,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = match cli.command {
        Command::InitConfig { .. } => AppConfig::default(),
        _ => AppConfig::load(cli.config.as_deref())?,
    };
    let _log_guard = vidscout::logging::init(&config.logging)?;

    match cli.command {
        Command::Search {
            keyword,
            days,
            regions,
            channels,
            order,
            json,
        } => {
            let mut request = config.default_request(&keyword);
            if let Some(days) = days {
                request.date_range_days = days;
            }
            if !regions.is_empty() {
                request.regions = regions.iter().map(|r| parse_region(r)).collect();
            }
            if !channels.is_empty() {
                request.tracked_channels = channels;
            }
            run_search(&config, cli.keys.as_deref(), &request, order, json).await
        }
        Command::Keys => list_keys(&config, cli.keys.as_deref()),
        Command::InitConfig { force } => init_config(&config, cli.config.as_deref(), force),
    }
}

fn load_pool(config: &AppConfig, keys: Option<&Path>) -> anyhow::Result<KeyPool> {
    let explicit = keys.map(Path::to_path_buf).or_else(|| config.keys.file.clone());
    let secrets = credentials::resolve(explicit.as_deref(), &config.keys.effective_file())?;
    Ok(KeyPool::new(secrets))
}

async fn run_search(
    config: &AppConfig,
    keys: Option<&Path>,
    request: &SearchRequest,
    order: Option<OrderArg>,
    json: bool,
) -> anyhow::Result<()> {
    let mut pool = load_pool(config, keys)?;
    let mut engine = config.engine_config()?;
    if let Some(order) = order {
        engine.order = order.into();
    }
    let client = YouTubeClient::new(&engine)?.with_base_url(config.api.base_url.as_str());

    let bar = ProgressBar::hidden();
    if let Ok(style) = ProgressStyle::with_template("  enriching [{bar:30}] {pos}/{len} batches")
    {
        bar.set_style(style);
    }
    let progress_bar = bar.clone();
    let on_progress: ProgressCallback = Box::new(move |tick| {
        if progress_bar.is_hidden() {
            progress_bar.set_draw_target(indicatif::ProgressDrawTarget::stderr());
        }
        progress_bar.set_length(tick.total as u64);
        progress_bar.set_position(tick.current as u64);
    });

    let report = vidscout_search::run_search(
        request,
        &mut pool,
        &client,
        &client,
        &engine,
        Some(&on_progress),
    )
    .await
    .context("search failed")?;
    bar.finish_and_clear();

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_results(&report);
    }
    print_diagnostics(&report);

    if report.pool_exhausted && report.is_empty() {
        anyhow::bail!("no results: every API key failed");
    }
    Ok(())
}

fn print_results(report: &SearchReport) {
    if report.is_empty() {
        println!("No results.");
        return;
    }
    for item in &report.results {
        let published = item
            .result
            .published_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "----------".to_owned());
        let views = item
            .details
            .as_ref()
            .and_then(|d| d.view_count)
            .map_or_else(|| "-".to_owned(), |v| v.to_string());
        println!(
            "{views:>12}  {published}  [{}] {}  https://www.youtube.com/watch?v={}",
            item.result.found_by, item.result.title, item.result.id
        );
    }
    println!("\n{} result(s)", report.results.len());
}

fn print_diagnostics(report: &SearchReport) {
    for warning in &report.warnings {
        eprintln!("warning: {}: {}", warning.task_id, warning.message);
    }
    if !report.incomplete_tasks.is_empty() {
        eprintln!("incomplete: {}", report.incomplete_tasks.join(", "));
    }
    if report.degraded {
        eprintln!("note: some results are missing view counts");
    }
    if let Some(summary) = &report.failure_summary {
        eprintln!("{summary}");
    }
}

fn list_keys(config: &AppConfig, keys: Option<&Path>) -> anyhow::Result<()> {
    let pool = load_pool(config, keys)?;
    if pool.is_empty() {
        println!("No API keys configured.");
        return Ok(());
    }
    for line in credentials::masked_listing(&pool) {
        println!("{line}");
    }
    Ok(())
}

fn init_config(config: &AppConfig, path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let path = path.map_or_else(AppConfig::default_config_path, Path::to_path_buf);
    if path.exists() && !force {
        anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
    }
    config.save_to_file(&path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
