//! sowonee: command-line front end for the SOWONEE Gallery core.
//!
//! Reads image records from a JSON file, keeps engagement statistics and
//! favorites in the configured storage, and prints JSON to stdout. Logs go to
//! stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde_json::json;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sowonee_core::defaults::{POPULAR_LIMIT, RECENT_SEARCH_LIMIT, TOP_LIMIT};
use sowonee_core::{FilterSpec, ImageRecord, SortOrder, SpecialFilter, TagOptions};
use sowonee_gallery::{Gallery, GalleryConfig, ImageSource, JsonFileSource, StorageKind};
use sowonee_stats::{EngagementTracker, Favorites};

#[derive(Parser)]
#[command(name = "sowonee")]
#[command(author, version, about = "Browse and filter the SOWONEE Gallery")]
#[command(propagate_version = true)]
struct Cli {
    /// Config file (default: ~/.config/sowonee/gallery.toml)
    #[arg(long, global = true, env = "SOWONEE_CONFIG")]
    config: Option<PathBuf>,

    /// JSON array of image records
    #[arg(long, global = true)]
    records: Option<PathBuf>,

    /// Directory for persisted statistics and favorites
    #[arg(long, global = true)]
    storage_dir: Option<PathBuf>,

    /// Keep statistics in memory only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the records matching the given filters
    List(FilterArgs),

    /// Record a lightbox view of an image
    View { id: String },

    /// Record a download of an image
    Download { id: String },

    /// Record a search and list its results
    Search {
        query: String,

        #[command(flatten)]
        filters: FilterArgs,
    },

    /// Toggle an image's favorite status
    Favorite { id: String },

    /// Image ids ranked by views and downloads
    Popular {
        #[arg(short, long, default_value_t = POPULAR_LIMIT)]
        limit: usize,
    },

    /// Show engagement statistics
    Stats,

    /// Erase all engagement statistics
    ClearStats,

    /// Facet counts and active filter chips
    Facets(FilterArgs),

    /// Every selectable filter value with its label
    Options,
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long, default_value = "")]
    character: String,
    #[arg(long, default_value = "")]
    emotion: String,
    #[arg(long, default_value = "")]
    action: String,
    #[arg(long, default_value = "")]
    scene: String,
    #[arg(long, default_value = "")]
    search: String,
    /// newest, oldest, popular or title
    #[arg(long, default_value = "newest")]
    sort: String,
    /// popular or favorites
    #[arg(long, default_value = "")]
    special: String,
    #[arg(long = "type", default_value = "")]
    image_type: String,
    #[arg(long, default_value = "")]
    mood: String,
    #[arg(long, default_value = "")]
    shape: String,
    #[arg(long, default_value = "")]
    purpose: String,
}

impl FilterArgs {
    fn to_spec(&self) -> FilterSpec {
        FilterSpec::new()
            .with_character(&self.character)
            .with_emotion(&self.emotion)
            .with_action(&self.action)
            .with_scene(&self.scene)
            .with_search(&self.search)
            .with_sort(SortOrder::from(self.sort.clone()))
            .with_special_filter(SpecialFilter::from(self.special.clone()))
            .with_type(&self.image_type)
            .with_mood(&self.mood)
            .with_shape(&self.shape)
            .with_purpose(&self.purpose)
    }
}

/// Used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "sowonee=info,sowonee_core=info,sowonee_stats=info,sowonee_gallery=info";

fn init_tracing() {
    // LOG_FORMAT - "json" or "text" (default: "text")
    // RUST_LOG   - standard env filter (default: DEFAULT_LOG_FILTER)
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<GalleryConfig> {
    let mut config = match &cli.config {
        Some(path) => GalleryConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => GalleryConfig::load()?,
    };
    if let Some(records) = &cli.records {
        config.records_path = Some(records.clone());
    }
    if let Some(dir) = &cli.storage_dir {
        config.storage = StorageKind::File;
        config.storage_dir = dir.clone();
    }
    if cli.ephemeral {
        config.storage = StorageKind::Memory;
    }
    config.validate()?;
    Ok(config)
}

async fn load_records(config: &GalleryConfig) -> anyhow::Result<Vec<ImageRecord>> {
    let Some(path) = &config.records_path else {
        bail!("no records file configured (use --records or SOWONEE_RECORDS_PATH)");
    };
    let records = JsonFileSource::new(path).fetch_visible().await?;
    Ok(records)
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    debug!(storage = %config.storage, "Configuration loaded");

    let storage = config.storage_backend();
    let gallery = Gallery::new(
        EngagementTracker::new(storage.clone()),
        Favorites::new(storage),
    )
    .with_popular_limit(config.popular_limit);

    match cli.command {
        Commands::List(filters) => {
            let records = load_records(&config).await?;
            print_json(&gallery.view(&records, &filters.to_spec()))?;
        }
        Commands::View { id } => {
            gallery.open_lightbox(&id);
            print_json(&json!({ "id": id, "views": gallery.tracker().view_count(&id) }))?;
        }
        Commands::Download { id } => {
            gallery.download(&id);
            print_json(
                &json!({ "id": id, "downloads": gallery.tracker().download_count(&id) }),
            )?;
        }
        Commands::Search { query, filters } => {
            let records = load_records(&config).await?;
            let spec = gallery.search(&filters.to_spec(), &query);
            print_json(&gallery.view(&records, &spec))?;
        }
        Commands::Favorite { id } => {
            let favorite = gallery.toggle_favorite(&id);
            print_json(&json!({ "id": id, "favorite": favorite }))?;
        }
        Commands::Popular { limit } => {
            print_json(&gallery.tracker().popular_image_ids(limit))?;
        }
        Commands::Stats => {
            let tracker = gallery.tracker();
            print_json(&json!({
                "top_viewed": tracker.top_viewed(TOP_LIMIT),
                "top_downloaded": tracker.top_downloaded(TOP_LIMIT),
                "top_searches": tracker.top_searches(TOP_LIMIT),
                "recent_searches": tracker.recent_searches(RECENT_SEARCH_LIMIT),
                "badges": gallery.badges(),
            }))?;
        }
        Commands::ClearStats => {
            gallery.tracker().clear_stats();
            print_json(&json!({ "cleared": true }))?;
        }
        Commands::Facets(filters) => {
            let records = load_records(&config).await?;
            print_json(&gallery.facets(&records, &filters.to_spec()))?;
        }
        Commands::Options => {
            print_json(&TagOptions::all())?;
        }
    }

    Ok(())
}
