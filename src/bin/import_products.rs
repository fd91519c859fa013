//! Loads products from a JSON export into a catalog category.
//!
//! ```text
//! import-products products.json --category Phones --source-dir ./export
//! ```

use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use megano_api::{
    config, db,
    events::{process_events, EventSender},
    services::{
        commerce::{import_service::parse_import_file, ImportOptions, ImportService},
        media::MediaStorage,
    },
};
use tokio::sync::mpsc;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "import-products",
    about = "Import products from a JSON array into a category",
    version
)]
struct Cli {
    /// JSON file holding an array of products
    file: PathBuf,

    /// Target category title; created as a root category when missing
    #[arg(long)]
    category: String,

    /// Directory image `src` paths are resolved against (defaults to the file's directory)
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Run pending migrations before importing
    #[arg(long, action = ArgAction::SetTrue)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let cfg = config::load_config().context("failed to load application config")?;
    config::init_tracing(cfg.log_level(), cfg.log_json);

    let raw = tokio::fs::read_to_string(&cli.file)
        .await
        .with_context(|| format!("failed to read {}", cli.file.display()))?;
    let items = parse_import_file(&raw)?;

    let pool = db::establish_connection_from_app_config(&cfg)
        .await
        .context("failed to connect to database")?;
    if cli.migrate || cfg.auto_migrate {
        db::run_migrations(&pool).await?;
    }

    let (event_tx, event_rx) = mpsc::channel(cfg.event_channel_capacity);
    let events = tokio::spawn(process_events(event_rx));

    let source_dir = cli.source_dir.unwrap_or_else(|| {
        cli.file
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    });
    let options = ImportOptions {
        category: cli.category,
        source_dir,
    };

    let service = ImportService::new(
        Arc::new(pool),
        Arc::new(EventSender::new(event_tx)),
        MediaStorage::from_app_config(&cfg),
    );
    let report = service
        .import(items, &options)
        .await
        .context("import failed")?;

    // Dropping the service closes the channel so the event task can finish.
    drop(service);
    events.await.context("event task panicked")?;

    info!(
        created = report.created.len(),
        skipped = report.skipped.len(),
        "import finished"
    );
    println!(
        "Imported {} product(s) into '{}'",
        report.created.len(),
        options.category
    );
    for title in &report.skipped {
        println!("  skipped existing product: {}", title);
    }

    Ok(())
}
