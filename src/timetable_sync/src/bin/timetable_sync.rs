use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use shared_utils::{get_env_var, get_env_var_or, parse_env_var};
use tracing_subscriber::EnvFilter;

use timetable_sync::{
    ImportConfig, ImportOptions, TimetableDescriptor, XmlDocument,
    config::normalize_config,
    db::{connection, migrate},
    import_timetable, load_config_path,
};

#[derive(Parser)]
#[command(version, about = "Timetable Sync CLI")]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Apply pending schema migrations to DATABASE_URL.
    Migrate,
    /// Import a timetable export as a new timetable.
    Import(ImportCmd),
}

#[derive(Args)]
struct ImportCmd {
    #[arg(long, value_name = "FILE")]
    file: PathBuf,
    #[arg(long)]
    name: String,
    #[arg(long, value_name = "YYYY-MM-DD")]
    valid_from: NaiveDate,
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    #[arg(long)]
    dry_run: bool,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(get_env_var_or("TIMETABLE_SYNC_LOG", "info")));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let db_url = get_env_var("DATABASE_URL")?;

    match cli.cmd {
        Cmd::Migrate => {
            migrate::run_sqlite(&db_url).context("applying migrations")?;
        }
        Cmd::Import(ImportCmd {
            file,
            name,
            valid_from,
            config,
            dry_run,
        }) => {
            // 1) Config: file, then env override
            let mut cfg = match &config {
                Some(path) => load_config_path(path)?,
                None => ImportConfig::default(),
            };
            if let Some(batch_size) = parse_env_var::<usize>("TIMETABLE_SYNC_BATCH_SIZE")? {
                cfg.batch_size = batch_size;
                normalize_config(&mut cfg)?;
            }

            // 2) Document
            let doc = XmlDocument::from_path(&file)?;

            // 3) Import
            let mut conn = connection::connect_sqlite(&db_url)?;
            let descriptor = TimetableDescriptor::new(name, valid_from);
            let options = ImportOptions {
                config: cfg,
                dry_run,
            };
            let summary = import_timetable(&mut conn, &doc, &descriptor, &options)?;
            println!("{summary}");
        }
    }

    Ok(())
}
