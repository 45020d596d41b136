//! viewfact - viewing-session ETL
//!
//! Generates synthetic raw data, validates and cleans it into a fact table
//! plus rejects, and loads the cleaned tables into SQLite.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use viewfact_common::config::{resolve_root_folder, DataLayout, GeneratorConfig, TomlConfig};
use viewfact_etl::build_id;
use viewfact_etl::pipeline::{run_etl, run_generate, run_load};

#[derive(Parser, Debug)]
#[command(name = "viewfact", version, about = "Viewing-session ETL")]
struct Cli {
    /// Root folder holding raw/, cleaned/, rejects/ and the database
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// TOML config file
    #[arg(long, global = true, env = "VIEWFACT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug, Clone)]
struct GenerateArgs {
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    users: Option<usize>,
    #[arg(long)]
    titles: Option<usize>,
    #[arg(long)]
    views: Option<usize>,
}

impl GenerateArgs {
    /// Command-line values override the config file
    fn apply(&self, mut config: GeneratorConfig) -> GeneratorConfig {
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(users) = self.users {
            config.users = users;
        }
        if let Some(titles) = self.titles {
            config.titles = titles;
        }
        if let Some(views) = self.views {
            config.views = views;
        }
        config
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write synthetic raw CSVs
    Generate(GenerateArgs),
    /// Clean dimensions, validate sessions, write cleaned data and rejects
    Etl,
    /// Load cleaned CSVs into SQLite
    Load,
    /// Generate, etl and load in sequence
    Run(GenerateArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config decides the default filter, so read it first and log the
    // outcome once a subscriber exists
    let loaded = TomlConfig::load_or_default(cli.config.as_deref());
    let level = match &loaded {
        Ok((config, _)) => config.logging.level.clone(),
        Err(_) => "info".to_string(),
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level)),
        )
        .init();

    info!("Starting viewfact {}", build_id());

    let (config, source) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            error!("{}", e);
            return Err(e.into());
        }
    };
    source.log();

    let root = resolve_root_folder(cli.root.as_deref(), &config);
    let layout = DataLayout::new(root);
    info!("Root folder: {}", layout.root().display());

    let result = match &cli.command {
        Command::Generate(args) => run_generate(&layout, &args.apply(config.generator.clone())),
        Command::Etl => run_etl(&layout).map(|_| ()),
        Command::Load => run_load(&layout).await.map(|_| ()),
        Command::Run(args) => {
            match run_generate(&layout, &args.apply(config.generator.clone()))
                .and_then(|_| run_etl(&layout))
            {
                Ok(_) => run_load(&layout).await.map(|_| ()),
                Err(e) => Err(e),
            }
        }
    };

    if let Err(e) = &result {
        error!("{}", e);
    }
    Ok(result?)
}
