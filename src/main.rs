use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use chirashi::config::{ConfigFile, ServerConfig};
use chirashi::repository::{Repository, SqliteRepository};
use chirashi::server::validation::validate_analysis;
use chirashi::server::{AppState, create_router};
use chirashi::types::{DatePolicy, FlyerAnalysis};

const DB_FILE: &str = "chirashi.db";

#[derive(Parser)]
#[command(name = "chirashi")]
#[command(about = "Stores analyzed retail flyers and serves them by store", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the data directory and database schema
    Init {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,
    },

    /// Start the server
    Serve {
        /// TOML config file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(long, short)]
        port: Option<u16>,

        /// Data directory for the database
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Reject uploads whose campaign dates are not YYYY-MM-DD
        #[arg(long)]
        strict_dates: bool,
    },

    /// Store an already analyzed flyer from files
    Import {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Flyer image file
        #[arg(long)]
        image: PathBuf,

        /// Analysis result as JSON
        #[arg(long)]
        analysis: PathBuf,

        /// Reject campaign dates that are not YYYY-MM-DD
        #[arg(long)]
        strict_dates: bool,
    },

    /// Print the most recent flyer for a store as JSON
    Show {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Store ID
        #[arg(long)]
        store_id: String,

        /// Also write the flyer image to this file
        #[arg(long)]
        image_out: Option<PathBuf>,
    },

    /// List known stores as JSON
    Stores {
        /// Data directory for the database
        #[arg(long, default_value = "./data")]
        data_dir: PathBuf,

        /// Print only the store with this exact name
        #[arg(long)]
        name: Option<String>,
    },
}

fn date_policy(strict: bool) -> DatePolicy {
    if strict {
        DatePolicy::Strict
    } else {
        DatePolicy::Lenient
    }
}

fn open_repository(data_dir: &Path, date_policy: DatePolicy) -> anyhow::Result<SqliteRepository> {
    let db_path = data_dir.join(DB_FILE);
    if !db_path.exists() {
        bail!("Database not initialized. Run 'chirashi init' first to create it.");
    }

    let repo = SqliteRepository::new(&db_path)?.with_date_policy(date_policy);
    Ok(repo)
}

fn run_init(data_dir: &Path) -> anyhow::Result<()> {
    fs::create_dir_all(data_dir)?;

    let db_path = data_dir.join(DB_FILE);
    let repo = SqliteRepository::new(&db_path)?;
    repo.initialize()?;

    println!("Initialized database at {}", db_path.display());
    Ok(())
}

fn run_import(
    data_dir: &Path,
    image: &Path,
    analysis: &Path,
    date_policy: DatePolicy,
) -> anyhow::Result<()> {
    let repo = open_repository(data_dir, date_policy)?;

    let image_data =
        fs::read(image).with_context(|| format!("Failed to read image {}", image.display()))?;
    let raw = fs::read_to_string(analysis)
        .with_context(|| format!("Failed to read analysis {}", analysis.display()))?;
    let analysis: FlyerAnalysis = serde_json::from_str(&raw).context("Invalid analysis JSON")?;
    if let Err(e) = validate_analysis(&analysis) {
        bail!("Invalid analysis: {}", e.message);
    }

    let saved = repo.save_flyer(&image_data, &analysis)?;

    let summary = serde_json::json!({
        "id": saved.flyer.id,
        "store_id": saved.store_id,
        "items": analysis.items.len(),
        "created_at": saved.flyer.created_at,
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_show(data_dir: &Path, store_id: &str, image_out: Option<&Path>) -> anyhow::Result<()> {
    let repo = open_repository(data_dir, DatePolicy::default())?;

    let Some(stored) = repo.get_flyer_by_store_id(store_id)? else {
        bail!("No flyer found for store {store_id}");
    };

    if let Some(path) = image_out {
        fs::write(path, &stored.flyer.image_data)?;
    }

    let output = serde_json::json!({
        "id": stored.flyer.id,
        "store_id": stored.store_id,
        "created_at": stored.flyer.created_at,
        "flyer_data": stored.data,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn run_stores(data_dir: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let repo = open_repository(data_dir, DatePolicy::default())?;

    if let Some(name) = name {
        let Some(store) = repo.get_store_by_name(name)? else {
            bail!("No store named '{name}'");
        };
        println!("{}", serde_json::to_string_pretty(&store)?);
        return Ok(());
    }

    let stores = repo.list_stores()?;
    println!("{}", serde_json::to_string_pretty(&stores)?);
    Ok(())
}

async fn run_serve(config: ServerConfig) -> anyhow::Result<()> {
    let repo = open_repository(&config.data_dir, config.date_policy)?;
    repo.initialize()?;

    info!(
        "Using database {} ({:?} dates)",
        config.db_path().display(),
        config.date_policy
    );

    let addr = config.socket_addr()?;
    let state = Arc::new(AppState::new(Arc::new(repo), config));
    let app = create_router(state);

    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("chirashi=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { data_dir } => run_init(&data_dir)?,
        Commands::Serve {
            config,
            host,
            port,
            data_dir,
            strict_dates,
        } => {
            let mut server_config = ServerConfig::default();
            if let Some(path) = config {
                server_config = server_config.merge(ConfigFile::load(&path)?);
            }
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            if let Some(data_dir) = data_dir {
                server_config.data_dir = data_dir;
            }
            if strict_dates {
                server_config.date_policy = DatePolicy::Strict;
            }

            run_serve(server_config).await?;
        }
        Commands::Import {
            data_dir,
            image,
            analysis,
            strict_dates,
        } => run_import(&data_dir, &image, &analysis, date_policy(strict_dates))?,
        Commands::Show {
            data_dir,
            store_id,
            image_out,
        } => run_show(&data_dir, &store_id, image_out.as_deref())?,
        Commands::Stores { data_dir, name } => run_stores(&data_dir, name.as_deref())?,
    }

    Ok(())
}
