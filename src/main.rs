use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use diagmarm::config::{DatabaseLocation, ServerConfig, parse_origins};
use diagmarm::rewrite::{AnthropicRewriter, DiagramRewriter};
use diagmarm::server::{AppState, create_router};
use diagmarm::service::{BootstrapReport, FolderService};
use diagmarm::store::{SqliteStore, Store};

#[derive(Parser)]
#[command(name = "diagmarm")]
#[command(about = "Mermaid diagram builder backend", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Serve {
        /// Host to bind to [env: HOST, default: 0.0.0.0]
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to [env: PORT, default: 5000]
        #[arg(long, short)]
        port: Option<u16>,

        /// SQLite database URI, e.g. "sqlite:///diagrams.db" [env: DATABASE_URI]
        #[arg(long)]
        database_uri: Option<String>,

        /// Comma-separated allowed origins, or "*" [env: CORS_ORIGINS]
        #[arg(long)]
        cors_origins: Option<String>,

        /// Verbose logging [env: DEBUG]
        #[arg(long)]
        debug: bool,
    },

    /// Create the database, the root folder, and file any unfiled diagrams
    Init {
        /// SQLite database URI [env: DATABASE_URI]
        #[arg(long)]
        database_uri: Option<String>,
    },
}

fn init_tracing(debug: bool) -> anyhow::Result<()> {
    let directive = if debug { "diagmarm=debug" } else { "diagmarm=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .init();
    Ok(())
}

/// Opens the store and brings the schema and folder tree up to date.
fn open_store(database: &DatabaseLocation) -> anyhow::Result<(SqliteStore, BootstrapReport)> {
    let store = database.open()?;
    store.initialize()?;
    let report = FolderService::new(&store).bootstrap()?;
    Ok((store, report))
}

fn run_init(config: &ServerConfig) -> anyhow::Result<()> {
    let (_, report) = open_store(&config.database)?;

    match &config.database {
        DatabaseLocation::File(path) => println!("Database: {}", path.display()),
        DatabaseLocation::Memory => println!("Database: in-memory"),
    }
    if report.created_root {
        println!("Created root folder (id {})", report.root.id);
    } else {
        println!("Root folder already exists (id {})", report.root.id);
    }
    println!("Unfiled diagrams moved to root: {}", report.migrated_diagrams);

    Ok(())
}

fn build_rewriter(config: &ServerConfig) -> anyhow::Result<Option<Arc<dyn DiagramRewriter>>> {
    let Some(api_key) = config.anthropic_api_key.as_deref() else {
        warn!("ANTHROPIC_API_KEY is not set; /api/update-diagram will answer 503");
        return Ok(None);
    };

    let rewriter = AnthropicRewriter::new(api_key, config.llm_model.as_str())?;
    info!("Diagram rewrites use model {}", rewriter.model());
    Ok(Some(Arc::new(rewriter)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;

    match cli.command {
        Commands::Init { database_uri } => {
            if let Some(uri) = database_uri {
                config.database = DatabaseLocation::from_uri(&uri)?;
            }
            init_tracing(config.debug)?;
            run_init(&config)?;
        }
        Commands::Serve {
            host,
            port,
            database_uri,
            cors_origins,
            debug,
        } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(uri) = database_uri {
                config.database = DatabaseLocation::from_uri(&uri)?;
            }
            if let Some(origins) = cors_origins {
                config.cors_origins = parse_origins(&origins);
            }
            config.debug |= debug;

            init_tracing(config.debug)?;

            let (store, _) = open_store(&config.database)?;
            let rewriter = build_rewriter(&config)?;

            let state = Arc::new(AppState::new(Arc::new(store), rewriter));
            let app = create_router(state, &config.cors_origins);
            let addr = config.socket_addr()?;

            info!("Starting server on {}", addr);

            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}
