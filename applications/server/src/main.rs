/// Roster Server - users collection over HTTP
use clap::{Parser, Subcommand};
use roster_server::{api, config::ServerConfig, services::UserService, state::AppState};
use roster_storage::SqliteUserStore;
use serde_json::json;
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "roster-server")]
#[command(about = "Roster users service", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Create a new user
    AddUser {
        /// Username
        #[arg(short, long)]
        username: String,
        /// Password
        #[arg(short, long)]
        password: String,
    },
    /// Print a stored user as JSON
    ShowUser {
        /// Username
        username: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "roster_server=info,roster_storage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = ServerConfig::load(cli.config.as_deref())?;
    config.validate()?;

    match cli.command {
        Commands::Serve => {
            serve(&config).await?;
        }
        Commands::AddUser { username, password } => {
            add_user(&config, &username, &password).await?;
        }
        Commands::ShowUser { username } => {
            show_user(&config, &username).await?;
        }
    }

    Ok(())
}

async fn serve(config: &ServerConfig) -> anyhow::Result<()> {
    tracing::info!("Starting Roster Server");
    tracing::info!("Host: {}", config.server.host);
    tracing::info!("Port: {}", config.server.port);

    let store = SqliteUserStore::open(&config.storage.database_url).await?;
    let app = api::router(AppState::new(Arc::new(store)));

    let addr = SocketAddr::from((
        config.server.host.parse::<std::net::IpAddr>()?,
        config.server.port,
    ));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn user_service(config: &ServerConfig) -> anyhow::Result<UserService> {
    let store = SqliteUserStore::open(&config.storage.database_url).await?;
    Ok(UserService::new(Arc::new(store)))
}

async fn add_user(config: &ServerConfig, username: &str, password: &str) -> anyhow::Result<()> {
    let users = user_service(config).await?;

    let candidate = json!({ "username": username, "password": password });
    let user = users.create_user(Some(&candidate)).await?;

    tracing::info!("Created user: {}", user.username);
    Ok(())
}

async fn show_user(config: &ServerConfig, username: &str) -> anyhow::Result<()> {
    let users = user_service(config).await?;
    let user = users.get_user(username).await?;

    println!("{}", serde_json::to_string_pretty(&user)?);
    Ok(())
}
