use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use runtime::{AppConfig, CliArgs};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use std::future::IntoFuture;
use std::path::PathBuf;
use std::time::Duration;
use users_info::UsersInfo;

mod http;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const MEMORY_DSN: &str = "sqlite::memory:";

/// Users Server - HTTP service for managing user records
#[derive(Parser)]
#[command(name = "users-server")]
#[command(about = "Users Server - HTTP service for managing user records")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use an in-memory SQLite database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // CLI args passed down to config/app
    let args = CliArgs {
        port: cli.port,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    // Apply CLI overrides (port / verbosity)
    config.apply_cli_overrides(&args);

    // Print config and exit if requested
    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    // Relative log files land next to the working directory
    let base_dir = std::env::current_dir().context("Failed to resolve working directory")?;
    let logging_config = config.logging.as_ref().cloned().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &base_dir);
    tracing::info!("Users Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, args).await,
        Commands::Check => check_config(config),
    }
}

/// Pick the DSN to connect to: in-memory SQLite for `--mock` or a missing
/// database section, the configured URL otherwise.
fn resolve_dsn(config: &AppConfig, args: &CliArgs) -> Result<String> {
    if args.mock {
        return Ok(MEMORY_DSN.to_string());
    }
    match &config.database {
        Some(db) => {
            let url = db.url.trim();
            if url.is_empty() {
                anyhow::bail!("Database URL not configured");
            }
            Ok(url.to_string())
        }
        None => {
            tracing::warn!("No database configuration found, using in-memory SQLite");
            Ok(MEMORY_DSN.to_string())
        }
    }
}

/// Mask the password of a URL-shaped DSN before it reaches logs or errors.
fn redact_credentials_in_dsn(dsn: &str) -> String {
    if !dsn.contains('@') {
        return dsn.to_string();
    }
    match url::Url::parse(dsn) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                let _ = parsed.set_password(Some("***"));
            }
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}

async fn connect(dsn: &str, max_conns: Option<u32>) -> Result<DatabaseConnection> {
    let mut opts = ConnectOptions::new(dsn.to_owned());
    // Every pooled in-memory connection would see its own empty database
    let max_conns = if dsn == MEMORY_DSN {
        1
    } else {
        max_conns.unwrap_or(10)
    };
    opts.max_connections(max_conns)
        .acquire_timeout(Duration::from_secs(5))
        .sqlx_logging(false);

    let shown = redact_credentials_in_dsn(dsn);
    tracing::info!("Connecting to database: {}", shown);
    Database::connect(opts)
        .await
        .with_context(|| format!("Failed to connect to database '{}'", shown))
}

async fn run_server(config: AppConfig, args: CliArgs) -> Result<()> {
    tracing::info!("Initializing modules...");

    let dsn = resolve_dsn(&config, &args)?;
    let max_conns = config.database.as_ref().and_then(|db| db.max_conns);
    let db = connect(&dsn, max_conns).await?;

    let users = UsersInfo::init(db, &config.users_info).await?;

    let request_timeout = match config.server.request_timeout_sec {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    let router = http::build_router(&users, request_timeout);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    tracing::info!("HTTP server bound on {}", addr);

    let (signalled_tx, signalled_rx) = tokio::sync::oneshot::channel::<()>();
    let serve = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            match wait_for_shutdown().await {
                Ok(()) => tracing::info!("HTTP server shutting down gracefully"),
                Err(e) => tracing::error!("Failed to listen for shutdown signals: {}", e),
            }
            let _ = signalled_tx.send(());
        })
        .into_future();
    tokio::pin!(serve);

    let grace = Duration::from_secs(config.server.shutdown_grace_sec);
    tokio::select! {
        res = &mut serve => res.context("HTTP server failed")?,
        Ok(()) = signalled_rx => {
            match tokio::time::timeout(grace, &mut serve).await {
                Ok(res) => res.context("HTTP server failed")?,
                Err(_) => tracing::warn!(
                    "Shutdown grace period of {:?} elapsed, dropping in-flight requests",
                    grace
                ),
            }
        }
    }

    tracing::info!("Users Server stopped");
    Ok(())
}

async fn wait_for_shutdown() -> Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?; // Ctrl+C
        tokio::select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
        Ok(())
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
        Ok(())
    }
}

fn check_config(config: AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    if let Some(db) = &config.database {
        if db.url.trim().is_empty() {
            anyhow::bail!("Database URL not configured");
        }
    }
    if config.users_info.default_page_size == 0
        || config.users_info.default_page_size > config.users_info.max_page_size
    {
        anyhow::bail!(
            "users_info.default_page_size must be between 1 and max_page_size ({})",
            config.users_info.max_page_size
        );
    }

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("{}", config.to_yaml()?);

    Ok(())
}
