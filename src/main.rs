use anyhow::Result;
use clap::{Parser, Subcommand};
use std::sync::Arc;
use taskdeck::{config::Config, rest, AppContext};
use tracing::{info, warn};

#[derive(Parser)]
#[command(
    name = "taskdeck",
    about = "taskdeck — local-first project & task daemon with AI-assisted insights",
    version
)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// REST server port
    #[arg(long, env = "TASKDECK_PORT")]
    port: Option<u16>,

    /// Data directory for the SQLite database and config.toml
    #[arg(long, env = "TASKDECK_DATA_DIR")]
    data_dir: Option<std::path::PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "TASKDECK_LOG")]
    log: Option<String>,

    /// Bind address (default: 127.0.0.1; use 0.0.0.0 for LAN access)
    #[arg(long, env = "TASKDECK_BIND")]
    bind_address: Option<String>,

    /// Write logs to this file path (rotated daily). Optional.
    #[arg(long, env = "TASKDECK_LOG_FILE")]
    log_file: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the daemon server (default when no subcommand given).
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = Arc::new(Config::new(
        args.port,
        args.data_dir,
        args.log,
        args.bind_address,
    ));

    let _log_guard = setup_logging(&config.log, args.log_file.as_deref(), &config.log_format);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
    }
}

async fn serve(config: Arc<Config>) -> Result<()> {
    info!(
        "taskdeck v{} starting (data dir: {})",
        env!("CARGO_PKG_VERSION"),
        config.data_dir.display()
    );

    let ctx = Arc::new(AppContext::bootstrap(config).await?);

    // Initial session load. A failure leaves the mirror empty and recoverable
    // by the client-driven reload, so it does not abort startup.
    if let Err(e) = ctx.state.load().await {
        warn!("initial load failed: {e}");
    }

    if ctx.config.openai_api_key.is_none() {
        warn!("OPENAI_API_KEY not set — the analysis route will answer 500 until configured");
    }

    rest::start_rest_server(ctx).await
}

fn setup_logging(
    log_level: &str,
    log_file: Option<&std::path::Path>,
    log_format: &str,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let use_json = log_format == "json";

    if let Some(path) = log_file {
        let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
        let filename = path
            .file_name()
            .unwrap_or_else(|| std::ffi::OsStr::new("taskdeck.log"));

        // Ensure the directory exists before tracing-appender tries to open it.
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "warn: could not create log directory '{}': {e} — falling back to stdout",
                dir.display()
            );
            if use_json {
                tracing_subscriber::fmt().json().with_env_filter(log_level).init();
            } else {
                tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
            }
            return None;
        }

        let appender = tracing_appender::rolling::daily(dir, filename);
        let (non_blocking, guard) = tracing_appender::non_blocking(appender);

        if use_json {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().json())
                .with(fmt::layer().json().with_writer(non_blocking))
                .init();
        } else {
            tracing_subscriber::registry()
                .with(EnvFilter::new(log_level))
                .with(fmt::layer().compact())
                .with(fmt::layer().with_ansi(false).with_writer(non_blocking))
                .init();
        }
        return Some(guard);
    }

    if use_json {
        tracing_subscriber::fmt().json().with_env_filter(log_level).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(log_level).compact().init();
    }
    None
}
