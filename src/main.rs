use std::fs::File;
use std::path::PathBuf;

use avatar_relay::ProviderKind;
use avatar_relay::core::config::{self, CliOverrides, EnvSnapshot};
use avatar_relay::server::{self, RelayState};
use clap::Parser;
use simplelog::{
    ColorChoice, CombinedLogger, ConfigBuilder, LevelFilter, SharedLogger, TermLogger,
    TerminalMode, WriteLogger,
};

#[derive(Parser)]
#[command(
    name = "avatar-relay",
    about = "WebSocket relay between a chat-driven avatar and an LLM provider"
)]
struct Args {
    /// Address to bind
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Pin the provider instead of detecting it from credentials
    #[arg(long, value_enum)]
    provider: Option<ProviderKind>,

    /// Only answer relay messages starting with this character
    #[arg(long)]
    require_prefix: Option<char>,

    /// Upper bound on one upstream call, in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Config file (defaults to ~/.avatar-relay/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn init_logging() {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();

    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Info,
        log_config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    // File logger - writes to avatar-relay.log in current directory
    if let Ok(log_file) = File::create("avatar-relay.log") {
        loggers.push(WriteLogger::new(LevelFilter::Debug, log_config, log_file));
    }
    let _ = CombinedLogger::init(loggers);
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();
    init_logging();

    let file_config = match args.config.clone().or_else(config::config_path) {
        Some(path) => match config::load_config(&path) {
            Ok(file_config) => file_config,
            Err(e) => {
                log::warn!("{}; falling back to defaults", e);
                config::RelayConfig::default()
            }
        },
        None => {
            log::warn!("Could not determine home directory, using default config");
            config::RelayConfig::default()
        }
    };

    let cli = CliOverrides {
        host: args.host,
        port: args.port,
        provider: args.provider,
        require_prefix: args.require_prefix,
        timeout_secs: args.timeout_secs,
    };
    let resolved = config::resolve(&file_config, &EnvSnapshot::from_process(), &cli);

    match resolved.providers.resolve_kind(resolved.provider.map(ProviderKind::as_str)) {
        Ok(kind) => log::info!("Relay starting with provider: {}", kind.as_str()),
        Err(e) => log::warn!("{} Messages will receive error replies.", e),
    }

    let listener = tokio::net::TcpListener::bind(resolved.bind_addr()).await?;
    server::serve_with_shutdown(listener, RelayState::from_config(&resolved), shutdown_signal())
        .await
}
