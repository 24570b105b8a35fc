mod config_commands;

use std::path::{Path, PathBuf};

use {
    clap::{Parser, Subcommand},
    lexbot_config::LexbotConfig,
    lexbot_messenger::{DeliveryOutcome, HttpMessengerBot},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "lexbot", about = "Lexbot, a messaging webhook bot", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to load instead of the discovered one.
    #[arg(long, global = true, env = "LEXBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,
    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the webhook server (default when no subcommand is provided).
    Gateway,
    /// Send a plain-text message to a platform user.
    Send {
        /// Recipient platform id.
        #[arg(long)]
        to: String,
        #[arg(short, long)]
        message: String,
    },
    /// Configuration management.
    Config {
        #[command(subcommand)]
        action: config_commands::ConfigAction,
    },
}

fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    if cli.json_logs {
        registry
            .with(fmt::layer().json().with_target(true).with_thread_ids(false))
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Load the config from `--config`, or discover it.
fn load(config_path: Option<&Path>) -> anyhow::Result<LexbotConfig> {
    match config_path {
        Some(path) => lexbot_config::load_config(path),
        None => Ok(lexbot_config::discover_and_load()),
    }
}

async fn send(config: &LexbotConfig, to: &str, message: &str) -> anyhow::Result<()> {
    let bot = HttpMessengerBot::from_config(config)?;
    match bot.send_text(to, message).await? {
        DeliveryOutcome::Delivered(receipt) => {
            println!("delivered ({})", receipt.status);
            Ok(())
        },
        DeliveryOutcome::Rejected(receipt) => anyhow::bail!(
            "send API rejected the message ({}): {}",
            receipt.status,
            receipt.body
        ),
        DeliveryOutcome::Failed(reason) => anyhow::bail!("delivery failed: {reason}"),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "lexbot starting");

    let config_path = cli.config.as_deref();
    match cli.command {
        // Default: start gateway when no subcommand is provided
        None | Some(Commands::Gateway) => {
            let mut config = load(config_path)?;

            // CLI args override config values
            if let Some(bind) = cli.bind {
                config.server.bind = bind;
            }
            if let Some(port) = cli.port {
                config.server.port = port;
            }

            lexbot_gateway::start_gateway(&config).await
        },
        Some(Commands::Send { to, message }) => send(&load(config_path)?, &to, &message).await,
        Some(Commands::Config { action }) => config_commands::handle_config(action, config_path),
    }
}
