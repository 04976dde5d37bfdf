//! BarLink daemon — entry point for running the registration bot.

use std::path::PathBuf;
use std::sync::Arc;

use barlink_channel::WhatsAppChannel;
use barlink_engine::RegistrationEngine;
use barlink_store_json::JsonFileStore;
use barlink_webhook::{AppState, BotConfig, InboundProcessor, WebhookServer};
use clap::Parser;

#[derive(Parser)]
#[command(name = "barlink-daemon", about = "BarLink registration bot daemon")]
struct Cli {
    /// Port for the webhook listener.
    #[arg(long, env = "BARLINK_PORT")]
    port: Option<u16>,

    /// Webhook verification token.
    #[arg(long, env = "BARLINK_VERIFY_TOKEN")]
    verify_token: Option<String>,

    /// Graph API access token.
    #[arg(long, env = "BARLINK_ACCESS_TOKEN")]
    access_token: Option<String>,

    /// WhatsApp business phone number id.
    #[arg(long, env = "BARLINK_PHONE_NUMBER_ID")]
    phone_number_id: Option<String>,

    /// App secret for webhook signature verification.
    #[arg(long, env = "BARLINK_APP_SECRET")]
    app_secret: Option<String>,

    /// Path to the JSON record store.
    #[arg(long, env = "BARLINK_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "BARLINK_LOG_LEVEL")]
    log_level: String,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the webhook server.
    Serve,
}

fn init_tracing(level: &str, format: &str) {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    if format == "json" {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// Merge file config (if any) under CLI/env overrides. Returns the final
/// config plus a note about how the file load went, emitted once tracing
/// is up.
fn load_config(cli: &Cli) -> (BotConfig, Option<String>) {
    let (base, note) = match &cli.config {
        Some(path) => match BotConfig::from_toml_file(&path.display().to_string()) {
            Ok(cfg) => (cfg, Some(format!("loaded config from {}", path.display()))),
            Err(e) => (
                BotConfig::default(),
                Some(format!("failed to load config file: {e}, using defaults")),
            ),
        },
        None => (BotConfig::default(), None),
    };

    let merged = BotConfig {
        port: cli.port.unwrap_or(base.port),
        verify_token: cli.verify_token.clone().unwrap_or(base.verify_token),
        access_token: cli.access_token.clone().unwrap_or(base.access_token),
        phone_number_id: cli
            .phone_number_id
            .clone()
            .unwrap_or(base.phone_number_id),
        app_secret: cli.app_secret.clone().or(base.app_secret),
        data_file: cli.data_file.clone().unwrap_or(base.data_file),
        log_level: cli.log_level.clone(),
        ..base
    };
    (merged, note)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, load_note) = load_config(&cli);
    init_tracing(&config.log_level, &config.log_format);
    if let Some(note) = load_note {
        tracing::info!("{note}");
    }

    match cli.command {
        Command::Serve => {
            tracing::info!(
                port = config.port,
                data_file = %config.data_file.display(),
                signature_check = config.app_secret.is_some(),
                "starting BarLink bot"
            );

            let store = JsonFileStore::open(&config.data_file)?;
            let channel = WhatsAppChannel::new(
                config.phone_number_id.clone(),
                config.access_token.clone(),
            )
            .with_base_url(&config.graph_api_base);
            let engine = RegistrationEngine::new(store, &config.params);
            let processor = InboundProcessor::new(engine, channel, config.dedup_capacity);

            let state = Arc::new(AppState {
                processor,
                verify_token: config.verify_token.clone(),
                app_secret: config.app_secret.clone(),
            });

            WebhookServer::new(config.port, state).start().await?;
            tracing::info!("BarLink daemon exited cleanly");
        }
    }

    Ok(())
}
