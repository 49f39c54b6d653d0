mod config_commands;
mod sentiment_commands;

use {
    anyhow::Result,
    clap::{Parser, Subcommand},
    std::path::PathBuf,
    tonality_config::TonalityConfig,
    tonality_metrics::{MetricsRecorderConfig, init_metrics},
    tracing::debug,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

#[derive(Parser)]
#[command(name = "tonality", about = "Tonality, sentiment annotation for chat messages")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Config file to use instead of the discovered one.
    #[arg(long, global = true, env = "TONALITY_CONFIG")]
    config: Option<PathBuf>,

    /// Remote timeout in seconds (overrides config value).
    #[arg(long, global = true)]
    timeout: Option<u64>,

    /// Skip the remote model and use the local lexicon only.
    #[arg(long, global = true, default_value_t = false)]
    offline: bool,

    /// Print Prometheus metrics to stderr after the command.
    #[arg(long, global = true, default_value_t = false)]
    metrics: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline on a message.
    Analyze {
        /// Message text.
        text: String,
    },
    /// Classify a message with the local lexicon only.
    Classify {
        /// Message text.
        text: String,
    },
    /// Extract a sentiment from a raw reply payload.
    Extract {
        /// Read the payload from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
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

    // Logs go to stderr so command output on stdout stays machine-readable.
    if cli.json_logs {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

/// Load config (explicit path or discovery) and apply command-line overrides.
fn load_config(cli: &Cli) -> Result<TonalityConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = tonality_config::load_config(path)?;
            tonality_config::apply_env_overrides(&mut config);
            config
        },
        None => tonality_config::discover_and_load(),
    };
    if let Some(secs) = cli.timeout {
        config.remote.timeout_secs = secs;
    }
    if cli.offline {
        config.remote.enabled = false;
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_telemetry(&cli);
    let metrics = init_metrics(MetricsRecorderConfig {
        enabled: cli.metrics,
    })?;

    debug!(version = env!("CARGO_PKG_VERSION"), "tonality starting");

    let succeeded = match &cli.command {
        Commands::Analyze { text } => {
            let config = load_config(&cli)?;
            sentiment_commands::analyze(&config, text).await?
        },
        Commands::Classify { text } => {
            let config = load_config(&cli)?;
            sentiment_commands::classify(&config, text)?
        },
        Commands::Extract { file } => sentiment_commands::extract(file.as_deref())?,
        Commands::Config { action } => config_commands::handle_config(action, cli.config.as_deref()),
    };

    if cli.metrics {
        eprint!("{}", metrics.render());
    }

    if !succeeded {
        std::process::exit(1);
    }
    Ok(())
}
