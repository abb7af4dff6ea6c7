use std::sync::Arc;

use {
    clap::{Parser, Subcommand},
    tracing::info,
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

use {
    palaver_config::PalaverConfig,
    palaver_gateway::server::start_gateway,
    palaver_providers::{FallbackChain, StreamingBackend, WorkersAiBackend},
};

#[derive(Parser)]
#[command(name = "palaver", about = "Palaver — streaming conversational relay gateway")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    /// Address to bind to (overrides config value).
    #[arg(long, global = true)]
    bind: Option<String>,

    /// Port to listen on (overrides config value).
    #[arg(long, global = true)]
    port: Option<u16>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the relay gateway (default when no subcommand is provided).
    Serve,
    /// Print the backend candidates in fallback order.
    Candidates,
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

/// One backend per configured candidate, in priority order.
fn build_chain(config: &PalaverConfig) -> FallbackChain {
    let backends = config
        .backend
        .candidates
        .iter()
        .map(|model| {
            Arc::new(WorkersAiBackend::new(
                model.clone(),
                config.backend.base_url.clone(),
                config.backend.api_token.clone(),
            )) as Arc<dyn StreamingBackend>
        })
        .collect();
    FallbackChain::new(backends)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), "palaver starting");

    let mut config = palaver_config::discover_and_load();
    if let Some(ref bind) = cli.bind {
        config.server.bind = bind.clone();
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    match cli.command {
        None | Some(Commands::Serve) => {
            let chain = build_chain(&config);
            start_gateway(&config, chain).await
        },
        Some(Commands::Candidates) => {
            for candidate in &config.backend.candidates {
                println!("{candidate}");
            }
            Ok(())
        },
    }
}
