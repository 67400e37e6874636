//! event-target CLI - Main entry point

use clap::{Parser, Subcommand};
use event_target::{init_global_registry, RegistryConfig, SETTINGS_FILE};
use event_target_cli::scenarios;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// evtarget - run event target scenarios
#[derive(Parser, Debug)]
#[command(name = "evtarget")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Registry settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Trace every dispatch and delivery
    #[arg(long)]
    trace: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Visitor and mail events on a house
    House {
        /// Who is visiting
        #[arg(short, long, default_value = "mum")]
        who: String,
    },
    /// Wait for the next click with once()
    Once {
        /// Buttons to click, in order
        #[arg(default_values_t = [42, 69])]
        buttons: Vec<u32>,
    },
    /// Loose events on a bare target
    Bare,
    /// Host that keeps dispatch private
    Private,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.trace {
        "trace"
    } else if args.debug {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // 설정 로드 후 전역 레지스트리 초기화
    let config_path = args.config.unwrap_or_else(|| PathBuf::from(SETTINGS_FILE));
    let config = RegistryConfig::load_or_default(&config_path)?.with_trace_dispatch(args.trace);
    let registry = init_global_registry(config);
    info!(
        failure_policy = registry.config().failure_policy.as_str(),
        "Registry ready"
    );

    match args.command {
        Command::House { who } => scenarios::house(&who)?,
        Command::Once { buttons } => scenarios::once(&buttons).await?,
        Command::Bare => scenarios::bare()?,
        Command::Private => scenarios::private()?,
    }

    info!(dispatches = registry.dispatch_count(), "Done");
    Ok(())
}
