use std::{io, path::PathBuf};

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{debug, info};

use estimate_cli::{
    AppConfig, ConsoleView, Overrides, Session, TracingAnalytics, logging, schema_loader,
};
use estimate_core::{ControllerOptions, EstimateFormController};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Console front-end for the auto-body estimate request form.
///
/// Walks through the form step by step and hands the finished request to
/// the configured transport backend.
#[derive(Debug, Parser)]
#[command(version)]
struct Cli {
    /// TOML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Form schema to use instead of the built-in auto-body layout.
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Transport backend (`simulated`, `outbox`).
    #[arg(long)]
    backend: Option<String>,

    /// Backend target: delay in ms for `simulated`, a directory for `outbox`.
    #[arg(long)]
    target: Option<String>,

    /// Log level or `EnvFilter` directive.
    #[arg(long)]
    log_level: Option<String>,

    /// Print the available transport backends and exit.
    #[arg(long)]
    list_backends: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            schema: self.schema.clone(),
            backend: self.backend.clone(),
            target: self.target.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config =
        AppConfig::load_or_default(cli.config.as_deref()).context("loading configuration")?;
    config.apply(cli.overrides());

    logging::init_logging(&config.logging.level, config.logging.stdout)?;
    if let Some(path) = &config.logging.file {
        logging::enable_file_logging(path)?;
    }

    let registry = estimate_transport::builtin_registry();
    if cli.list_backends {
        for name in registry.available_backends() {
            println!("{name}");
        }
        return Ok(());
    }

    info!(
        app = logging::app_name(),
        backend = %config.transport.backend,
        "starting estimate form"
    );

    let schema = schema_loader::load(config.schema.as_deref()).context("loading form schema")?;
    let transport = registry
        .create(&config.transport)
        .await
        .context("creating submission transport")?;

    let view = ConsoleView::new(io::stdout(), &schema);
    let options = ControllerOptions {
        policy: config.submit.policy(),
        ..ControllerOptions::default()
    };
    let form = EstimateFormController::new(schema, view, transport, options)
        .with_analytics(Box::new(TracingAnalytics));

    let end = Session::new(form)
        .run(BufReader::new(tokio::io::stdin()))
        .await?;
    debug!(?end, "session finished");

    Ok(())
}
