use anyhow::{anyhow, Context, Result};
use clap::Parser;
use eframe::{egui, NativeOptions};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use pdf_summarizer::app::{SummarizerApp, WINDOW_SIZE, WINDOW_TITLE};
use pdf_summarizer::config::AppConfig;
use pdf_summarizer::controller::RunDispatcher;
use pdf_summarizer::logging::{cleanup_old_logs, init_logging, log_system_info};
use pdf_summarizer::pipeline::Pipeline;
use pdf_summarizer::resources::Resources;

#[derive(Parser)]
#[command(name = "pdf-summarizer")]
#[command(about = "Summarize a PDF and chart its most frequent words")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?
            .apply_env(),
        None => AppConfig::load_from_env(),
    };
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let logging_config = config.logging.to_logging_config();
    let _log_guard = init_logging(&logging_config)?;
    log_system_info();
    match cleanup_old_logs(&logging_config) {
        Ok(0) => {}
        Ok(removed) => info!(removed, "Removed old log files"),
        Err(e) => warn!("Log cleanup failed: {}", e),
    }

    let resources = match Resources::load(&config.resources, &config.pipeline) {
        Ok(resources) => resources,
        Err(e) => {
            error!("Startup failed: {}", e);
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    info!(model = resources.model.name(), "Resources ready");

    let pipeline = Arc::new(Pipeline::new(Arc::new(resources)));
    let dispatcher = RunDispatcher::new(Duration::from_secs(config.pipeline.timeout_secs))
        .context("starting background runtime")?;

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(WINDOW_SIZE)
            .with_resizable(true)
            .with_title(WINDOW_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(SummarizerApp::new(cc, pipeline, dispatcher)))),
    )
    .map_err(|e| anyhow!("GUI error: {}", e))?;

    info!("Window closed");
    Ok(())
}
