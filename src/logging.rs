use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Registry,
    Layer,
};

use crate::error::StartupError;

/// Logging configuration for the summarizer
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub log_dir: PathBuf,
    pub enable_file_logging: bool,
    pub max_log_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            enable_file_logging: false,
            max_log_files: 10,
        }
    }
}

/// Keeps the non-blocking file writer alive; drop it only on exit.
#[must_use]
pub struct LoggingGuard {
    #[cfg(feature = "file_logging")]
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            // ONNX Runtime and the GL backend are chatty at info
            EnvFilter::new(format!(
                "pdf_summarizer={},ort=warn,eframe=warn,egui_glow=warn,{}",
                level, level
            ))
        })
}

/// Initialize the logging system
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, StartupError> {
    let registry = Registry::default().with(env_filter(&config.level));

    fn console_layer<S>() -> Box<dyn Layer<S> + Send + Sync>
    where
        S: tracing::Subscriber + for<'a> tracing_subscriber::registry::LookupSpan<'a>,
    {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .boxed()
    }

    #[cfg(feature = "file_logging")]
    let guard = if config.enable_file_logging {
        fs::create_dir_all(&config.log_dir)
            .map_err(|e| StartupError::file_io(
                config.log_dir.to_string_lossy().to_string(),
                e
            ))?;

        let file_appender = tracing_appender::rolling::daily(&config.log_dir, "pdf-summarizer.log");
        let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);

        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_ansi(false)
            .boxed();

        registry
            .with(file_layer)
            .with(console_layer())
            .try_init()
            .map_err(|e| StartupError::configuration(format!("logging already initialized: {}", e)))?;

        LoggingGuard { _file_guard: Some(file_guard) }
    } else {
        registry
            .with(console_layer())
            .try_init()
            .map_err(|e| StartupError::configuration(format!("logging already initialized: {}", e)))?;

        LoggingGuard { _file_guard: None }
    };

    #[cfg(not(feature = "file_logging"))]
    let guard = {
        if config.enable_file_logging {
            eprintln!("file logging requested but the file_logging feature is disabled");
        }
        registry
            .with(console_layer())
            .try_init()
            .map_err(|e| StartupError::configuration(format!("logging already initialized: {}", e)))?;
        LoggingGuard {}
    };

    info!("Logging initialized");
    info!("Log level: {}", config.level);

    if config.enable_file_logging {
        info!("File logging enabled: {}", config.log_dir.display());
    }

    Ok(guard)
}

/// Log system information for debugging
pub fn log_system_info() {
    info!("PDF Summarizer v{}", env!("CARGO_PKG_VERSION"));
    info!("System: {} {}", std::env::consts::OS, std::env::consts::ARCH);

    if let Ok(cwd) = std::env::current_dir() {
        info!("Working directory: {}", cwd.display());
    }
}

/// Logs how long an operation (and each of its stages) took
pub struct PerformanceTimer {
    start: std::time::Instant,
    operation: String,
}

impl PerformanceTimer {
    pub fn start(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        debug!(operation = %operation, "Timer started");
        Self {
            start: std::time::Instant::now(),
            operation,
        }
    }

    pub fn checkpoint(&self, checkpoint: &str) {
        info!(
            operation = %self.operation,
            stage = checkpoint,
            elapsed_ms = self.elapsed_ms() as u64,
            "Stage finished"
        );
    }

    pub fn elapsed_ms(&self) -> u128 {
        self.start.elapsed().as_millis()
    }
}

impl Drop for PerformanceTimer {
    fn drop(&mut self) {
        info!(
            operation = %self.operation,
            elapsed_ms = self.elapsed_ms() as u64,
            "Completed"
        );
    }
}

/// Clean up old log files, newest `max_log_files` are kept
pub fn cleanup_old_logs(config: &LoggingConfig) -> Result<usize, StartupError> {
    if !config.enable_file_logging || !config.log_dir.exists() {
        return Ok(0);
    }

    let mut log_files = Vec::new();

    let entries = fs::read_dir(&config.log_dir)
        .map_err(|e| StartupError::file_io(
            config.log_dir.to_string_lossy().to_string(),
            e
        ))?;

    for entry in entries {
        let entry = entry.map_err(|e| StartupError::file_io(
            config.log_dir.to_string_lossy().to_string(),
            e
        ))?;

        let path = entry.path();
        let is_log = path
            .file_name()
            .and_then(|s| s.to_str())
            .map_or(false, |name| name.starts_with("pdf-summarizer.log"));
        if is_log {
            if let Ok(metadata) = fs::metadata(&path) {
                log_files.push((path, metadata.modified().unwrap_or(std::time::SystemTime::UNIX_EPOCH)));
            }
        }
    }

    // Newest first
    log_files.sort_by(|a, b| b.1.cmp(&a.1));

    let mut removed = 0;
    if log_files.len() > config.max_log_files {
        for (path, _) in &log_files[config.max_log_files..] {
            if let Err(e) = fs::remove_file(path) {
                warn!("Failed to remove old log file {}: {}", path.display(), e);
            } else {
                info!("Removed old log file: {}", path.display());
                removed += 1;
            }
        }
    }

    Ok(removed)
}

/// Macro for logging a failed pipeline run with context
#[macro_export]
macro_rules! log_pipeline_error {
    ($run_id:expr, $error:expr) => {
        tracing::error!(
            run_id = $run_id,
            stage = $error.stage(),
            error = %$error,
            "Pipeline run failed"
        );
    };
}

#[macro_export]
macro_rules! log_processing_start {
    ($file:expr, $size:expr) => {
        tracing::info!(
            file = %$file,
            size_bytes = $size,
            "Starting PDF processing"
        );
    };
}

#[macro_export]
macro_rules! log_chunk_summarized {
    ($index:expr, $total:expr, $input_chars:expr, $output_chars:expr) => {
        tracing::debug!(
            chunk = $index,
            total = $total,
            input_chars = $input_chars,
            output_chars = $output_chars,
            "Summarized chunk"
        );
    };
}
