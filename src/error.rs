use thiserror::Error;

/// Failure to turn a PDF into text
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("File I/O error: {path}")]
    FileIO {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse PDF {path}: {message}")]
    Parse { path: String, message: String },

    #[error("PDF is encrypted: {path}")]
    Encrypted { path: String },

    #[error("Failed to extract text from page {page}: {message}")]
    Page { page: u32, message: String },
}

/// Failure inside the chunked summarization stage
#[derive(Error, Debug)]
pub enum SummarizationError {
    #[error("Model failed on chunk {chunk} of {total}: {message}")]
    Model {
        chunk: usize,
        total: usize,
        message: String,
    },

    #[error("Invalid chunk size: {0}")]
    InvalidChunkSize(usize),
}

/// Failure while building the chart or the word cloud
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("No words left to visualize after removing stopwords and short words")]
    NoTokens,

    #[error("Rendering failed: {message}")]
    Render { message: String },
}

impl VisualizationError {
    pub fn render(message: impl Into<String>) -> Self {
        Self::Render {
            message: message.into(),
        }
    }
}

/// Any failure of a single pipeline run, as seen by the UI
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Summarization(#[from] SummarizationError),

    #[error(transparent)]
    Visualization(#[from] VisualizationError),

    #[error("Processing timeout after {seconds} seconds")]
    Timeout { seconds: u64 },

    #[error("Background task failed: {message}")]
    Task { message: String },
}

impl PipelineError {
    /// Stage name used in log fields
    pub fn stage(&self) -> &'static str {
        match self {
            PipelineError::Extraction(_) => "extraction",
            PipelineError::Summarization(_) => "summarization",
            PipelineError::Visualization(_) => "visualization",
            PipelineError::Timeout { .. } => "timeout",
            PipelineError::Task { .. } => "task",
        }
    }

    /// Text shown in the error dialog
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Extraction(ExtractionError::Encrypted { .. }) => {
                "This PDF is encrypted and cannot be read.".to_string()
            }
            PipelineError::Timeout { seconds } => {
                format!("Processing took longer than {} seconds. Try a smaller document.", seconds)
            }
            other => other.to_string(),
        }
    }
}

/// Errors raised before the window becomes interactive
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Failed to load summarization model from {path}: {message}")]
    Model { path: String, message: String },

    #[error("Failed to load stopwords from {path}")]
    Stopwords {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("No usable font found: {message}")]
    Font { message: String },

    #[error("File I/O error: {path}")]
    FileIO {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl StartupError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn file_io(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::FileIO {
            path: path.into(),
            source,
        }
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
