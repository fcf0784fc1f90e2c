use thiserror::Error;

#[derive(Error, Debug)]
pub enum RoadnetError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("OSM decoding error: {0}")]
    OsmError(#[from] osmpbf::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Geocoding failed for '{region}': {message}")]
    GeocodingError { region: String, message: String },

    #[error("Data processing error: {message}")]
    ProcessingError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Input,
    Processing,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code: 2 for retryable failures, 1 for processing, 3 for system errors.
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Medium => 2,
            Self::High => 1,
            Self::Critical => 3,
        }
    }
}

impl RoadnetError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::ApiError(_) | Self::GeocodingError { .. } => ErrorCategory::Network,
            Self::OsmError(_) | Self::SerializationError(_) | Self::ValidationError { .. } => {
                ErrorCategory::Input
            }
            Self::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => ErrorCategory::Input,
            Self::ProcessingError { .. } => ErrorCategory::Processing,
            Self::ZipError(_) | Self::CsvError(_) | Self::IoError(_) => ErrorCategory::Output,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ApiError(_) | Self::GeocodingError { .. } | Self::ValidationError { .. } => {
                ErrorSeverity::Medium
            }
            Self::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Exit code the CLI terminates with for this error.
    pub fn exit_code(&self) -> i32 {
        self.severity().exit_code()
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the configuration file or command-line arguments"
            }
            ErrorCategory::Network => {
                "Check network access to the geocoder, or set an explicit bbox in [source]"
            }
            ErrorCategory::Input => {
                "Make sure the input file exists and is a valid config, OSM PBF or graph JSON file"
            }
            ErrorCategory::Processing => {
                "Check that the bounding box overlaps the OSM extract and road types are correct"
            }
            ErrorCategory::Output => "Check that the output directory is writable and has free space",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(e) if e.is_timeout() => {
                "The geocoding service did not answer in time".to_string()
            }
            Self::IoError(e) if e.kind() == std::io::ErrorKind::NotFound => {
                format!("File not found: {}", e)
            }
            Self::OsmError(_) => format!("Could not read the OSM extract: {}", self),
            _ => self.to_string(),
        }
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::ProcessingError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, RoadnetError>;
