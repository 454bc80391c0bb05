use thiserror::Error;

#[derive(Error, Debug)]
pub enum SmokeError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Prediction request failed: {message}")]
    PredictionError { message: String },

    #[error("Model error: {message}")]
    ModelError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Model,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Medium,
    High,
    Critical,
}

impl SmokeError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SmokeError::ConfigError { .. }
            | SmokeError::ConfigValidationError { .. }
            | SmokeError::InvalidConfigValueError { .. }
            | SmokeError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SmokeError::ApiError(_) | SmokeError::PredictionError { .. } => ErrorCategory::Network,
            SmokeError::CsvError(_)
            | SmokeError::SerializationError(_)
            | SmokeError::ValidationError { .. } => ErrorCategory::Data,
            SmokeError::ModelError { .. } => ErrorCategory::Model,
            SmokeError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 遠端服務暫時失敗，重跑通常可以解決
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data | ErrorCategory::Model => {
                ErrorSeverity::High
            }
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SmokeError::ApiError(_) => {
                "Check network connectivity and that the prediction endpoint is reachable"
            }
            SmokeError::PredictionError { .. } => {
                "Verify the project, model and version exist and the access token is valid"
            }
            SmokeError::CsvError(_)
            | SmokeError::SerializationError(_)
            | SmokeError::ValidationError { .. } => {
                "Check that the instances file matches the expected feature columns"
            }
            SmokeError::ModelError { .. } => "Check the local model file contents",
            SmokeError::IoError(_) => "Check that the file exists and is readable",
            SmokeError::MissingConfigError { .. } => {
                "Provide the missing value via a CLI flag or the config file"
            }
            SmokeError::ConfigError { .. }
            | SmokeError::ConfigValidationError { .. }
            | SmokeError::InvalidConfigValueError { .. } => {
                "Fix the configuration value and run again (see --help)"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Network => format!("Remote prediction failed: {}", self),
            ErrorCategory::Data => format!("Could not read prediction instances: {}", self),
            ErrorCategory::Model => format!("Local model failed: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }

    /// 依嚴重程度對應程序退出碼
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

pub type Result<T> = std::result::Result<T, SmokeError>;
