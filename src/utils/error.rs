use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{service} request failed: {source}")]
    NetworkError {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{service} returned HTTP {status}{}", server_detail(.server_message))]
    HttpStatusError {
        service: &'static str,
        status: u16,
        server_message: Option<String>,
    },

    #[error("No country found at latitude {latitude}, longitude {longitude}")]
    UnknownLocation { latitude: f64, longitude: f64 },

    #[error("Unexpected response from {service}: {message}")]
    MalformedResponse {
        service: &'static str,
        message: String,
    },

    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid configuration value for {field} ('{value}'): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Upstream,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl AppError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::NetworkError { .. } | AppError::HttpStatusError { .. } => {
                ErrorCategory::Network
            }
            AppError::UnknownLocation { .. } | AppError::MalformedResponse { .. } => {
                ErrorCategory::Upstream
            }
            AppError::InvalidCoordinate { .. } | AppError::InvalidRequest { .. } => {
                ErrorCategory::Input
            }
            AppError::ConfigError { .. }
            | AppError::MissingConfigError { .. }
            | AppError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            AppError::IoError(_) | AppError::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // soft failures: the session stays usable and the next click retries
            ErrorCategory::Upstream | ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network => ErrorSeverity::Medium,
            ErrorCategory::System => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Whether the message should be shown as a warning rather than an error.
    pub fn is_soft(&self) -> bool {
        self.severity() == ErrorSeverity::Low
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            AppError::NetworkError { service, .. } => {
                format!("Could not reach the {} service.", service)
            }
            AppError::HttpStatusError {
                service,
                status,
                server_message,
            } => match server_message {
                Some(message) => format!(
                    "The {} service rejected the request (HTTP {}). Server message: {}",
                    service, status, message
                ),
                None => format!(
                    "The {} service rejected the request (HTTP {}).",
                    service, status
                ),
            },
            AppError::UnknownLocation { .. } => {
                "No country information was found for the selected location. Please click somewhere else."
                    .to_string()
            }
            AppError::MalformedResponse { service, .. } => {
                format!("The {} service returned a response in an unexpected format.", service)
            }
            AppError::InvalidCoordinate { message } => format!("Invalid map position: {}", message),
            AppError::InvalidRequest { message } => format!("Malformed click request: {}", message),
            AppError::MissingConfigError { field } => {
                format!("Required setting '{}' is not configured.", field)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            AppError::MissingConfigError { .. } => {
                "Set CALENDARIFIC_API_KEY in the environment or holidays.api_key in holiday-map.toml"
            }
            AppError::InvalidConfigValueError { .. } | AppError::ConfigError { .. } => {
                "Check holiday-map.toml and the environment overrides"
            }
            AppError::NetworkError { .. } => "Check the network connection and click the map again",
            AppError::HttpStatusError { status: 401, .. }
            | AppError::HttpStatusError { status: 403, .. } => {
                "Verify that the Calendarific API key is valid"
            }
            AppError::HttpStatusError { status: 429, .. } => "Wait a moment before clicking again",
            AppError::HttpStatusError { .. } | AppError::MalformedResponse { .. } => {
                "Try again later"
            }
            AppError::UnknownLocation { .. } => "Click on land inside a country",
            AppError::InvalidCoordinate { .. } => "Click inside the map bounds",
            AppError::InvalidRequest { .. } => "Send a JSON body with numeric lat and lng fields",
            AppError::IoError(_) | AppError::SerializationError(_) => {
                "Check file permissions and contents"
            }
        }
    }
}

fn server_detail(message: &Option<String>) -> String {
    message
        .as_deref()
        .map(|m| format!(": {}", m))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, AppError>;
