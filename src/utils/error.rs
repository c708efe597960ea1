use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown puzzle: {name}")]
    UnknownPuzzle { name: String },

    #[error("Simulation '{puzzle}' did not finish within {limit} rounds")]
    SimulationDiverged { puzzle: String, limit: u64 },

    #[error("Simulation task failed: {message}")]
    TaskError { message: String },

    #[error("Processing error: {message}")]
    ProcessingError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Simulation,
    Output,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// Process exit code used by the binaries.
    pub fn exit_code(self) -> i32 {
        match self {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }
}

impl SimError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SimError::ConfigValidationError { .. }
            | SimError::InvalidConfigValueError { .. }
            | SimError::UnknownPuzzle { .. } => ErrorCategory::Configuration,
            SimError::SimulationDiverged { .. } | SimError::ProcessingError { .. } => {
                ErrorCategory::Simulation
            }
            SimError::SerializationError(_) | SimError::CsvError(_) => ErrorCategory::Output,
            SimError::IoError(_) | SimError::TaskError { .. } => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            SimError::ConfigValidationError { .. }
            | SimError::InvalidConfigValueError { .. }
            | SimError::UnknownPuzzle { .. } => ErrorSeverity::High,
            SimError::SimulationDiverged { .. } => ErrorSeverity::Medium,
            SimError::ProcessingError { .. }
            | SimError::SerializationError(_)
            | SimError::CsvError(_) => ErrorSeverity::High,
            SimError::IoError(_) | SimError::TaskError { .. } => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            SimError::ConfigValidationError { field, .. } => {
                format!("Check the '{}' entry of your configuration file", field)
            }
            SimError::InvalidConfigValueError { field, reason, .. } => {
                format!("Fix '{}': {}", field, reason)
            }
            SimError::UnknownPuzzle { .. } => format!(
                "Use one of: {}",
                crate::puzzles::PuzzleKind::ALL
                    .iter()
                    .map(|k| k.slug())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            SimError::SimulationDiverged { .. } => {
                "Raise max_rounds or choose a coin bias closer to 0.5".to_string()
            }
            SimError::IoError(_) => {
                "Verify the output path exists and is writable".to_string()
            }
            SimError::SerializationError(_) | SimError::CsvError(_) => {
                "Try a different output format".to_string()
            }
            SimError::TaskError { .. } | SimError::ProcessingError { .. } => {
                "Re-run with --verbose to see where the simulation failed".to_string()
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Configuration problem: {}", self),
            ErrorCategory::Simulation => format!("Simulation problem: {}", self),
            ErrorCategory::Output => format!("Could not write results: {}", self),
            ErrorCategory::System => format!("System error: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, SimError>;
