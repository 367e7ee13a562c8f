use thiserror::Error;

/// Main error type for the sweep launcher
#[derive(Error, Debug)]
pub enum SwError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Execution error: {0}")]
    Execution(#[from] ExecutionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Launch configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No tasks configured")]
    NoTasks,

    #[error("Invalid task name: {name:?}")]
    InvalidTaskName { name: String },

    #[error("Duplicate task name: {name}")]
    DuplicateTask { name: String },

    #[error("Concurrency limit must be at least 1")]
    ZeroConcurrency,

    #[error("Sweep step must be positive, got {step}")]
    NonPositiveStep { step: i64 },

    #[error("Invalid sweep range: start {start} is after end {end}")]
    InvalidRange { start: i64, end: i64 },

    #[error("Command template has no entrypoint")]
    EmptyEntrypoint,

    #[error("Run name separator must not be empty")]
    EmptySeparator,

    #[error("{0}")]
    Other(String),
}

/// Errors raised while running a single command or draining the pool
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Failed to spawn {run_name}: {message}")]
    SpawnFailed { run_name: String, message: String },

    #[error("Failed waiting on {run_name}: {message}")]
    WaitFailed { run_name: String, message: String },

    #[error("Cannot open log file {path}: {message}")]
    LogFile { path: String, message: String },

    #[error("Executor worker panicked: {message}")]
    WorkerPanicked { message: String },
}

/// Result type alias for launcher operations
pub type SwResult<T> = Result<T, SwError>;

/// Macro for creating internal errors
#[macro_export]
macro_rules! internal_error {
    ($($arg:tt)*) => {
        $crate::SwError::Internal(format!($($arg)*))
    };
}

/// Macro for creating configuration errors
#[macro_export]
macro_rules! config_error {
    ($($arg:tt)*) => {
        $crate::SwError::Config($crate::ConfigError::Other(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ConfigError::InvalidRange { start: 40, end: 5 };
        assert!(error.to_string().contains("start 40"));
        assert!(error.to_string().contains("end 5"));

        let error = ExecutionError::SpawnFailed {
            run_name: "Ecoli1_5".to_string(),
            message: "No such file or directory".to_string(),
        };
        assert!(error.to_string().contains("Ecoli1_5"));
    }

    #[test]
    fn test_error_conversion() {
        let sw_error: SwError = ConfigError::ZeroConcurrency.into();

        match sw_error {
            SwError::Config(ConfigError::ZeroConcurrency) => (),
            _ => panic!("Expected Config error"),
        }
    }

    #[test]
    fn test_macros() {
        let err = config_error!("Missing required field: {}", "tasks");
        assert!(err.to_string().contains("tasks"));
        let err = internal_error!("slot {} vanished", 3);
        assert!(matches!(err, SwError::Internal(_)));
    }
}
