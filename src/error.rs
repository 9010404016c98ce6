use thiserror::Error;

/// Application-level error carrying the process exit code.
///
/// Exit codes:
/// - `2`: bad input files, arguments, or malformed feed data
/// - `3`: not enough usable data to fit
/// - `4`: network / runtime failures
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the analytical core (normalizer + engine).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    /// A required field could not be parsed or the raw rows are inconsistent.
    #[error("malformed input ({context}): {message}")]
    MalformedInput { context: String, message: String },

    /// Fewer than two records after filtering, or no finite measure pairs.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// The requested state code or district does not exist in the feed.
    #[error("unknown region: {0}")]
    UnknownRegion(String),
}

impl CoreError {
    pub fn malformed(context: impl Into<String>, message: impl Into<String>) -> Self {
        CoreError::MalformedInput {
            context: context.into(),
            message: message.into(),
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        let code = match err {
            CoreError::MalformedInput { .. } | CoreError::UnknownRegion(_) => 2,
            CoreError::InsufficientData(_) => 3,
        };
        AppError::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let e: AppError = CoreError::malformed("national row 3", "bad number").into();
        assert_eq!(e.exit_code(), 2);
        assert!(e.message().contains("national row 3"));

        let e: AppError = CoreError::InsufficientData("no rows".into()).into();
        assert_eq!(e.exit_code(), 3);

        let e: AppError = CoreError::UnknownRegion("zz".into()).into();
        assert_eq!(e.exit_code(), 2);
    }
}
