//! Process exit codes
//!
//! A clean run exits 0; setup failures map to distinct non-zero codes so
//! scripts can tell a bad path from a credential problem.

use sb_core::Error;

/// Exit codes returned by the s3bulk binary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    /// One or more files failed to upload, or another runtime error
    GeneralError = 1,
    /// Invalid arguments or usage
    UsageError = 2,
    /// Root path or destination not found
    NotFound = 3,
    /// Network or credential failure
    NetworkError = 4,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Map a fatal core error to the exit code it should produce
    pub fn from_error(error: &Error) -> Self {
        match error {
            Error::NotFound(_) => ExitCode::NotFound,
            Error::Network(_) | Error::Auth(_) => ExitCode::NetworkError,
            Error::InvalidPath(_) | Error::Config(_) => ExitCode::UsageError,
            _ => ExitCode::GeneralError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ExitCode::Success.code(), 0);
        assert_eq!(ExitCode::GeneralError.code(), 1);
        assert_eq!(ExitCode::UsageError.code(), 2);
        assert_eq!(ExitCode::NotFound.code(), 3);
        assert_eq!(ExitCode::NetworkError.code(), 4);
    }

    #[test]
    fn test_from_error() {
        assert_eq!(
            ExitCode::from_error(&Error::NotFound("x".to_string())),
            ExitCode::NotFound
        );
        assert_eq!(
            ExitCode::from_error(&Error::Auth("denied".to_string())),
            ExitCode::NetworkError
        );
        assert_eq!(
            ExitCode::from_error(&Error::General("x".to_string())),
            ExitCode::GeneralError
        );
    }
}
