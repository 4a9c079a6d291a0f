//! CLI-level errors (wraps infrastructure errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::infrastructure::InfraError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Infra(#[from] InfraError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl From<ApplicationError> for CliError {
    fn from(e: ApplicationError) -> Self {
        CliError::Infra(InfraError::Application(e))
    }
}

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) | CliError::Usage(_) => crate::exitcode::USAGE,
            CliError::Infra(e) => match e {
                InfraError::Io { .. } => crate::exitcode::IOERR,
                InfraError::Json { .. } => crate::exitcode::DATAERR,
                InfraError::Application(app) => match app {
                    ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                    ApplicationError::Domain(_) => crate::exitcode::DATAERR,
                    ApplicationError::OperationFailed { .. } => crate::exitcode::NOINPUT,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DomainError;

    #[test]
    fn given_error_kinds_when_mapping_then_sysexits_codes() {
        let config: CliError = ApplicationError::Config {
            message: "bad".into(),
        }
        .into();
        let domain: CliError = ApplicationError::Domain(DomainError::NodeNotFound("x".into())).into();
        let io = CliError::Infra(InfraError::io(
            "write",
            std::io::Error::new(std::io::ErrorKind::Other, "boom"),
        ));

        assert_eq!(config.exit_code(), crate::exitcode::CONFIG);
        assert_eq!(domain.exit_code(), crate::exitcode::DATAERR);
        assert_eq!(io.exit_code(), crate::exitcode::IOERR);
        assert_eq!(
            CliError::Usage("nope".into()).exit_code(),
            crate::exitcode::USAGE
        );
    }
}
