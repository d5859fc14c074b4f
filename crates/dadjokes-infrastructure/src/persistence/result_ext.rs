use dadjokes_domain::shared::DomainError;
use std::fmt::Display;

/// Maps storage-layer errors onto domain errors.
pub trait ResultExt<T> {
    /// Query failures: `result.to_repo_err()?`
    fn to_repo_err(self) -> Result<T, DomainError>;

    /// Setup failures (files, connections, migrations), prefixed with what
    /// was being attempted.
    fn infra_context(self, context: &str) -> Result<T, DomainError>;
}

impl<T, E: Display> ResultExt<T> for Result<T, E> {
    fn to_repo_err(self) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::Repository(e.to_string()))
    }

    fn infra_context(self, context: &str) -> Result<T, DomainError> {
        self.map_err(|e| DomainError::Infrastructure(format!("{}: {}", context, e)))
    }
}
