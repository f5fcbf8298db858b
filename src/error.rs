use thiserror::Error;

/// Outcomes of the service operations that callers can observe.
#[derive(Debug, Error)]
pub enum HealthError {
    /// No battery monitor is wired in, as in charger or recovery modes.
    #[error("battery monitor not initialized")]
    NotInitialized,

    #[error("listener not registered")]
    NotFound,

    #[error("battery refresh failed")]
    Refresh(#[source] anyhow::Error),
}

pub type HealthResult<T> = Result<T, HealthError>;
