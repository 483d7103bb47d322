use thiserror::Error;

/// Bootstrap failures: listeners, database pool, migrations, logging and settings.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error("listener error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot reach category database: {0}")]
    Database(#[from] sqlx::Error),
    #[error("schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("telemetry initialization failed: {0}")]
    Telemetry(String),
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl InfraError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn telemetry(message: impl Into<String>) -> Self {
        Self::Telemetry(message.into())
    }
}
