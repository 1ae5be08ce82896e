use gpt_resume::config::StorageConfig;
use gpt_resume::screening::{RepositoryError, SqliteRepository};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Opens the configured database and makes sure the schema exists.
pub(crate) fn open_repository(storage: &StorageConfig) -> Result<SqliteRepository, RepositoryError> {
    if storage.is_in_memory() {
        info!("using in-memory database; data is discarded on shutdown");
        return SqliteRepository::open_in_memory();
    }

    if let Some(parent) = storage
        .database_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
    {
        std::fs::create_dir_all(parent)
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
    }
    let repository = SqliteRepository::open(&storage.database_path)?;
    info!(path = %storage.database_path.display(), "database ready");
    Ok(repository)
}
