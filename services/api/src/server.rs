use crate::cli::ServeArgs;
use crate::infra::{open_repository, AppState};
use crate::routes::site_router;
use axum::extract::DefaultBodyLimit;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use gpt_resume::config::AppConfig;
use gpt_resume::error::AppError;
use gpt_resume::screening::{FsResumeStore, ScreeningService};
use gpt_resume::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(open_repository(&config.storage)?);
    let resumes = Arc::new(FsResumeStore::new(config.storage.media_root.clone()));
    let screening_service = Arc::new(ScreeningService::new(
        repository,
        resumes,
        config.screening,
    ));

    let app = site_router(screening_service, &config.storage)
        .layer(DefaultBodyLimit::max(config.storage.max_upload_bytes))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        debug = config.storage.debug,
        threshold = config.screening.recommendation_threshold,
        "resume screening service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
