use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::router;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;
use veille::config::AppConfig;
use veille::error::AppError;
use veille::telemetry;
use veille::workflows::opportunities::OpportunityEngine;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let engine = OpportunityEngine::new(config.scoring)?;
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        engine: Arc::new(engine),
    };

    let app = router(app_state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        weights = ?config.scoring.weights,
        "opportunity scoring service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
