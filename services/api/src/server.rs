use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_dock_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use marina_dock::config::AppConfig;
use marina_dock::error::AppError;
use marina_dock::telemetry;
use marina_dock::workflows::dock::{DockPlanningService, MemoryStore};
use std::sync::atomic::{AtomicBool, Ordering};
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(MemoryStore::default());
    let service = Arc::new(DockPlanningService::new(store, &config.planner));

    let app = with_dock_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        pump_starts = ?config.planner.layout.pump_starts(),
        "marina dock planner ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
