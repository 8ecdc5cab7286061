use crate::cli::ServeArgs;
use crate::infra::{load_from_config, AppState, CutoffState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use dse_cutoffs::config::AppConfig;
use dse_cutoffs::error::AppError;
use dse_cutoffs::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let cutoffs = load_from_config(&config.cutoffs).await;
    info!(
        subjects = cutoffs.store.len(),
        generic_fallback = cutoffs.using_generic_fallback,
        "cutoff store ready"
    );

    let app = with_service_routes(CutoffState::new(cutoffs))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "dse cutoff service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
