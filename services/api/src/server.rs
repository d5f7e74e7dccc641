use crate::cli::ServeArgs;
use crate::infra::{load_campus, AppState};
use crate::routes::with_transfer_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use classdesk::config::AppConfig;
use classdesk::error::AppError;
use classdesk::telemetry;
use classdesk::transfers::{TransferEligibilityResolver, TransferService};
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

    let campus = Arc::new(load_campus(&config.transfers, None, None)?);
    let resolver = TransferEligibilityResolver::from_config(&config.transfers);
    let transfer_service = Arc::new(TransferService::new(campus.clone(), campus, resolver));

    let app = with_transfer_routes(transfer_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        candidate_limit = ?config.transfers.candidate_limit,
        "class transfer service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
