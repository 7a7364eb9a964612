use crate::cli::ServeArgs;
use crate::infra::{seed_repositories, AppState, SeededRepositories};
use crate::routes::with_order_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use kitflow::config::AppConfig;
use kitflow::error::AppError;
use kitflow::ordering::OrderService;
use kitflow::telemetry;
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

    let SeededRepositories {
        employees,
        catalog,
        orders,
        companies,
    } = seed_repositories();
    let order_service = Arc::new(OrderService::new(employees, catalog, orders, companies));

    let app = with_order_routes(order_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "uniform ordering service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
