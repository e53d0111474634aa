use crate::cli::ServeArgs;
use crate::infra::{load_engines, AppState, InMemoryAlertPublisher, InMemorySessionRepository};
use crate::routes::with_support_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use mindcare::config::AppConfig;
use mindcare::error::AppError;
use mindcare::telemetry;
use mindcare::triage::SupportService;
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

    let engines = load_engines(&config.triage)?;
    info!(
        questionnaire = engines.questionnaire.id(),
        questions = engines.questionnaire.len(),
        typing_delay_ms = config.triage.typing_delay_ms,
        "triage engines loaded"
    );

    let repository = Arc::new(InMemorySessionRepository::default());
    let alerts = Arc::new(InMemoryAlertPublisher::default());
    let support_service = Arc::new(SupportService::new(repository, alerts, engines));

    let app = with_support_routes(support_service, config.triage.typing_delay())
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "mindcare support companion ready");

    axum::serve(listener, app).await?;
    Ok(())
}
