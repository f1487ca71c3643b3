use crate::cli::ServeArgs;
use crate::infra::{AppState, CalendarLedger, EntityDirectory, FeedLog, NotificationLedger};
use crate::routes::with_compliance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use compliance_ai::config::AppConfig;
use compliance_ai::error::AppError;
use compliance_ai::telemetry;
use compliance_ai::workflows::compliance::channel::{LogOnlyChannel, SendChannel, WebhookChannel};
use compliance_ai::workflows::compliance::clock::SystemClock;
use compliance_ai::workflows::compliance::policy::EnginePolicy;
use compliance_ai::workflows::compliance::{
    ComplianceCatalog, ComplianceScheduler, EngineState, NotificationDispatcher,
};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the outbound delivery channel. Missing or broken webhook
/// configuration degrades to log-only delivery so the calendar pipeline
/// keeps running without the external provider.
fn outbound_channel(webhook_url: Option<&str>) -> Box<dyn SendChannel> {
    match webhook_url {
        Some(url) => match WebhookChannel::with_runtime(url.to_string()) {
            Ok(channel) => Box::new(channel),
            Err(err) => {
                warn!(error = %err, "webhook channel unavailable; using log-only delivery");
                Box::new(LogOnlyChannel)
            }
        },
        None => Box::new(LogOnlyChannel),
    }
}

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

    let directory = Arc::new(EntityDirectory::default());
    let calendar = Arc::new(CalendarLedger::default());
    let notifications = Arc::new(NotificationLedger::default());
    let feed = Arc::new(FeedLog::default());
    let policy = EnginePolicy::default();

    let scheduler = Arc::new(ComplianceScheduler::new(
        directory.clone(),
        calendar.clone(),
        notifications.clone(),
        Arc::new(ComplianceCatalog::standard()),
        policy.clone(),
    ));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        directory.clone(),
        calendar,
        notifications,
        feed,
        outbound_channel(config.notify.webhook_url.as_deref()),
        outbound_channel(config.notify.webhook_url.as_deref()),
        policy.retry_cap,
    ));
    let engine = EngineState {
        scheduler,
        dispatcher,
        clock: Arc::new(SystemClock),
    };

    let app = with_compliance_routes(engine, directory)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "compliance deadline engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
