use crate::cli::ServeArgs;
use crate::infra::{AppState, LogMailer};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hiretrack::config::AppConfig;
use hiretrack::reminders::{spawn_daily, DailySchedule, ReminderJob};
use hiretrack::telemetry;
use hiretrack::tracker::{tracker_router, MemoryStore, TrackerServices};
use hiretrack::{AppError, SharedClock};
use mockable::DefaultClock;
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

    let clock: SharedClock = Arc::new(DefaultClock);
    let store = Arc::new(MemoryStore::new());
    let services = TrackerServices::new(store.clone(), clock.clone());

    let reminder_task = if config.reminders.enabled {
        let job = Arc::new(ReminderJob::new(
            store,
            Arc::new(LogMailer),
            config.reminders.sender.clone(),
        ));
        info!(at = %config.reminders.send_at, "daily reminders enabled");
        Some(spawn_daily(
            job,
            DailySchedule::new(config.reminders.send_at),
            clock,
        ))
    } else {
        info!("daily reminders disabled");
        None
    };

    let app = with_operational_routes(tracker_router(services))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hiretrack service ready");

    let served = axum::serve(listener, app).await;
    if let Some(task) = reminder_task {
        task.abort();
    }
    served?;
    Ok(())
}
