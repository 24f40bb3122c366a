use crate::cli::ServeArgs;
use crate::infra::{memory_services, AppState, DirectorySeed, LogMailer, LogNotifier};
use crate::routes::with_hiring_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hireflow::config::AppConfig;
use hireflow::error::AppError;
use hireflow::telemetry;
use hireflow::workflows::hiring::{
    ensure_default_admin, BootstrapOutcome, InMemoryAdminRegistry, SystemClock,
};
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

    let admins = InMemoryAdminRegistry::default();
    match ensure_default_admin(&admins, &config.admin)? {
        BootstrapOutcome::Created(account) => {
            info!(admin = %account.id, email = %account.email, "default admin created")
        }
        BootstrapOutcome::AlreadyPresent(account) => {
            info!(admin = %account.id, "default admin already present")
        }
        BootstrapOutcome::Skipped => {}
    }

    let seed = match args.directory.take() {
        Some(path) => DirectorySeed::from_path(&path)?,
        None => DirectorySeed::default(),
    };
    info!(
        freelancers = seed.freelancers.len(),
        clients = seed.clients.len(),
        "profile directory seeded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let services = memory_services(
        Arc::new(seed.into_directory()),
        Arc::new(LogNotifier),
        Arc::new(LogMailer),
        Arc::new(SystemClock),
    );

    let app = with_hiring_routes(services)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "hiring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
