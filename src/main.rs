mod core;
mod features;
mod shared;

use crate::core::config::Config;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::core::{database, middleware};
use crate::features::analytics::{routes as analytics_routes, KpiScheduler, KpiService, PgKpiStore};
use crate::features::auth;
use crate::features::classification::{Classifier, GeminiBackend};
use crate::features::notifications::{
    DisabledPushGateway, FcmGateway, Notifier, PgDeliveryLedger, PushGateway,
};
use crate::features::reports::{
    routes as reports_routes, PgReportStore, ReportEventBus, ReportReactor, ReportService,
};
use crate::features::users::{routes as users_routes, PgUserDirectory, UserService};
use crate::shared::clock::{Clock, SystemClock};
use axum::{middleware::from_fn, Router};
use std::sync::Arc;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

fn main() -> anyhow::Result<()> {
    // Build Tokio runtime with configurable worker threads
    let worker_threads = std::env::var("TOKIO_WORKER_THREADS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(4)
        });

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .max_blocking_threads(worker_threads * 4)
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Load .env file BEFORE initializing logger so RUST_LOG is available
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "System info: tokio_worker_threads={}, pid={}",
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    let pool = database::create_pool(&config.database).await?;
    tracing::info!("Database connection pool created");

    tracing::info!("Running database migrations...");
    database::run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;
    tracing::info!("Database migrations completed successfully");

    // Caller identity
    let jwks_client = Arc::new(auth::JwksClient::new(
        &config.auth.jwks_url,
        config.auth.jwks_cache_ttl,
    ));
    let jwt_validator = Arc::new(auth::JwtValidator::new(
        jwks_client,
        config.auth.issuer.clone(),
        config.auth.audience.clone(),
        config.auth.jwt_leeway,
    ));
    tracing::info!("Auth configuration initialized");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let report_store = Arc::new(PgReportStore::new(pool.clone()));
    let user_directory = Arc::new(PgUserDirectory::new(pool.clone()));

    // Classification backend
    let classifier_backend = GeminiBackend::new(config.classifier.clone())
        .map_err(|e| anyhow::anyhow!("Failed to create classifier backend: {}", e))?;
    let classifier = Arc::new(Classifier::new(Arc::new(classifier_backend)));
    tracing::info!(
        "Classifier initialized (model: {})",
        config.classifier.model
    );

    // Push delivery
    let push_gateway: Arc<dyn PushGateway> = match config.push.clone() {
        Some(push_config) => {
            tracing::info!("Push delivery enabled for project {}", push_config.project_id);
            Arc::new(FcmGateway::new(push_config))
        }
        None => {
            tracing::warn!("Push delivery disabled (no FCM credentials configured)");
            Arc::new(DisabledPushGateway)
        }
    };
    let notifier = Arc::new(Notifier::new(user_directory.clone(), push_gateway));

    // Report lifecycle and change reactor
    let (event_bus, event_receiver) = ReportEventBus::channel();
    let report_service = Arc::new(ReportService::new(
        report_store.clone(),
        user_directory.clone(),
        classifier,
        event_bus,
        clock.clone(),
    ));

    let reactor = Arc::new(ReportReactor::new(
        notifier,
        user_directory.clone(),
        Arc::new(PgDeliveryLedger::new(pool.clone())),
        clock.clone(),
    ));
    tokio::spawn(reactor.run(event_receiver));
    tracing::info!("Report reactor worker spawned");

    let user_service = Arc::new(UserService::new(user_directory, clock.clone()));

    // KPI aggregation
    let kpi_service = Arc::new(KpiService::new(
        report_store,
        Arc::new(PgKpiStore::new(pool.clone())),
        clock.clone(),
    ));
    let kpi_scheduler = KpiScheduler::new(Arc::clone(&kpi_service), clock, config.scheduler);
    tokio::spawn(async move {
        kpi_scheduler.run().await;
    });
    tracing::info!("KPI scheduler worker spawned");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };

    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);

    let swagger = if let Some(credentials) = config.swagger.credentials() {
        tracing::info!("Swagger UI basic auth enabled");
        Router::new()
            .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
            .layer(from_fn(middleware::basic_auth_middleware(Arc::new(
                credentials,
            ))))
    } else {
        tracing::info!("Swagger UI basic auth disabled (no credentials configured)");
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
    };

    // Identity is optional here; each operation rejects anonymous callers itself
    let api_routes = Router::new()
        .merge(reports_routes::routes(report_service))
        .merge(users_routes::routes(user_service))
        .route_layer(axum::middleware::from_fn_with_state(
            jwt_validator,
            middleware::optional_auth_middleware,
        ));

    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let public_routes = Router::new().merge(analytics_routes::routes(kpi_service));

    let app = Router::new()
        .merge(swagger)
        .merge(api_routes)
        .merge(public_routes)
        .merge(health_route)
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    let addr = config.app.server_address();
    let socket_addr: std::net::SocketAddr = addr
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid address: {}", e))?;

    // Use socket2 for TCP listener configuration
    let socket = socket2::Socket::new(
        socket2::Domain::for_address(socket_addr),
        socket2::Type::STREAM,
        Some(socket2::Protocol::TCP),
    )?;

    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    socket.set_nodelay(true)?;

    socket.set_recv_buffer_size(256 * 1024)?;
    socket.set_send_buffer_size(256 * 1024)?;

    #[cfg(target_os = "linux")]
    {
        let keepalive = socket2::TcpKeepalive::new()
            .with_time(std::time::Duration::from_secs(60))
            .with_interval(std::time::Duration::from_secs(10))
            .with_retries(3);
        socket.set_tcp_keepalive(&keepalive)?;
    }
    #[cfg(not(target_os = "linux"))]
    {
        let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
        socket.set_tcp_keepalive(&keepalive)?;
    }

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(65535)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
