mod core;
mod features;
mod shared;

use std::sync::Arc;

use axum::middleware::{from_fn, from_fn_with_state};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::{DefaultOnRequest, DefaultOnResponse, TraceLayer};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::core::config::Config;
use crate::core::middleware;
use crate::core::openapi::{ApiDoc, SwaggerInfoModifier};
use crate::features::auth::clients::IdentityClient;
use crate::features::auth::{AuthService, ProviderTokenService};
use crate::features::enhance::clients::CompletionClient;
use crate::features::enhance::handlers::EnhanceState;
use crate::features::enhance::routes as enhance_routes;
use crate::features::github_proxy::clients::GithubClient;
use crate::features::github_proxy::handlers::GithubProxyState;
use crate::features::github_proxy::routes as github_proxy_routes;
use crate::features::rate_limits::{InMemoryRateLimitStore, RateLimitService};
use crate::features::release_notes::handlers::ReleaseNotesState;
use crate::features::release_notes::routes as release_notes_routes;

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
        .enable_all()
        .build()?;

    runtime.block_on(async_main(worker_threads))
}

async fn async_main(worker_threads: usize) -> anyhow::Result<()> {
    // Config loads .env first so DEBUG_MODE and RUST_LOG are visible below
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    let default_level = if config.app.debug_mode { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let available_cpus = std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1);
    tracing::info!(
        "System info: available_cpus={}, tokio_worker_threads={}, pid={}",
        available_cpus,
        worker_threads,
        std::process::id()
    );
    tracing::info!("Configuration loaded successfully");

    // Missing secrets are surfaced at startup but only fail the requests
    // that need them, as per-request configuration errors.
    if config.identity.base_url.is_none() || config.identity.service_key.is_none() {
        tracing::warn!(
            "Identity service not fully configured; authenticated requests will return a configuration error"
        );
    }
    if config.openai.api_key.is_none() {
        tracing::warn!(
            "OPENAI_API_KEY not set; enhancement requests will return a configuration error"
        );
    }

    // Upstream clients
    let identity_client = Arc::new(IdentityClient::new(config.identity.clone()));
    let github_client = Arc::new(GithubClient::new(config.github.clone()));
    let completion_client = Arc::new(CompletionClient::new(config.openai.clone()));
    tracing::info!("Upstream clients initialized");

    // Auth services
    let auth_service = Arc::new(AuthService::new(Arc::clone(&identity_client)));
    let provider_token_service = Arc::new(ProviderTokenService::new(
        Arc::clone(&identity_client),
        Arc::clone(&github_client),
    ));
    tracing::info!("Auth services initialized");

    // Rate limiting: one store per endpoint family, mirroring their
    // separate quotas. In-memory, process-local.
    let enhance_rate_limits = Arc::new(RateLimitService::new(Arc::new(
        InMemoryRateLimitStore::new(),
    )));
    let proxy_rate_limits = Arc::new(RateLimitService::new(Arc::new(
        InMemoryRateLimitStore::new(),
    )));
    tracing::info!("Rate limit services initialized");

    // Build application router with dynamic swagger config
    let swagger_modifier = SwaggerInfoModifier {
        title: config.swagger.title.clone(),
        version: config.swagger.version.clone(),
        description: config.swagger.description.clone(),
    };
    let mut openapi = ApiDoc::openapi();
    swagger_modifier.modify(&mut openapi);
    let swagger =
        Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi));

    let enhance_state = EnhanceState {
        completion: completion_client,
        rate_limits: enhance_rate_limits,
        quota: config.rate_limit.clone(),
    };
    let github_proxy_state = GithubProxyState {
        github: Arc::clone(&github_client),
        provider_tokens: Arc::clone(&provider_token_service),
        rate_limits: Arc::clone(&proxy_rate_limits),
        quota: config.rate_limit.clone(),
    };
    let release_notes_state = ReleaseNotesState {
        github: github_client,
        provider_tokens: provider_token_service,
        rate_limits: proxy_rate_limits,
        quota: config.rate_limit.clone(),
    };

    // Protected routes (require a verified session token)
    let protected_routes = Router::new()
        .merge(enhance_routes::routes(enhance_state))
        .merge(github_proxy_routes::routes(github_proxy_state))
        .merge(release_notes_routes::routes(release_notes_state))
        .route_layer(from_fn_with_state(
            Arc::clone(&auth_service),
            middleware::auth_middleware,
        ));

    // Simple health check endpoint (no auth required)
    async fn health_check() -> axum::http::StatusCode {
        axum::http::StatusCode::OK
    }
    let health_route = Router::new().route("/health", axum::routing::get(health_check));

    let app = Router::new()
        .merge(swagger)
        .merge(protected_routes)
        .merge(health_route)
        // Panics become 500s here, then the logging middleware shapes them
        .layer(CatchPanicLayer::new())
        .layer(from_fn(middleware::request_logging_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(middleware::MakeSpanWithRequestId)
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::cors_layer(
            config.app.cors_allowed_origins.clone(),
        ))
        // Propagate X-Request-Id to response headers
        .layer(PropagateRequestIdLayer::x_request_id())
        // Generate X-Request-Id using UUID v7 (or use client-provided one)
        .layer(SetRequestIdLayer::x_request_id(middleware::MakeRequestUuid));

    // Start server
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

    let keepalive = socket2::TcpKeepalive::new().with_time(std::time::Duration::from_secs(60));
    socket.set_tcp_keepalive(&keepalive)?;

    socket.set_nonblocking(true)?;
    socket.bind(&socket_addr.into())?;
    socket.listen(1024)?;

    let listener = tokio::net::TcpListener::from_std(socket.into())?;
    tracing::info!("Server listening on {}", format!("http://{}", addr));
    tracing::info!(
        "Swagger UI available at {}",
        format!("http://{}/swagger-ui/", addr)
    );

    axum::serve(listener, app).await?;

    Ok(())
}
