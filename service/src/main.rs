#![deny(
    clippy::expect_used,
    clippy::panic,
    clippy::print_stdout,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used
)]

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context as _;
use axum::{
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Extension, Router,
};
use rc_catalog::ResourceCatalog;
use resource_connect_api::{
    build_info::BuildInfoProvider,
    chat::{ChatRelay, HttpChatTransport},
    config::{CatalogConfig, Config},
    graphql::{build_schema, graphql_handler, graphql_playground},
    http::{build_security_headers, security_headers_middleware},
    rest::{self, ApiDoc},
    search::SearchController,
    session::SessionStore,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Health check handler
async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

fn load_catalog(config: &CatalogConfig) -> anyhow::Result<ResourceCatalog> {
    match &config.path {
        Some(path) => ResourceCatalog::from_json_path(path)
            .with_context(|| format!("failed to load catalog from {path}")),
        None => {
            tracing::info!("catalog.path not set, using built-in directory");
            Ok(ResourceCatalog::placeholder())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load and validate configuration first (fail-fast)
    let config = Config::load().map_err(|e| anyhow::anyhow!("{e}"))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.logging.level))
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "resource-connect-api starting up"
    );

    let build_info = BuildInfoProvider::from_env();
    let build_info_snapshot = build_info.build_info();
    tracing::info!(
        version = %build_info_snapshot.version,
        git_sha = %build_info_snapshot.git_sha,
        build_time = %build_info_snapshot.build_time,
        "resolved build metadata"
    );

    let catalog = Arc::new(load_catalog(&config.catalog)?);
    tracing::info!(
        resources = catalog.len(),
        zipcodes = catalog.zipcodes().len(),
        "catalog loaded"
    );
    for (category, count) in catalog.category_counts() {
        tracing::debug!(%category, count, "catalog category");
    }
    let controller = SearchController::new(catalog);

    let transport = HttpChatTransport::from_config(&config.chat)?;
    tracing::info!(
        endpoint = %transport.endpoint(),
        timeout_secs = ?config.chat.timeout_secs,
        "chat relay configured"
    );
    let relay = ChatRelay::new(Arc::new(transport), config.chat.fallback_message.clone());

    let idle_timeout = config.sessions.idle_timeout();
    let sessions = Arc::new(SessionStore::new(config.sessions.max_sessions, idle_timeout));
    let _sweeper = sessions.spawn_sweeper(idle_timeout / 2);
    tracing::info!(
        max_sessions = config.sessions.max_sessions,
        idle_timeout_secs = config.sessions.idle_timeout_secs,
        "session store ready"
    );

    let schema = build_schema(controller.clone(), build_info.clone());

    // Build CORS layer from config
    let cors_origins = &config.cors.allowed_origins;
    let allow_origin: AllowOrigin = if cors_origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow any origin - not recommended for production");
        AllowOrigin::any()
    } else if cors_origins.is_empty() {
        tracing::info!(
            "CORS allowed origins not configured - cross-origin requests will be blocked"
        );
        AllowOrigin::list(Vec::<HeaderValue>::new())
    } else {
        let origins: Vec<HeaderValue> = cors_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        tracing::info!(origins = ?cors_origins, "CORS allowed origins configured");
        AllowOrigin::list(origins)
    };

    let graphql_routes = if config.graphql.playground_enabled {
        tracing::info!("GraphQL playground enabled at /graphql");
        get(graphql_playground).post(graphql_handler)
    } else {
        post(graphql_handler)
    };

    let mut app = Router::new()
        .route("/graphql", graphql_routes)
        .nest("/api/v1", rest::router())
        .route("/health", get(health_check));

    if config.swagger.enabled {
        tracing::info!("Swagger UI enabled at /swagger-ui");
        app = app.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    app = app
        .layer(Extension(schema))
        .layer(Extension(build_info_snapshot))
        .layer(Extension(controller))
        .layer(Extension(relay))
        .layer(Extension(sessions))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers(Any)
                .allow_origin(allow_origin),
        );

    // Security headers are the outermost layer
    if config.security_headers.enabled {
        tracing::info!("Security headers enabled");
        app = app
            .layer(middleware::from_fn(security_headers_middleware))
            .layer(Extension(build_security_headers(&config.security_headers)));
    } else {
        tracing::info!("Security headers disabled");
    }

    let host: std::net::IpAddr = config
        .server
        .host
        .parse()
        .with_context(|| format!("invalid server.host '{}'", config.server.host))?;
    let addr = SocketAddr::from((host, config.server.port));
    tracing::info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
