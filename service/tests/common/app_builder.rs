//! Test app builder that mirrors main.rs wiring with injectable deps/mocks.
//!
//! ```ignore
//! let app = TestAppBuilder::with_mocks().build();
//! // app.oneshot(...)
//! ```
//!
//! # Preset Builders
//!
//! - [`TestAppBuilder::minimal()`] - Health check only
//! - [`TestAppBuilder::graphql_only()`] - GraphQL and health
//! - [`TestAppBuilder::with_mocks()`] - Full app with a scripted chat transport

use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::{HeaderValue, Method, StatusCode},
    middleware,
    response::IntoResponse,
    routing::get,
    Extension, Router,
};
use rc_catalog::ResourceCatalog;
use resource_connect_api::{
    build_info::BuildInfoProvider,
    chat::{
        transport::mock::MockChatTransport, ChatRelay, ChatTransport, DEFAULT_FALLBACK_MESSAGE,
    },
    config::SecurityHeadersConfig,
    graphql::{build_schema, graphql_handler, graphql_playground},
    http::{build_security_headers, security_headers_middleware},
    rest::{self, ApiDoc},
    search::SearchController,
    session::SessionStore,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Health check handler (mirrors main.rs)
async fn health_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Builder for test applications that mirrors main.rs wiring.
pub struct TestAppBuilder {
    include_graphql: bool,
    include_rest: bool,
    include_health: bool,
    include_swagger: bool,
    build_info: Option<BuildInfoProvider>,
    catalog: Option<ResourceCatalog>,
    /// Chat transport (None uses an echoing mock)
    transport: Option<Arc<dyn ChatTransport>>,
    fallback_message: String,
    max_sessions: usize,
    idle_timeout: Duration,
    /// CORS allowed origins (None means no CORS layer)
    cors_origins: Option<Vec<String>>,
    /// Security headers config (None means disabled)
    security_headers: Option<SecurityHeadersConfig>,
}

impl Default for TestAppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestAppBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            include_graphql: false,
            include_rest: false,
            include_health: false,
            include_swagger: false,
            build_info: None,
            catalog: None,
            transport: None,
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            max_sessions: 100,
            idle_timeout: Duration::from_secs(1800),
            cors_origins: None,
            security_headers: None,
        }
    }

    // =========================================================================
    // Preset Builders
    // =========================================================================

    #[must_use]
    pub fn minimal() -> Self {
        Self::new().with_health()
    }

    #[must_use]
    pub fn graphql_only() -> Self {
        Self::new().with_graphql().with_health()
    }

    /// All routes, CORS, and security headers, with the default mock transport.
    #[must_use]
    pub fn with_mocks() -> Self {
        Self::new()
            .with_graphql()
            .with_rest()
            .with_health()
            .with_swagger()
            .with_cors(&["http://localhost:3000"])
            .with_security_headers_default()
    }

    // =========================================================================
    // Component Configuration
    // =========================================================================

    #[must_use]
    pub fn with_graphql(mut self) -> Self {
        self.include_graphql = true;
        self
    }

    #[must_use]
    pub fn with_rest(mut self) -> Self {
        self.include_rest = true;
        self
    }

    #[must_use]
    pub fn with_health(mut self) -> Self {
        self.include_health = true;
        self
    }

    #[must_use]
    pub fn with_swagger(mut self) -> Self {
        self.include_swagger = true;
        self
    }

    #[must_use]
    pub fn with_catalog(mut self, catalog: ResourceCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    #[must_use]
    pub fn with_transport(mut self, transport: Arc<dyn ChatTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    #[must_use]
    pub fn with_fallback_message(mut self, message: &str) -> Self {
        self.fallback_message = message.to_string();
        self
    }

    #[must_use]
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max;
        self
    }

    #[must_use]
    pub fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Pass an empty slice to block all cross-origin requests, `&["*"]` to allow any.
    #[must_use]
    pub fn with_cors(mut self, origins: &[&str]) -> Self {
        self.cors_origins = Some(origins.iter().map(|s| (*s).to_string()).collect());
        self
    }

    #[must_use]
    pub fn with_security_headers_default(mut self) -> Self {
        self.security_headers = Some(SecurityHeadersConfig::default());
        self
    }

    #[must_use]
    pub fn with_security_headers(mut self, config: SecurityHeadersConfig) -> Self {
        self.security_headers = Some(config);
        self
    }

    #[must_use]
    pub fn with_build_info(mut self, provider: BuildInfoProvider) -> Self {
        self.build_info = Some(provider);
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    /// Build the Axum router with the same layer order as main.rs:
    /// routes, extensions, CORS, then security headers outermost.
    #[must_use]
    pub fn build(self) -> Router {
        let build_info = self.build_info.unwrap_or_else(BuildInfoProvider::from_env);
        let catalog = self.catalog.unwrap_or_else(ResourceCatalog::placeholder);
        let controller = SearchController::new(Arc::new(catalog));
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(MockChatTransport::new()) as Arc<dyn ChatTransport>);
        let relay = ChatRelay::new(transport, self.fallback_message);
        let sessions = Arc::new(SessionStore::new(self.max_sessions, self.idle_timeout));
        let schema = build_schema(controller.clone(), build_info.clone());

        let mut app = Router::new();

        if self.include_graphql {
            app = app.route("/graphql", get(graphql_playground).post(graphql_handler));
        }

        if self.include_rest {
            app = app.nest("/api/v1", rest::router());
        }

        if self.include_swagger {
            app = app.merge(
                SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
            );
        }

        if self.include_health {
            app = app.route("/health", get(health_check));
        }

        app = app
            .layer(Extension(schema))
            .layer(Extension(build_info.build_info()))
            .layer(Extension(controller))
            .layer(Extension(relay))
            .layer(Extension(sessions));

        if let Some(origins) = self.cors_origins {
            let allow_origin: AllowOrigin = if origins.iter().any(|o| o == "*") {
                AllowOrigin::any()
            } else if origins.is_empty() {
                AllowOrigin::list(Vec::<HeaderValue>::new())
            } else {
                let header_values: Vec<HeaderValue> = origins
                    .iter()
                    .filter_map(|origin| origin.parse().ok())
                    .collect();
                AllowOrigin::list(header_values)
            };

            app = app.layer(
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
        }

        if let Some(config) = self.security_headers {
            if config.enabled {
                app = app
                    .layer(middleware::from_fn(security_headers_middleware))
                    .layer(Extension(build_security_headers(&config)));
            }
        }

        app
    }
}
