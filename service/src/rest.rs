//! REST API handlers and `OpenAPI` documentation.
//!
//! Stateless catalog lookups live under `/resources`. Everything a visitor
//! does on the page (search, map, chat) is addressed through a session id
//! under `/sessions/{id}`.

// The OpenApi derive macro generates code that triggers this lint
#![allow(clippy::needless_for_each)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use rc_catalog::{Category, Resource};
use serde::{Deserialize, Serialize, Serializer};
use utoipa::{IntoParams, OpenApi, ToSchema};
use uuid::Uuid;

use crate::build_info::BuildInfo;
use crate::chat::{ChatError, ChatMessage, ChatRelay, Sender};
use crate::map::{MapError, MapFrame, Marker, Overlay, Viewport};
use crate::search::{EmptyState, SearchController, SearchResults, SearchView};
use crate::session::{Session, SessionError, SessionStore};

/// Serialize a `StatusCode` as its `u16` representation.
#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires `&T` signature
fn serialize_status_code<S: Serializer>(status: &StatusCode, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u16(status.as_u16())
}

/// RFC 7807 Problem Details error response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    /// URI reference identifying the problem type
    #[serde(rename = "type")]
    pub problem_type: String,
    /// Short human-readable summary
    pub title: String,
    /// HTTP status code
    #[serde(serialize_with = "serialize_status_code")]
    #[schema(value_type = u16)]
    pub status: StatusCode,
    /// Human-readable explanation specific to this occurrence
    pub detail: String,
    /// URI reference identifying the specific occurrence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Additional error details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extensions: Option<ProblemExtensions>,
}

/// Machine-readable error details.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProblemExtensions {
    /// Stable error code, e.g. `SESSION_NOT_FOUND`
    pub code: String,
    /// Request field that caused the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ProblemDetails {
    fn new(status: StatusCode, code: &str, title: &str, detail: impl Into<String>) -> Self {
        Self {
            problem_type: format!(
                "https://resourceconnect.app/errors/{}",
                code.to_lowercase().replace('_', "-")
            ),
            title: title.to_string(),
            status,
            detail: detail.into(),
            instance: None,
            extensions: Some(ProblemExtensions {
                code: code.to_string(),
                field: None,
            }),
        }
    }

    #[must_use]
    fn with_field(mut self, field: &str) -> Self {
        if let Some(ext) = self.extensions.as_mut() {
            ext.field = Some(field.to_string());
        }
        self
    }

    #[must_use]
    fn with_instance(mut self, instance: String) -> Self {
        self.instance = Some(instance);
        self
    }

    /// Create an internal server error response.
    #[must_use]
    pub fn internal_error(detail: &str) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Internal Server Error",
            detail,
        )
    }

    #[must_use]
    pub fn session_not_found(id: Uuid) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            "SESSION_NOT_FOUND",
            "Session Not Found",
            format!("no session with id {id}"),
        )
        .with_instance(format!("/api/v1/sessions/{id}"))
    }

    /// The code from `extensions`, if any.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.extensions.as_ref().map(|e| e.code.as_str())
    }
}

impl IntoResponse for ProblemDetails {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<MapError> for ProblemDetails {
    fn from(err: MapError) -> Self {
        let detail = err.to_string();
        match err {
            MapError::NotRendered => {
                Self::new(StatusCode::CONFLICT, "MAP_EMPTY", "Map Is Empty", detail)
            }
            MapError::UnknownMarker(_) => Self::new(
                StatusCode::NOT_FOUND,
                "UNKNOWN_MARKER",
                "Unknown Marker",
                detail,
            )
            .with_field("resourceId"),
            MapError::InvalidCoordinates { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                "INVALID_COORDINATES",
                "Invalid Coordinates",
                detail,
            ),
        }
    }
}

impl From<SessionError> for ProblemDetails {
    fn from(err: SessionError) -> Self {
        let detail = err.to_string();
        match err {
            SessionError::CapacityReached { .. } => Self::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "SESSION_CAPACITY",
                "Too Many Sessions",
                detail,
            ),
            SessionError::Chat(ChatError::EmptyMessage) => Self::new(
                StatusCode::BAD_REQUEST,
                "EMPTY_MESSAGE",
                "Empty Message",
                detail,
            )
            .with_field("message"),
            SessionError::Chat(ChatError::Busy) => Self::new(
                StatusCode::CONFLICT,
                "CHAT_BUSY",
                "Message In Flight",
                detail,
            ),
            SessionError::Relay(source) => {
                tracing::error!(error = %source, "chat relay task did not complete");
                Self::internal_error("chat relay did not complete")
            }
        }
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ZipcodeQuery {
    /// Zipcode to look up, matched exactly
    pub zipcode: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    pub zipcode: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ViewportRequest {
    pub lat: f64,
    pub lng: f64,
    /// Rounded to the nearest level and clamped to 1..=18
    pub zoom: f64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SelectionRequest {
    pub resource_id: u32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatResponse {
    /// Assistant reply, or the fallback line when `delivered` is false
    pub reply: String,
    pub delivered: bool,
    pub transcript: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ChatStateResponse {
    pub transcript: Vec<ChatMessage>,
    /// A message is awaiting its reply
    pub busy: bool,
}

/// `OpenAPI` documentation for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Resource Connect API",
        version = "1.0.0",
        description = "Find housing, food, and utility assistance by zipcode",
        license(name = "MIT")
    ),
    servers(
        (url = "/api/v1", description = "REST API v1")
    ),
    paths(
        get_build_info,
        search_resources,
        search_category,
        create_session,
        delete_session,
        get_search,
        submit_search,
        get_map,
        set_viewport,
        select_marker,
        clear_selection,
        get_chat,
        send_chat
    ),
    components(schemas(
        BuildInfo,
        ProblemDetails,
        ProblemExtensions,
        Resource,
        Category,
        SearchResults,
        SearchView,
        EmptyState,
        MapFrame,
        Marker,
        Overlay,
        Viewport,
        ChatMessage,
        Sender,
        CreateSessionResponse,
        SearchRequest,
        ViewportRequest,
        SelectionRequest,
        ChatRequest,
        ChatResponse,
        ChatStateResponse
    )),
    tags(
        (name = "System", description = "Service metadata"),
        (name = "Resources", description = "Stateless catalog lookups"),
        (name = "Sessions", description = "Per-visitor search, map, and chat state")
    )
)]
pub struct ApiDoc;

/// Routes mounted under `/api/v1`.
///
/// Handlers expect `Extension`s for `BuildInfo`, `SearchController`,
/// `ChatRelay`, and `Arc<SessionStore>`.
pub fn router() -> Router {
    Router::new()
        .route("/build-info", get(get_build_info))
        .route("/resources", get(search_resources))
        .route("/resources/{category}", get(search_category))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", delete(delete_session))
        .route("/sessions/{id}/search", get(get_search).post(submit_search))
        .route("/sessions/{id}/map", get(get_map))
        .route("/sessions/{id}/map/viewport", put(set_viewport))
        .route(
            "/sessions/{id}/map/selection",
            put(select_marker).delete(clear_selection),
        )
        .route("/sessions/{id}/chat", get(get_chat).post(send_chat))
}

async fn load_session(store: &SessionStore, id: Uuid) -> Result<Arc<Session>, ProblemDetails> {
    store
        .get(id)
        .await
        .ok_or_else(|| ProblemDetails::session_not_found(id))
}

/// Get build information
///
/// Returns metadata about the running service including version, git SHA, and build time.
///
/// # Errors
///
/// Returns `ProblemDetails` on internal server errors.
#[utoipa::path(
    get,
    path = "/build-info",
    tag = "System",
    responses(
        (status = 200, description = "Build information retrieved successfully", body = BuildInfo),
        (status = 500, description = "Internal server error", body = ProblemDetails)
    )
)]
#[allow(clippy::unused_async)] // Required for Axum handler signature
pub async fn get_build_info(
    Extension(build_info): Extension<BuildInfo>,
) -> Result<Json<BuildInfo>, ProblemDetails> {
    Ok(Json(build_info))
}

/// Search resources by zipcode
///
/// Unknown zipcodes return three empty lists.
#[utoipa::path(
    get,
    path = "/resources",
    tag = "Resources",
    params(ZipcodeQuery),
    responses(
        (status = 200, description = "Resources partitioned by category", body = SearchResults)
    )
)]
#[allow(clippy::unused_async)]
pub async fn search_resources(
    Extension(controller): Extension<SearchController>,
    Query(query): Query<ZipcodeQuery>,
) -> Json<SearchResults> {
    Json(controller.search(&query.zipcode))
}

/// Resources of one category
///
/// `category` is `housing`, `food`, or `utility` (or the full label).
///
/// # Errors
///
/// 404 `UNKNOWN_CATEGORY` for any other category.
#[utoipa::path(
    get,
    path = "/resources/{category}",
    tag = "Resources",
    params(
        ("category" = String, Path, description = "housing, food, or utility"),
        ZipcodeQuery
    ),
    responses(
        (status = 200, description = "Matching resources in catalog order", body = Vec<Resource>),
        (status = 404, description = "Unknown category", body = ProblemDetails)
    )
)]
#[allow(clippy::unused_async)]
pub async fn search_category(
    Extension(controller): Extension<SearchController>,
    Path(category): Path<String>,
    Query(query): Query<ZipcodeQuery>,
) -> Result<Json<Vec<Resource>>, ProblemDetails> {
    let category = Category::from_str(&category).map_err(|err| {
        ProblemDetails::new(
            StatusCode::NOT_FOUND,
            "UNKNOWN_CATEGORY",
            "Unknown Category",
            err.to_string(),
        )
        .with_field("category")
    })?;
    Ok(Json(controller.search_category(&query.zipcode, category)))
}

/// Open a session
///
/// A new session has not searched, shows no map, and holds only the greeting.
///
/// # Errors
///
/// 503 `SESSION_CAPACITY` when the server holds the maximum number of sessions.
#[utoipa::path(
    post,
    path = "/sessions",
    tag = "Sessions",
    responses(
        (status = 201, description = "Session created", body = CreateSessionResponse),
        (status = 503, description = "Session capacity reached", body = ProblemDetails)
    )
)]
pub async fn create_session(
    Extension(store): Extension<Arc<SessionStore>>,
) -> Result<(StatusCode, Json<CreateSessionResponse>), ProblemDetails> {
    let session = store.create().await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateSessionResponse {
            session_id: session.id(),
        }),
    ))
}

/// Close a session
///
/// # Errors
///
/// 404 `SESSION_NOT_FOUND`.
#[utoipa::path(
    delete,
    path = "/sessions/{id}",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 204, description = "Session closed"),
        (status = 404, description = "Unknown session", body = ProblemDetails)
    )
)]
pub async fn delete_session(
    Extension(store): Extension<Arc<SessionStore>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ProblemDetails> {
    if store.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ProblemDetails::session_not_found(id))
    }
}

/// Current search state
///
/// # Errors
///
/// 404 `SESSION_NOT_FOUND`.
#[utoipa::path(
    get,
    path = "/sessions/{id}/search",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Search state", body = SearchView),
        (status = 404, description = "Unknown session", body = ProblemDetails)
    )
)]
pub async fn get_search(
    Extension(store): Extension<Arc<SessionStore>>,
    Path(id): Path<Uuid>,
) -> Result<Json<SearchView>, ProblemDetails> {
    let session = load_session(&store, id).await?;
    Ok(Json(session.search_view().await))
}

/// Submit a zipcode
///
/// Replaces the previous results and redraws the map.
///
/// # Errors
///
/// 404 `SESSION_NOT_FOUND`.
#[utoipa::path(
    post,
    path = "/sessions/{id}/search",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = SearchRequest,
    responses(
        (status = 200, description = "Search state after the submission", body = SearchView),
        (status = 404, description = "Unknown session", body = ProblemDetails)
    )
)]
pub async fn submit_search(
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(controller): Extension<SearchController>,
    Path(id): Path<Uuid>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchView>, ProblemDetails> {
    let session = load_session(&store, id).await?;
    Ok(Json(session.search(&controller, &req.zipcode).await))
}

/// Current map frame
///
/// `null` while nothing is plotted.
///
/// # Errors
///
/// 404 `SESSION_NOT_FOUND`.
#[utoipa::path(
    get,
    path = "/sessions/{id}/map",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Map frame or null", body = Option<MapFrame>),
        (status = 404, description = "Unknown session", body = ProblemDetails)
    )
)]
pub async fn get_map(
    Extension(store): Extension<Arc<SessionStore>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Option<MapFrame>>, ProblemDetails> {
    let session = load_session(&store, id).await?;
    Ok(Json(session.map_frame().await))
}

/// Move the map
///
/// # Errors
///
/// 404 `SESSION_NOT_FOUND`, 409 `MAP_EMPTY`, 400 `INVALID_COORDINATES`.
#[utoipa::path(
    put,
    path = "/sessions/{id}/map/viewport",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = ViewportRequest,
    responses(
        (status = 200, description = "Map frame after the move", body = MapFrame),
        (status = 400, description = "Coordinates out of range", body = ProblemDetails),
        (status = 404, description = "Unknown session", body = ProblemDetails),
        (status = 409, description = "Nothing on the map", body = ProblemDetails)
    )
)]
pub async fn set_viewport(
    Extension(store): Extension<Arc<SessionStore>>,
    Path(id): Path<Uuid>,
    Json(req): Json<ViewportRequest>,
) -> Result<Json<MapFrame>, ProblemDetails> {
    let session = load_session(&store, id).await?;
    let frame = session.set_viewport(req.lat, req.lng, req.zoom).await?;
    Ok(Json(frame))
}

/// Select a marker
///
/// Opens the detail overlay for the marker, replacing any previous selection.
///
/// # Errors
///
/// 404 `SESSION_NOT_FOUND` or `UNKNOWN_MARKER`, 409 `MAP_EMPTY`.
#[utoipa::path(
    put,
    path = "/sessions/{id}/map/selection",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = SelectionRequest,
    responses(
        (status = 200, description = "Map frame with the overlay open", body = MapFrame),
        (status = 404, description = "Unknown session or marker", body = ProblemDetails),
        (status = 409, description = "Nothing on the map", body = ProblemDetails)
    )
)]
pub async fn select_marker(
    Extension(store): Extension<Arc<SessionStore>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<MapFrame>, ProblemDetails> {
    let session = load_session(&store, id).await?;
    let frame = session.select(req.resource_id).await?;
    Ok(Json(frame))
}

/// Close the overlay
///
/// # Errors
///
/// 404 `SESSION_NOT_FOUND`.
#[utoipa::path(
    delete,
    path = "/sessions/{id}/map/selection",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Map frame or null", body = Option<MapFrame>),
        (status = 404, description = "Unknown session", body = ProblemDetails)
    )
)]
pub async fn clear_selection(
    Extension(store): Extension<Arc<SessionStore>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Option<MapFrame>>, ProblemDetails> {
    let session = load_session(&store, id).await?;
    Ok(Json(session.clear_selection().await))
}

/// Chat transcript
///
/// # Errors
///
/// 404 `SESSION_NOT_FOUND`.
#[utoipa::path(
    get,
    path = "/sessions/{id}/chat",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Transcript and busy flag", body = ChatStateResponse),
        (status = 404, description = "Unknown session", body = ProblemDetails)
    )
)]
pub async fn get_chat(
    Extension(store): Extension<Arc<SessionStore>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ChatStateResponse>, ProblemDetails> {
    let session = load_session(&store, id).await?;
    let (transcript, busy) = session.chat_state().await;
    Ok(Json(ChatStateResponse { transcript, busy }))
}

/// Send a chat message
///
/// An unreachable assistant is not an error: the reply is the fallback line
/// and `delivered` is false.
///
/// # Errors
///
/// 404 `SESSION_NOT_FOUND`, 400 `EMPTY_MESSAGE`, 409 `CHAT_BUSY`.
#[utoipa::path(
    post,
    path = "/sessions/{id}/chat",
    tag = "Sessions",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Reply and updated transcript", body = ChatResponse),
        (status = 400, description = "Blank message", body = ProblemDetails),
        (status = 404, description = "Unknown session", body = ProblemDetails),
        (status = 409, description = "A message is already in flight", body = ProblemDetails)
    )
)]
pub async fn send_chat(
    Extension(store): Extension<Arc<SessionStore>>,
    Extension(relay): Extension<ChatRelay>,
    Path(id): Path<Uuid>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ProblemDetails> {
    let session = load_session(&store, id).await?;
    let exchange = session.chat(&relay, &req.message).await?;
    Ok(Json(ChatResponse {
        reply: exchange.reply.text().to_string(),
        delivered: exchange.reply.delivered(),
        transcript: exchange.transcript,
    }))
}
