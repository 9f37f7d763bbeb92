use crate::{
    chats::{chat_patch_schema, Chat, ChatGroup, ChatPatchRequest, ChatRepository, ChatStore},
    config::Config,
    errors::{AppError, PatchError},
    paging::{self, Pagination, PagingDefaults, PagingResult},
    patch::{PatchRegistry, PatchRequest, ValidatedPatch},
};
use axum::{
    async_trait,
    body::Bytes,
    extract::{FromRef, FromRequest, FromRequestParts, Path, Request, State},
    http::{request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, patch},
    Json, Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tokio::signal;

pub const TOTAL_COUNT_HEADER: &str = "totalcount";
pub const TOTAL_PAGES_HEADER: &str = "totalpages";

#[derive(Clone, FromRef)]
pub struct SharedState {
    pub store: Arc<dyn ChatRepository>,
    pub patches: Arc<PatchRegistry>,
    pub paging: PagingDefaults,
}

impl SharedState {
    /// Registers every patch schema and checks the wiring up front.
    pub fn new(store: Arc<dyn ChatRepository>, paging: PagingDefaults) -> anyhow::Result<Self> {
        let patches = PatchRegistry::new().register(chat_patch_schema());
        patches.require::<ChatPatchRequest>()?;

        Ok(Self {
            store,
            patches: Arc::new(patches),
            paging,
        })
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/api/chatService/chatGroups", get(chat_groups))
        .route(
            "/api/chatService/chatGroups/:chat_group_id/chats",
            get(chats),
        )
        .route(
            "/api/chatService/chatGroups/:chat_group_id/chats/:chat_id",
            patch(patch_chat),
        )
        .layer(
            tower_http::trace::TraceLayer::new_for_http()
                .make_span_with(
                    tower_http::trace::DefaultMakeSpan::new().level(tracing::Level::INFO),
                )
                .on_response(
                    tower_http::trace::DefaultOnResponse::new().level(tracing::Level::INFO),
                ),
        )
        .with_state(state)
}

async fn start_app(config: Config) -> anyhow::Result<()> {
    let store = match config.data_file() {
        Some(path) => ChatStore::load(path)?,
        None => ChatStore::default(),
    };
    let state = SharedState::new(Arc::new(store), config.paging)?;

    async fn shutdown_signal() {
        let ctrl_c = async {
            signal::ctrl_c()
                .await
                .expect("failed to install Ctrl+C handler");
        };

        let terminate = async {
            signal::unix::signal(signal::unix::SignalKind::terminate())
                .expect("failed to install signal handler")
                .recv()
                .await;
        };

        tokio::select! {
            _ = ctrl_c => {},
            _ = terminate => {},
        }
        log::warn!("shutting down");
    }

    let listener = tokio::net::TcpListener::bind(&config.listen).await?;
    log::info!("listening on {}", config.listen);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn start_daemon(config: Config) -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(start_app(config))
}

#[derive(Debug)]
pub struct HttpError(AppError);

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        match &self.0 {
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, Json(json!({"error": message}))),
            AppError::BadRequest(_) | AppError::Query(_) => {
                (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
            }
            AppError::Patch(PatchError::Validation(errors)) => (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": message, "errors": errors})),
            ),
            AppError::Patch(PatchError::Malformed(_) | PatchError::NotAnObject) => {
                (StatusCode::BAD_REQUEST, Json(json!({"error": message})))
            }
            AppError::Patch(PatchError::Configuration(_))
            | AppError::IO(_)
            | AppError::Other(_) => {
                log::error!("{self:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": message})),
                )
            }
        }
        .into_response()
    }
}

impl<E> From<E> for HttpError
where
    E: Into<AppError>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Paging options read from the query string.
#[async_trait]
impl<S> FromRequestParts<S> for Pagination
where
    PagingDefaults: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let defaults = PagingDefaults::from_ref(state);
        let query = parts.uri.query().unwrap_or_default();
        Ok(Pagination::from_query(query, &defaults)?)
    }
}

/// A page of items as a JSON array, with totals in response headers when
/// they were requested.
pub struct PagedJson<T>(pub PagingResult<T>);

impl<T: Serialize> IntoResponse for PagedJson<T> {
    fn into_response(self) -> Response {
        let PagingResult { metadata, items } = self.0;
        let mut response = Json(items).into_response();
        if let Some(metadata) = metadata {
            let headers = response.headers_mut();
            headers.insert(TOTAL_COUNT_HEADER, HeaderValue::from(metadata.total_count));
            headers.insert(TOTAL_PAGES_HEADER, HeaderValue::from(metadata.total_pages));
        }
        response
    }
}

/// A patch body that passed binding and validation for `R`.
pub struct Patch<R: PatchRequest>(pub ValidatedPatch<R>);

#[async_trait]
impl<S, R> FromRequest<S> for Patch<R>
where
    R: PatchRequest,
    Arc<PatchRegistry>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = HttpError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let registry = Arc::<PatchRegistry>::from_ref(state);
        let body = Bytes::from_request(req, state)
            .await
            .map_err(|err| AppError::BadRequest(err.body_text()))?;
        let raw = std::str::from_utf8(&body)
            .map_err(|err| AppError::BadRequest(err.to_string()))?;

        Ok(Patch(registry.accept::<R>(raw)?))
    }
}

async fn chat_groups(
    State(state): State<SharedState>,
    pagination: Pagination,
) -> Result<PagedJson<ChatGroup>, HttpError> {
    log::debug!("pagination: {pagination:?}");

    let groups = state.store.chat_groups();
    Ok(PagedJson(paging::paginate(groups, &pagination)?))
}

async fn chats(
    State(state): State<SharedState>,
    Path(chat_group_id): Path<i64>,
    pagination: Pagination,
) -> Result<PagedJson<Chat>, HttpError> {
    log::debug!("chat group {chat_group_id}, pagination: {pagination:?}");

    let chats = state.store.chats(chat_group_id)?;
    Ok(PagedJson(paging::paginate(chats, &pagination)?))
}

async fn patch_chat(
    State(state): State<SharedState>,
    Path((chat_group_id, chat_id)): Path<(i64, i64)>,
    Patch(patch): Patch<ChatPatchRequest>,
) -> Result<Json<Chat>, HttpError> {
    log::debug!("patch chat {chat_id}: {:?}", patch.request());

    let chat = state.store.patch_chat(chat_group_id, chat_id, &patch)?;
    Ok(Json(chat))
}
