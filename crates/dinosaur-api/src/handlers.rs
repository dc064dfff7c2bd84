//! HTTP request handlers for the Dinosaur API.
//!
//! axum accepts connections and hands every request to [`dispatch`], which
//! resolves it against the route table and runs the matching handler. Each
//! handler is one fixed sequence: decode parameters, make a single store
//! call, encode the result or map the error.

use crate::codec::{decode_create_request, decode_id, encode_dinosaur, encode_dinosaurs};
use crate::error::{ApiError, ApiResult};
use crate::message::{ApiRequest, ApiResponse};
use crate::routing::{RouteMatch, RouteTable};
use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    Router as AxumRouter,
};
use dinosaur_domain::traits::DinosaurStore;
use http_body_util::LengthLimitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, error};

/// Body of `GET /`
pub const WELCOME_MESSAGE: &str = "Welcome to the Dinosaur API!";

/// Default request body limit when none is configured
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024;

/// Handler identifiers stored in the route table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `GET /`
    Welcome,
    /// `GET /health`
    Health,
    /// `GET /dinosaur`
    ListDinosaurs,
    /// `GET /dinosaur/:id`
    GetDinosaur,
    /// `POST /dinosaur`
    CreateDinosaur,
    /// `DELETE /dinosaur/:id`
    DeleteDinosaur,
}

/// The API's route table
pub fn dinosaur_routes() -> RouteTable<Endpoint> {
    RouteTable::new()
        .get("/", Endpoint::Welcome)
        .get("/health", Endpoint::Health)
        .get("/dinosaur", Endpoint::ListDinosaurs)
        .get("/dinosaur/:id", Endpoint::GetDinosaur)
        .post("/dinosaur", Endpoint::CreateDinosaur)
        .delete("/dinosaur/:id", Endpoint::DeleteDinosaur)
}

/// Shared application state
pub struct AppState<S> {
    /// The persistence port, shared by all requests
    pub store: Arc<Mutex<S>>,
    /// Route table consulted for every request
    pub routes: Arc<RouteTable<Endpoint>>,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            routes: Arc::clone(&self.routes),
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl<S> AppState<S> {
    /// Create state owning the given store
    pub fn new(store: S) -> Self {
        Self::from_shared(Arc::new(Mutex::new(store)))
    }

    /// Create state around a store that is already shared
    pub fn from_shared(store: Arc<Mutex<S>>) -> Self {
        Self {
            store,
            routes: Arc::new(dinosaur_routes()),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Override the request body limit
    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// "ok" or "unavailable"
    pub status: String,
    /// Number of stored dinosaurs, when the store answered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dinosaurs: Option<usize>,
}

/// Run one store operation on the blocking pool
async fn with_store<S, T, F>(state: &AppState<S>, op: F) -> ApiResult<T>
where
    S: DinosaurStore + Send + 'static,
    S::Error: fmt::Display,
    T: Send + 'static,
    F: FnOnce(&mut S) -> Result<T, S::Error> + Send + 'static,
{
    let store = Arc::clone(&state.store);

    let joined = tokio::task::spawn_blocking(move || {
        let mut guard = store
            .lock()
            .map_err(|_| ApiError::StorageUnavailable("store lock poisoned".to_string()))?;
        op(&mut *guard).map_err(|e| ApiError::StorageUnavailable(e.to_string()))
    })
    .await;

    match joined {
        Ok(result) => result,
        Err(e) => Err(ApiError::StorageUnavailable(format!(
            "store task failed: {}",
            e
        ))),
    }
}

/// GET / - static welcome text
fn welcome() -> ApiResponse {
    ApiResponse::text(StatusCode::OK, WELCOME_MESSAGE)
}

/// GET /health - store reachability
async fn health_check<S>(state: &AppState<S>) -> ApiResult<ApiResponse>
where
    S: DinosaurStore + Send + 'static,
    S::Error: fmt::Display,
{
    let (status, body) = match with_store(state, |store| store.count_dinosaurs()).await {
        Ok(count) => (
            StatusCode::OK,
            HealthCheckResponse {
                status: "ok".to_string(),
                dinosaurs: Some(count),
            },
        ),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                HealthCheckResponse {
                    status: "unavailable".to_string(),
                    dinosaurs: None,
                },
            )
        }
    };

    Ok(ApiResponse::json(status, Bytes::from(serde_json::to_vec(&body)?)))
}

/// GET /dinosaur - every record
async fn list_dinosaurs<S>(state: &AppState<S>) -> ApiResult<ApiResponse>
where
    S: DinosaurStore + Send + 'static,
    S::Error: fmt::Display,
{
    let dinosaurs = with_store(state, |store| store.list_dinosaurs()).await?;
    Ok(ApiResponse::json(StatusCode::OK, encode_dinosaurs(&dinosaurs)?))
}

/// GET /dinosaur/:id - one record
async fn get_dinosaur<S>(state: &AppState<S>, request: &ApiRequest) -> ApiResult<ApiResponse>
where
    S: DinosaurStore + Send + 'static,
    S::Error: fmt::Display,
{
    let id = decode_id(request.params.get("id").unwrap_or_default())?;
    let dinosaur = with_store(state, move |store| store.get_dinosaur(id))
        .await?
        .ok_or(ApiError::NotFound(id))?;

    Ok(ApiResponse::json(StatusCode::OK, encode_dinosaur(&dinosaur)?))
}

/// POST /dinosaur - create a record, the store assigns its id
async fn create_dinosaur<S>(state: &AppState<S>, request: &ApiRequest) -> ApiResult<ApiResponse>
where
    S: DinosaurStore + Send + 'static,
    S::Error: fmt::Display,
{
    let new_dinosaur = decode_create_request(&request.body)?;
    let created = with_store(state, move |store| store.create_dinosaur(new_dinosaur)).await?;

    debug!("Created dinosaur {}", created.id);
    Ok(ApiResponse::json(StatusCode::OK, encode_dinosaur(&created)?))
}

/// DELETE /dinosaur/:id - remove a record, returning it
async fn delete_dinosaur<S>(state: &AppState<S>, request: &ApiRequest) -> ApiResult<ApiResponse>
where
    S: DinosaurStore + Send + 'static,
    S::Error: fmt::Display,
{
    let id = decode_id(request.params.get("id").unwrap_or_default())?;
    let deleted = with_store(state, move |store| store.delete_dinosaur(id))
        .await?
        .ok_or(ApiError::NotFound(id))?;

    debug!("Deleted dinosaur {}", deleted.id);
    Ok(ApiResponse::json(StatusCode::OK, encode_dinosaur(&deleted)?))
}

/// Run the handler for a resolved endpoint and map any error to a response
pub async fn handle<S>(state: &AppState<S>, endpoint: Endpoint, request: ApiRequest) -> ApiResponse
where
    S: DinosaurStore + Send + 'static,
    S::Error: fmt::Display,
{
    let result = match endpoint {
        Endpoint::Welcome => Ok(welcome()),
        Endpoint::Health => health_check(state).await,
        Endpoint::ListDinosaurs => list_dinosaurs(state).await,
        Endpoint::GetDinosaur => get_dinosaur(state, &request).await,
        Endpoint::CreateDinosaur => create_dinosaur(state, &request).await,
        Endpoint::DeleteDinosaur => delete_dinosaur(state, &request).await,
    };

    result.unwrap_or_else(|err| {
        if err.status_code().is_server_error() {
            error!("{} {} failed: {}", request.method, request.path, err);
        } else {
            debug!("{} {} rejected: {}", request.method, request.path, err);
        }
        err.into_api_response()
    })
}

/// Entry point for every request axum receives
async fn dispatch<S>(State(state): State<AppState<S>>, request: Request) -> Response
where
    S: DinosaurStore + Send + 'static,
    S::Error: fmt::Display,
{
    let (parts, body) = request.into_parts();
    let path = parts.uri.path().to_string();

    let (endpoint, params) = match state.routes.resolve(&parts.method, &path) {
        RouteMatch::Matched { handler, params } => (*handler, params),
        RouteMatch::MethodNotAllowed { allowed } if parts.method == Method::OPTIONS => {
            return ApiResponse::options(&allowed).into_response();
        }
        RouteMatch::MethodNotAllowed { allowed } => {
            debug!("{} {} not allowed", parts.method, path);
            return ApiResponse::method_not_allowed(&allowed).into_response();
        }
        RouteMatch::NotFound => {
            debug!("{} {} has no route", parts.method, path);
            return ApiResponse::not_found().into_response();
        }
    };

    let declared_length = parts
        .headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.parse::<usize>().ok());
    if declared_length.is_some_and(|length| length > state.max_body_bytes) {
        return ApiError::PayloadTooLarge(state.max_body_bytes).into_response();
    }

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) if exceeded_length_limit(&e) => {
            return ApiError::PayloadTooLarge(state.max_body_bytes).into_response()
        }
        Err(e) => {
            debug!("{} {} body could not be read: {}", parts.method, path, e);
            return ApiError::UnreadableBody(e.to_string()).into_response();
        }
    };

    debug!("Dispatching {} {} to {:?}", parts.method, path, endpoint);
    let request = ApiRequest::new(parts.method, path)
        .with_params(params)
        .with_body(body);

    handle(&state, endpoint, request).await.into_response()
}

/// Whether a body read failed because the limit was hit rather than the stream
fn exceeded_length_limit(error: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(error);
    while let Some(err) = source {
        if err.is::<LengthLimitError>() {
            return true;
        }
        source = err.source();
    }
    false
}

/// Create the axum router that feeds every request through the route table
pub fn create_router<S>(state: AppState<S>) -> AxumRouter
where
    S: DinosaurStore + Send + 'static,
    S::Error: fmt::Display,
{
    AxumRouter::new().fallback(dispatch::<S>).with_state(state)
}
