use std::{net::SocketAddr, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use catalog::CatalogError;
use shared::{
    domain::{MacroProcessHandle, SessionState},
    error::{ApiError, ErrorCode},
    protocol::{
        ActionOutcome, ScriptsResponse, ServerInfo, SessionStateRequest, StartMacroRequest,
    },
};
use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_directories};

const MAX_REQUEST_BYTES: usize = 64 * 1024;

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings();
    prepare_directories(&settings)?;
    let state = AppState::from_settings(&settings).map_err(|error| {
        error!(
            script_dir = %settings.script_dir.display(),
            error = %format!("{error:#}"),
            "failed to initialise; verify the script directory is readable"
        );
        error
    })?;
    if settings.dry_run {
        warn!("dry-run mode: actions are logged, not sent to the hid gadget");
    }
    info!(
        keyboard = state.hid.keyboard_present(),
        mouse = state.hid.mouse_present(),
        "hid devices"
    );
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(server_info))
        .route("/healthz", get(healthz))
        .route(
            "/session_state",
            get(get_session_state)
                .post(update_session_state)
                .delete(clear_session_state),
        )
        .route("/scripts", get(list_scripts))
        .route("/image/:script_name", get(script_image))
        .route("/action/:family/:name", post(run_action))
        .route("/status", get(macro_status))
        .route("/start_macro", post(start_macro))
        .route("/pause_macro", post(pause_macro))
        .route("/resume_macro", post(resume_macro))
        .route("/stop_macro", post(stop_macro))
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Maps a domain error onto its HTTP status and JSON body.
fn reject(error: impl Into<ApiError>) -> (StatusCode, Json<ApiError>) {
    let error = error.into();
    let status = match error.code {
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        code if code.is_client_error() => StatusCode::BAD_REQUEST,
        _ => StatusCode::NOT_FOUND,
    };
    (status, Json(error))
}

/// Parses a JSON body, reporting malformed input as a validation error.
fn parse_body<T: serde::de::DeserializeOwned>(body: &Bytes) -> ApiResult<T> {
    serde_json::from_slice(body).map_err(|e| {
        reject(ApiError::new(
            ErrorCode::Validation,
            format!("invalid request body: {e}"),
        ))
    })
}

async fn healthz() -> &'static str {
    "ok"
}

async fn server_info(State(state): State<Arc<AppState>>) -> Json<ServerInfo> {
    Json(ServerInfo {
        message: "Macro control server".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        status: "running".into(),
        script_directory: state.library.script_dir().display().to_string(),
        images_directory: state.library.images_dir().display().to_string(),
        mouse_enabled: state.hid.mouse_present(),
        keyboard_enabled: state.hid.keyboard_present(),
        dry_run: state.dry_run,
        class_map_combinations: state.catalog.list(),
    })
}

async fn get_session_state(State(state): State<Arc<AppState>>) -> Json<SessionState> {
    Json(state.session.get().await)
}

async fn update_session_state(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<SessionState>> {
    let request: SessionStateRequest = parse_body(&body)?;
    let updated = state.session.update(request).await.map_err(reject)?;
    Ok(Json(updated))
}

async fn clear_session_state(State(state): State<Arc<AppState>>) -> Json<SessionState> {
    Json(state.session.clear().await)
}

async fn list_scripts(State(state): State<Arc<AppState>>) -> ApiResult<Json<ScriptsResponse>> {
    let library = Arc::clone(&state.library);
    let scripts = tokio::task::spawn_blocking(move || library.list_scripts())
        .await
        .map_err(|e| reject(ApiError::internal(e.to_string())))?
        .map_err(|e| {
            error!(error = %e, "failed to list scripts");
            reject(ApiError::internal(e.to_string()))
        })?;
    Ok(Json(ScriptsResponse {
        success: true,
        scripts,
    }))
}

async fn script_image(
    State(state): State<Arc<AppState>>,
    Path(script_name): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let library = Arc::clone(&state.library);
    let asset = tokio::task::spawn_blocking(move || library.find_image(&script_name))
        .await
        .map_err(|e| reject(ApiError::internal(e.to_string())))?
        .map_err(|e| match &e {
            CatalogError::NotFound(_) => {
                reject(ApiError::new(ErrorCode::NotFound, e.to_string()))
            }
            CatalogError::TooLarge { .. } => {
                warn!(error = %e, "refusing to serve oversized image");
                reject(ApiError::new(ErrorCode::NotFound, e.to_string()))
            }
            CatalogError::Io(_) => reject(ApiError::internal(e.to_string())),
        })?;
    let bytes = tokio::fs::read(&asset.path).await.map_err(|e| {
        error!(path = %asset.path.display(), error = %e, "failed to read image");
        reject(ApiError::internal(format!("failed to read image: {e}")))
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(asset.media_type),
    );
    Ok((StatusCode::OK, headers, bytes))
}

async fn run_action(
    State(state): State<Arc<AppState>>,
    Path((family, name)): Path<(String, String)>,
) -> ApiResult<Json<ActionOutcome>> {
    let outcome = state
        .actions
        .dispatch(&family, &name)
        .await
        .map_err(reject)?;
    Ok(Json(outcome))
}

async fn macro_status(State(state): State<Arc<AppState>>) -> Json<MacroProcessHandle> {
    Json(state.macros.status().await)
}

async fn start_macro(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<MacroProcessHandle>> {
    let request: StartMacroRequest = parse_body(&body)?;
    let handle = state
        .macros
        .start(&request.script_name)
        .await
        .map_err(reject)?;
    Ok(Json(handle))
}

async fn pause_macro(State(state): State<Arc<AppState>>) -> ApiResult<Json<MacroProcessHandle>> {
    let handle = state.macros.pause().await.map_err(reject)?;
    Ok(Json(handle))
}

async fn resume_macro(State(state): State<Arc<AppState>>) -> ApiResult<Json<MacroProcessHandle>> {
    let handle = state.macros.resume().await.map_err(reject)?;
    Ok(Json(handle))
}

async fn stop_macro(State(state): State<Arc<AppState>>) -> ApiResult<Json<MacroProcessHandle>> {
    let handle = state.macros.stop().await.map_err(reject)?;
    Ok(Json(handle))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
