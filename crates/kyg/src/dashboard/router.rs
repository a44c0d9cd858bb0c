use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{debug, info};

use super::app::{CANCEL_PATH, RETRIEVE_PATH, RETRY_PATH};
use super::artifact::{ReportArtifact, ReportGenerator};
use super::components::DOWNLOAD_PATH;
use super::domain::{DocumentHandle, RetrievalRequest};
use super::runtime::{DashboardHandle, RuntimeError};

#[derive(Clone)]
pub struct DashboardState {
    pub handle: DashboardHandle,
    pub reports: Arc<dyn ReportGenerator>,
    /// Body limit of the multipart retrieval form.
    pub upload_limit: usize,
}

/// Router builder exposing the dashboard page, its form actions and the JSON API.
pub fn dashboard_router(state: DashboardState) -> Router {
    let upload_limit = state.upload_limit;
    Router::new()
        .route("/", get(page_handler))
        .route(
            RETRIEVE_PATH,
            post(retrieve_form_handler).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(RETRY_PATH, post(retry_handler))
        .route(CANCEL_PATH, post(cancel_handler))
        .route(DOWNLOAD_PATH, get(download_handler))
        .route("/api/v1/dashboard", get(snapshot_handler))
        .route("/api/v1/retrievals", post(retrieve_json_handler))
        .with_state(state)
}

pub(crate) async fn page_handler(State(state): State<DashboardState>) -> Response {
    match state.handle.snapshot().await {
        Ok(snapshot) => Html(snapshot.html).into_response(),
        Err(err) => unavailable(err),
    }
}

pub(crate) async fn snapshot_handler(State(state): State<DashboardState>) -> Response {
    match state.handle.snapshot().await {
        Ok(snapshot) => (StatusCode::OK, Json(snapshot)).into_response(),
        Err(err) => unavailable(err),
    }
}

pub(crate) async fn retrieve_form_handler(
    State(state): State<DashboardState>,
    multipart: Multipart,
) -> Response {
    let request = match read_form(multipart).await {
        Ok(request) => request,
        Err(err) => {
            debug!(error = %err, "retrieval form rejected");
            let payload = json!({ "error": err.body_text() });
            return (err.status(), Json(payload)).into_response();
        }
    };

    match state.handle.submit(request).await {
        Ok(accepted) => {
            if !accepted {
                debug!("submit ignored while a retrieval is pending");
            }
            Redirect::to("/").into_response()
        }
        Err(err) => unavailable(err),
    }
}

pub(crate) async fn retrieve_json_handler(
    State(state): State<DashboardState>,
    Json(request): Json<RetrievalRequest>,
) -> Response {
    match state.handle.submit(request).await {
        Ok(true) => {
            let payload = json!({ "status": "pending" });
            (StatusCode::ACCEPTED, Json(payload)).into_response()
        }
        Ok(false) => {
            let payload = json!({ "error": "a retrieval is already pending" });
            (StatusCode::CONFLICT, Json(payload)).into_response()
        }
        Err(err) => unavailable(err),
    }
}

pub(crate) async fn retry_handler(State(state): State<DashboardState>) -> Response {
    match state.handle.retry().await {
        Ok(_) => Redirect::to("/").into_response(),
        Err(err) => unavailable(err),
    }
}

pub(crate) async fn cancel_handler(State(state): State<DashboardState>) -> Response {
    match state.handle.cancel().await {
        Ok(cancelled) => {
            if cancelled {
                info!("in-flight retrieval cancelled by user");
            }
            Redirect::to("/").into_response()
        }
        Err(err) => unavailable(err),
    }
}

pub(crate) async fn download_handler(State(state): State<DashboardState>) -> Response {
    let snapshot = match state.handle.snapshot().await {
        Ok(snapshot) => snapshot,
        Err(err) => return unavailable(err),
    };

    let Some(payload) = snapshot.payload else {
        let payload = json!({ "error": "no report has been retrieved yet" });
        return (StatusCode::CONFLICT, Json(payload)).into_response();
    };

    match state
        .reports
        .generate(&payload.reporting, Some(&payload.charity_profile))
    {
        Ok(artifact) => artifact_response(artifact),
        Err(err) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
        }
    }
}

fn artifact_response(artifact: ReportArtifact) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.body,
    )
        .into_response()
}

fn unavailable(err: RuntimeError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
}

/// Reads the retrieval form; documents are measured while streaming, not buffered.
async fn read_form(mut multipart: Multipart) -> Result<RetrievalRequest, MultipartError> {
    let mut request = RetrievalRequest::default();

    while let Some(mut field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "charity_identifier" => request.charity_identifier = field.text().await?,
            "links" => request.links = field.text().await?,
            "documents" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let mut size = 0;
                while let Some(chunk) = field.chunk().await? {
                    size += chunk.len();
                }
                if !file_name.is_empty() {
                    request.documents.push(DocumentHandle {
                        name: file_name,
                        content_type,
                        size,
                    });
                }
            }
            other => debug!(field = other, "unexpected form field ignored"),
        }
    }

    Ok(request)
}
