use crate::export::ExportError;
use crate::solr::SolrError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: bool,
    pub code: &'static str,
    pub message: String,
    pub data: Option<()>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_argument", message)
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<SolrError> for ApiError {
    fn from(err: SolrError) -> Self {
        tracing::warn!(%err, "upstream search failed");
        let code = match err {
            SolrError::Transport(_) => "upstream_unavailable",
            SolrError::Status { .. } => "upstream_status",
            SolrError::Parse(_) => "upstream_parse",
        };
        Self::new(StatusCode::BAD_GATEWAY, code, err.to_string())
    }
}

impl From<ExportError> for ApiError {
    fn from(err: ExportError) -> Self {
        match err {
            ExportError::Solr(err) => err.into(),
            other => Self::new(StatusCode::INTERNAL_SERVER_ERROR, "export_failed", other.to_string()),
        }
    }
}

impl From<minijinja::Error> for ApiError {
    fn from(err: minijinja::Error) -> Self {
        tracing::error!(%err, "page template failed to render");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "render_failed", err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = axum::Json(ErrorBody {
            error: true,
            code: self.code,
            message: self.message,
            data: None,
        });
        (self.status, body).into_response()
    }
}
