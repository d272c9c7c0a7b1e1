use crate::api::errors::ApiError;
use crate::api::AppState;
use crate::export::{self, ExportFormat, ExportJob};
use crate::search::filters::coerce_int;
use crate::search::{RequestParams, SearchRequest};
use axum::body::Body;
use axum::extract::{RawQuery, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use time::OffsetDateTime;

#[derive(Debug, Serialize)]
pub struct CountBody {
    pub count: u64,
}

/// `GET /export?action=export|export_count`.
pub async fn export(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Result<Response, ApiError> {
    let params = RequestParams::parse(raw.as_deref().unwrap_or_default());
    let request = SearchRequest::from_params(&params);

    match params.get("action").unwrap_or_default() {
        "export" => download(state, &params, request).await,
        "export_count" => {
            let departments = state.service.departments().await;
            let count = state
                .service
                .count(&request.query, &request.filters, &departments)
                .await?;
            Ok(Json(CountBody { count }).into_response())
        }
        other => Err(ApiError::bad_request(format!("unknown export action: {other:?}"))),
    }
}

async fn download(state: AppState, params: &RequestParams, request: SearchRequest) -> Result<Response, ApiError> {
    let config = state.service.config();
    let format = ExportFormat::parse(params.get("format").unwrap_or("json"));
    let requested = params
        .get("rows")
        .map(coerce_int)
        .filter(|n| *n > 0)
        .map(|n| n as usize);

    let job = ExportJob {
        text: request.query,
        filters: request.filters,
        format,
        target_collection: config.target_collection_id.clone(),
        limit: config.export_row_limit(requested),
        batch: config.export_batch_rows,
    };

    let departments = state.service.departments().await;
    let stream = export::start(state.service.client().clone(), departments, job).await?;

    let filename = format.filename(OffsetDateTime::now_utc().date(), stream.num_found);
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\""))
        .map_err(|err| ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "export_failed", err.to_string()))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(format.content_type())),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        Body::from_stream(stream.into_stream()),
    )
        .into_response())
}
