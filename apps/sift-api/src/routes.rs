use axum::{
	Json, Router,
	extract::{Path, State, rejection::JsonRejection},
	http::StatusCode,
	response::{IntoResponse, Response},
	routing::{get, post},
};
use serde::Serialize;

use crate::state::AppState;
use sift_service::{BatchSearchRequest, BatchSearchResponse, Error, SearchRequest, SearchResponse};

pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(health))
		.route("/collections/{name}/search", post(search))
		.route("/collections/{name}/search/batch", post(search_batch))
		.with_state(state)
}

#[derive(Debug, Serialize)]
struct HealthBody {
	status: &'static str,
	store: &'static str,
}

async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthBody>) {
	match state.service.health().await {
		Ok(()) => (StatusCode::OK, Json(HealthBody { status: "ok", store: "connected" })),
		Err(err) => {
			tracing::warn!(error = %err, "Vector store health check failed.");

			(
				StatusCode::SERVICE_UNAVAILABLE,
				Json(HealthBody { status: "degraded", store: "disconnected" }),
			)
		},
	}
}

async fn search(
	State(state): State<AppState>,
	Path(name): Path<String>,
	payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.search(&name, payload).await?;

	Ok(Json(response))
}

async fn search_batch(
	State(state): State<AppState>,
	Path(name): Path<String>,
	payload: Result<Json<BatchSearchRequest>, JsonRejection>,
) -> Result<Json<BatchSearchResponse>, ApiError> {
	let Json(payload) = payload?;
	let response = state.service.search_batch(&name, payload).await?;

	Ok(Json(response))
}

#[derive(Debug, Serialize)]
struct ErrorBody {
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}

#[derive(Debug)]
pub struct ApiError {
	status: StatusCode,
	error_code: String,
	message: String,
	fields: Option<Vec<String>>,
}
impl ApiError {
	fn new(
		status: StatusCode,
		error_code: impl Into<String>,
		message: impl Into<String>,
		fields: Option<Vec<String>>,
	) -> Self {
		Self { status, error_code: error_code.into(), message: message.into(), fields }
	}
}
impl From<Error> for ApiError {
	fn from(err: Error) -> Self {
		match err {
			Error::MissingRank => json_error(
				StatusCode::BAD_REQUEST,
				"missing_rank",
				err.to_string(),
				Some(vec!["$.rank".to_string()]),
			),
			Error::InvalidRequest { message, field } =>
				json_error(StatusCode::BAD_REQUEST, "invalid_request", message, Some(vec![field])),
			Error::UnsupportedTarget { .. } =>
				json_error(StatusCode::BAD_REQUEST, "unsupported_target", err.to_string(), None),
			Error::NotFound { message } =>
				json_error(StatusCode::NOT_FOUND, "not_found", message, None),
			Error::Provider { message } => {
				tracing::error!(%message, "Embedding provider failed.");

				json_error(StatusCode::BAD_GATEWAY, "provider_error", message, None)
			},
			Error::Store { message } => {
				tracing::error!(%message, "Vector store failed.");

				json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", message, None)
			},
		}
	}
}
impl From<JsonRejection> for ApiError {
	fn from(rejection: JsonRejection) -> Self {
		json_error(StatusCode::BAD_REQUEST, "invalid_request", rejection.body_text(), None)
	}
}
impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let body =
			ErrorBody { error_code: self.error_code, message: self.message, fields: self.fields };

		(self.status, Json(body)).into_response()
	}
}

pub fn json_error(
	status: StatusCode,
	code: &str,
	message: impl Into<String>,
	fields: Option<Vec<String>>,
) -> ApiError {
	ApiError::new(status, code, message, fields)
}
