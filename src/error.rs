use std::borrow::Cow;

use axum::{
	extract::rejection,
	http::StatusCode,
	response::{IntoResponse, Response},
	Json,
};
use schemars::JsonSchema;
use serde::Serialize;

pub type Map = serde_json::Map<String, serde_json::Value>;

/// A single error message sent to the client.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Message<'a> {
	/// A machine-readable error code, or a short human-readable message.
	pub content: Cow<'a, str>,
	/// The input field the error relates to, if any.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub field: Option<Cow<'a, str>>,
	/// Extra context about the error.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<Cow<'a, Map>>,
}

impl<'a> Message<'a> {
	pub fn new(content: impl Into<Cow<'a, str>>) -> Self {
		Self {
			content: content.into(),
			field: None,
			details: None,
		}
	}

	#[must_use]
	pub fn field(mut self, field: impl Into<Cow<'a, str>>) -> Self {
		self.field = Some(field.into());
		self
	}

	#[must_use]
	pub fn detail(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
		self.details
			.get_or_insert_with(|| Cow::Owned(Map::new()))
			.to_mut()
			.insert(key.into(), value.into());
		self
	}

	pub fn into_vec(self) -> Vec<Self> {
		vec![self]
	}
}

/// The body of every error response.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ErrorResponse {
	pub errors: Vec<Message<'static>>,
}

/// An error specific to a group of routes.
///
/// The messages are presented to the client, so they should not contain
/// sensitive information.
pub trait ErrorShape: std::error::Error {
	fn status(&self) -> StatusCode;

	fn into_errors(self) -> Vec<Message<'static>>;
}

/// Errors shared by every route.
///
/// The Display trait is not sent to the client, so it can show
/// sensitive information.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
	#[error("validation error: {0}")]
	Validation(#[from] validator::ValidationErrors),
	#[error("json error: {0}")]
	Json(#[from] rejection::JsonRejection),
	#[error("query error: {0}")]
	Query(#[from] rejection::QueryRejection),
	#[error("path error: {0}")]
	Path(#[from] rejection::PathRejection),
	#[error("database error: {0}")]
	Database(#[from] sqlx::Error),
	#[error("serialization error: {0}")]
	Serialize(#[from] serde_json::Error),
	#[error("too many requests, retry in {wait_time}s")]
	RateLimited { wait_time: u64 },
	#[error("rate limiter error: {0}")]
	RateLimiter(String),
	#[error("route not found")]
	NotFound,
	#[error("invalid redirect location: {0}")]
	InvalidRedirect(String),
	#[error("body error: {0}")]
	Body(#[from] rejection::BytesRejection),
}

impl AppError {
	pub fn status(&self) -> StatusCode {
		match self {
			Self::Validation(..)
			| Self::Json(..)
			| Self::Query(..)
			| Self::Path(..)
			| Self::Body(..) => StatusCode::BAD_REQUEST,
			Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
			Self::NotFound => StatusCode::NOT_FOUND,
			Self::Database(..)
			| Self::Serialize(..)
			| Self::RateLimiter(..)
			| Self::InvalidRedirect(..) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	fn into_errors(self) -> Vec<Message<'static>> {
		match self {
			Self::Validation(errors) => errors
				.field_errors()
				.into_iter()
				.flat_map(|(field, errors)| {
					errors.iter().map(move |error| {
						let content = error.message.clone().unwrap_or_else(|| error.code.clone());

						Message::new(content).field(field.to_string())
					})
				})
				.collect(),
			Self::Json(error) => Message::new(error.body_text()).into_vec(),
			Self::Query(error) => Message::new(error.body_text()).into_vec(),
			Self::Path(error) => Message::new(error.body_text()).into_vec(),
			Self::Body(error) => Message::new(error.body_text()).into_vec(),
			Self::RateLimited { wait_time } => Message::new("too_many_requests")
				.detail("wait_time", wait_time)
				.into_vec(),
			Self::NotFound => Message::new("not_found").into_vec(),
			Self::Database(..)
			| Self::Serialize(..)
			| Self::RateLimiter(..)
			| Self::InvalidRedirect(..) => Message::new("internal_server_error").into_vec(),
		}
	}
}

impl IntoResponse for AppError {
	fn into_response(self) -> Response {
		let status = self.status();

		if status.is_server_error() {
			tracing::error!(error = %self, "request failed");
		}

		(
			status,
			Json(ErrorResponse {
				errors: self.into_errors(),
			}),
		)
			.into_response()
	}
}

impl aide::OperationOutput for AppError {
	type Inner = ErrorResponse;
}

/// The error type returned by route handlers: either an error shared
/// by every route, or one specific to the route module.
#[derive(Debug)]
pub enum RouteError<T> {
	App(AppError),
	Route(T),
}

impl<T: ErrorShape> From<T> for RouteError<T> {
	fn from(error: T) -> Self {
		Self::Route(error)
	}
}

impl<T> From<AppError> for RouteError<T> {
	fn from(error: AppError) -> Self {
		Self::App(error)
	}
}

impl<T> From<sqlx::Error> for RouteError<T> {
	fn from(error: sqlx::Error) -> Self {
		Self::App(error.into())
	}
}

impl<T> From<validator::ValidationErrors> for RouteError<T> {
	fn from(error: validator::ValidationErrors) -> Self {
		Self::App(error.into())
	}
}

impl<T> From<serde_json::Error> for RouteError<T> {
	fn from(error: serde_json::Error) -> Self {
		Self::App(error.into())
	}
}

impl<T: ErrorShape> IntoResponse for RouteError<T> {
	fn into_response(self) -> Response {
		match self {
			Self::App(error) => error.into_response(),
			Self::Route(error) => (
				error.status(),
				Json(ErrorResponse {
					errors: error.into_errors(),
				}),
			)
				.into_response(),
		}
	}
}

impl<T> aide::OperationOutput for RouteError<T> {
	type Inner = ErrorResponse;
}

/// Fallback for unknown routes.
pub async fn not_found() -> AppError {
	AppError::NotFound
}

#[cfg(test)]
mod test {
	use validator::{ValidationError, ValidationErrors};

	use super::*;

	#[test]
	fn test_validation_errors_keep_their_field() {
		let mut errors = ValidationErrors::new();
		errors.add("text", ValidationError::new("length"));

		let messages = AppError::Validation(errors).into_errors();

		assert_eq!(messages.len(), 1);
		assert_eq!(messages[0].content, "length");
		assert_eq!(messages[0].field.as_deref(), Some("text"));
	}

	#[test]
	fn test_database_errors_are_opaque() {
		let error = AppError::Database(sqlx::Error::RowNotFound);

		assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);

		let messages = error.into_errors();

		assert_eq!(messages[0].content, "internal_server_error");
		assert!(messages[0].details.is_none());
	}

	#[test]
	fn test_message_details() {
		let message = Message::new("unknown_post").detail("post", 7);

		let details = message.details.expect("details should be set");

		assert_eq!(details["post"], 7);
	}
}
