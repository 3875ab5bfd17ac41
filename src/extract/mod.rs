mod session;

pub use session::{Session, Viewer};

use std::marker::PhantomData;

use aide::OperationIo;
use axum::{
	async_trait,
	body::{Body, Bytes},
	extract::{FromRequest, FromRequestParts, Request},
	http::{request, Response},
	response::IntoResponse,
};
use schemars::JsonSchema;
use serde::de;

use crate::error::AppError;

/// Runs the `validator` rules of an extracted value.
fn validated<T: validator::Validate>(value: T) -> Result<T, AppError> {
	value.validate()?;
	Ok(value)
}

/// Extractor that deserializes a JSON body and validates it.
///
/// T must implement [`serde::de::DeserializeOwned`] and [`validator::Validate`]
/// in order to be used in an extractor.
///
/// ```rust
/// async fn route(Json(form): Json<PostForm>) {
///   // ...
/// }
/// ```
#[derive(OperationIo)]
#[aide(
	input_with = "axum::Json<T>",
	output_with = "axum::Json<T>",
	json_schema
)]
pub struct Json<T>(pub T);

impl<T> IntoResponse for Json<T>
where
	T: serde::Serialize,
{
	fn into_response(self) -> Response<Body> {
		axum::Json(self.0).into_response()
	}
}

#[async_trait]
impl<T, S> FromRequest<S> for Json<T>
where
	T: de::DeserializeOwned + validator::Validate + JsonSchema + 'static,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		let axum::Json(form) = axum::Json::<T>::from_request(req, state).await?;

		validated(form).map(Self)
	}
}

/// A JSON body that is read eagerly but only deserialized and validated
/// by [`DeferredJson::parse`].
///
/// Handlers that must answer before looking at the body (e.g. redirecting
/// anyone but the author of a post) use this instead of [`Json<T>`], so a
/// malformed body cannot short-circuit them.
#[derive(OperationIo)]
#[aide(input_with = "axum::Json<T>", json_schema)]
pub struct DeferredJson<T> {
	body: Bytes,
	_form: PhantomData<fn() -> T>,
}

impl<T> DeferredJson<T>
where
	T: de::DeserializeOwned + validator::Validate,
{
	pub fn parse(self) -> Result<T, AppError> {
		validated(axum::Json::<T>::from_bytes(&self.body)?.0)
	}
}

#[async_trait]
impl<T, S> FromRequest<S> for DeferredJson<T>
where
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
		Ok(Self {
			body: Bytes::from_request(req, state).await?,
			_form: PhantomData,
		})
	}
}

/// Extractor that deserializes a query string and validates it.
///
/// This is similar to [`Json<T>`], but does not consume the body.
///
/// ```rust
/// async fn route(Query(input): Query<PageInput>) {
///   // ...
/// }
/// ```
#[derive(OperationIo)]
#[aide(
	input_with = "axum::extract::Query<T>",
	output_with = "axum::Json<T>",
	json_schema
)]
pub struct Query<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Query<T>
where
	T: de::DeserializeOwned + validator::Validate,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let axum::extract::Query(input) =
			axum::extract::Query::<T>::from_request_parts(parts, state).await?;

		validated(input).map(Self)
	}
}

/// Extractor that deserializes a path parameter and validates it.
#[derive(OperationIo)]
#[aide(
	input_with = "axum::extract::Path<T>",
	output_with = "axum::Json<T>",
	json_schema
)]
pub struct Path<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for Path<T>
where
	T: de::DeserializeOwned + validator::Validate + Send,
	S: Send + Sync,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let axum::extract::Path(input) =
			axum::extract::Path::<T>::from_request_parts(parts, state).await?;

		validated(input).map(Self)
	}
}

#[cfg(test)]
mod test {
	use axum::http::StatusCode;

	use super::*;
	use crate::route::post::model::PostForm;

	fn deferred(body: &'static str) -> DeferredJson<PostForm> {
		DeferredJson {
			body: Bytes::from_static(body.as_bytes()),
			_form: PhantomData,
		}
	}

	#[test]
	fn test_deferred_json_parses_on_demand() {
		let form = deferred(r#"{ "text": "hello", "group_id": 3 }"#).parse().unwrap();

		assert_eq!(form.text, "hello");
		assert_eq!(form.group_id, Some(3));
	}

	#[test]
	fn test_deferred_json_rejects_malformed_bodies() {
		let error = deferred("{ not json").parse().unwrap_err();

		assert_eq!(error.status(), StatusCode::BAD_REQUEST);

		let error = deferred(r#"{ "text": " " }"#).parse().unwrap_err();

		assert!(matches!(error, AppError::Validation(..)));
	}
}
