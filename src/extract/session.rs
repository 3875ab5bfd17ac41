use aide::OperationInput;
use axum::{
	async_trait,
	extract::{FromRef, FromRequestParts},
	http::{header, request},
};
use uuid::Uuid;

use crate::{
	error::{AppError, RouteError},
	openapi::SECURITY_SCHEME_SESSION,
	route::auth,
	session, Database,
};

/// Reads the session id from the `Cookie` headers, if there is one.
fn session_cookie(parts: &request::Parts) -> Option<String> {
	parts
		.headers
		.get_all(header::COOKIE)
		.into_iter()
		.filter_map(|value| value.to_str().ok())
		.flat_map(cookie::Cookie::split_parse)
		.filter_map(Result::ok)
		.find(|cookie| cookie.name() == session::COOKIE_NAME)
		.map(|cookie| cookie.value().to_owned())
}

async fn session_user(
	database: &Database,
	session_id: Uuid,
) -> Result<Option<auth::model::User>, sqlx::Error> {
	sqlx::query_as::<_, auth::model::User>(
		r#"
			SELECT * FROM "user" WHERE id = (
				SELECT user_id FROM session WHERE id = ?
			)
		"#,
	)
	.bind(session_id)
	.fetch_optional(database)
	.await
}

/// Extracts the session and related user from the request.
///
/// If it does not exist, a [`auth::Error::NoSessionCookie`] is returned.
/// If the session is invalid, a [`auth::Error::InvalidSessionCookie`] is returned.
///
/// ```rust
/// async fn route(session: Session) {
///   println!("{:?}", session.user);
/// }
/// ```
#[derive(Debug)]
pub struct Session {
	pub id: Uuid,
	pub user: auth::model::User,
}

#[async_trait]
impl<S> FromRequestParts<S> for Session
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = RouteError<auth::Error>;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let session_id = session_cookie(parts).ok_or(auth::Error::NoSessionCookie)?;
		let session_id =
			Uuid::parse_str(&session_id).map_err(|_| auth::Error::InvalidSessionCookie)?;

		let database = Database::from_ref(state);
		let user = session_user(&database, session_id)
			.await?
			.ok_or(auth::Error::InvalidSessionCookie)?;

		Ok(Session {
			id: session_id,
			user,
		})
	}
}

impl OperationInput for Session {
	/// Operation input for the session extractor.
	///
	/// This adds a session cookie requirement to the `OpenAPI` operation.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.push(
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		);
	}
}

/// The user making the request, if they are logged in.
///
/// Unlike [`Session`], a missing or stale session cookie is not an error:
/// the request is simply treated as anonymous.
#[derive(Debug)]
pub struct Viewer(pub Option<auth::model::User>);

impl Viewer {
	pub fn id(&self) -> Option<Uuid> {
		self.0.as_ref().map(|user| user.id)
	}
}

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
	Database: FromRef<S>,
	S: Sync + Send,
{
	type Rejection = AppError;

	async fn from_request_parts(
		parts: &mut request::Parts,
		state: &S,
	) -> Result<Self, Self::Rejection> {
		let Some(session_id) = session_cookie(parts).and_then(|id| Uuid::parse_str(&id).ok())
		else {
			return Ok(Self(None));
		};

		let database = Database::from_ref(state);

		Ok(Self(session_user(&database, session_id).await?))
	}
}

impl OperationInput for Viewer {
	/// The session cookie is optional, so both an empty requirement and
	/// the session cookie requirement are accepted.
	fn operation_input(_ctx: &mut aide::gen::GenContext, operation: &mut aide::openapi::Operation) {
		operation.security.extend([
			Default::default(),
			[(SECURITY_SCHEME_SESSION.to_string(), Vec::new())]
				.into_iter()
				.collect(),
		]);
	}
}
