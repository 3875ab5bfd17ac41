pub mod about;
pub mod auth;
pub mod docs;
pub mod group;
pub mod model;
pub mod post;
pub mod profile;

use axum::{
	http::{header, HeaderValue, StatusCode},
	response::{IntoResponse, Response},
};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};

use crate::error::AppError;

/// The profile page of a user. Usernames may contain any letter, so the
/// segment is percent-encoded.
pub fn profile_location(username: &str) -> String {
	format!("/profile/{}", utf8_percent_encode(username, NON_ALPHANUMERIC))
}

/// Redirects (303 See Other) to the given location.
pub fn redirect(location: &str) -> Result<Response, AppError> {
	let value = HeaderValue::try_from(location)
		.map_err(|_| AppError::InvalidRedirect(location.to_owned()))?;

	Ok((StatusCode::SEE_OTHER, [(header::LOCATION, value)]).into_response())
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_profile_location_is_encoded() {
		assert_eq!(profile_location("john"), "/profile/john");
		assert_eq!(profile_location("Иван"), "/profile/%D0%98%D0%B2%D0%B0%D0%BD");
	}

	#[test]
	fn test_redirect() {
		let response = redirect("/posts/1").unwrap();

		assert_eq!(response.status(), StatusCode::SEE_OTHER);
		assert_eq!(response.headers()[header::LOCATION], "/posts/1");
	}

	#[test]
	fn test_redirect_to_invalid_location_is_an_error() {
		let error = redirect("/profile/Иван").unwrap_err();

		assert_eq!(error.status(), StatusCode::INTERNAL_SERVER_ERROR);
	}
}
