use aide::axum::{
	routing::{get_with, post_with},
	ApiRouter,
};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown post {0}")]
	UnknownPost(i64),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/", get_with(index, index_docs))
		.api_route(
			"/create",
			get_with(create_page, create_page_docs).post_with(create_post, create_post_docs),
		)
		.api_route("/posts/:id", get_with(get_post, get_post_docs))
		.api_route(
			"/posts/:id/edit",
			get_with(edit_page, edit_page_docs).post_with(update_post, update_post_docs),
		)
		.api_route("/posts/:id/delete", post_with(delete_post, delete_post_docs))
		.api_route("/posts/:id/comment", post_with(add_comment, add_comment_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownPost(..) => StatusCode::NOT_FOUND,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownPost(post) => error::Message::new("unknown_post")
				.detail("post", post)
				.into_vec(),
		}
	}
}
