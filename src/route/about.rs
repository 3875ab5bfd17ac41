use aide::axum::{routing::get_with, ApiRouter};
use macros::route;
use schemars::JsonSchema;
use serde::Serialize;

use crate::{extract::Json, openapi::tag, AppState};

/// A static informational page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct AboutPage {
	pub title: &'static str,
	pub content: &'static str,
}

pub fn routes() -> ApiRouter<AppState> {
	ApiRouter::new()
		.api_route("/about/author", get_with(author, author_docs))
		.api_route("/about/tech", get_with(tech, tech_docs))
}

/// About the author
/// Returns a short page about the people behind the blog.
#[route(tag = tag::ABOUT)]
pub async fn author() -> Json<AboutPage> {
	Json(AboutPage {
		title: "About the author",
		content: "A small blog where anyone can write posts, sort them into groups, \
		          comment on them and follow the authors they like.",
	})
}

/// About the technology
/// Returns a short page about the technology the blog is built with.
#[route(tag = tag::ABOUT)]
pub async fn tech() -> Json<AboutPage> {
	Json(AboutPage {
		title: "Technology",
		content: "Rust, axum, sqlx and SQLite.",
	})
}
