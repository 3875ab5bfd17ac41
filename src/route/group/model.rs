pub use crate::route::model::{PageInput, SlugInput};

use schemars::JsonSchema;
use serde::Serialize;

use crate::{feed::Page, route::post::model::PostView};

/// A named category that posts can be published in.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct Group {
	pub id: i64,
	pub title: String,
	/// The unique, URL-safe name of the group.
	pub slug: String,
	pub description: String,
}

/// A group with a page of its posts.
#[derive(Debug, Serialize, JsonSchema)]
pub struct GroupPage {
	pub group: Group,
	pub page: Page<PostView>,
}
