pub use crate::route::model::{PageInput, UsernameInput};

use schemars::JsonSchema;
use serde::Serialize;

use crate::{feed::Page, route::auth::model::User, route::post::model::PostView};

/// An author with a page of their posts.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ProfilePage {
	pub author: User,
	/// Whether the viewer follows the author.
	pub following: bool,
	/// Whether the viewer may follow the author: they must be logged in,
	/// and cannot follow themselves.
	pub can_follow: bool,
	pub page: Page<PostView>,
}
