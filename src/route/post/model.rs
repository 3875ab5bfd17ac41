pub use crate::route::model::{IdInput, PageInput};

use chrono::{DateTime, Utc};
use macros::model;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{feed::Page, route::group::model::Group};

fn validate_text(text: &str) -> Result<(), ValidationError> {
	if text.trim().is_empty() {
		return Err(ValidationError::new("blank"));
	}

	Ok(())
}

/// Images are uploaded under `posts/`, so only relative paths inside it are accepted.
fn validate_image(image: &str) -> Result<(), ValidationError> {
	let Some(name) = image.strip_prefix("posts/") else {
		return Err(ValidationError::new("image_path"));
	};

	if name.contains('\\') || name.split('/').any(|part| part.is_empty() || part == "..") {
		return Err(ValidationError::new("image_path"));
	}

	Ok(())
}

/// A single post, written by a user.
#[model]
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Post {
	/// The unique identifier of the post.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The text of the post.
	#[validate(custom(function = "validate_text"))]
	pub text: String,
	/// The group the post is published in, if any.
	pub group_id: Option<i64>,
	/// Path to an image attached to the post, relative to the media root.
	#[validate(length(max = 255), custom(function = "validate_image"))]
	pub image: Option<String>,
	/// The user that wrote the post.
	#[serde(skip_deserializing)]
	pub author_id: Uuid,
	/// The publication time of the post.
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
}

impl From<Post> for PostForm {
	fn from(post: Post) -> Self {
		Self {
			text: post.text,
			group_id: post.group_id,
			image: post.image,
		}
	}
}

/// A single comment on a post.
#[model]
#[derive(Debug, Deserialize, Serialize, JsonSchema, Validate, sqlx::FromRow)]
pub struct Comment {
	/// The unique identifier of the comment.
	#[serde(skip_deserializing)]
	pub id: i64,
	/// The post the comment belongs to.
	#[serde(skip_deserializing)]
	pub post_id: i64,
	/// The user that wrote the comment.
	#[serde(skip_deserializing)]
	pub author_id: Uuid,
	/// The text of the comment.
	#[validate(length(min = 1, max = 300), custom(function = "validate_text"))]
	pub text: String,
	/// The creation time of the comment.
	#[serde(skip_deserializing)]
	pub created_at: DateTime<Utc>,
}

/// A post as it is shown in listings, with its author and group resolved.
#[derive(Debug, Clone, Serialize, JsonSchema, sqlx::FromRow)]
pub struct PostView {
	pub id: i64,
	pub text: String,
	pub created_at: DateTime<Utc>,
	pub image: Option<String>,
	pub author_id: Uuid,
	/// The username of the author.
	pub author: String,
	pub group_id: Option<i64>,
	pub group_slug: Option<String>,
	pub group_title: Option<String>,
}

impl PostView {
	pub const SELECT: &'static str = r#"
		SELECT
			post.id, post.text, post.created_at, post.image, post.author_id,
			"user".username AS author,
			post.group_id, "group".slug AS group_slug, "group".title AS group_title
		FROM post
		JOIN "user" ON "user".id = post.author_id
		LEFT JOIN "group" ON "group".id = post.group_id
	"#;
}

/// A comment as it is shown under a post.
#[derive(Debug, Serialize, JsonSchema, sqlx::FromRow)]
pub struct CommentView {
	pub id: i64,
	pub text: String,
	pub created_at: DateTime<Utc>,
	pub author_id: Uuid,
	/// The username of the author.
	pub author: String,
}

/// A page of posts.
#[derive(Debug, Serialize, JsonSchema)]
pub struct FeedPage {
	pub page: Page<PostView>,
}

/// A single post with its comments, newest first.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostDetail {
	pub post: PostView,
	/// The number of posts written by the author of this post.
	pub author_post_count: i64,
	pub comments: Vec<CommentView>,
	/// An empty comment form.
	pub form: CommentForm,
	/// Whether the viewer wrote the post, and may edit or delete it.
	pub can_edit: bool,
}

/// The post creation and edit page.
#[derive(Debug, Serialize, JsonSchema)]
pub struct PostFormPage {
	pub form: PostForm,
	/// The groups a post can be published in.
	pub groups: Vec<Group>,
	pub is_edit: bool,
	pub post_id: Option<i64>,
}

#[cfg(test)]
mod test {
	use validator::Validate;

	use super::{CommentForm, PostForm};

	#[test]
	fn test_post_text_must_not_be_blank() {
		let form = PostForm {
			text: " \n\t".into(),
			group_id: None,
			image: None,
		};

		let errors = form.validate().unwrap_err();

		assert!(errors.field_errors().contains_key("text"));
	}

	#[test]
	fn test_image_path() {
		let form = |image: &str| PostForm {
			text: "hello".into(),
			group_id: None,
			image: Some(image.into()),
		};

		assert!(form("posts/cat.png").validate().is_ok());
		assert!(form("posts/2024/cat.png").validate().is_ok());

		for image in [
			"cat.png",
			"posts/",
			"/posts/cat.png",
			"posts/../cat.png",
			"posts//cat.png",
			"posts/a\\b.png",
		] {
			let errors = form(image).validate().unwrap_err();

			assert!(errors.field_errors().contains_key("image"), "accepted {image}");
		}
	}

	#[test]
	fn test_comment_length_is_bounded() {
		let form = CommentForm {
			text: "a".repeat(300),
		};

		assert!(form.validate().is_ok());

		let form = CommentForm {
			text: "a".repeat(301),
		};

		assert!(form.validate().is_err());
	}
}
