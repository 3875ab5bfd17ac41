use axum::{
	body::Bytes,
	extract::State,
	http::header,
	response::{IntoResponse, Response},
};
use chrono::Utc;
use macros::route;
use validator::{ValidationError, ValidationErrors};

use crate::{
	extract::{DeferredJson, Json, Path, Query, Session, Viewer},
	feed::{self, Scope},
	openapi::tag,
	route::{group::model::Group, profile_location, redirect},
	AppState, Database,
};

use super::{model, Error, RouteError};

fn json_body(body: Bytes) -> Response {
	([(header::CONTENT_TYPE, "application/json")], body).into_response()
}

fn detail_location(id: i64) -> String {
	format!("/posts/{id}")
}

async fn find_post(database: &Database, id: i64) -> Result<model::Post, RouteError> {
	let post = sqlx::query_as::<_, model::Post>("SELECT * FROM post WHERE id = ?")
		.bind(id)
		.fetch_optional(database)
		.await?;

	Ok(post.ok_or(Error::UnknownPost(id))?)
}

async fn groups(database: &Database) -> Result<Vec<Group>, sqlx::Error> {
	sqlx::query_as::<_, Group>(r#"SELECT * FROM "group" ORDER BY title"#)
		.fetch_all(database)
		.await
}

/// Rejects a form that points at a group that does not exist.
async fn check_group(database: &Database, group_id: Option<i64>) -> Result<(), RouteError> {
	let Some(group_id) = group_id else {
		return Ok(());
	};

	let exists =
		sqlx::query_scalar::<_, bool>(r#"SELECT EXISTS (SELECT 1 FROM "group" WHERE id = ?)"#)
			.bind(group_id)
			.fetch_one(database)
			.await?;

	if exists {
		return Ok(());
	}

	let mut errors = ValidationErrors::new();
	errors.add("group_id", ValidationError::new("unknown_group"));

	Err(errors.into())
}

/// Get all posts
/// Returns a page of every post, newest first. Pages are cached for a short while,
/// so changes may take a moment to show up.
#[route(tag = tag::POST, response(status = 200, description = "A page of posts.", shape = "Json<model::FeedPage>"))]
pub async fn index(
	State(state): State<AppState>,
	Query(input): Query<model::PageInput>,
) -> Result<Response, RouteError> {
	if let Some(body) = state.cache.get(input.raw()).await {
		return Ok(json_body(body));
	}

	let page = feed::fetch(&state.database, state.paginator, Scope::All, input.number()).await?;
	let body = Bytes::from(serde_json::to_vec(&model::FeedPage { page })?);

	state.cache.insert(input.raw(), body.clone()).await;

	Ok(json_body(body))
}

/// Get single post
/// Returns a single post by its unique id, along with its comments, newest first.
#[route(tag = tag::POST)]
pub async fn get_post(
	State(database): State<Database>,
	viewer: Viewer,
	Path(path): Path<model::IdInput>,
) -> Result<Json<model::PostDetail>, RouteError> {
	let post = sqlx::query_as::<_, model::PostView>(&format!(
		"{} WHERE post.id = ?",
		model::PostView::SELECT
	))
	.bind(path.id)
	.fetch_optional(&database)
	.await?
	.ok_or(Error::UnknownPost(path.id))?;

	let comments = sqlx::query_as::<_, model::CommentView>(
		r#"
			SELECT
				comment.id, comment.text, comment.created_at, comment.author_id,
				"user".username AS author
			FROM comment
			JOIN "user" ON "user".id = comment.author_id
			WHERE comment.post_id = ?
			ORDER BY comment.created_at DESC, comment.id DESC
		"#,
	)
	.bind(path.id)
	.fetch_all(&database)
	.await?;

	let author_post_count =
		sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM post WHERE author_id = ?")
			.bind(post.author_id)
			.fetch_one(&database)
			.await?;

	Ok(Json(model::PostDetail {
		can_edit: viewer.id() == Some(post.author_id),
		post,
		author_post_count,
		comments,
		form: model::CommentForm {
			text: String::new(),
		},
	}))
}

/// Get post creation page
/// Returns an empty post form and the groups a post can be published in.
#[route(tag = tag::POST)]
pub async fn create_page(
	State(database): State<Database>,
	_session: Session,
) -> Result<Json<model::PostFormPage>, RouteError> {
	Ok(Json(model::PostFormPage {
		form: model::PostForm {
			text: String::new(),
			group_id: None,
			image: None,
		},
		groups: groups(&database).await?,
		is_edit: false,
		post_id: None,
	}))
}

/// Create post
/// Publishes a new post as the authenticated user, then redirects to their profile.
#[route(tag = tag::POST, response(status = 303, description = "Redirects to the author's profile."))]
pub async fn create_post(
	State(database): State<Database>,
	session: Session,
	Json(form): Json<model::PostForm>,
) -> Result<Response, RouteError> {
	check_group(&database, form.group_id).await?;

	let id = sqlx::query_scalar::<_, i64>(
		r#"
			INSERT INTO post (text, created_at, group_id, author_id, image)
			VALUES (?, ?, ?, ?, ?)
			RETURNING id
		"#,
	)
	.bind(&form.text)
	.bind(Utc::now())
	.bind(form.group_id)
	.bind(session.user.id)
	.bind(&form.image)
	.fetch_one(&database)
	.await?;

	tracing::info!(post = id, author = %session.user.id, "post created");

	Ok(redirect(&profile_location(&session.user.username))?)
}

/// Get post edit page
/// Returns the post form filled in with the current post. Anyone but the author
/// is redirected to the post instead.
#[route(tag = tag::POST, response(status = 303, description = "Not the author, redirects to the post."))]
pub async fn edit_page(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Response, RouteError> {
	let post = find_post(&database, path.id).await?;

	if post.author_id != session.user.id {
		return Ok(redirect(&detail_location(post.id))?);
	}

	Ok(Json(model::PostFormPage {
		post_id: Some(post.id),
		form: post.into(),
		groups: groups(&database).await?,
		is_edit: true,
	})
	.into_response())
}

/// Update post
/// Replaces the text, group and image of a post, then redirects to it. Anyone
/// but the author is redirected without changing anything.
#[route(tag = tag::POST, response(status = 303, description = "Redirects to the post."))]
pub async fn update_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	form: DeferredJson<model::PostForm>,
) -> Result<Response, RouteError> {
	let post = find_post(&database, path.id).await?;

	if post.author_id != session.user.id {
		return Ok(redirect(&detail_location(post.id))?);
	}

	let form = form.parse()?;
	check_group(&database, form.group_id).await?;

	sqlx::query("UPDATE post SET text = ?, group_id = ?, image = ? WHERE id = ?")
		.bind(&form.text)
		.bind(form.group_id)
		.bind(&form.image)
		.bind(post.id)
		.execute(&database)
		.await?;

	tracing::info!(post = post.id, "post updated");

	Ok(redirect(&detail_location(post.id))?)
}

/// Delete post
/// Deletes a post and its comments, then redirects to the author's profile.
/// Anyone but the author is redirected to the post instead.
#[route(tag = tag::POST, response(status = 303, description = "Redirects to the profile, or to the post if not the author."))]
pub async fn delete_post(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
) -> Result<Response, RouteError> {
	let post = find_post(&database, path.id).await?;

	if post.author_id != session.user.id {
		return Ok(redirect(&detail_location(post.id))?);
	}

	sqlx::query("DELETE FROM post WHERE id = ?")
		.bind(post.id)
		.execute(&database)
		.await?;

	tracing::info!(post = post.id, "post deleted");

	Ok(redirect(&profile_location(&session.user.username))?)
}

/// Add comment
/// Comments on a post as the authenticated user, then redirects to the post.
#[route(tag = tag::POST, response(status = 303, description = "Redirects to the post."))]
pub async fn add_comment(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::IdInput>,
	Json(form): Json<model::CommentForm>,
) -> Result<Response, RouteError> {
	let post = find_post(&database, path.id).await?;

	let comment = sqlx::query_as::<_, model::Comment>(
		r#"
			INSERT INTO comment (text, post_id, author_id, created_at)
			VALUES (?, ?, ?, ?)
			RETURNING *
		"#,
	)
	.bind(&form.text)
	.bind(post.id)
	.bind(session.user.id)
	.bind(Utc::now())
	.fetch_one(&database)
	.await?;

	tracing::info!(comment = comment.id, post = post.id, "comment added");

	Ok(redirect(&detail_location(post.id))?)
}
