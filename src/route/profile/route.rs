use axum::{extract::State, response::Response};
use macros::route;

use crate::{
	extract::{Json, Path, Query, Session, Viewer},
	feed::{self, Scope},
	follow,
	openapi::tag,
	route::{auth::model::User, post::model::FeedPage, profile_location, redirect},
	AppState, Database,
};

use super::{model, Error, RouteError};

async fn find_author(database: &Database, username: &str) -> Result<User, RouteError> {
	let user = sqlx::query_as::<_, User>(r#"SELECT * FROM "user" WHERE username = ?"#)
		.bind(username)
		.fetch_optional(database)
		.await?;

	Ok(user.ok_or_else(|| Error::UnknownUser(username.to_owned()))?)
}

/// Get profile
/// Returns an author and a page of their posts, newest first, and whether the viewer follows them.
#[route(tag = tag::PROFILE)]
pub async fn get_profile(
	State(state): State<AppState>,
	viewer: Viewer,
	Path(path): Path<model::UsernameInput>,
	Query(input): Query<model::PageInput>,
) -> Result<Json<model::ProfilePage>, RouteError> {
	let author = find_author(&state.database, &path.username).await?;

	let page = feed::fetch(
		&state.database,
		state.paginator,
		Scope::Author(author.id),
		input.number(),
	)
	.await?;

	// Following yourself is not allowed, so it is never offered
	let (following, can_follow) = match viewer.id() {
		Some(id) if id != author.id => (follow::is_following(&state.database, id, author.id).await?, true),
		_ => (false, false),
	};

	Ok(Json(model::ProfilePage {
		author,
		following,
		can_follow,
		page,
	}))
}

/// Follow author
/// Adds the author's posts to the authenticated user's follow feed, then redirects to their profile.
/// Following an author twice, or following yourself, changes nothing.
#[route(tag = tag::PROFILE, response(status = 303, description = "Redirects to the profile."))]
pub async fn follow_author(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::UsernameInput>,
) -> Result<Response, RouteError> {
	let author = find_author(&database, &path.username).await?;

	if author.id != session.user.id && follow::follow(&database, session.user.id, author.id).await? {
		tracing::info!(user = %session.user.id, author = %author.id, "followed author");
	}

	Ok(redirect(&profile_location(&author.username))?)
}

/// Unfollow author
/// Removes the author from the authenticated user's follow feed, then redirects to their profile.
#[route(tag = tag::PROFILE, response(status = 303, description = "Redirects to the profile."))]
pub async fn unfollow_author(
	State(database): State<Database>,
	session: Session,
	Path(path): Path<model::UsernameInput>,
) -> Result<Response, RouteError> {
	let author = find_author(&database, &path.username).await?;

	if !follow::unfollow(&database, session.user.id, author.id).await? {
		return Err(Error::NotFollowing(author.username).into());
	}

	tracing::info!(user = %session.user.id, author = %author.id, "unfollowed author");

	Ok(redirect(&profile_location(&author.username))?)
}

/// Get follow feed
/// Returns a page of posts by every author the authenticated user follows, newest first.
#[route(tag = tag::PROFILE)]
pub async fn follow_index(
	State(state): State<AppState>,
	session: Session,
	Query(input): Query<model::PageInput>,
) -> Result<Json<FeedPage>, RouteError> {
	let page = feed::fetch(
		&state.database,
		state.paginator,
		Scope::FollowedBy(session.user.id),
		input.number(),
	)
	.await?;

	Ok(Json(FeedPage { page }))
}
