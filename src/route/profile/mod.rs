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
	#[error("unknown user {0}")]
	UnknownUser(String),
	#[error("not following {0}")]
	NotFollowing(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new()
		.api_route("/profile/:username", get_with(get_profile, get_profile_docs))
		.api_route(
			"/profile/:username/follow",
			post_with(follow_author, follow_author_docs),
		)
		.api_route(
			"/profile/:username/unfollow",
			post_with(unfollow_author, unfollow_author_docs),
		)
		.api_route("/follow", get_with(follow_index, follow_index_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownUser(..) | Self::NotFollowing(..) => StatusCode::NOT_FOUND,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownUser(username) => error::Message::new("unknown_user")
				.detail("user", username)
				.into_vec(),
			Self::NotFollowing(username) => error::Message::new("not_following")
				.detail("user", username)
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_profile_lists_the_author_posts(pool: Database) {
		let app = app(pool.clone());
		let john = user(&pool, "john").await;
		let jane = user(&pool, "jane").await;

		for i in 0..11 {
			post(&pool, john, &format!("john {i}"), None).await;
		}

		post(&pool, jane, "jane", None).await;

		let body = app.get("/profile/john").await.json::<Value>();

		assert_eq!(body["author"]["username"], "john");
		assert!(body["author"].get("email").is_none());
		assert_eq!(body["page"]["count"], 11);
		assert_eq!(body["page"]["items"].as_array().unwrap().len(), 10);
		assert_eq!(body["following"], false);
		assert_eq!(body["can_follow"], false);
	}

	#[sqlx::test]
	async fn test_unknown_profile(pool: Database) {
		let app = app(pool);

		assert_eq!(app.get("/profile/nobody").await.status_code(), 404);
	}

	#[sqlx::test]
	async fn test_follow_flow(pool: Database) {
		let app = app(pool.clone());
		let john = user(&pool, "john").await;
		post(&pool, john, "followed post", None).await;

		register(&app, "jane").await;

		let body = app.get("/profile/john").await.json::<Value>();

		assert_eq!(body["following"], false);
		assert_eq!(body["can_follow"], true);

		let response = app.post("/profile/john/follow").await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), "/profile/john");

		// Following twice does not create a second edge
		app.post("/profile/john/follow").await;

		assert_eq!(count(&pool, "follow").await, 1);

		let body = app.get("/profile/john").await.json::<Value>();

		assert_eq!(body["following"], true);

		let feed = app.get("/follow").await.json::<Value>();

		assert_eq!(feed["page"]["count"], 1);
		assert_eq!(feed["page"]["items"][0]["text"], "followed post");

		let response = app.post("/profile/john/unfollow").await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(count(&pool, "follow").await, 0);

		let feed = app.get("/follow").await.json::<Value>();

		assert_eq!(feed["page"]["count"], 0);
	}

	#[sqlx::test]
	async fn test_follow_feed_excludes_other_authors(pool: Database) {
		let app = app(pool.clone());
		let john = user(&pool, "john").await;
		let mark = user(&pool, "mark").await;

		post(&pool, john, "from john", None).await;
		post(&pool, mark, "from mark", None).await;

		register(&app, "jane").await;
		app.post("/profile/john/follow").await;

		let feed = app.get("/follow").await.json::<Value>();

		assert_eq!(feed["page"]["count"], 1);
		assert_eq!(feed["page"]["items"][0]["author"], "john");
	}

	#[sqlx::test]
	async fn test_cannot_follow_yourself(pool: Database) {
		let app = app(pool.clone());

		register(&app, "jane").await;

		let response = app.post("/profile/jane/follow").await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(count(&pool, "follow").await, 0);

		let body = app.get("/profile/jane").await.json::<Value>();

		assert_eq!(body["can_follow"], false);
	}

	#[sqlx::test]
	async fn test_unfollow_without_edge(pool: Database) {
		let app = app(pool.clone());
		user(&pool, "john").await;

		register(&app, "jane").await;

		let response = app.post("/profile/john/unfollow").await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "not_following");
	}

	#[sqlx::test]
	async fn test_non_ascii_username_redirects(pool: Database) {
		let state = state(pool.clone());
		let ivan = server(state.clone());
		let reader = server(state);
		let location = "/profile/%D0%98%D0%B2%D0%B0%D0%BD";

		let response = ivan
			.post("/auth/register")
			.json(&json!({
				"email": "ivan@example.com",
				"username": "Иван",
				"password": PASSWORD,
			}))
			.await;

		assert_eq!(response.status_code(), 200);

		let response = ivan.post("/create").json(&json!({ "text": "привет" })).await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), location);

		let body = reader.get(location).await.json::<Value>();

		assert_eq!(body["author"]["username"], "Иван");
		assert_eq!(body["page"]["count"], 1);

		register(&reader, "jane").await;

		let response = reader.post(&format!("{location}/follow")).await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), location);
		assert_eq!(count(&pool, "follow").await, 1);

		let response = reader.post(&format!("{location}/unfollow")).await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), location);
		assert_eq!(count(&pool, "follow").await, 0);

		let response = ivan.post("/posts/1/delete").await;

		assert_eq!(response.status_code(), 303);
		assert_eq!(response.header("location"), location);
		assert_eq!(count(&pool, "post").await, 0);
	}

	#[sqlx::test]
	async fn test_anonymous_cannot_follow(pool: Database) {
		let app = app(pool.clone());
		user(&pool, "john").await;

		assert_eq!(app.post("/profile/john/follow").await.status_code(), 401);
		assert_eq!(app.get("/follow").await.status_code(), 401);
		assert_eq!(count(&pool, "follow").await, 0);
	}
}
