use aide::axum::{routing::get_with, ApiRouter};
use axum::http::StatusCode;

use crate::{error, AppState};

pub mod model;
pub mod route;

#[derive(Debug, thiserror::Error)]
pub enum Error {
	#[error("unknown group {0}")]
	UnknownGroup(String),
}

pub type RouteError = error::RouteError<Error>;

pub fn routes() -> ApiRouter<AppState> {
	use route::*;

	ApiRouter::new().api_route("/group/:slug", get_with(get_group, get_group_docs))
}

impl error::ErrorShape for Error {
	fn status(&self) -> StatusCode {
		match self {
			Self::UnknownGroup(..) => StatusCode::NOT_FOUND,
		}
	}

	fn into_errors(self) -> Vec<error::Message<'static>> {
		match self {
			Self::UnknownGroup(slug) => error::Message::new("unknown_group")
				.detail("group", slug)
				.into_vec(),
		}
	}
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_group_lists_only_its_posts(pool: Database) {
		let app = app(pool.clone());
		let author = user(&pool, "john").await;
		let cats = group(&pool, "cats").await;
		let dogs = group(&pool, "dogs").await;

		for i in 0..12 {
			post(&pool, author, &format!("cat {i}"), Some(cats)).await;
		}

		post(&pool, author, "dog", Some(dogs)).await;
		post(&pool, author, "nobody's", None).await;

		let body = app.get("/group/cats").await.json::<Value>();

		assert_eq!(body["group"]["slug"], "cats");
		assert_eq!(body["page"]["count"], 12);
		assert_eq!(body["page"]["items"].as_array().unwrap().len(), 10);

		let body = app
			.get("/group/cats")
			.add_query_param("page", "2")
			.await
			.json::<Value>();

		assert_eq!(body["page"]["items"].as_array().unwrap().len(), 2);
	}

	#[sqlx::test]
	async fn test_unknown_group(pool: Database) {
		let app = app(pool);

		let response = app.get("/group/missing").await;

		assert_eq!(response.status_code(), 404);
		assert_eq!(response.json::<Value>()["errors"][0]["content"], "unknown_group");
	}

	#[sqlx::test]
	async fn test_deleting_a_group_keeps_its_posts(pool: Database) {
		let app = app(pool.clone());
		let author = user(&pool, "john").await;
		let cats = group(&pool, "cats").await;
		let id = post(&pool, author, "orphan", Some(cats)).await;

		sqlx::query(r#"DELETE FROM "group" WHERE id = ?"#)
			.bind(cats)
			.execute(&pool)
			.await
			.unwrap();

		let body = app.get(&format!("/posts/{id}")).await.json::<Value>();

		assert_eq!(body["post"]["text"], "orphan");
		assert!(body["post"]["group_id"].is_null());
	}
}
