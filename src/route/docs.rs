use std::sync::Arc;

use aide::openapi::OpenApi;
use axum::{routing::get, Extension, Router};

use crate::AppState;

pub fn routes() -> Router<AppState> {
	Router::new().route("/api.json", get(serve_docs))
}

async fn serve_docs(Extension(api): Extension<Arc<OpenApi>>) -> axum::Json<OpenApi> {
	axum::Json(OpenApi::clone(&api))
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_docs_list_routes(pool: Database) {
		let app = app(pool);

		let response = app.get("/docs/api.json").await;

		assert_eq!(response.status_code(), 200);

		let api = response.json::<Value>();

		for path in ["/", "/follow", "/create", "/about/tech", "/auth/login"] {
			assert!(api["paths"].get(path).is_some(), "missing {path}");
		}
	}
}
