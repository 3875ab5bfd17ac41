#![warn(clippy::pedantic)]

mod cache;
mod config;
mod error;
mod extract;
mod feed;
mod follow;
mod openapi;
mod ratelimit;
mod route;
mod session;
mod trace;

use std::{net::SocketAddr, str::FromStr, sync::Arc, time::Duration};

use aide::{axum::ApiRouter, openapi::OpenApi};
use argon2::Argon2;
use axum::{
	extract::Request,
	http::Method,
	response::Response,
	Extension, Router, ServiceExt,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tower::{Layer, ServiceBuilder};
use tower_governor::GovernorLayer;
use tower_http::{
	compression::CompressionLayer,
	cors::{Any, CorsLayer},
	normalize_path::NormalizePathLayer,
	request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
	trace::TraceLayer,
};
use tracing::Span;

use crate::{cache::FeedCache, config::Config, feed::Paginator, ratelimit::Limits};

pub type Database = sqlx::Pool<sqlx::Sqlite>;
pub type AppState = State;

/// The shared application state.
#[derive(Clone, axum::extract::FromRef)]
pub struct State {
	pub database: Database,
	pub hasher: Argon2<'static>,
	/// Serialized landing pages.
	pub cache: FeedCache,
	pub paginator: Paginator,
}

impl State {
	pub fn new(database: Database, hasher: Argon2<'static>, config: &Config) -> Self {
		Self {
			database,
			hasher,
			cache: FeedCache::new(cache::INDEX_PREFIX, config.index_cache_ttl),
			paginator: Paginator::new(config.page_size),
		}
	}
}

/// Builds the application router, along with its OpenAPI document.
///
/// Rate limiting relies on the peer address, so it is only applied when the
/// router is served with connection info.
pub fn router(state: AppState, limits: Option<&Limits>) -> Router {
	let mut api = OpenApi::default();

	let auth = match limits {
		Some(limits) => route::auth::routes().layer(GovernorLayer {
			config: limits.secure.clone(),
		}),
		None => route::auth::routes(),
	};

	let app = ApiRouter::new()
		.merge(route::post::routes())
		.merge(route::group::routes())
		.merge(route::profile::routes())
		.merge(route::about::routes())
		.nest("/auth", auth)
		.finish_api_with(&mut api, openapi::docs)
		.nest("/docs", route::docs::routes())
		.fallback(error::not_found)
		.layer(Extension(Arc::new(api)));

	let app = match limits {
		Some(limits) => app.layer(GovernorLayer {
			config: limits.default.clone(),
		}),
		None => app,
	};

	app.layer(
		ServiceBuilder::new()
			.layer(CompressionLayer::new())
			.layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
			.layer(
				TraceLayer::new_for_http()
					.make_span_with(|request: &Request| {
						let request_id = request
							.headers()
							.get("x-request-id")
							.and_then(|id| id.to_str().ok())
							.unwrap_or_default();

						tracing::info_span!(
							"request",
							method = %request.method(),
							uri = %request.uri(),
							request_id,
						)
					})
					.on_response(|response: &Response, latency: Duration, _span: &Span| {
						tracing::info!(
							histogram.request_duration_ms = latency.as_secs_f64() * 1000.0,
							status = response.status().as_u16(),
							"finished request"
						);
					}),
			)
			.layer(PropagateRequestIdLayer::x_request_id())
			.layer(
				CorsLayer::new()
					.allow_methods([Method::GET, Method::POST, Method::DELETE])
					.allow_origin(Any),
			),
	)
	.with_state(state)
}

#[tokio::main]
async fn main() {
	dotenvy::dotenv().ok();

	let config = Config::load().expect("invalid configuration");
	let _guard = trace::init(&config);

	let options = SqliteConnectOptions::from_str(&config.database_url)
		.expect("DATABASE_URL must be a valid SQLite url")
		.create_if_missing(true)
		.foreign_keys(true);

	let database = SqlitePoolOptions::new()
		.connect_with(options)
		.await
		.expect("failed to connect to database");

	sqlx::migrate!()
		.run(&database)
		.await
		.expect("failed to run migrations");

	let state = State::new(database, Argon2::default(), &config);
	let limits = Limits::new(&config).expect("rate limits must be non-zero");

	ratelimit::cleanup_old_limits(&[&limits.default, &limits.secure]);

	let app = NormalizePathLayer::trim_trailing_slash().layer(router(state, Some(&limits)));

	let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
		.await
		.expect("failed to bind to port");

	tracing::info!(host = %config.host, port = config.port, "listening");

	axum::serve(
		listener,
		ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
	)
	.await
	.expect("server error");
}
