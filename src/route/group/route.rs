use axum::extract::State;
use macros::route;

use crate::{
	extract::{Json, Path, Query},
	feed::{self, Scope},
	openapi::tag,
	AppState,
};

use super::{model, Error, RouteError};

/// Get group
/// Returns a group by its slug, along with a page of its posts, newest first.
#[route(tag = tag::GROUP)]
pub async fn get_group(
	State(state): State<AppState>,
	Path(path): Path<model::SlugInput>,
	Query(input): Query<model::PageInput>,
) -> Result<Json<model::GroupPage>, RouteError> {
	let group = sqlx::query_as::<_, model::Group>(r#"SELECT * FROM "group" WHERE slug = ?"#)
		.bind(&path.slug)
		.fetch_optional(&state.database)
		.await?
		.ok_or_else(|| Error::UnknownGroup(path.slug.clone()))?;

	let page = feed::fetch(
		&state.database,
		state.paginator,
		Scope::Group(group.id),
		input.number(),
	)
	.await?;

	Ok(Json(model::GroupPage { group, page }))
}
