//! Paginated post feeds.
//!
//! Every listing in the application (the landing page, a group, a profile and
//! the personalized follow feed) is a [`Scope`] over the same post query,
//! cut into fixed-size [`Page`]s by a [`Paginator`].

use schemars::JsonSchema;
use serde::Serialize;
use uuid::Uuid;

use crate::{route::post::model::PostView, Database};

/// A single page of a listing.
#[derive(Debug, Serialize, JsonSchema)]
pub struct Page<T> {
	/// The page number (1-indexed).
	pub number: i64,
	/// The total number of pages, at least 1.
	pub num_pages: i64,
	/// The total number of items across all pages.
	pub count: i64,
	pub has_previous: bool,
	pub has_next: bool,
	pub items: Vec<T>,
}

/// Cuts listings into pages of a fixed size.
#[derive(Debug, Clone, Copy)]
pub struct Paginator {
	per_page: i64,
}

impl Paginator {
	pub fn new(per_page: i64) -> Self {
		Self {
			per_page: per_page.max(1),
		}
	}

	pub fn per_page(&self) -> i64 {
		self.per_page
	}

	/// The number of pages needed for `count` items. An empty listing still has one page.
	pub fn num_pages(&self, count: i64) -> i64 {
		if count <= 0 {
			1
		} else {
			count / self.per_page + i64::from(count % self.per_page != 0)
		}
	}

	/// Resolves a requested page number to an existing page.
	///
	/// A missing page is the first one, and out-of-range pages clamp to the nearest valid page.
	pub fn clamp(&self, requested: Option<i64>, count: i64) -> i64 {
		requested.unwrap_or(1).clamp(1, self.num_pages(count))
	}

	pub fn offset(&self, number: i64) -> i64 {
		(number - 1) * self.per_page
	}

	pub fn page<T>(&self, number: i64, count: i64, items: Vec<T>) -> Page<T> {
		let num_pages = self.num_pages(count);

		Page {
			number,
			num_pages,
			count,
			has_previous: number > 1,
			has_next: number < num_pages,
			items,
		}
	}
}

/// The posts a feed is built from.
#[derive(Debug, Clone, Copy)]
pub enum Scope {
	/// Every post.
	All,
	/// Posts in a single group.
	Group(i64),
	/// Posts written by a single user.
	Author(Uuid),
	/// Posts written by any author the user follows.
	FollowedBy(Uuid),
}

impl Scope {
	fn filter(self) -> &'static str {
		match self {
			Self::All => "",
			Self::Group(..) => "WHERE post.group_id = ?",
			Self::Author(..) => "WHERE post.author_id = ?",
			Self::FollowedBy(..) => {
				"WHERE post.author_id IN (SELECT author_id FROM follow WHERE user_id = ?)"
			}
		}
	}
}

/// Fetches one page of the posts in `scope`, newest first.
pub async fn fetch(
	database: &Database,
	paginator: Paginator,
	scope: Scope,
	requested: Option<i64>,
) -> Result<Page<PostView>, sqlx::Error> {
	let filter = scope.filter();

	let count_sql = format!("SELECT COUNT(*) FROM post {filter}");
	let count = sqlx::query_scalar::<_, i64>(&count_sql);
	let count = match scope {
		Scope::All => count,
		Scope::Group(id) => count.bind(id),
		Scope::Author(id) | Scope::FollowedBy(id) => count.bind(id),
	}
	.fetch_one(database)
	.await?;

	let number = paginator.clamp(requested, count);

	let sql = format!(
		"{} {filter} ORDER BY post.created_at DESC, post.id DESC LIMIT ? OFFSET ?",
		PostView::SELECT
	);
	let items = sqlx::query_as::<_, PostView>(&sql);
	let items = match scope {
		Scope::All => items,
		Scope::Group(id) => items.bind(id),
		Scope::Author(id) | Scope::FollowedBy(id) => items.bind(id),
	}
	.bind(paginator.per_page())
	.bind(paginator.offset(number))
	.fetch_all(database)
	.await?;

	tracing::debug!(?scope, number, count, "fetched feed page");

	Ok(paginator.page(number, count, items))
}

#[cfg(test)]
mod test {
	use super::*;

	#[test]
	fn test_paginate_offset() {
		let paginator = Paginator::new(10);

		assert_eq!(paginator.offset(1), 0);
		assert_eq!(paginator.offset(2), 10);

		let paginator = Paginator::new(5);

		assert_eq!(paginator.offset(2), 5);
		assert_eq!(paginator.offset(3), 10);
	}

	#[test]
	fn test_num_pages() {
		let paginator = Paginator::new(10);

		assert_eq!(paginator.num_pages(0), 1);
		assert_eq!(paginator.num_pages(1), 1);
		assert_eq!(paginator.num_pages(10), 1);
		assert_eq!(paginator.num_pages(11), 2);
		assert_eq!(paginator.num_pages(14), 2);
	}

	#[test]
	fn test_clamp_to_nearest_page() {
		let paginator = Paginator::new(10);

		assert_eq!(paginator.clamp(None, 14), 1);
		assert_eq!(paginator.clamp(Some(0), 14), 1);
		assert_eq!(paginator.clamp(Some(-3), 14), 1);
		assert_eq!(paginator.clamp(Some(2), 14), 2);
		assert_eq!(paginator.clamp(Some(99), 14), 2);
		assert_eq!(paginator.clamp(Some(i64::MAX), 14), 2);
		assert_eq!(paginator.clamp(Some(5), 0), 1);
	}

	#[test]
	fn test_page_neighbours() {
		let paginator = Paginator::new(10);

		let first = paginator.page(1, 14, vec![(); 10]);
		assert!(!first.has_previous);
		assert!(first.has_next);

		let last = paginator.page(2, 14, vec![(); 4]);
		assert!(last.has_previous);
		assert!(!last.has_next);
		assert_eq!(last.num_pages, 2);
	}

	#[test]
	fn test_huge_page_size() {
		let paginator = Paginator::new(i64::MAX);

		assert_eq!(paginator.num_pages(i64::MAX), 1);
		assert_eq!(paginator.num_pages(1), 1);
		assert_eq!(paginator.clamp(Some(2), i64::MAX), 1);
		assert_eq!(paginator.offset(1), 0);
	}

	#[test]
	fn test_page_size_is_at_least_one() {
		assert_eq!(Paginator::new(0).per_page(), 1);
	}
}
