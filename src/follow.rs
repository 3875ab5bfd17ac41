//! The follow graph: directed edges from a follower to an author.

use uuid::Uuid;

use crate::Database;

/// Makes `user` follow `author`.
///
/// Following an author twice is a no-op, guarded by the `(user_id, author_id)`
/// unique constraint. Returns whether a new edge was created.
pub async fn follow(database: &Database, user: Uuid, author: Uuid) -> Result<bool, sqlx::Error> {
	let result = sqlx::query(
		r#"
			INSERT INTO follow (user_id, author_id) VALUES (?, ?)
			ON CONFLICT (user_id, author_id) DO NOTHING
		"#,
	)
	.bind(user)
	.bind(author)
	.execute(database)
	.await?;

	Ok(result.rows_affected() == 1)
}

/// Removes the edge from `user` to `author`. Returns whether there was one.
pub async fn unfollow(database: &Database, user: Uuid, author: Uuid) -> Result<bool, sqlx::Error> {
	let result = sqlx::query("DELETE FROM follow WHERE user_id = ? AND author_id = ?")
		.bind(user)
		.bind(author)
		.execute(database)
		.await?;

	Ok(result.rows_affected() > 0)
}

pub async fn is_following(
	database: &Database,
	user: Uuid,
	author: Uuid,
) -> Result<bool, sqlx::Error> {
	sqlx::query_scalar::<_, bool>(
		"SELECT EXISTS (SELECT 1 FROM follow WHERE user_id = ? AND author_id = ?)",
	)
	.bind(user)
	.bind(author)
	.fetch_one(database)
	.await
}

#[cfg(test)]
mod test {
	use crate::test::*;

	#[sqlx::test]
	async fn test_follow_is_idempotent(pool: Database) {
		let reader = user(&pool, "reader").await;
		let author = user(&pool, "author").await;

		assert!(super::follow(&pool, reader, author).await.unwrap());
		assert!(!super::follow(&pool, reader, author).await.unwrap());

		let edges = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM follow")
			.fetch_one(&pool)
			.await
			.unwrap();

		assert_eq!(edges, 1);
	}

	#[sqlx::test]
	async fn test_edges_are_directed(pool: Database) {
		let reader = user(&pool, "reader").await;
		let author = user(&pool, "author").await;

		super::follow(&pool, reader, author).await.unwrap();

		assert!(super::is_following(&pool, reader, author).await.unwrap());
		assert!(!super::is_following(&pool, author, reader).await.unwrap());
	}

	#[sqlx::test]
	async fn test_unfollow_requires_an_edge(pool: Database) {
		let reader = user(&pool, "reader").await;
		let author = user(&pool, "author").await;

		assert!(!super::unfollow(&pool, reader, author).await.unwrap());

		super::follow(&pool, reader, author).await.unwrap();

		assert!(super::unfollow(&pool, reader, author).await.unwrap());
		assert!(!super::is_following(&pool, reader, author).await.unwrap());
	}
}
