use schemars::JsonSchema;
use serde::Deserialize;
use validator::Validate;

#[derive(Debug, Default, Deserialize, Validate, JsonSchema)]
pub struct PageInput {
	/// The page number to return (1-indexed).
	///
	/// Pages past the end return the last page, and anything that is not
	/// a number returns the first page.
	pub page: Option<String>,
}

impl PageInput {
	/// The requested page number, if it is a number at all.
	pub fn number(&self) -> Option<i64> {
		self.page.as_deref()?.trim().parse().ok()
	}

	/// The raw page parameter, used to key cached pages.
	pub fn raw(&self) -> &str {
		self.page.as_deref().unwrap_or_default()
	}
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct IdInput {
	pub id: i64,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct SlugInput {
	#[validate(length(min = 1))]
	pub slug: String,
}

#[derive(Deserialize, Validate, JsonSchema)]
pub struct UsernameInput {
	#[validate(length(min = 1))]
	pub username: String,
}
