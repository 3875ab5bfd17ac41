mod model;
mod route;

use proc_macro::TokenStream;

/// Creates a new documentation function for the route, named after the annotated function with the suffix `_docs`.
///
/// The first line of the doc comment becomes the summary, the rest becomes the description.
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}

/// Creates a new struct `XForm` for the model, holding the fields a user is allowed to submit.
///
/// Fields with `#[serde(skip_deserializing)]` or `#[serde(skip)]` are left out, every other
/// field is copied verbatim (including `validate` and `serde` attributes). Database-only
/// attributes (`#[sqlx(..)]` and the `FromRow` derive) are not carried over.
#[proc_macro_attribute]
pub fn model(_args: TokenStream, input: TokenStream) -> TokenStream {
	model::from_input(input)
}
