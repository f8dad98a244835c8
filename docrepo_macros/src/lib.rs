mod entity;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Entity)] derive macro
// ============================================================================

/// Derive macro for the `Entity` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Serialize, Deserialize, Entity)]
/// #[entity(collection = "users")]
/// struct User {
///     #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
///     pub id: Option<String>,
///     pub name: String,
///     #[entity(default = "member")]
///     #[serde(default)]
///     pub role: String,
/// }
/// ```
///
/// - `#[entity(collection = "...")]` sets the collection name.
///   If omitted, defaults to snake_case struct name + "s".
/// - `#[entity(default = <literal>)]` on a field adds a schema default the
///   engine fills in when an insert omits that field. The stored key follows
///   `#[serde(rename = "...")]` when present.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive_entity(input)
}
