use proc_macro::TokenStream;
use proc_macro2::{Span, TokenStream as TokenStream2};
use quote::quote;
use syn::{Data, DeriveInput, Error, Fields, Ident, LitStr, Result, Type, TypePath, parse_macro_input};

mod entity_id;

use entity_id::ParsedEntityId;

/// Derive identifier plumbing for a `String` newtype.
///
/// Generates `new`, `empty`, `as_str`, `into_inner`, `Display`, `From<String>`,
/// `From<&str>`, `AsRef<str>` and the `morning_call::id::EntityId` impl.
///
/// ```text
/// #[derive(EntityId)]
/// pub struct UserId(String);
///
/// #[derive(EntityId)]
/// #[entity_id(entity = "friend_request")]
/// pub struct RelationshipId(String);
/// ```
#[proc_macro_derive(EntityId, attributes(entity_id))]
pub fn derive_entity_id(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedEntityId::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
