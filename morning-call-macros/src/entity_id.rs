use super::*;

/// Parsed `#[derive(EntityId)]` input: a tuple struct wrapping one `String`.
pub(crate) struct ParsedEntityId {
    name: Ident,
    entity: String,
}

impl ParsedEntityId {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        let fields = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Unnamed(unnamed) => &unnamed.unnamed,
                _ => {
                    return Err(Error::new_spanned(
                        &input.ident,
                        "EntityId requires a tuple struct such as `struct UserId(String);`",
                    ));
                }
            },
            _ => return Err(Error::new_spanned(&input.ident, "EntityId can only be derived for structs")),
        };

        if fields.len() != 1 {
            return Err(Error::new_spanned(fields, "EntityId requires exactly one field"));
        }
        let Some(field) = fields.first() else {
            return Err(Error::new_spanned(&input.ident, "EntityId requires exactly one field"));
        };
        if !is_string(&field.ty) {
            return Err(Error::new_spanned(&field.ty, "EntityId field must be a `String`"));
        }

        let mut entity: Option<String> = None;
        for attr in &input.attrs {
            if attr.path().is_ident("entity_id") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("entity") {
                        let value: LitStr = meta.value()?.parse()?;
                        if value.value().trim().is_empty() {
                            return Err(meta.error("entity name must not be empty"));
                        }
                        entity = Some(value.value());
                        Ok(())
                    } else {
                        Err(meta.error("unsupported entity_id attribute; expected `entity = \"...\"`"))
                    }
                })?;
            }
        }

        let name = input.ident.clone();
        let entity = entity.unwrap_or_else(|| default_entity_name(&name.to_string()));
        Ok(Self { name, entity })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let name = &self.name;
        let entity = LitStr::new(&self.entity, Span::call_site());

        quote! {
            impl #name {
                /// Wraps a raw identifier string.
                pub fn new(value: impl ::core::convert::Into<::std::string::String>) -> Self {
                    Self(value.into())
                }

                /// The identifier meaning "no entity".
                pub fn empty() -> Self {
                    Self(::std::string::String::new())
                }

                pub fn as_str(&self) -> &str {
                    &self.0
                }

                pub fn into_inner(self) -> ::std::string::String {
                    self.0
                }
            }

            impl ::morning_call::id::EntityId for #name {
                const ENTITY: &'static str = #entity;

                fn from_raw(raw: ::std::string::String) -> Self {
                    Self(raw)
                }

                fn raw(&self) -> &str {
                    &self.0
                }
            }

            impl ::core::fmt::Display for #name {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl ::core::convert::From<::std::string::String> for #name {
                fn from(value: ::std::string::String) -> Self {
                    Self(value)
                }
            }

            impl ::core::convert::From<&str> for #name {
                fn from(value: &str) -> Self {
                    Self(value.to_owned())
                }
            }

            impl ::core::convert::AsRef<str> for #name {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }
        }
    }
}

fn is_string(ty: &Type) -> bool {
    match ty {
        Type::Path(TypePath { qself: None, path }) => path.segments.last().is_some_and(|seg| seg.ident == "String"),
        _ => false,
    }
}

/// `UserId` -> `user`, `MorningCallId` -> `morning_call`.
fn default_entity_name(type_name: &str) -> String {
    let trimmed = type_name.strip_suffix("Id").filter(|s| !s.is_empty()).unwrap_or(type_name);
    to_snake_case(trimmed)
}

/// Converts a PascalCase identifier to snake_case
fn to_snake_case(name: &str) -> String {
    let mut result = String::new();
    for (i, ch) in name.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(ch.to_ascii_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
