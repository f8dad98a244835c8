use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, Lit, LitStr};

pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    // Extract #[entity(collection = "...")] from struct-level attributes
    let collection = extract_collection(input)?;

    // Extract #[entity(default = ...)] from field attributes
    let defaults = extract_defaults(input)?
        .into_iter()
        .map(|(key, value)| {
            quote! {
                defaults.insert(
                    #key.to_string(),
                    ::docrepo::__private::serde_json::Value::from(#value),
                );
            }
        })
        .collect::<Vec<_>>();

    Ok(quote! {
        impl #impl_generics ::docrepo::Entity for #name #ty_generics #where_clause {
            const COLLECTION: &'static str = #collection;

            fn defaults() -> ::docrepo::Document {
                #[allow(unused_mut)]
                let mut defaults = ::docrepo::Document::new();
                #(#defaults)*
                defaults
            }
        }
    })
}

fn extract_collection(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("entity") {
            continue;
        }

        let mut collection = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported entity attribute, expected `collection`"))
            }
        })?;

        if let Some(c) = collection {
            return Ok(c);
        }
    }

    // Default: snake_case struct name + "s"
    let name = input.ident.to_string();
    Ok(format!("{}s", to_snake_case(&name)))
}

fn extract_defaults(input: &DeriveInput) -> syn::Result<Vec<(String, TokenStream2)>> {
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input.ident,
                    "Entity derive requires named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "Entity derive only supports structs",
            ))
        }
    };

    let mut defaults = Vec::new();
    for field in fields {
        for attr in &field.attrs {
            if !attr.path().is_ident("entity") {
                continue;
            }
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    let lit: Lit = meta.value()?.parse()?;
                    defaults.push((stored_key(field), default_value(&lit)?));
                    Ok(())
                } else {
                    Err(meta.error("unsupported entity field attribute, expected `default`"))
                }
            })?;
        }
    }

    Ok(defaults)
}

fn default_value(lit: &Lit) -> syn::Result<TokenStream2> {
    match lit {
        Lit::Str(_) | Lit::Bool(_) => Ok(quote!(#lit)),
        Lit::Int(_) => Ok(quote!(#lit as i64)),
        Lit::Float(_) => Ok(quote!(#lit as f64)),
        _ => Err(syn::Error::new_spanned(
            lit,
            "entity defaults must be string, integer, float or bool literals",
        )),
    }
}

/// Key the field is stored under: `#[serde(rename = "...")]` or the field name.
fn stored_key(field: &Field) -> String {
    for attr in &field.attrs {
        if !attr.path().is_ident("serde") {
            continue;
        }

        let mut rename = None;
        let _ = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") && meta.input.peek(syn::Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                rename = Some(value.value());
            } else if meta.input.peek(syn::Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            } else if meta.input.peek(syn::token::Paren) {
                let content;
                syn::parenthesized!(content in meta.input);
                let _: TokenStream2 = content.parse()?;
            }
            Ok(())
        });

        if let Some(rename) = rename {
            return rename;
        }
    }

    field
        .ident
        .as_ref()
        .map(|ident| ident.to_string().trim_start_matches("r#").to_string())
        .unwrap_or_default()
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
