//! Rowcraft Macros - `#[derive(Entity)]`
//!
//! The derive describes a struct to the rowcraft metadata engine: member
//! names, annotations, visibility and column value kinds in declaration
//! order, plus positional accessors for reading and writing member values.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::parse::{Parse, ParseStream};
use syn::punctuated::Punctuated;
use syn::{parse_macro_input, Attribute, Data, DeriveInput, Fields, Ident, LitStr, Token, Visibility};

/// Implement `rowcraft::Reflect` and `rowcraft::Entity` for a struct
///
/// # Usage
/// ```rust,ignore
/// use rowcraft::prelude::*;
///
/// #[derive(Entity, Default)]
/// pub struct Audit {
///     #[rowcraft("readOnly")]
///     pub created_at: Option<chrono::NaiveDateTime>,
/// }
///
/// #[derive(Entity, Default)]
/// #[rowcraft("table:users")]
/// pub struct User {
///     #[rowcraft("primaryKey;autoIncrement")]
///     pub id: i64,
///     #[rowcraft("notNull;size:255", "uniqueIndex:udx_users_email")]
///     pub email: String,
///     #[rowcraft(embedded)]
///     pub audit: Audit,
///     #[rowcraft("-")]
///     pub scratch: Vec<String>,
/// }
/// ```
///
/// Public members must hold a column type unless marked `embedded` or
/// ignored with `-`. Private members are described but never read.
#[proc_macro_derive(Entity, attributes(rowcraft))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand_entity(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

enum RowcraftArg {
    Tag(LitStr),
    Flag(Ident),
}

impl Parse for RowcraftArg {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.peek(LitStr) {
            Ok(RowcraftArg::Tag(input.parse()?))
        } else {
            Ok(RowcraftArg::Flag(input.parse()?))
        }
    }
}

#[derive(Default)]
struct Annotation {
    tag: Option<String>,
    embedded: bool,
}

impl Annotation {
    /// A `-` or `ignore` segment removes the member from the entity
    fn is_ignored(&self) -> bool {
        self.tag.as_deref().map_or(false, |tag| {
            tag.split(';')
                .map(str::trim)
                .any(|segment| segment == "-" || segment == "ignore")
        })
    }

    fn tag_tokens(&self) -> TokenStream2 {
        match &self.tag {
            Some(tag) => quote!(::core::option::Option::Some(#tag)),
            None => quote!(::core::option::Option::None),
        }
    }
}

fn parse_annotation(attrs: &[Attribute], allow_embedded: bool) -> syn::Result<Annotation> {
    let mut annotation = Annotation::default();
    let mut tags: Vec<String> = Vec::new();

    for attr in attrs.iter().filter(|a| a.path().is_ident("rowcraft")) {
        let args = attr.parse_args_with(Punctuated::<RowcraftArg, Token![,]>::parse_terminated)?;
        for arg in args {
            match arg {
                RowcraftArg::Tag(lit) => tags.push(lit.value()),
                RowcraftArg::Flag(ident) if allow_embedded && (ident == "embedded" || ident == "embed") => {
                    annotation.embedded = true;
                }
                RowcraftArg::Flag(ident) => {
                    return Err(syn::Error::new(
                        ident.span(),
                        format!("unknown rowcraft option `{}`", ident),
                    ));
                }
            }
        }
    }

    if !tags.is_empty() {
        annotation.tag = Some(tags.join(";"));
    }
    Ok(annotation)
}

fn expand_entity(input: DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Entity can only be derived for structs with named fields",
                ))
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Entity can only be derived for structs",
            ))
        }
    };

    let record_annotation = parse_annotation(&input.attrs, false)?.tag_tokens();
    let name_str = name.to_string();

    let mut members = Vec::with_capacity(fields.len());
    let mut getters = Vec::new();
    let mut zero_checks = Vec::new();
    let mut setters = Vec::new();

    for (index, field) in fields.iter().enumerate() {
        let ident = field.ident.as_ref().ok_or_else(|| {
            syn::Error::new_spanned(field, "Entity members must be named")
        })?;
        let ty = &field.ty;
        let annotation = parse_annotation(&field.attrs, true)?;

        let member_name = ident.to_string();
        let member_name = member_name.trim_start_matches("r#");
        let type_name = quote!(#ty).to_string().replace(' ', "");
        let exported = !matches!(field.vis, Visibility::Inherited);
        let embedded = annotation.embedded;
        let tag = annotation.tag_tokens();

        let member_type = if annotation.is_ignored() || !(exported || embedded) {
            quote!(::rowcraft::MemberType::Opaque)
        } else if embedded {
            getters.push(quote! {
                [#index, rest @ ..] => ::rowcraft::Reflect::member_value(&self.#ident, rest),
            });
            zero_checks.push(quote! {
                [#index, rest @ ..] => ::rowcraft::Reflect::member_is_zero(&self.#ident, rest),
            });
            setters.push(quote! {
                [#index, rest @ ..] => ::rowcraft::Reflect::set_member_value(&mut self.#ident, rest, value),
            });
            quote!(::rowcraft::MemberType::Nested(::rowcraft::NestedType::of::<#ty>()))
        } else {
            getters.push(quote! {
                [#index] => ::core::option::Option::Some(::rowcraft::ColumnType::to_sql_value(&self.#ident)),
            });
            zero_checks.push(quote! {
                [#index] => ::core::option::Option::Some(::rowcraft::ColumnType::is_zero(&self.#ident)),
            });
            setters.push(quote! {
                [#index] => {
                    self.#ident = <#ty as ::rowcraft::ColumnType>::from_sql_value(value)?;
                    ::core::result::Result::Ok(())
                }
            });
            quote!(::rowcraft::MemberType::Value(<#ty as ::rowcraft::ColumnType>::value_kind()))
        };

        members.push(quote! {
            ::rowcraft::MemberShape {
                name: #member_name,
                annotation: #tag,
                type_name: #type_name,
                exported: #exported,
                embedded: #embedded,
                ty: #member_type,
            }
        });
    }

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::rowcraft::Reflect for #name #ty_generics #where_clause {
            fn shape() -> ::rowcraft::TypeShape {
                ::rowcraft::TypeShape::Record(::rowcraft::RecordShape {
                    name: #name_str,
                    annotation: #record_annotation,
                    members: ::std::vec![#(#members),*],
                })
            }

            #[allow(unused_variables)]
            fn member_value(&self, path: &[usize]) -> ::core::option::Option<::rowcraft::SqlValue> {
                match path {
                    #(#getters)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn member_is_zero(&self, path: &[usize]) -> ::core::option::Option<bool> {
                match path {
                    #(#zero_checks)*
                    _ => ::core::option::Option::None,
                }
            }

            #[allow(unused_variables)]
            fn set_member_value(
                &mut self,
                path: &[usize],
                value: ::rowcraft::SqlValue,
            ) -> ::core::result::Result<(), ::rowcraft::ConversionError> {
                match path {
                    #(#setters)*
                    _ => ::core::result::Result::Ok(()),
                }
            }
        }

        impl #impl_generics ::rowcraft::Entity for #name #ty_generics #where_clause {}
    })
}
