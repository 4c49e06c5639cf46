//! `Bindable` implementation code generation.
//!
//! `fields()` lists one `FieldEntry` per bound field in declaration order.
//! With `#[env_config(updater)]` the struct's own `Updater` impl is exposed
//! through `as_updater()`:
//!
//! ```rust,ignore
//! #[derive(Bindable)]
//! #[env_config(updater)]
//! struct Config { /* ... */ }
//!
//! impl envbind::Updater for Config {
//!     fn update(&mut self) -> Result<(), envbind::BoxError> { Ok(()) }
//! }
//! ```

use proc_macro2::TokenStream as QuoteStream;
use quote::quote;
use syn::{Generics, Ident};

use crate::field::BoundField;
use crate::parse::EnvConfigAttr;

/// Generate `impl ::envbind::Bindable for Struct`.
pub fn generate_bindable_impl(
    struct_name: &Ident,
    generics: &Generics,
    fields: &[&BoundField],
    env_config_attr: &EnvConfigAttr,
) -> QuoteStream {
    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();

    let entries = fields.iter().map(|f| f.entry_tokens());

    let updater = env_config_attr.updater.then(|| {
        quote! {
            fn as_updater(&mut self) -> ::core::option::Option<&mut dyn ::envbind::Updater> {
                ::core::option::Option::Some(self)
            }
        }
    });

    quote! {
        impl #impl_generics ::envbind::Bindable for #struct_name #type_generics #where_clause {
            fn fields(&mut self) -> ::std::vec::Vec<::envbind::FieldEntry<'_>> {
                ::std::vec![#(#entries),*]
            }

            #updater
        }
    }
}
