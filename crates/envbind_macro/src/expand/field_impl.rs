//! `Field` implementation code generation.
//!
//! A derived struct is a [`Kind::Struct`] with no storage slot of its own.
//! It is zero when every bound field is zero; a struct with no bound fields
//! is always zero.

use proc_macro2::TokenStream as QuoteStream;
use quote::quote;
use syn::{Generics, Ident};

use crate::field::BoundField;

/// Generate `impl ::envbind::Field for Struct`.
pub fn generate_field_impl(
    struct_name: &Ident,
    generics: &Generics,
    fields: &[&BoundField],
) -> QuoteStream {
    let (impl_generics, type_generics, where_clause) = generics.split_for_impl();

    let zero_checks = fields.iter().map(|f| f.zero_tokens());

    quote! {
        impl #impl_generics ::envbind::Field for #struct_name #type_generics #where_clause {
            fn kind(&self) -> ::envbind::Kind {
                ::envbind::Kind::Struct
            }

            fn is_zero(&self) -> bool {
                true #(&& #zero_checks)*
            }

            fn slot(&mut self) -> ::envbind::Slot<'_> {
                ::envbind::Slot::None
            }

            fn as_bindable(&mut self) -> ::core::option::Option<&mut dyn ::envbind::Bindable> {
                ::core::option::Option::Some(self)
            }
        }
    }
}
