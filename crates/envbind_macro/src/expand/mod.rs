//! Code generation orchestration for the `Bindable` derive macro.
//!
//! The [`Expander`] validates the input, turns every named field into a
//! [`BoundField`] and emits two impl blocks:
//!
//! | Impl | Generator Function |
//! |------|-------------------|
//! | `impl Field` | [`field_impl::generate_field_impl`] |
//! | `impl Bindable` | [`bindable::generate_bindable_impl`] |

use proc_macro::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error as SynError, Field, Fields, Result as SynResult};

use crate::field::BoundField;
use crate::parse::EnvConfigAttr;

pub mod bindable;
pub mod field_impl;

/// The main orchestrator for macro expansion.
pub struct Expander;

impl Expander {
    /// Main entry point for expanding the derive macro.
    pub fn expand(input: &DeriveInput) -> SynResult<TokenStream> {
        let struct_name = &input.ident;
        let generics = &input.generics;

        let env_config_attr = EnvConfigAttr::parse_from_struct(input)?;

        let fields = Self::extract_struct_fields(input)?
            .into_iter()
            .map(BoundField::parse)
            .collect::<SynResult<Vec<_>>>()?;

        // Skipped fields are neither bound nor part of the zero check.
        let bound: Vec<&BoundField> = fields.iter().filter(|f| f.is_bound()).collect();

        let field_impl = field_impl::generate_field_impl(struct_name, generics, &bound);
        let bindable_impl =
            bindable::generate_bindable_impl(struct_name, generics, &bound, &env_config_attr);

        Ok(quote! {
            #field_impl
            #bindable_impl
        }
        .into())
    }

    /// Extract named fields from the struct, rejecting invalid types.
    ///
    /// A unit struct has no fields to bind and yields an empty list.
    fn extract_struct_fields(input: &DeriveInput) -> SynResult<Vec<&Field>> {
        match &input.data {
            Data::Struct(data_struct) => match &data_struct.fields {
                // Named fields: struct Foo { bar: i32 }
                Fields::Named(fields_named) => Ok(fields_named.named.iter().collect()),

                // Tuple struct: struct Foo(i32)
                Fields::Unnamed(_) => Err(SynError::new_spanned(
                    input,
                    "Bindable does not support tuple structs",
                )),

                // Unit struct: struct Foo;
                Fields::Unit => Ok(Vec::new()),
            },

            Data::Enum(_) => Err(SynError::new_spanned(
                input,
                "Bindable can only be derived for structs, not enums",
            )),

            Data::Union(_) => Err(SynError::new_spanned(
                input,
                "Bindable can only be derived for structs, not unions",
            )),
        }
    }
}
