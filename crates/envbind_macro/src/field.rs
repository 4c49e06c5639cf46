//! Per-field code generation for the `Bindable` derive macro.
//!
//! Each named struct field becomes a [`BoundField`]: its identifier plus the
//! parsed `#[env(...)]` options. A bound field knows how to emit the three
//! fragments the expander stitches together:
//!
//! | Fragment | Used in |
//! |----------|---------|
//! | [`BoundField::spec_tokens`] | `FieldSpec` builder chain |
//! | [`BoundField::entry_tokens`] | `Bindable::fields` |
//! | [`BoundField::zero_tokens`] | `Field::is_zero` |
//!
//! Skipped fields produce no fragments at all.

use proc_macro2::TokenStream as QuoteStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Error as SynError, Field, Ident, Result as SynResult};

use crate::parse::{FieldAttr, Parser};

/// A named struct field with its binding options.
pub struct BoundField {
    /// The field identifier, used for `self.<ident>` access.
    ident: Ident,

    /// Parsed `#[env(...)]` options.
    attr: FieldAttr,
}

impl BoundField {
    /// Parses a named field.
    pub fn parse(field: &Field) -> SynResult<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| SynError::new_spanned(field, "Bindable fields must be named"))?;

        let attr = Parser::parse_field_attr(field)?;

        Ok(Self { ident, attr })
    }

    /// Whether the field takes part in binding.
    pub const fn is_bound(&self) -> bool {
        !self.attr.skip
    }

    /// The `::envbind::FieldSpec` expression for this field.
    ///
    /// Raw identifiers lose their `r#` prefix in the reported name.
    pub fn spec_tokens(&self) -> QuoteStream {
        let name = self.ident.unraw().to_string();
        let attr = &self.attr;

        let env = attr.var.as_deref().map(|v| quote! { .env(#v) });
        let layout = attr.layout.as_deref().map(|v| quote! { .layout(#v) });
        let default = attr.default.as_deref().map(|v| quote! { .default_value(#v) });
        let separator = attr.separator.as_deref().map(|v| quote! { .separator(#v) });
        let description = attr
            .description
            .as_deref()
            .map(|v| quote! { .description(#v) });
        let updatable = attr.updatable.then(|| quote! { .updatable() });
        let required = attr.required.then(|| quote! { .required() });
        let prefix = attr.prefix.as_deref().map(|v| quote! { .prefix(#v) });

        quote! {
            ::envbind::FieldSpec::new(#name)
                #env
                #layout
                #default
                #separator
                #description
                #updatable
                #required
                #prefix
        }
    }

    /// The `::envbind::FieldEntry` expression pairing the field spec with its storage.
    pub fn entry_tokens(&self) -> QuoteStream {
        let ident = &self.ident;
        let spec = self.spec_tokens();

        quote! {
            ::envbind::FieldEntry::new(#spec, &mut self.#ident)
        }
    }

    /// The zero check for this field.
    pub fn zero_tokens(&self) -> QuoteStream {
        let ident = &self.ident;

        quote! {
            ::envbind::Field::is_zero(&self.#ident)
        }
    }
}

#[cfg(test)]
mod tests {
    use syn::parse_quote;

    use super::*;

    fn parse(field: Field) -> BoundField {
        BoundField::parse(&field).unwrap()
    }

    #[test]
    fn test_spec_tokens_chain_options() {
        let field = parse(parse_quote! {
            #[env(var = "PORT,HTTP_PORT", default = "8080", upd, required)]
            port: u16
        });

        let tokens = field.spec_tokens().to_string();
        assert!(tokens.contains("FieldSpec :: new (\"port\")"));
        assert!(tokens.contains(". env (\"PORT,HTTP_PORT\")"));
        assert!(tokens.contains(". default_value (\"8080\")"));
        assert!(tokens.contains(". updatable ()"));
        assert!(tokens.contains(". required ()"));
        assert!(!tokens.contains("prefix"));
    }

    #[test]
    fn test_raw_identifier_is_unraw() {
        let field = parse(parse_quote! {
            #[env(var = "TYPE")]
            r#type: String
        });

        let tokens = field.spec_tokens().to_string();
        assert!(tokens.contains("FieldSpec :: new (\"type\")"));
        assert!(field.entry_tokens().to_string().contains("self . r#type"));
    }

    #[test]
    fn test_doc_comment_becomes_description() {
        let field = parse(parse_quote! {
            /// Listen address.
            #[env(var = "ADDR")]
            addr: String
        });

        let tokens = field.spec_tokens().to_string();
        assert!(tokens.contains(". description (\"Listen address.\")"));
    }

    #[test]
    fn test_skip() {
        let field = parse(parse_quote! {
            #[env(skip)]
            cache: Vec<u8>
        });

        assert!(!field.is_bound());
    }

    #[test]
    fn test_skip_with_other_options_rejected() {
        let field: Field = parse_quote! {
            #[env(skip, var = "X")]
            cache: Vec<u8>
        };

        let err = BoundField::parse(&field).err().unwrap();
        assert!(err.to_string().contains("`skip` cannot be combined with: var"));
    }

    #[test]
    fn test_unknown_and_duplicate_options() {
        let unknown: Field = parse_quote! {
            #[env(secret)]
            token: String
        };
        let err = BoundField::parse(&unknown).err().unwrap();
        assert!(err.to_string().contains("Unknown option `secret`"));

        let duplicate: Field = parse_quote! {
            #[env(var = "A")]
            #[env(var = "B")]
            token: String
        };
        let err = BoundField::parse(&duplicate).err().unwrap();
        assert!(err.to_string().contains("Duplicate option: `var`"));
    }

    #[test]
    fn test_empty_separator_rejected() {
        let field: Field = parse_quote! {
            #[env(var = "LIST", separator = "")]
            list: Vec<String>
        };

        let err = BoundField::parse(&field).err().unwrap();
        assert!(err.to_string().contains("separator cannot be empty"));
    }

    #[test]
    fn test_unannotated_field_is_bound() {
        let field = parse(parse_quote! { nested: Inner });

        assert!(field.is_bound());
        let tokens = field.spec_tokens().to_string();
        assert!(!tokens.contains(". env"));
    }
}
