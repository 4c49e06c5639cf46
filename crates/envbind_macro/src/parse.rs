//! Attribute parsing for `#[env(...)]` and `#[env_config(...)]`.
//!
//! Field options are parsed with syn's `ParseNestedMeta`, one option per
//! callback, into a [`Parser`] that rejects unknown and duplicate options.
//! [`Parser::build`] then validates combinations and produces a [`FieldAttr`].
//!
//! # Supported Syntax
//!
//! ## Field-level attributes
//!
//! ```ignore
//! #[env(var = "PORT,HTTP_PORT")]                 // First variable set wins
//! #[env(var = "PORT", default = "8080")]         // With default
//! #[env(var = "PEERS", separator = ";")]         // List separator
//! #[env(var = "STARTED", layout = "%Y-%m-%d")]   // Timestamp layout
//! #[env(var = "LEVEL", upd)]                     // Refreshed by update passes
//! #[env(var = "TOKEN", required)]                // Must resolve or be non-zero
//! #[env(prefix = "DB_")]                         // Nested struct prefix
//! #[env(skip)]                                   // Not bound
//! ```
//!
//! `upd` and `required` are markers: `upd = false` still marks the field.
//!
//! ## Struct-level attributes
//!
//! ```ignore
//! #[env_config(updater)]                         // Run the Updater impl first
//! ```

use std::collections::HashSet;

use syn::meta::ParseNestedMeta;
use syn::{
    DeriveInput, Error as SynError, Expr, ExprLit, Field, Lit, LitStr, Meta,
    Result as SynResult, Token,
};

/// Extract doc comments from a field's attributes.
///
/// Multiple doc lines are joined with a single space.
pub fn extract_doc_comment(field: &Field) -> Option<String> {
    let mut result = String::new();

    for attr in &field.attrs {
        if !attr.path().is_ident("doc") {
            continue;
        }

        if let Meta::NameValue(meta) = &attr.meta
            && let Expr::Lit(ExprLit {
                lit: Lit::Str(lit_str),
                ..
            }) = &meta.value
        {
            let line = lit_str.value();
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if !result.is_empty() {
                result.push(' ');
            }

            result.push_str(line);
        }
    }

    (!result.is_empty()).then_some(result)
}

/// Parsed options of one field.
#[derive(Clone, Debug, Default)]
pub struct FieldAttr {
    /// Comma-separated environment variable list.
    pub var: Option<String>,

    /// Layout hint for registered converters.
    pub layout: Option<String>,

    /// Raw default value.
    pub default: Option<String>,

    /// Separator for lists and maps.
    pub separator: Option<String>,

    /// Description, falling back to the doc comment.
    pub description: Option<String>,

    /// Refreshed by update-only passes.
    pub updatable: bool,

    /// Fails when unresolved and zero.
    pub required: bool,

    /// Prefix for a nested struct.
    pub prefix: Option<String>,

    /// Excluded from binding.
    pub skip: bool,
}

/// Accumulates the options of the `#[env(...)]` attributes on one field.
#[derive(Default)]
pub struct Parser {
    /// Options already seen, for duplicate detection.
    seen: HashSet<&'static str>,

    /// The options parsed so far.
    attr: FieldAttr,
}

impl Parser {
    /// Parse a single option from within the attribute.
    #[expect(
        clippy::needless_pass_by_value,
        reason = "ParseNestedMeta is passed by value per syn's parse_nested_meta callback signature"
    )]
    fn parse_meta(&mut self, meta: ParseNestedMeta) -> SynResult<()> {
        let ident = meta
            .path
            .get_ident()
            .ok_or_else(|| meta.error("Expected Identifier"))?;
        let name = ident.to_string();

        let key: &'static str = match name.as_str() {
            "var" => "var",
            "layout" => "layout",
            "default" => "default",
            "separator" => "separator",
            "description" => "description",
            "upd" => "upd",
            "required" => "required",
            "prefix" => "prefix",
            "skip" => "skip",
            _ => return Err(meta.error(format!("Unknown option `{name}`"))),
        };

        if !self.seen.insert(key) {
            return Err(meta.error(format!("Duplicate option: `{key}`")));
        }

        match key {
            "var" => self.attr.var = Some(Self::string_value(&meta)?),

            "layout" => self.attr.layout = Some(Self::string_value(&meta)?),

            "default" => self.attr.default = Some(Self::string_value(&meta)?),

            "separator" => {
                let lit_str: LitStr = meta.value()?.parse()?;
                if lit_str.value().is_empty() {
                    return Err(SynError::new_spanned(lit_str, "separator cannot be empty"));
                }
                self.attr.separator = Some(lit_str.value());
            }

            "description" => self.attr.description = Some(Self::string_value(&meta)?),

            "upd" => {
                Self::skip_marker_value(&meta)?;
                self.attr.updatable = true;
            }

            "required" => {
                Self::skip_marker_value(&meta)?;
                self.attr.required = true;
            }

            "prefix" => self.attr.prefix = Some(Self::string_value(&meta)?),

            "skip" => self.attr.skip = true,

            _ => unreachable!("option names are validated above"),
        }

        Ok(())
    }

    /// Parses `= "literal"`.
    fn string_value(meta: &ParseNestedMeta) -> SynResult<String> {
        let lit_str: LitStr = meta.value()?.parse()?;
        Ok(lit_str.value())
    }

    /// Consumes an optional `= <expr>` after a marker option.
    fn skip_marker_value(meta: &ParseNestedMeta) -> SynResult<()> {
        if meta.input.peek(Token![=]) {
            let _eq: Token![=] = meta.input.parse()?;
            let _value: Expr = meta.input.parse()?;
        }

        Ok(())
    }

    /// Validates option combinations and fills in the doc-comment description.
    ///
    /// Every option combined with `skip` is reported in one error.
    fn build(self, field: &Field) -> SynResult<FieldAttr> {
        let mut attr = self.attr;

        if attr.skip {
            let mut incompatible: Vec<&str> = self
                .seen
                .iter()
                .copied()
                .filter(|key| *key != "skip")
                .collect();

            if !incompatible.is_empty() {
                incompatible.sort_unstable();

                return Err(SynError::new_spanned(
                    field,
                    format!(
                        "`skip` cannot be combined with: {}",
                        incompatible.join(", ")
                    ),
                ));
            }
        }

        if attr.description.is_none() {
            attr.description = extract_doc_comment(field);
        }

        Ok(attr)
    }

    /// Parses every `#[env(...)]` attribute on `field`.
    ///
    /// A field without the attribute is still bound: it has no environment
    /// variables, and nested structs are still entered.
    pub fn parse_field_attr(field: &Field) -> SynResult<FieldAttr> {
        let mut parser = Self::default();

        for attr in &field.attrs {
            if !attr.path().is_ident("env") {
                continue;
            }

            attr.parse_nested_meta(|meta: ParseNestedMeta<'_>| parser.parse_meta(meta))?;
        }

        parser.build(field)
    }
}

/// Struct-level configuration from `#[env_config(...)]`.
#[derive(Clone, Debug, Default)]
pub struct EnvConfigAttr {
    /// Wire the struct's `Updater` impl into binding passes.
    /// Generated from: `#[env_config(updater)]`
    pub updater: bool,
}

impl EnvConfigAttr {
    /// Parse `#[env_config(...)]` attribute from a struct.
    pub fn parse_from_struct(input: &DeriveInput) -> SynResult<Self> {
        let mut result = Self::default();

        for attr in &input.attrs {
            if !attr.path().is_ident("env_config") {
                continue;
            }

            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("updater") {
                    if result.updater {
                        return Err(meta.error("Duplicate option: `updater`"));
                    }
                    result.updater = true;

                    Ok(())
                } else {
                    Err(meta.error("unknown env_config option"))
                }
            })?;
        }

        Ok(result)
    }
}
