//! `#[crud("...")]` attribute parsing.

use syn::{Field, GenericArgument, LitStr, PathArguments, Result, Type};

/// A field carrying a `#[crud]` attribute.
pub struct TaggedField {
    pub ident: syn::Ident,
    pub ty: syn::Type,
    /// The raw tag, passed through unchanged.
    pub tag: String,
    /// Column part of the tag.
    pub column: String,
}

/// Read the `#[crud("...")]` attribute of a field, if any.
pub fn parse_field(field: &Field) -> Result<Option<TaggedField>> {
    let mut found: Option<LitStr> = None;

    for attr in &field.attrs {
        if !attr.path().is_ident("crud") {
            continue;
        }
        if found.is_some() {
            return Err(syn::Error::new_spanned(attr, "duplicate #[crud] attribute"));
        }
        found = Some(attr.parse_args::<LitStr>()?);
    }

    let Some(lit) = found else {
        return Ok(None);
    };

    let Some(ident) = field.ident.clone() else {
        return Err(syn::Error::new_spanned(field, "#[crud] requires a named field"));
    };

    let tag = lit.value();
    let column = tag.split(',').next().unwrap_or_default().trim().to_string();
    if column.is_empty() {
        return Err(syn::Error::new_spanned(
            &lit,
            "#[crud] needs a column name; remove the attribute to leave the field unmapped",
        ));
    }

    let unix = tag.split(',').skip(1).any(|flag| flag.trim() == "unix");
    if unix && is_primitive(&field.ty) {
        return Err(syn::Error::new_spanned(
            &field.ty,
            "`unix` requires a timestamp field such as `DateTime<Utc>`",
        ));
    }

    Ok(Some(TaggedField {
        ident,
        ty: field.ty.clone(),
        tag,
        column,
    }))
}

/// Scalar types that can never hold a timestamp, looking through `Option`.
///
/// Anything else, aliases included, is checked when a value is scanned.
fn is_primitive(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    let Some(last) = path.path.segments.last() else {
        return false;
    };
    if last.ident == "Option" {
        return match &last.arguments {
            PathArguments::AngleBracketed(args) => match args.args.first() {
                Some(GenericArgument::Type(inner)) => is_primitive(inner),
                _ => false,
            },
            _ => false,
        };
    }
    const PRIMITIVES: &[&str] = &[
        "i8", "i16", "i32", "i64", "u8", "u16", "u32", "u64", "f32", "f64", "bool", "String",
    ];
    PRIMITIVES.iter().any(|p| last.ident == p)
}
