//! Record derive macro implementation

use crate::attrs::{self, TaggedField};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Fields, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let tagged: Vec<TaggedField> = fields
        .iter()
        .map(attrs::parse_field)
        .filter_map(Result::transpose)
        .collect::<Result<_>>()?;

    let defs = tagged.iter().map(|f| {
        let field_name = f.ident.to_string();
        let tag = &f.tag;
        quote! { ::tagcrud::FieldDef::new(#field_name, #tag) }
    });

    let gets = tagged.iter().enumerate().map(|(i, f)| {
        let ident = &f.ident;
        quote! { #i => ::tagcrud::ToSqlValue::to_sql_value(&self.#ident) }
    });

    let sets = tagged.iter().enumerate().map(|(i, f)| {
        let ident = &f.ident;
        let ty = &f.ty;
        let column = &f.column;
        quote! {
            #i => {
                self.#ident = <#ty as ::tagcrud::FromSqlValue>::from_sql_value(value)
                    .map_err(|e| ::tagcrud::CrudError::decode(#column, e))?;
                ::core::result::Result::Ok(())
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::tagcrud::Record for #name #ty_generics #where_clause {
            fn fields(&self) -> &'static [::tagcrud::FieldDef] {
                static FIELDS: &[::tagcrud::FieldDef] = &[#(#defs),*];
                FIELDS
            }

            fn get_field(&self, index: usize) -> ::tagcrud::SqlValue {
                match index {
                    #(#gets,)*
                    _ => ::tagcrud::SqlValue::Null,
                }
            }

            fn set_field(
                &mut self,
                index: usize,
                value: ::tagcrud::SqlValue,
            ) -> ::tagcrud::CrudResult<()> {
                match index {
                    #(#sets)*
                    _ => ::core::result::Result::Err(::tagcrud::record::unknown_field(index)),
                }
            }
        }
    })
}
