use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, LitStr, Result};

pub(crate) fn generate_document_for_struct(ast: &DeriveInput) -> Result<TokenStream> {
    if !matches!(ast.data, Data::Struct(_)) {
        return Err(syn::Error::new_spanned(
            &ast.ident,
            "#[derive(Document)] only supports structs",
        ));
    }

    let name = &ast.ident;
    let collection = collection_name(ast)?;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics docbus::document::Document for #name #ty_generics #where_clause {
            fn collection_name() -> &'static str {
                #collection
            }
        }

        impl #impl_generics docbus::mapper::ToDocuments for #name #ty_generics #where_clause {
            type Root = Self;

            fn append_documents(
                &self,
                out: &mut ::std::vec::Vec<docbus::bson::Document>,
            ) -> docbus::error::StoreResult<()> {
                out.push(docbus::document::DocumentExt::to_document(self)?);
                ::std::result::Result::Ok(())
            }
        }
    })
}

fn collection_name(ast: &DeriveInput) -> Result<String> {
    let mut collection = ast.ident.to_string();

    for attr in &ast.attrs {
        if !attr.path().is_ident("document") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value = meta.value()?;
                let s: LitStr = value.parse()?;
                collection = s.value();
                Ok(())
            } else {
                Err(meta.error("Unknown document attribute, expected `collection`"))
            }
        })?;
    }

    Ok(collection)
}
