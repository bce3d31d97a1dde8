//! Derive macro for docbus document types.
//!
//! `#[derive(Document)]` wires a struct into the document store: it emits the
//! `Document` impl naming the target collection and the mapper leaf impl that
//! flattens the value into BSON. The generated code refers to types through
//! the `docbus` facade crate, so derive users depend on `docbus` rather than
//! the individual member crates.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod document;

/// Derives the document capability traits for a struct.
///
/// The collection name defaults to the struct identifier verbatim; override
/// it with `#[document(collection = "...")]`. Field names in the persisted
/// document are serde's serialized names, so `#[serde(rename = "...")]`
/// applies as usual.
///
/// # Examples
///
/// ```rust,ignore
/// use docbus::prelude::*;
/// use serde::{Serialize, Deserialize};
///
/// #[derive(Debug, Serialize, Deserialize, Document)]
/// pub struct User {
///     pub name: String,
///     pub email: String,
/// }
///
/// #[derive(Debug, Serialize, Deserialize, Document)]
/// #[document(collection = "audit_log")]
/// pub struct AuditEntry {
///     pub actor: String,
///     pub action: String,
/// }
/// ```
///
/// # Errors
///
/// Produces a compile error for enums and unions, and for unrecognized
/// `#[document(...)]` attributes.
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(input as DeriveInput);

    document::generate_document_for_struct(&ast)
        .unwrap_or_else(|err| err.to_compile_error())
        .into()
}
