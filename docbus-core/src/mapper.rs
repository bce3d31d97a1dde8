//! Shape-driven mapping of values onto collections and document sequences.
//!
//! Store operations accept values of many shapes: a single document, a
//! reference or box of one, or arbitrarily nested sequences of either.
//! [`ToDocuments`] resolves any such shape to the underlying document type's
//! collection and flattens the value into an ordered run of BSON documents.
//! Wrapper layers are peeled by the blanket impls in this module; the
//! per-type leaf impl comes from `#[derive(Document)]` (or is written by
//! hand next to a manual [`Document`] impl).

use bson::Bson;

use crate::{
    document::Document,
    error::{StoreError, StoreResult},
};

/// Capability to flatten a value into BSON documents bound for one collection.
///
/// `Root` names the document type reached after stripping every reference,
/// box, and sequence layer, so collection routing always lands on
/// `Root::collection_name()` no matter how deeply the value is wrapped:
/// `Vec<&Box<User>>` routes exactly like `User`.
pub trait ToDocuments {
    /// The document type at the bottom of the wrapper stack.
    type Root: Document;

    /// Appends this value's flattened documents to `out`, preserving order.
    fn append_documents(&self, out: &mut Vec<bson::Document>) -> StoreResult<()>;

    /// Flattens this value into an ordered document sequence.
    ///
    /// A single document yields one element; a sequence yields one element
    /// per item, in input order, recursing through nested sequences. An
    /// empty sequence yields an empty output.
    fn to_documents(&self) -> StoreResult<Vec<bson::Document>> {
        let mut out = Vec::new();
        self.append_documents(&mut out)?;
        Ok(out)
    }

    /// The collection every document of this value routes to.
    fn collection() -> &'static str {
        Self::Root::collection_name()
    }
}

impl<S: ToDocuments + ?Sized> ToDocuments for &S {
    type Root = S::Root;

    fn append_documents(&self, out: &mut Vec<bson::Document>) -> StoreResult<()> {
        (**self).append_documents(out)
    }
}

impl<S: ToDocuments + ?Sized> ToDocuments for Box<S> {
    type Root = S::Root;

    fn append_documents(&self, out: &mut Vec<bson::Document>) -> StoreResult<()> {
        (**self).append_documents(out)
    }
}

impl<S: ToDocuments> ToDocuments for [S] {
    type Root = S::Root;

    fn append_documents(&self, out: &mut Vec<bson::Document>) -> StoreResult<()> {
        for item in self {
            item.append_documents(out)?;
        }
        Ok(())
    }
}

impl<S: ToDocuments> ToDocuments for Vec<S> {
    type Root = S::Root;

    fn append_documents(&self, out: &mut Vec<bson::Document>) -> StoreResult<()> {
        self.as_slice().append_documents(out)
    }
}

impl<S: ToDocuments, const N: usize> ToDocuments for [S; N] {
    type Root = S::Root;

    fn append_documents(&self, out: &mut Vec<bson::Document>) -> StoreResult<()> {
        self.as_slice().append_documents(out)
    }
}

/// A single-field equality filter captured from a flattened document.
///
/// Upserts are keyed on one field; the filter is derived per document so
/// every element of a batch matches on its own value.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSpec {
    field: String,
    value: Bson,
}

impl FilterSpec {
    /// Looks up `field` on a flattened document and captures its value.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::FieldNotFound`] if the document has no such
    /// field. Field names are the serialized names, exactly as they appear
    /// in the document; an upsert never runs against a missing field.
    pub fn from_document(document: &bson::Document, field: &str) -> StoreResult<Self> {
        match document.get(field) {
            Some(value) => Ok(Self {
                field: field.to_string(),
                value: value.clone(),
            }),
            None => Err(StoreError::FieldNotFound(field.to_string())),
        }
    }

    /// The field this filter matches on.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The captured value the field must equal.
    pub fn value(&self) -> &Bson {
        &self.value
    }

    /// Renders the filter as the equality query sent to the store.
    pub fn into_query(self) -> bson::Document {
        let mut query = bson::Document::new();
        query.insert(self.field, self.value);
        query
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;
    use serde::{Deserialize, Serialize};

    use super::*;
    use crate::document::DocumentExt;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        name: String,
        email: String,
    }

    impl Document for User {
        fn collection_name() -> &'static str {
            "User"
        }
    }

    impl ToDocuments for User {
        type Root = Self;

        fn append_documents(&self, out: &mut Vec<bson::Document>) -> StoreResult<()> {
            out.push(self.to_document()?);
            Ok(())
        }
    }

    fn user(name: &str) -> User {
        User {
            name: name.to_string(),
            email: format!("{name}@x.com"),
        }
    }

    fn names(documents: &[bson::Document]) -> Vec<&str> {
        documents
            .iter()
            .filter_map(|d| d.get("name").and_then(Bson::as_str))
            .collect()
    }

    #[test]
    fn collection_resolves_through_any_wrapper_stack() {
        assert_eq!(<User as ToDocuments>::collection(), "User");
        assert_eq!(<&User as ToDocuments>::collection(), "User");
        assert_eq!(<Box<User> as ToDocuments>::collection(), "User");
        assert_eq!(<Vec<User> as ToDocuments>::collection(), "User");
        assert_eq!(<&[User] as ToDocuments>::collection(), "User");
        assert_eq!(<[User; 4] as ToDocuments>::collection(), "User");
        assert_eq!(<Vec<&Vec<Box<User>>> as ToDocuments>::collection(), "User");
        assert_eq!(<&[Box<[User; 2]>] as ToDocuments>::collection(), "User");
    }

    #[test]
    fn single_value_yields_one_document() {
        let documents = user("alice").to_documents().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(names(&documents), ["alice"]);
    }

    #[test]
    fn sequence_preserves_length_and_order() {
        let users = vec![user("alice"), user("bob"), user("carol")];
        let documents = users.to_documents().unwrap();
        assert_eq!(documents.len(), 3);
        assert_eq!(names(&documents), ["alice", "bob", "carol"]);
    }

    #[test]
    fn nested_sequences_flatten_in_order() {
        let groups = vec![vec![user("alice"), user("bob")], vec![], vec![user("carol")]];
        let documents = groups.to_documents().unwrap();
        assert_eq!(names(&documents), ["alice", "bob", "carol"]);
    }

    #[test]
    fn references_map_like_their_referents() {
        let users = [user("alice"), user("bob")];
        let refs: Vec<&User> = users.iter().collect();
        assert_eq!(refs.to_documents().unwrap(), users.to_documents().unwrap());
    }

    #[test]
    fn empty_sequence_yields_no_documents() {
        let users: Vec<User> = Vec::new();
        assert!(users.to_documents().unwrap().is_empty());
    }

    #[test]
    fn filter_captures_the_field_value() {
        let document = user("alice").to_document().unwrap();
        let filter = FilterSpec::from_document(&document, "email").unwrap();
        assert_eq!(filter.field(), "email");
        assert_eq!(filter.value(), &Bson::String("alice@x.com".to_string()));
        assert_eq!(filter.into_query(), doc! { "email": "alice@x.com" });
    }

    #[test]
    fn filter_on_a_missing_field_is_an_error() {
        let document = user("alice").to_document().unwrap();
        let err = FilterSpec::from_document(&document, "age").unwrap_err();
        assert!(matches!(err, StoreError::FieldNotFound(field) if field == "age"));
    }
}
