//! Equality matching for in-memory queries.

use bson::{Bson, Document};
use docbus_core::{
    error::{StoreError, StoreResult},
    value,
};

/// True when `document` satisfies every field of `filter`.
///
/// Supports field-by-field equality with dotted paths, array-contains
/// matching on array fields, and null-matches-missing. Query operators are
/// not evaluated here: a `$`-prefixed key, at the top level or inside an
/// expected value, surfaces [`StoreError::Unsupported`].
pub(crate) fn matches(document: &Document, filter: &Document) -> StoreResult<bool> {
    for (key, expected) in filter {
        if key.starts_with('$') {
            return Err(StoreError::Unsupported(format!("query operator {key}")));
        }
        if let Bson::Document(inner) = expected
            && let Some(operator) = inner.keys().find(|k| k.starts_with('$'))
        {
            return Err(StoreError::Unsupported(format!(
                "query operator {operator}"
            )));
        }

        let hit = match value::field_at_path(document, key) {
            Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
                value::array_contains(items, expected)
            }
            Some(actual) => value::loose_eq(actual, expected),
            None => matches!(expected, Bson::Null),
        };
        if !hit {
            return Ok(false);
        }
    }
    Ok(true)
}
