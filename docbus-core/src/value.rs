//! Helpers for inspecting BSON values.

use bson::{Bson, Document};

/// Returns the value at a dotted `path` inside `document`, if present.
///
/// `"a.b"` descends through embedded documents; a missing segment or a
/// non-document partway down yields `None`.
pub fn field_at_path<'a>(document: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut current = document;
    let mut segments = path.split('.').peekable();
    while let Some(segment) = segments.next() {
        let value = current.get(segment)?;
        if segments.peek().is_none() {
            return Some(value);
        }
        current = value.as_document()?;
    }
    None
}

/// Numeric-loose equality over BSON values.
///
/// Integers and doubles compare by numeric value (`Int32(1)` equals
/// `Int64(1)`), matching how MongoDB treats numbers; arrays and embedded
/// documents compare element-wise under the same rule; everything else uses
/// exact BSON equality.
pub fn loose_eq(a: &Bson, b: &Bson) -> bool {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x == y;
    }
    match (a, b) {
        (Bson::Array(xs), Bson::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| loose_eq(x, y))
        }
        (Bson::Document(x), Bson::Document(y)) => {
            x.len() == y.len()
                && x.iter()
                    .zip(y.iter())
                    .all(|((ka, va), (kb, vb))| ka == kb && loose_eq(va, vb))
        }
        _ => a == b,
    }
}

/// True when `values` contains an element loosely equal to `needle`.
pub fn array_contains(values: &[Bson], needle: &Bson) -> bool {
    values.iter().any(|value| loose_eq(value, needle))
}

fn as_number(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(f64::from(*v)),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use bson::doc;

    use super::*;

    #[test]
    fn path_lookup_finds_top_level_fields() {
        let document = doc! { "name": "alice" };
        assert_eq!(
            field_at_path(&document, "name"),
            Some(&Bson::String("alice".to_string()))
        );
        assert_eq!(field_at_path(&document, "email"), None);
    }

    #[test]
    fn path_lookup_descends_dotted_paths() {
        let document = doc! { "profile": { "address": { "city": "oslo" } } };
        assert_eq!(
            field_at_path(&document, "profile.address.city"),
            Some(&Bson::String("oslo".to_string()))
        );
        assert_eq!(field_at_path(&document, "profile.address.zip"), None);
    }

    #[test]
    fn path_lookup_stops_at_non_documents() {
        let document = doc! { "name": "alice" };
        assert_eq!(field_at_path(&document, "name.first"), None);
    }

    #[test]
    fn numbers_compare_across_bson_types() {
        assert!(loose_eq(&Bson::Int32(7), &Bson::Int64(7)));
        assert!(loose_eq(&Bson::Int64(7), &Bson::Double(7.0)));
        assert!(!loose_eq(&Bson::Int32(7), &Bson::Int32(8)));
        assert!(!loose_eq(&Bson::Int32(7), &Bson::String("7".to_string())));
    }

    #[test]
    fn containers_compare_element_wise() {
        let a = Bson::Array(vec![Bson::Int32(1), Bson::Int32(2)]);
        let b = Bson::Array(vec![Bson::Int64(1), Bson::Int64(2)]);
        assert!(loose_eq(&a, &b));

        let x = Bson::Document(doc! { "n": 1_i32 });
        let y = Bson::Document(doc! { "n": 1_i64 });
        assert!(loose_eq(&x, &y));
        assert!(!loose_eq(&x, &Bson::Document(doc! { "m": 1_i32 })));
    }

    #[test]
    fn array_contains_uses_loose_equality() {
        let values = vec![Bson::Int64(1), Bson::String("b".to_string())];
        assert!(array_contains(&values, &Bson::Int32(1)));
        assert!(array_contains(&values, &Bson::String("b".to_string())));
        assert!(!array_contains(&values, &Bson::String("c".to_string())));
    }
}
