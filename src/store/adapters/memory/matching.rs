//! Equality filters and distinct-value extraction over stored documents.

use crate::store::domain::FieldKey;
use mongodb::bson::{Bson, Document};
use std::slice;
use thiserror::Error;

/// The in-memory driver only understands field equality filters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported filter on '{0}': only field equality is supported")]
pub(super) struct UnsupportedFilter(pub(super) String);

/// Rejects query operators such as `$or` or `{ "$gt": 1 }`.
pub(super) fn validate_filter(filter: &Document) -> Result<(), UnsupportedFilter> {
    for (key, value) in filter {
        let has_operator = matches!(
            value,
            Bson::Document(inner) if inner.keys().any(|inner_key| inner_key.starts_with('$'))
        );
        if key.starts_with('$') || has_operator {
            return Err(UnsupportedFilter(key.clone()));
        }
    }
    Ok(())
}

/// Returns `true` when every filter field equals the document's field.
///
/// Dotted keys descend into embedded documents. An array field matches
/// when it equals the expected value or contains it.
pub(super) fn matches(document: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| {
        lookup(document, key.split('.')).is_some_and(|actual| field_matches(actual, expected))
    })
}

fn field_matches(actual: &Bson, expected: &Bson) -> bool {
    values_equal(actual, expected)
        || matches!(actual, Bson::Array(items) if items.iter().any(|item| values_equal(item, expected)))
}

fn lookup<'doc, 'key>(
    document: &'doc Document,
    mut path: impl Iterator<Item = &'key str>,
) -> Option<&'doc Bson> {
    let first = path.next()?;
    let mut current = document.get(first)?;
    for segment in path {
        current = match current {
            Bson::Document(inner) => inner.get(segment)?,
            _ => return None,
        };
    }
    Some(current)
}

// 32- and 64-bit integers with the same value compare equal, as on the server.
fn values_equal(left: &Bson, right: &Bson) -> bool {
    match (left, right) {
        (Bson::Int32(narrow), Bson::Int64(wide)) | (Bson::Int64(wide), Bson::Int32(narrow)) => {
            i64::from(*narrow) == *wide
        }
        _ => left == right,
    }
}

/// Collects the distinct values under `key`, in first-seen order.
///
/// Array fields contribute each element rather than the array itself.
/// Documents without the field are skipped.
pub(super) fn distinct_values<'doc>(
    documents: impl IntoIterator<Item = &'doc Document>,
    key: &FieldKey,
) -> Vec<Bson> {
    let mut values: Vec<Bson> = Vec::new();
    for document in documents {
        let Some(found) = lookup(document, key.segments()) else {
            continue;
        };
        let candidates = match found {
            Bson::Array(items) => items.as_slice(),
            single => slice::from_ref(single),
        };
        for candidate in candidates {
            if !values.iter().any(|seen| values_equal(seen, candidate)) {
                values.push(candidate.clone());
            }
        }
    }
    values
}
