//! Lookup-by-filter for data sources without a known ID
//!
//! Some APIs have no server-side "find by name" endpoint, so data sources
//! list everything in scope and filter on the client.

use crate::error::{CloudError, Result};

/// Select the single item of `items` accepted by `matches`.
///
/// No match yields `NoMatch`, more than one yields `Ambiguous`; the caller
/// should then look the resource up by ID.
pub fn select_one<T>(
    kind: &'static str,
    field: &'static str,
    value: &str,
    items: impl IntoIterator<Item = T>,
    mut matches: impl FnMut(&T) -> bool,
) -> Result<T> {
    let mut found: Vec<T> = items.into_iter().filter(|item| matches(item)).collect();

    match found.len() {
        0 => Err(CloudError::NoMatch {
            kind,
            field,
            value: value.to_string(),
        }),
        1 => Ok(found.remove(0)),
        count => {
            tracing::debug!(kind, field, value, count, "Lookup matched more than one resource");
            Err(CloudError::Ambiguous {
                kind,
                field,
                value: value.to_string(),
                count,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item {
        id: &'static str,
        name: &'static str,
    }

    fn items() -> Vec<Item> {
        vec![
            Item { id: "a", name: "logs" },
            Item { id: "b", name: "metrics" },
            Item { id: "c", name: "logs" },
        ]
    }

    #[test]
    fn test_single_match() {
        let item = select_one("pipeline", "name", "metrics", items(), |i| i.name == "metrics").unwrap();
        assert_eq!(item.id, "b");
    }

    #[test]
    fn test_no_match() {
        let err = select_one("pipeline", "name", "traces", items(), |i| i.name == "traces").unwrap_err();
        assert!(matches!(err, CloudError::NoMatch { .. }));
    }

    #[test]
    fn test_ambiguous_match() {
        let err = select_one("pipeline", "name", "logs", items(), |i| i.name == "logs").unwrap_err();
        match err {
            CloudError::Ambiguous { count, .. } => assert_eq!(count, 2),
            other => panic!("expected ambiguous, got {other:?}"),
        }
    }
}
