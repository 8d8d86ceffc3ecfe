//! Result projection.
//!
//! Turns the raw result of an observable query into the snapshot published
//! for render callbacks.

use weft_core::util::{is_empty_data, shallow_merge};
use weft_core::{OperationResult, Value, Variables};
use weft_store::QuerySnapshot;

/// Projects a raw result into a snapshot.
///
/// - GraphQL errors reported with the result become the snapshot's error.
/// - While loading, the previous snapshot's data is shown with whatever
///   partial data has arrived merged over it.
/// - On error, the data of the last successful result is shown.
/// - Otherwise the current data is shown.
///
/// Empty data (absent, `null` or `{}`) is published as `None`.
pub fn project(
    current: &OperationResult,
    previous_data: Option<&Value>,
    last_result: Option<&OperationResult>,
    variables: Variables,
) -> QuerySnapshot {
    let error = current.combined_error();

    let data = if current.loading {
        match current.data.as_ref() {
            Some(Value::Object(_)) | None => {
                Some(Value::Object(shallow_merge(previous_data, current.data.as_ref())))
            }
            Some(other) => Some(other.clone()),
        }
    } else if error.is_some() {
        last_result.and_then(|r| r.data.clone())
    } else {
        current.data.clone()
    };

    QuerySnapshot {
        data: if is_empty_data(data.as_ref()) { None } else { data },
        error,
        loading: current.loading,
        network_status: current.network_status,
        variables,
    }
}

/// Picks the data to keep as "previous" when a subscription starts.
///
/// A settled, error-free snapshot replaces the previous data; a loading or
/// failed one keeps it.
pub fn previous_data_for(snapshot: &QuerySnapshot, previous: Option<Value>) -> Option<Value> {
    if snapshot.loading || snapshot.error.is_some() {
        previous
    } else {
        snapshot.data.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::{json, ClientError, GraphQlError, NetworkStatus};

    #[test]
    fn test_project_ready() {
        let current = OperationResult::ready(json!({"pokemon": {"name": "Pikachu"}}));
        let snapshot = project(&current, None, None, Variables::new());
        assert_eq!(snapshot.data, Some(json!({"pokemon": {"name": "Pikachu"}})));
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
        assert_eq!(snapshot.network_status, NetworkStatus::Ready);
    }

    #[test]
    fn test_project_loading_keeps_previous() {
        let previous = json!({"pokemon": {"name": "Pikachu"}, "count": 1});
        let current = OperationResult::loading().with_data(json!({"count": 2}));
        let snapshot = project(&current, Some(&previous), None, Variables::new());
        assert!(snapshot.loading);
        assert_eq!(
            snapshot.data,
            Some(json!({"pokemon": {"name": "Pikachu"}, "count": 2}))
        );
    }

    #[test]
    fn test_project_loading_without_anything_is_null() {
        let snapshot = project(&OperationResult::loading(), None, None, Variables::new());
        assert!(snapshot.data.is_none());
        assert!(snapshot.loading);
    }

    #[test]
    fn test_project_error_shows_last_result() {
        let last = OperationResult::ready(json!({"items": [1, 2]}));
        let current = OperationResult::failed(ClientError::network("offline"));
        let snapshot = project(&current, None, Some(&last), Variables::new());
        assert_eq!(snapshot.data, Some(json!({"items": [1, 2]})));
        assert_eq!(snapshot.error, Some(ClientError::network("offline")));
    }

    #[test]
    fn test_project_graphql_errors_fold_into_error() {
        let current = OperationResult::ready(json!({"partial": true}))
            .with_errors(vec![GraphQlError::new("field failed")]);
        let snapshot = project(&current, None, None, Variables::new());
        assert!(snapshot.data.is_none());
        assert_eq!(snapshot.errors()[0].message, "field failed");
    }

    #[test]
    fn test_project_empty_object_is_null() {
        let snapshot = project(&OperationResult::ready(json!({})), None, None, Variables::new());
        assert!(snapshot.data.is_none());
    }

    #[test]
    fn test_previous_data_for() {
        let settled = project(&OperationResult::ready(json!({"a": 1})), None, None, Variables::new());
        assert_eq!(previous_data_for(&settled, Some(json!({"a": 0}))), Some(json!({"a": 1})));

        let loading = project(&OperationResult::loading(), None, None, Variables::new());
        assert_eq!(previous_data_for(&loading, Some(json!({"a": 0}))), Some(json!({"a": 0})));
    }
}
