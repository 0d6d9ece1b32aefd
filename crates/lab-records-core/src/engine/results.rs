//! Result aggregation for the save-results transition.

use std::collections::HashMap;

use crate::models::{ResultFlag, TestResult};

/// Build the full result set for a visit.
///
/// One row per selected test, in selection order, whatever keys `inputs`
/// holds. Tests without input get an empty value; inputs for tests that are
/// not selected are ignored.
pub fn aggregate_results(
    selected_test_ids: &[String],
    inputs: &HashMap<String, String>,
) -> Vec<TestResult> {
    selected_test_ids
        .iter()
        .map(|test_id| TestResult {
            test_id: test_id.clone(),
            value: inputs.get(test_id).cloned().unwrap_or_default(),
            flag: ResultFlag::Normal,
            notes: None,
        })
        .collect()
}
