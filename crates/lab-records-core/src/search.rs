//! List filters for patients, visits and tests.
//!
//! An empty term matches everything.

use crate::engine::LabState;
use crate::models::{LabTest, Patient, Visit};

/// Patients whose name or phone contains `term`.
pub fn search_patients<'a>(state: &'a LabState, term: &str) -> Vec<&'a Patient> {
    state
        .patients()
        .iter()
        .filter(|p| p.name.contains(term) || p.phone.contains(term))
        .collect()
}

/// Visits whose patient name or visit ID contains `term`.
///
/// Visits of an unknown patient only match on ID.
pub fn search_visits<'a>(state: &'a LabState, term: &str) -> Vec<&'a Visit> {
    state
        .visits()
        .iter()
        .filter(|v| {
            let name_matches = state
                .patient(&v.patient_id)
                .is_some_and(|p| p.name.contains(term));
            name_matches || v.id.contains(term)
        })
        .collect()
}

/// Tests whose name or code contains `term`, ignoring case.
pub fn search_tests<'a>(state: &'a LabState, term: &str) -> Vec<&'a LabTest> {
    state.tests().iter().filter(|t| t.matches(term)).collect()
}
