//! Visit lifecycle: create, save results, delete.

use std::collections::HashMap;

use super::{aggregate_results, Confirmation, EngineError, EngineResult, LabController};
use crate::db::{Slot, SnapshotStore};
use crate::models::{Visit, VisitStatus};
use crate::report::ReportDocument;

impl<S: SnapshotStore> LabController<S> {
    /// Open a visit for a patient with an ordered set of tests.
    ///
    /// The total is the sum of current catalog prices (unknown IDs count 0)
    /// and is never recomputed. The visit is placed first in the list.
    pub fn create_visit(&mut self, patient_id: &str, test_ids: Vec<String>) -> EngineResult<Visit> {
        if patient_id.trim().is_empty() {
            return Err(EngineError::Validation("a patient must be selected".into()));
        }
        if test_ids.is_empty() {
            return Err(EngineError::Validation("at least one test must be selected".into()));
        }

        let total_cost = self.price_of(&test_ids);
        let visit = Visit::new(patient_id.to_string(), test_ids, total_cost);

        self.commit(Slot::Visits, |state| state.visits.insert(0, visit.clone()))?;

        tracing::info!(
            visit_id = %visit.id,
            patient_id = %visit.patient_id,
            tests = visit.selected_test_ids.len(),
            total_cost,
            "Visit created"
        );
        Ok(visit)
    }

    /// Sum of current catalog prices for the given test IDs.
    pub fn price_of(&self, test_ids: &[String]) -> u64 {
        test_ids
            .iter()
            .map(|id| self.state.test(id).map(|t| t.price).unwrap_or(0))
            .sum()
    }

    /// Replace a visit's results and mark it completed.
    ///
    /// Every selected test gets a row, blank when no value was supplied.
    /// Saving again overwrites the previous results.
    pub fn save_results(
        &mut self,
        visit_id: &str,
        values_by_test_id: &HashMap<String, String>,
    ) -> EngineResult<Visit> {
        let index = self.visit_index(visit_id)?;

        let saved = self.commit(Slot::Visits, |state| {
            let visit = &mut state.visits[index];
            debug_assert!(visit.status.can_transition_to(VisitStatus::Completed));
            visit.results = aggregate_results(&visit.selected_test_ids, values_by_test_id);
            visit.status = VisitStatus::Completed;
            visit.clone()
        })?;

        let filled = saved.results.iter().filter(|r| !r.value.is_empty()).count();
        tracing::info!(
            visit_id = %visit_id,
            results = saved.results.len(),
            filled,
            "Visit results saved"
        );
        Ok(saved)
    }

    /// Remove a visit. Returns `false` if no visit has that ID.
    pub fn delete_visit(&mut self, visit_id: &str, confirmation: Confirmation) -> EngineResult<bool> {
        confirmation.require("delete visit")?;

        if self.state.visit(visit_id).is_none() {
            return Ok(false);
        }

        self.commit(Slot::Visits, |state| state.visits.retain(|v| v.id != visit_id))?;
        tracing::info!(visit_id = %visit_id, "Visit deleted");
        Ok(true)
    }

    /// Position of a visit in the list, or `NotFound`.
    pub(super) fn visit_index(&self, visit_id: &str) -> EngineResult<usize> {
        self.state
            .visits
            .iter()
            .position(|v| v.id == visit_id)
            .ok_or_else(|| EngineError::NotFound(format!("visit {}", visit_id)))
    }

    /// Print-ready report for a visit at any status, stamped with the local time.
    pub fn report(&self, visit_id: &str) -> EngineResult<ReportDocument> {
        let visit = self
            .state
            .visit(visit_id)
            .ok_or_else(|| EngineError::NotFound(format!("visit {}", visit_id)))?;
        let patient = self.state.patient(&visit.patient_id);

        Ok(ReportDocument::build(
            visit,
            patient,
            &self.state.tests,
            &self.state.settings,
            chrono::Local::now().naive_local(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::{LabTestUpdate, ResultFlag};

    fn setup() -> LabController<MemoryStore> {
        LabController::load(MemoryStore::new()).unwrap()
    }

    fn ids(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_create_visit_totals_prices() {
        let mut controller = setup();
        let visit = controller.create_visit("1", ids(&["t1", "t2"])).unwrap();

        assert_eq!(visit.total_cost, 200);
        assert_eq!(visit.status, VisitStatus::Pending);
        assert!(visit.results.is_empty());
        assert_eq!(visit.date, chrono::Local::now().date_naive());
    }

    #[test]
    fn test_total_frozen_after_price_edit() {
        let mut controller = setup();
        let first = controller.create_visit("1", ids(&["t1", "t2"])).unwrap();

        controller
            .update_test(
                "t1",
                LabTestUpdate {
                    price: Some(999),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(controller.state().visit(&first.id).unwrap().total_cost, 200);

        let second = controller.create_visit("1", ids(&["t1", "t2"])).unwrap();
        assert_eq!(second.total_cost, 1049);
    }

    #[test]
    fn test_unknown_test_costs_nothing() {
        let mut controller = setup();
        let visit = controller.create_visit("1", ids(&["t2", "gone"])).unwrap();
        assert_eq!(visit.total_cost, 50);
    }

    #[test]
    fn test_create_visit_validation() {
        let mut controller = setup();

        let result = controller.create_visit("", ids(&["t1"]));
        assert!(matches!(result, Err(EngineError::Validation(_))));

        let result = controller.create_visit("1", vec![]);
        assert!(matches!(result, Err(EngineError::Validation(_))));

        assert!(controller.state().visits().is_empty());
        assert_eq!(controller.store().writes(), 0);
    }

    #[test]
    fn test_newest_visit_first() {
        let mut controller = setup();
        let older = controller.create_visit("1", ids(&["t1"])).unwrap();
        let newer = controller.create_visit("2", ids(&["t2"])).unwrap();

        let visits = controller.state().visits();
        assert_eq!(visits[0].id, newer.id);
        assert_eq!(visits[1].id, older.id);
    }

    #[test]
    fn test_save_results_covers_all_selected() {
        let mut controller = setup();
        let visit = controller.create_visit("1", ids(&["t1", "t2", "t3"])).unwrap();

        let inputs = HashMap::from([("t2".to_string(), "95".to_string())]);
        let saved = controller.save_results(&visit.id, &inputs).unwrap();

        assert_eq!(saved.status, VisitStatus::Completed);
        assert_eq!(saved.results.len(), 3);
        assert_eq!(saved.result_for("t2").unwrap().value, "95");
        assert_eq!(saved.result_for("t1").unwrap().value, "");
        assert!(saved.results.iter().all(|r| r.flag == ResultFlag::Normal));
        assert_eq!(controller.state().visit(&visit.id), Some(&saved));
    }

    #[test]
    fn test_save_results_overwrites() {
        let mut controller = setup();
        let visit = controller.create_visit("1", ids(&["t2", "t3"])).unwrap();

        let first = HashMap::from([
            ("t2".to_string(), "95".to_string()),
            ("t3".to_string(), "5.1".to_string()),
        ]);
        controller.save_results(&visit.id, &first).unwrap();

        let second = HashMap::from([("t2".to_string(), "130".to_string())]);
        let saved = controller.save_results(&visit.id, &second).unwrap();

        assert_eq!(saved.status, VisitStatus::Completed);
        assert_eq!(saved.results.len(), 2);
        assert_eq!(saved.result_for("t2").unwrap().value, "130");
        assert_eq!(saved.result_for("t3").unwrap().value, "");
    }

    #[test]
    fn test_save_results_unknown_visit() {
        let mut controller = setup();
        let result = controller.save_results("missing", &HashMap::new());
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[test]
    fn test_delete_visit() {
        let mut controller = setup();
        let visit = controller.create_visit("1", ids(&["t1"])).unwrap();

        assert!(matches!(
            controller.delete_visit(&visit.id, Confirmation::Declined),
            Err(EngineError::ConfirmationRequired(_))
        ));
        assert_eq!(controller.state().visits().len(), 1);

        assert!(controller
            .delete_visit(&visit.id, Confirmation::Confirmed)
            .unwrap());
        assert!(controller.state().visits().is_empty());
    }

    #[test]
    fn test_deleted_test_keeps_visit() {
        let mut controller = setup();
        let visit = controller.create_visit("1", ids(&["t1", "t2"])).unwrap();
        controller.delete_test("t1", Confirmation::Confirmed).unwrap();

        let kept = controller.state().visit(&visit.id).unwrap();
        assert_eq!(kept.selected_test_ids, ids(&["t1", "t2"]));
        assert_eq!(kept.total_cost, 200);

        let report = controller.report(&visit.id).unwrap();
        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].test_name, crate::report::UNKNOWN_TEST);
    }
}
