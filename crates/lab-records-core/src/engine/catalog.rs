//! Catalog operations.

use super::{Confirmation, EngineError, EngineResult, LabController};
use crate::db::{Slot, SnapshotStore};
use crate::models::{LabTest, LabTestUpdate, TestCategory};

/// Fields for a new catalog test.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewLabTest {
    pub name: String,
    /// Defaults to `GEN` when empty
    pub code: String,
    pub price: u64,
    pub unit: String,
    pub normal_range: String,
    pub category: TestCategory,
}

fn validate_test(name: &str, price: u64) -> EngineResult<()> {
    if name.trim().is_empty() {
        return Err(EngineError::Validation("test name is required".into()));
    }
    if price == 0 {
        return Err(EngineError::Validation("test price is required".into()));
    }
    Ok(())
}

impl<S: SnapshotStore> LabController<S> {
    /// Add a test to the catalog.
    pub fn add_test(&mut self, new: NewLabTest) -> EngineResult<LabTest> {
        validate_test(&new.name, new.price)?;

        let mut test = LabTest::new(new.name, new.price);
        if !new.code.trim().is_empty() {
            test.code = new.code;
        }
        test.unit = new.unit;
        test.normal_range = new.normal_range;
        test.category = new.category;

        self.commit(Slot::Tests, |state| state.tests.push(test.clone()))?;

        tracing::info!(test_id = %test.id, code = %test.code, price = test.price, "Catalog test added");
        Ok(test)
    }

    /// Edit a catalog test. Returns `false` if no test has that ID.
    ///
    /// Existing visits keep their frozen totals; they pick up the new name,
    /// unit and range on display.
    pub fn update_test(&mut self, id: &str, update: LabTestUpdate) -> EngineResult<bool> {
        let Some(index) = self.state.tests.iter().position(|t| t.id == id) else {
            return Ok(false);
        };

        let mut edited = self.state.tests[index].clone();
        edited.apply(update);
        validate_test(&edited.name, edited.price)?;

        self.commit(Slot::Tests, |state| state.tests[index] = edited)?;

        tracing::info!(test_id = %id, "Catalog test updated");
        Ok(true)
    }

    /// Remove a catalog test. Visits that reference it are left untouched.
    pub fn delete_test(&mut self, id: &str, confirmation: Confirmation) -> EngineResult<bool> {
        confirmation.require("delete test")?;

        if self.state.test(id).is_none() {
            return Ok(false);
        }

        self.commit(Slot::Tests, |state| state.tests.retain(|t| t.id != id))?;
        tracing::info!(test_id = %id, "Catalog test deleted");
        Ok(true)
    }
}
