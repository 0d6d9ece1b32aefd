//! Patient registry operations.

use super::{Confirmation, EngineError, EngineResult, LabController};
use crate::db::{Slot, SnapshotStore};
use crate::models::{Gender, Patient, PatientUpdate};

/// Fields for registering a patient.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub phone: String,
    pub email: Option<String>,
}

impl<S: SnapshotStore> LabController<S> {
    /// Register a patient. The name is required.
    pub fn register_patient(&mut self, new: NewPatient) -> EngineResult<Patient> {
        if new.name.trim().is_empty() {
            return Err(EngineError::Validation("patient name is required".into()));
        }

        let mut patient = Patient::new(new.name, new.age, new.gender, new.phone);
        patient.email = new.email;

        self.commit(Slot::Patients, |state| state.patients.push(patient.clone()))?;

        tracing::info!(patient_id = %patient.id, "Patient registered");
        Ok(patient)
    }

    /// Edit a patient. Returns `false` if no patient has that ID.
    pub fn update_patient(&mut self, id: &str, update: PatientUpdate) -> EngineResult<bool> {
        if matches!(&update.name, Some(name) if name.trim().is_empty()) {
            return Err(EngineError::Validation("patient name is required".into()));
        }

        let Some(index) = self.state.patients.iter().position(|p| p.id == id) else {
            return Ok(false);
        };

        self.commit(Slot::Patients, |state| state.patients[index].apply(update))?;
        tracing::info!(patient_id = %id, "Patient updated");
        Ok(true)
    }

    /// Remove a patient. Their visits stay and render as an unknown patient.
    pub fn delete_patient(&mut self, id: &str, confirmation: Confirmation) -> EngineResult<bool> {
        confirmation.require("delete patient")?;

        if self.state.patient(id).is_none() {
            return Ok(false);
        }

        self.commit(Slot::Patients, |state| state.patients.retain(|p| p.id != id))?;
        tracing::info!(patient_id = %id, "Patient deleted");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;

    fn setup() -> LabController<MemoryStore> {
        LabController::load(MemoryStore::new()).unwrap()
    }

    fn new_patient(name: &str) -> NewPatient {
        NewPatient {
            name: name.into(),
            age: 45,
            gender: Gender::Male,
            phone: "0551112222".into(),
            email: None,
        }
    }

    #[test]
    fn test_register_patient() {
        let mut controller = setup();
        let patient = controller.register_patient(new_patient("Omar")).unwrap();

        assert_eq!(controller.state().patients().len(), 3);
        assert_eq!(controller.state().patient(&patient.id), Some(&patient));
        assert_eq!(controller.store().writes(), 1);
    }

    #[test]
    fn test_register_requires_name() {
        let mut controller = setup();
        let result = controller.register_patient(new_patient(""));
        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert_eq!(controller.state().patients().len(), 2);
    }

    #[test]
    fn test_update_patient() {
        let mut controller = setup();
        let found = controller
            .update_patient(
                "1",
                PatientUpdate {
                    age: Some(35),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(found);
        assert_eq!(controller.state().patient("1").unwrap().age, 35);

        let result = controller.update_patient(
            "1",
            PatientUpdate {
                name: Some(" ".into()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(EngineError::Validation(_))));
        assert!(!controller
            .update_patient("nobody", PatientUpdate::default())
            .unwrap());
    }

    #[test]
    fn test_delete_patient() {
        let mut controller = setup();
        assert!(controller
            .delete_patient("2", Confirmation::Declined)
            .is_err());
        assert!(controller.delete_patient("2", Confirmation::Confirmed).unwrap());
        assert!(controller.state().patient("2").is_none());
    }
}
