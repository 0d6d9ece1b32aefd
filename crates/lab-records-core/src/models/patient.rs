//! Patient models.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Patient gender.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// Localized display label.
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "ذكر",
            Gender::Female => "أنثى",
        }
    }
}

/// A registered patient.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    /// Opaque unique ID
    pub id: String,
    /// Full name
    pub name: String,
    /// Age in years
    pub age: u32,
    pub gender: Gender,
    /// Contact phone
    pub phone: String,
    /// Contact email
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Registration date
    pub registered_at: NaiveDate,
}

impl Patient {
    /// Create a new patient registered today.
    pub fn new(name: String, age: u32, gender: Gender, phone: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            age,
            gender,
            phone,
            email: None,
            registered_at: chrono::Local::now().date_naive(),
        }
    }

    /// Apply the supplied fields of an update; the ID never changes.
    pub fn apply(&mut self, update: PatientUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(age) = update.age {
            self.age = age;
        }
        if let Some(gender) = update.gender {
            self.gender = gender;
        }
        if let Some(phone) = update.phone {
            self.phone = phone;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
    }
}

/// Partial patient edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub gender: Option<Gender>,
    pub phone: Option<String>,
    /// `Some(None)` clears the email
    pub email: Option<Option<String>>,
}
