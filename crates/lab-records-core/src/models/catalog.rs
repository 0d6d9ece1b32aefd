//! Lab test catalog models.

use serde::{Deserialize, Serialize};

/// Code assigned to tests created without one.
pub const DEFAULT_TEST_CODE: &str = "GEN";

/// Catalog section a test belongs to.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TestCategory {
    Hematology,
    #[default]
    Biochemistry,
    Microbiology,
    Hormones,
}

/// A single orderable test.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabTest {
    /// Opaque unique ID
    pub id: String,
    /// Catalog code (e.g., "BIO001"); duplicates are allowed
    pub code: String,
    /// Display name
    pub name: String,
    /// Price in whole currency units
    pub price: u64,
    /// Result unit (e.g., "mg/dL")
    pub unit: String,
    /// Reference range as displayed (e.g., "70-100", "<200")
    pub normal_range: String,
    pub category: TestCategory,
}

impl LabTest {
    /// Create a new catalog test with required fields.
    pub fn new(name: String, price: u64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            code: DEFAULT_TEST_CODE.to_string(),
            name,
            price,
            unit: String::new(),
            normal_range: String::new(),
            category: TestCategory::default(),
        }
    }

    /// Whether the name or code contains `term`, ignoring case.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term) || self.code.to_lowercase().contains(&term)
    }

    /// Apply the supplied fields of an update; the ID never changes.
    pub fn apply(&mut self, update: LabTestUpdate) {
        if let Some(code) = update.code {
            self.code = code;
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(unit) = update.unit {
            self.unit = unit;
        }
        if let Some(normal_range) = update.normal_range {
            self.normal_range = normal_range;
        }
        if let Some(category) = update.category {
            self.category = category;
        }
    }
}

/// Partial catalog edit. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabTestUpdate {
    pub code: Option<String>,
    pub name: Option<String>,
    pub price: Option<u64>,
    pub unit: Option<String>,
    pub normal_range: Option<String>,
    pub category: Option<TestCategory>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_defaults() {
        let test = LabTest::new("Ferritin".into(), 90);
        assert_eq!(test.code, "GEN");
        assert_eq!(test.category, TestCategory::Biochemistry);
        assert!(test.unit.is_empty());
        assert_eq!(test.id.len(), 36);
    }

    #[test]
    fn test_matches_name_or_code() {
        let mut test = LabTest::new("Fasting Blood Sugar".into(), 50);
        test.code = "BIO001".into();

        assert!(test.matches("blood"));
        assert!(test.matches("bio0"));
        assert!(test.matches(""));
        assert!(!test.matches("hba1c"));
    }

    #[test]
    fn test_apply_update() {
        let mut test = LabTest::new("HbA1c".into(), 120);
        let id = test.id.clone();

        test.apply(LabTestUpdate {
            price: Some(999),
            normal_range: Some("4.0-5.6".into()),
            ..Default::default()
        });

        assert_eq!(test.id, id);
        assert_eq!(test.price, 999);
        assert_eq!(test.name, "HbA1c");
        assert_eq!(test.normal_range, "4.0-5.6");
    }
}
