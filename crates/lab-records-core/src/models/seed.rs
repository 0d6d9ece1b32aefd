//! Default dataset used when a slot has never been saved.

use chrono::NaiveDate;

use super::{Gender, LabTest, Patient, TestCategory};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN)
}

/// Sample patients.
pub fn seed_patients() -> Vec<Patient> {
    vec![
        Patient {
            id: "1".into(),
            name: "أحمد محمد علي".into(),
            age: 34,
            gender: Gender::Male,
            phone: "0501234567".into(),
            email: None,
            registered_at: date(2023, 10, 1),
        },
        Patient {
            id: "2".into(),
            name: "سارة خالد".into(),
            age: 28,
            gender: Gender::Female,
            phone: "0509876543".into(),
            email: None,
            registered_at: date(2023, 10, 5),
        },
    ]
}

fn seed_test(
    id: &str,
    name: &str,
    code: &str,
    price: u64,
    unit: &str,
    normal_range: &str,
    category: TestCategory,
) -> LabTest {
    LabTest {
        id: id.into(),
        code: code.into(),
        name: name.into(),
        price,
        unit: unit.into(),
        normal_range: normal_range.into(),
        category,
    }
}

/// Starter catalog.
pub fn seed_tests() -> Vec<LabTest> {
    vec![
        seed_test("t1", "CBC - صورة دم كاملة", "HEM001", 150, "-", "N/A", TestCategory::Hematology),
        seed_test("t2", "Fasting Blood Sugar", "BIO001", 50, "mg/dL", "70-100", TestCategory::Biochemistry),
        seed_test("t3", "HbA1c", "BIO002", 120, "%", "4.0-5.6", TestCategory::Biochemistry),
        seed_test("t4", "Vitamin D", "HOR001", 300, "ng/mL", "30-100", TestCategory::Hormones),
        seed_test("t5", "Lipid Profile", "BIO003", 200, "mg/dL", "<200", TestCategory::Biochemistry),
    ]
}
