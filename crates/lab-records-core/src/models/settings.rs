//! Laboratory identity used on printed reports.

use serde::{Deserialize, Serialize};

/// Process-wide lab settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LabSettings {
    pub lab_name: String,
    pub address: String,
    pub phone: String,
    /// Closing line printed at the bottom of every report
    pub footer_text: String,
}

impl Default for LabSettings {
    fn default() -> Self {
        Self {
            lab_name: "مختبر الشفاء الطبي".to_string(),
            address: "الرياض - شارع الملك فهد".to_string(),
            phone: "011-1234567".to_string(),
            footer_text: "نتمنى لكم دوام الصحة والعافية".to_string(),
        }
    }
}
