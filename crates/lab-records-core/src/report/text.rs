//! Plain-text rendering of a report for printing.

use super::ReportDocument;

const RULE_WIDTH: usize = 72;

impl ReportDocument {
    /// Render the fixed layout: header, patient block, results table,
    /// optional narrative, signature line and footer.
    pub fn to_text(&self) -> String {
        let mut text = String::new();
        let heavy = format!("{}\n", "=".repeat(RULE_WIDTH));
        let light = format!("{}\n", "-".repeat(RULE_WIDTH));

        // Header
        text.push_str(&format!(
            "{}\n{}\n{}\n",
            self.header.lab_name, self.header.address, self.header.phone
        ));
        text.push_str("تقرير نتائج طبية / Medical Laboratory Report\n");
        text.push_str(&format!("ID: {}\n", self.header.report_id));
        text.push_str(&heavy);

        // Patient
        let age_gender = match (self.patient.age, &self.patient.gender) {
            (Some(age), Some(gender)) => format!("{} سنة / {}", age, gender),
            _ => "-".to_string(),
        };
        text.push_str(&format!("اسم المريض: {}\n", self.patient.name));
        text.push_str(&format!("تاريخ الزيارة: {}\n", self.patient.visit_date));
        text.push_str(&format!("العمر / الجنس: {}\n", age_gender));
        text.push_str(&format!("رقم الهاتف: {}\n", self.patient.phone));
        text.push_str(&format!("الحالة: {}\n", self.status));
        text.push_str(&light);

        // Results
        text.push_str(&format!(
            "{:<30} {:>12} {:>10} {:>16}\n",
            "Test Name", "Result", "Unit", "Ref. Range"
        ));
        text.push_str(&light);
        for row in &self.rows {
            text.push_str(&format!(
                "{:<30} {:>12} {:>10} {:>16}\n",
                row.test_name, row.result, row.unit, row.reference_range
            ));
        }
        text.push_str(&heavy);

        // Narrative
        if let Some(analysis) = &self.analysis {
            text.push_str("ملاحظات التقرير الذكي:\n");
            text.push_str(&format!("{}\n", analysis));
            text.push_str(&light);
        }

        // Signature and footer
        text.push_str("مدير المختبر: ____________________\n\n");
        text.push_str(&format!("{}\n", self.footer_text));
        text.push_str(&format!(
            "تاريخ الطباعة: {}\n",
            self.printed_at.format("%Y-%m-%d %H:%M:%S")
        ));

        text
    }
}
