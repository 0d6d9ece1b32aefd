//! Prompts for lab result analysis.

use crate::analysis::{AnalysisRequest, AnalysisRow};

/// Role and task framing for the model.
pub const SYSTEM_PROMPT: &str = r#"You are an expert medical laboratory assistant.
Analyze the following lab results for a patient."#;

/// Output instructions appended after the results.
pub const INSTRUCTIONS: &str = r#"Instructions:
1. Provide a brief summary of the findings in Arabic.
2. Highlight any abnormal values.
3. Suggest general lifestyle advice or follow-up doctor types.
4. Output MUST be in Arabic."#;

/// Format one result line as `- name: value unit (Range: range)`.
pub fn format_result_line(row: &AnalysisRow) -> String {
    format!(
        "- {}: {} {} (Range: {})",
        row.test_name, row.value, row.unit, row.normal_range
    )
}

/// Build the complete prompt for a visit.
pub fn build_analysis_prompt(request: &AnalysisRequest) -> String {
    let results = request
        .rows
        .iter()
        .map(format_result_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"{}

Patient Info:
- Age: {}
- Gender: {}

Results:
{}

{}"#,
        SYSTEM_PROMPT, request.age, request.gender, results, INSTRUCTIONS
    )
}
