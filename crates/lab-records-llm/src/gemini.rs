//! HTTP client for the hosted Gemini `generateContent` API.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::analysis::{AnalysisError, AnalysisRequest, AnalysisResult, LabAnalyzer};
use crate::config::AnalysisConfig;
use crate::prompts::build_analysis_prompt;

/// Analyzer backed by the hosted Gemini model.
pub struct GeminiAnalyzer {
    config: AnalysisConfig,
    client: reqwest::blocking::Client,
}

impl GeminiAnalyzer {
    /// Create an analyzer; the timeout applies to the whole request.
    pub fn new(config: AnalysisConfig) -> AnalysisResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Analyzer configured from the environment.
    pub fn from_env() -> AnalysisResult<Self> {
        Self::new(AnalysisConfig::from_env())
    }

    /// The `generateContent` URL for the configured model.
    pub fn generate_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint, self.config.model
        )
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }
}

/// Request body for `generateContent`.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

/// Response body from `generateContent`.
#[derive(Deserialize, Default)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize, Default)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Default)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate.
fn extract_text(response: &GenerateResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .collect();

    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

impl LabAnalyzer for GeminiAnalyzer {
    fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult<String> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or(AnalysisError::MissingApiKey)?;

        let prompt = build_analysis_prompt(request);
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: &prompt }],
            }],
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        };

        tracing::debug!(model = %self.config.model, rows = request.rows.len(), "Requesting lab analysis");

        let response = self
            .client
            .post(self.generate_url())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    AnalysisError::Timeout(self.config.timeout_secs)
                } else {
                    AnalysisError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(AnalysisError::Service {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;

        extract_text(&parsed).ok_or(AnalysisError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::AnalysisRow;

    fn request() -> AnalysisRequest {
        AnalysisRequest {
            age: 34,
            gender: "ذكر".into(),
            rows: vec![AnalysisRow {
                test_name: "Lipid Profile".into(),
                value: "240".into(),
                unit: "mg/dL".into(),
                normal_range: "<200".into(),
            }],
        }
    }

    #[test]
    fn test_missing_key_skips_request() {
        let analyzer = GeminiAnalyzer::new(AnalysisConfig::default()).unwrap();
        let err = analyzer.analyze(&request()).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingApiKey));
    }

    #[test]
    fn test_generate_url() {
        let config = AnalysisConfig {
            endpoint: "http://localhost:9000/v1beta".into(),
            ..AnalysisConfig::default()
        };
        let analyzer = GeminiAnalyzer::new(config).unwrap();
        assert_eq!(
            analyzer.generate_url(),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig { thinking_budget: 0 },
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(json["generationConfig"]["thinkingConfig"]["thinkingBudget"], 0);
    }

    #[test]
    fn test_extract_text() {
        let json = r#"{"candidates":[{"content":{"parts":[{"text":"ملخص "},{"text":"النتائج"}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(&parsed), Some("ملخص النتائج".into()));
    }

    #[test]
    fn test_extract_text_empty() {
        let parsed: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(extract_text(&parsed), None);

        let json = r#"{"candidates":[{"content":{"parts":[{"text":"  "}]}}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(extract_text(&parsed), None);
    }
}
