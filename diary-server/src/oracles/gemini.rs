//! Gemini generateContent API client
//!
//! One client serves two capabilities: free-text generation from a
//! prompt, and image captioning via an inline base64 JPEG part.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

use super::{CaptionOracle, OracleError, TextGenerationOracle};

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const CAPTION_PROMPT: &str =
    "Describe this photo in detail. Provide a clear, descriptive caption of the \
     scene, the people or objects in it, and the overall mood.";

/// generateContent response (only the fields we read)
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Gemini API client
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String) -> Result<Self, OracleError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| OracleError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            model,
        })
    }

    /// POST a generateContent request with the given parts
    async fn generate_content(&self, parts: Vec<Value>) -> Result<String, OracleError> {
        let url = format!(
            "{}/{}:generateContent?key={}",
            GEMINI_BASE_URL, self.model, self.api_key
        );

        let payload = json!({
            "contents": [{
                "parts": parts
            }]
        });

        tracing::debug!(model = %self.model, "Querying Gemini generateContent");

        let response = self
            .http_client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OracleError::Api(status.as_u16(), error_text));
        }

        let body: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(e.to_string()))?;

        let text = body
            .candidates
            .and_then(|mut c| c.drain(..).next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| p.drain(..).next())
            .and_then(|p| p.text)
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or(OracleError::EmptyResponse)?;

        Ok(text)
    }
}

#[async_trait]
impl TextGenerationOracle for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError> {
        let text = self.generate_content(vec![json!({ "text": prompt })]).await?;

        tracing::info!(
            model = %self.model,
            response_chars = text.len(),
            "Gemini generation completed"
        );

        Ok(text)
    }
}

#[async_trait]
impl CaptionOracle for GeminiClient {
    async fn caption(&self, image_jpeg_base64: &str) -> Result<String, OracleError> {
        let parts = vec![
            json!({ "text": CAPTION_PROMPT }),
            json!({
                "inline_data": {
                    "mime_type": "image/jpeg",
                    "data": image_jpeg_base64
                }
            }),
        ];

        let caption = self.generate_content(parts).await?;

        tracing::info!(model = %self.model, caption = %caption, "Image captioned");

        Ok(caption)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = GeminiClient::new("test-key".to_string(), "gemini-2.0-flash".to_string());
        assert!(client.is_ok());
    }

    #[test]
    fn test_response_text_extraction() {
        let json_str = r#"{
            "candidates": [{
                "content": {
                    "parts": [{"text": "  A dog running on a beach.  "}]
                }
            }]
        }"#;

        let body: GenerateContentResponse = serde_json::from_str(json_str).unwrap();
        let text = body
            .candidates
            .and_then(|mut c| c.drain(..).next())
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| p.drain(..).next())
            .and_then(|p| p.text)
            .unwrap();
        assert_eq!(text.trim(), "A dog running on a beach.");
    }

    #[test]
    fn test_empty_candidates_parse() {
        let body: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(body.candidates.is_none());
    }
}
