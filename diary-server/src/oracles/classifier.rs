//! Emotion classification and embedding service clients
//!
//! Both models run as local sidecar services (a fine-tuned KoBERT
//! classifier and an E5 embedder) exposing one JSON endpoint each.

use async_trait::async_trait;
use diary_common::Emotion;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{EmbeddingOracle, EmotionOracle, OracleError};

#[derive(Debug, Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    emotion: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

fn build_http_client() -> Result<reqwest::Client, OracleError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| OracleError::Network(e.to_string()))
}

/// Client for the emotion classification sidecar
pub struct EmotionClassifierClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl EmotionClassifierClient {
    pub fn new(base_url: String) -> Result<Self, OracleError> {
        Ok(Self {
            http_client: build_http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl EmotionOracle for EmotionClassifierClient {
    async fn classify(&self, text: &str) -> Result<Emotion, OracleError> {
        let url = format!("{}/classify_emotion", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&TextRequest { text })
            .send()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OracleError::Api(status.as_u16(), error_text));
        }

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(e.to_string()))?;

        let emotion: Emotion = body
            .emotion
            .parse()
            .map_err(|e: diary_common::Error| OracleError::Parse(e.to_string()))?;

        tracing::debug!(emotion = %emotion, text_chars = text.len(), "Text classified");

        Ok(emotion)
    }
}

/// Client for the text embedding sidecar
pub struct EmbeddingClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl EmbeddingClient {
    pub fn new(base_url: String) -> Result<Self, OracleError> {
        Ok(Self {
            http_client: build_http_client()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl EmbeddingOracle for EmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError> {
        let url = format!("{}/embed", self.base_url);

        let response = self
            .http_client
            .post(&url)
            .json(&TextRequest { text })
            .send()
            .await
            .map_err(|e| OracleError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OracleError::Api(status.as_u16(), error_text));
        }

        let body: EmbedResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(e.to_string()))?;

        if body.embedding.is_empty() {
            return Err(OracleError::EmptyResponse);
        }

        tracing::debug!(dimensions = body.embedding.len(), "Text embedded");

        Ok(body.embedding)
    }
}
