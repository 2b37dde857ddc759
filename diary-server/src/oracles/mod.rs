//! External model collaborators
//!
//! Every non-trivial computation (captioning, emotion classification,
//! text generation, embedding) is delegated to a pretrained model
//! behind a narrow capability trait, so the session state machine can
//! be exercised with deterministic fakes instead of live models.

pub mod classifier;
pub mod gemini;

pub use classifier::{EmbeddingClient, EmotionClassifierClient};
pub use gemini::GeminiClient;

use async_trait::async_trait;
use diary_common::Emotion;
use thiserror::Error;

/// Oracle call errors
///
/// All four collaborators are network services with the same failure
/// modes, so they share one error enum.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Empty response from model")]
    EmptyResponse,
}

/// Describes an image as free text
#[async_trait]
pub trait CaptionOracle: Send + Sync {
    /// Caption a JPEG image supplied as base64
    async fn caption(&self, image_jpeg_base64: &str) -> Result<String, OracleError>;
}

/// Classifies text into the closed emotion label set
#[async_trait]
pub trait EmotionOracle: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Emotion, OracleError>;
}

/// Produces free text from a prompt
#[async_trait]
pub trait TextGenerationOracle: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, OracleError>;
}

/// Maps text to a fixed-length numeric vector
#[async_trait]
pub trait EmbeddingOracle: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, OracleError>;
}
