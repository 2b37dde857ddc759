//! Diary workflow orchestration
//!
//! Each operation checks the session's precondition, performs its
//! oracle calls with nothing committed, and only commits the session
//! mutation once every call has succeeded. A failed oracle call
//! therefore leaves the session exactly as it was.

use diary_common::Emotion;
use std::sync::Arc;
use thiserror::Error;

use crate::catalog::{Recommendation, SongCatalog};
use crate::oracles::{
    CaptionOracle, EmbeddingOracle, EmotionOracle, OracleError, TextGenerationOracle,
};
use crate::prompts;
use crate::session::{ConversationSession, SequenceError};

/// Workflow errors: either the caller skipped a step, or a collaborator failed
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Sequence(#[from] SequenceError),

    #[error(transparent)]
    Oracle(#[from] OracleError),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// Stateless orchestrator over the four oracles and the song catalog
pub struct DiaryService {
    caption_oracle: Arc<dyn CaptionOracle>,
    emotion_oracle: Arc<dyn EmotionOracle>,
    generation_oracle: Arc<dyn TextGenerationOracle>,
    embedding_oracle: Arc<dyn EmbeddingOracle>,
    catalog: Arc<SongCatalog>,
}

impl DiaryService {
    pub fn new(
        caption_oracle: Arc<dyn CaptionOracle>,
        emotion_oracle: Arc<dyn EmotionOracle>,
        generation_oracle: Arc<dyn TextGenerationOracle>,
        embedding_oracle: Arc<dyn EmbeddingOracle>,
        catalog: Arc<SongCatalog>,
    ) -> Self {
        Self {
            caption_oracle,
            emotion_oracle,
            generation_oracle,
            embedding_oracle,
            catalog,
        }
    }

    /// Caption the uploaded photo
    ///
    /// Captioning reads no session state, so the caller resolves or
    /// creates the session and records the caption only after this
    /// succeeds. A failed oracle call therefore never strands a
    /// freshly minted session.
    pub async fn caption_image(&self, image_jpeg_base64: &str) -> ServiceResult<String> {
        let caption = self.caption_oracle.caption(image_jpeg_base64).await?;
        Ok(caption)
    }

    /// Generate the opening question from the stored caption
    pub async fn first_question(
        &self,
        session: &mut ConversationSession,
    ) -> ServiceResult<String> {
        session.ensure_captioned()?;

        let prompt = prompts::first_question(session.caption());
        let question = self.generation_oracle.generate(&prompt).await?;
        session.record_first_question(question.clone());

        Ok(question)
    }

    /// Process one user answer: classify its emotion, then generate the
    /// follow-up question. Committed as a single exchange only after
    /// both oracle calls succeed.
    pub async fn answer(
        &self,
        session: &mut ConversationSession,
        user_text: &str,
    ) -> ServiceResult<(Emotion, String)> {
        session.ensure_questioning()?;

        let emotion = self.emotion_oracle.classify(user_text).await?;

        // History for the prompt includes the not-yet-committed answer.
        let mut history = session.history_text();
        history.push_str(&format!("\nUser: {}", user_text.trim()));

        let prompt = prompts::followup_question(session.caption(), emotion, &history);
        let followup = self.generation_oracle.generate(&prompt).await?;

        session.record_exchange(user_text.to_string(), emotion, followup.clone());

        tracing::info!(
            client_id = %session.client_id(),
            emotion = %emotion,
            turns = session.turn_count(),
            "Exchange recorded"
        );

        Ok((emotion, followup))
    }

    /// Summarize the conversation into a diary draft and classify its
    /// overall emotion
    pub async fn summarize(
        &self,
        session: &mut ConversationSession,
    ) -> ServiceResult<(String, Emotion)> {
        session.ensure_has_conversation()?;

        let prompt = prompts::diary_draft(&session.history_text());
        let draft = self.generation_oracle.generate(&prompt).await?;
        let emotion = self.emotion_oracle.classify(&draft).await?;

        session.record_summary(draft.clone(), emotion);

        tracing::info!(
            client_id = %session.client_id(),
            final_emotion = %emotion,
            "Conversation summarized"
        );

        Ok((draft, emotion))
    }

    /// Rewrite the draft with the user's requested changes
    pub async fn revise(
        &self,
        session: &mut ConversationSession,
        user_changes: &str,
    ) -> ServiceResult<(String, Emotion)> {
        session.ensure_has_draft()?;

        let prompt = prompts::revision(session.diary_draft(), user_changes);
        let draft = self.generation_oracle.generate(&prompt).await?;
        let emotion = self.emotion_oracle.classify(&draft).await?;

        session.record_revision(draft.clone(), emotion);

        Ok((draft, emotion))
    }

    /// Recommend the catalog song closest to the current draft
    ///
    /// `None` means no catalog row carries the diary's emotion — a
    /// normal outcome, not a failure.
    pub async fn recommend_song(
        &self,
        session: &ConversationSession,
    ) -> ServiceResult<Option<Recommendation>> {
        session.ensure_has_draft()?;
        let emotion = session
            .latest_emotion()
            .ok_or(SequenceError::DraftMissing)?;

        let embedding = self.embedding_oracle.embed(session.diary_draft()).await?;
        let recommendation = self.catalog.recommend(&embedding, emotion);

        match &recommendation {
            Some(rec) => tracing::info!(
                client_id = %session.client_id(),
                title = %rec.title,
                similarity = rec.similarity,
                "Song recommended"
            ),
            None => tracing::info!(
                client_id = %session.client_id(),
                emotion = %emotion,
                "No catalog song matches the diary emotion"
            ),
        }

        Ok(recommendation)
    }
}
