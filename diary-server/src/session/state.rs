//! Conversation session state machine
//!
//! One session per client, progressing through:
//! EMPTY → CAPTIONED → QUESTIONING → SUMMARIZED (⇄ revise) → SAVED
//!
//! The session holds state only; oracle calls live in the service
//! layer. Multi-field updates are exposed as single `record_*` methods
//! so a step either commits in full or not at all — the service
//! computes every oracle result first, then commits once.

use chrono::{DateTime, Utc};
use diary_common::Emotion;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use thiserror::Error;

/// Turn history bound; oldest entries are evicted first
const MAX_TURNS: usize = 20;

/// Conversation lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DiaryState {
    /// Fresh session, nothing recorded
    Empty,
    /// Photo captioned, conversation not started
    Captioned,
    /// Q&A loop in progress
    Questioning,
    /// Draft exists; revision keeps this state
    Summarized,
    /// Final diary stored
    Saved,
}

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    User,
    Assistant,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Speaker::User => f.write_str("User"),
            Speaker::Assistant => f.write_str("AI"),
        }
    }
}

/// One conversation turn
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: Speaker,
    pub text: String,
}

/// Precondition violation: a step was invoked out of order
///
/// Distinct from oracle failures so the client can tell a skipped step
/// apart from a downstream outage.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("No caption set; upload a photo and generate a caption first")]
    CaptionMissing,

    #[error("Conversation has not started; request the first question first")]
    ConversationMissing,

    #[error("No diary draft; summarize the conversation first")]
    DraftMissing,
}

/// Snapshot persisted when the user saves the diary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub conversation: Vec<String>,
    pub emotion_history: Vec<Emotion>,
    pub diary_summary: String,
    pub diary: String,
}

/// Full accumulated state of one client's diary conversation
#[derive(Debug, Clone)]
pub struct ConversationSession {
    client_id: String,
    state: DiaryState,
    caption: String,
    turns: VecDeque<Turn>,
    emotions: Vec<Emotion>,
    diary_draft: String,
    final_diary: String,
    created_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(client_id: String) -> Self {
        Self {
            client_id,
            state: DiaryState::Empty,
            caption: String::new(),
            turns: VecDeque::new(),
            emotions: Vec::new(),
            diary_draft: String::new(),
            final_diary: String::new(),
            created_at: Utc::now(),
        }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn state(&self) -> DiaryState {
        self.state
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    pub fn turn_count(&self) -> usize {
        self.turns.len()
    }

    pub fn emotions(&self) -> &[Emotion] {
        &self.emotions
    }

    /// Emotion of the most recent classified text
    pub fn latest_emotion(&self) -> Option<Emotion> {
        self.emotions.last().copied()
    }

    pub fn diary_draft(&self) -> &str {
        &self.diary_draft
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Render the turn log as prompt text, one `Speaker: text` line per turn
    pub fn history_text(&self) -> String {
        self.turns
            .iter()
            .map(|t| format!("{}: {}", t.speaker, t.text))
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ---- preconditions ----------------------------------------------------

    /// First question requires a caption
    pub fn ensure_captioned(&self) -> Result<(), SequenceError> {
        if self.caption.is_empty() {
            return Err(SequenceError::CaptionMissing);
        }
        Ok(())
    }

    /// Answering requires the Q&A loop to have started
    pub fn ensure_questioning(&self) -> Result<(), SequenceError> {
        match self.state {
            DiaryState::Empty | DiaryState::Captioned => Err(SequenceError::ConversationMissing),
            _ => Ok(()),
        }
    }

    /// Summarizing requires at least one recorded turn
    pub fn ensure_has_conversation(&self) -> Result<(), SequenceError> {
        if self.turns.is_empty() {
            return Err(SequenceError::ConversationMissing);
        }
        Ok(())
    }

    /// Revision and recommendation require a draft
    pub fn ensure_has_draft(&self) -> Result<(), SequenceError> {
        if self.diary_draft.is_empty() {
            return Err(SequenceError::DraftMissing);
        }
        Ok(())
    }

    // ---- commits ----------------------------------------------------------

    /// Store the photo caption, beginning a new round
    pub fn record_caption(&mut self, caption: String) {
        self.caption = caption;
        self.state = DiaryState::Captioned;
    }

    /// Record the opening assistant question
    pub fn record_first_question(&mut self, question: String) {
        self.push_turn(Speaker::Assistant, question);
        self.state = DiaryState::Questioning;
    }

    /// Commit one full Q&A exchange: the user's answer, its emotion,
    /// and the next assistant question, as a single step
    pub fn record_exchange(&mut self, user_text: String, emotion: Emotion, followup: String) {
        self.push_turn(Speaker::User, user_text);
        self.emotions.push(emotion);
        self.push_turn(Speaker::Assistant, followup);
    }

    /// Store the diary draft and the emotion classified from it
    pub fn record_summary(&mut self, draft: String, emotion: Emotion) {
        self.diary_draft = draft;
        self.emotions.push(emotion);
        self.state = DiaryState::Summarized;
    }

    /// Overwrite the draft with a revision; emotion history grows so the
    /// last entry always reflects the current draft
    pub fn record_revision(&mut self, draft: String, emotion: Emotion) {
        self.diary_draft = draft;
        self.emotions.push(emotion);
    }

    /// Store the user's final diary text and produce the snapshot to persist
    pub fn record_save(&mut self, final_text: String) -> SessionSnapshot {
        self.final_diary = final_text;
        self.state = DiaryState::Saved;
        self.snapshot()
    }

    /// Snapshot of the session in its persisted layout
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            conversation: self
                .turns
                .iter()
                .map(|t| format!("{}: {}", t.speaker, t.text))
                .collect(),
            emotion_history: self.emotions.clone(),
            diary_summary: self.diary_draft.clone(),
            diary: self.final_diary.clone(),
        }
    }

    fn push_turn(&mut self, speaker: Speaker, text: String) {
        self.turns.push_back(Turn {
            speaker,
            text: text.trim().to_string(),
        });
        while self.turns.len() > MAX_TURNS {
            self.turns.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn questioning_session() -> ConversationSession {
        let mut session = ConversationSession::new("c1".to_string());
        session.record_caption("a dog running on a beach".to_string());
        session.record_first_question("What is your dog's name?".to_string());
        session
    }

    #[test]
    fn test_fresh_session_is_empty() {
        let session = ConversationSession::new("c1".to_string());
        assert_eq!(session.state(), DiaryState::Empty);
        assert_eq!(session.turn_count(), 0);
        assert!(session.latest_emotion().is_none());
    }

    #[test]
    fn test_first_question_requires_caption() {
        let session = ConversationSession::new("c1".to_string());
        assert_eq!(
            session.ensure_captioned(),
            Err(SequenceError::CaptionMissing)
        );
    }

    #[test]
    fn test_first_question_records_one_assistant_turn() {
        let session = questioning_session();
        assert_eq!(session.state(), DiaryState::Questioning);
        assert_eq!(session.turn_count(), 1);
        let turn = session.turns().next().unwrap();
        assert_eq!(turn.speaker, Speaker::Assistant);
        assert!(!turn.text.is_empty());
    }

    #[test]
    fn test_answer_before_question_is_sequence_error() {
        let mut session = ConversationSession::new("c1".to_string());
        assert!(session.ensure_questioning().is_err());

        session.record_caption("caption".to_string());
        assert_eq!(
            session.ensure_questioning(),
            Err(SequenceError::ConversationMissing)
        );
    }

    #[test]
    fn test_exchange_adds_two_turns_and_one_emotion() {
        let mut session = questioning_session();
        session.record_exchange(
            "I felt great today".to_string(),
            Emotion::Happiness,
            "What made it so great?".to_string(),
        );

        // opening question + user answer + follow-up
        assert_eq!(session.turn_count(), 3);
        assert_eq!(session.emotions(), &[Emotion::Happiness]);
    }

    #[test]
    fn test_turns_bounded_to_twenty_most_recent() {
        let mut session = questioning_session();
        for i in 0..25 {
            session.record_exchange(
                format!("answer {i}"),
                Emotion::Neutral,
                format!("question {i}"),
            );
        }

        assert_eq!(session.turn_count(), MAX_TURNS);
        // Retained turns are the most recent, in original order.
        let texts: Vec<&str> = session.turns().map(|t| t.text.as_str()).collect();
        assert_eq!(texts.last().copied(), Some("question 24"));
        assert_eq!(texts.first().copied(), Some("answer 15"));
        // Emotion history is unbounded: one entry per exchange.
        assert_eq!(session.emotions().len(), 25);
    }

    #[test]
    fn test_summarize_requires_conversation() {
        let session = ConversationSession::new("c1".to_string());
        assert_eq!(
            session.ensure_has_conversation(),
            Err(SequenceError::ConversationMissing)
        );
    }

    #[test]
    fn test_summary_sets_final_emotion_last() {
        let mut session = questioning_session();
        session.record_exchange(
            "okay".to_string(),
            Emotion::Neutral,
            "and then?".to_string(),
        );
        session.record_summary("Dear diary...".to_string(), Emotion::Happiness);

        assert_eq!(session.state(), DiaryState::Summarized);
        assert_eq!(session.diary_draft(), "Dear diary...");
        assert_eq!(session.latest_emotion(), Some(Emotion::Happiness));
    }

    #[test]
    fn test_revision_overwrites_draft_and_appends_emotion() {
        let mut session = questioning_session();
        session.record_summary("v1".to_string(), Emotion::Neutral);

        for i in 0..3 {
            session.record_revision(format!("v{}", i + 2), Emotion::Sadness);
        }

        assert_eq!(session.diary_draft(), "v4");
        assert_eq!(session.state(), DiaryState::Summarized);
        // one summary emotion + three revision emotions
        assert_eq!(session.emotions().len(), 4);
        assert_eq!(session.latest_emotion(), Some(Emotion::Sadness));
    }

    #[test]
    fn test_recommendation_requires_draft() {
        let session = questioning_session();
        assert_eq!(session.ensure_has_draft(), Err(SequenceError::DraftMissing));
    }

    #[test]
    fn test_save_snapshot_layout() {
        let mut session = questioning_session();
        session.record_exchange("fine".to_string(), Emotion::Neutral, "more?".to_string());
        session.record_summary("draft text".to_string(), Emotion::Neutral);

        let snapshot = session.record_save("final text".to_string());
        assert_eq!(session.state(), DiaryState::Saved);
        assert_eq!(snapshot.diary, "final text");
        assert_eq!(snapshot.diary_summary, "draft text");
        assert_eq!(snapshot.conversation.len(), 3);
        assert!(snapshot.conversation[0].starts_with("AI: "));
        assert!(snapshot.conversation[1].starts_with("User: "));
        assert_eq!(snapshot.emotion_history.len(), 2);
    }
}
