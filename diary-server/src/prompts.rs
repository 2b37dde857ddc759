//! Prompt templates for the generation oracle
//!
//! Four prompts drive the conversation: the opening question from the
//! photo caption, the follow-up question from the running history, the
//! diary draft from the full conversation, and the revision merge.

use diary_common::Emotion;

const ROLE_DESCRIPTION: &str = "You are a service that helps the user write a diary with ease. \
     The user wants to build a lasting journaling habit, so keep them \
     motivated to come back and write again tomorrow, not just once. \
     Use a warm, friendly, and empathetic tone.";

/// Opening question generated from the photo caption
pub fn first_question(caption: &str) -> String {
    format!(
        "Photo description: {caption}\n\
         Instructions: {ROLE_DESCRIPTION}\n\
         Based on the description of the photo the user took and uploaded, \
         mention a topic from the image worth writing a diary entry about, \
         and naturally pose one interesting, easy-to-answer question in a \
         single sentence."
    )
}

/// Follow-up question generated from the conversation so far
///
/// `history` is the rendered turn log including the user's newest
/// answer; `emotion` is the classification of that answer.
pub fn followup_question(caption: &str, emotion: Emotion, history: &str) -> String {
    format!(
        "Uploaded photo: \"{caption}\"\n\
         The user's current emotion: \"{emotion}\"\n\
         Conversation so far:\n\
         {history}\n\n\
         Instructions: {ROLE_DESCRIPTION}\n\
         Drawing on the above, ask exactly one follow-up question that \
         makes the diary entry more concrete or draws out an interesting \
         story. If the topic is repeating itself or seems uncomfortable \
         for the user, find a fresh topic in the photo description or the \
         conversation. Acknowledge the user's emotion and help them \
         explore it a little further. Keep your reply to two or three \
         sentences with at most one example."
    )
}

/// Diary draft generated from the full conversation
pub fn diary_draft(history: &str) -> String {
    format!(
        "Instructions: {ROLE_DESCRIPTION}\n\
         Based on the conversation below, write a diary draft that \
         clearly conveys the user's emotions and circumstances. Keep the \
         flow natural and the key moments intact, and include a warm, \
         hopeful sentence or two that makes the user want to keep writing \
         every day. Stay concise, add one or two lines of gentle \
         self-reflection, and end with a small resolution or a sense of \
         anticipation for tomorrow's entry.\n\n\
         Conversation:\n\
         {history}"
    )
}

/// Revision prompt merging the user's requested changes into the draft
pub fn revision(original_draft: &str, user_changes: &str) -> String {
    format!(
        "Instructions: {ROLE_DESCRIPTION}\n\
         Below is a diary draft:\n\
         ===\n\
         {original_draft}\n\
         ===\n\n\
         The user has requested the following changes:\n\
         ===\n\
         {user_changes}\n\
         ===\n\n\
         Keep the mood and tone of the draft, but the user's changes take \
         priority. As in the draft, include warm and hopeful sentences \
         that motivate daily journaling, and keep a small resolution or \
         sense of anticipation for the next entry. Apply the changes \
         faithfully and produce a final diary entry that reads naturally \
         from start to finish."
    )
}
