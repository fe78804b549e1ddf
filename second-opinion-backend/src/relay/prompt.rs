//! Prompt assembly for the second-opinion request.

use crate::llm::ChatMessage;
use second_opinion_types::MedicalDetail;

pub const SYSTEM_PROMPT: &str = "You are the world's most knowledgeable and insightful doctor. \
Based on the provided medical details, provide a possible diagnosis and recommendations. \
Do not use markdown formatting in your response.";

pub const USER_PREAMBLE: &str = "Please analyze these medical details and provide a brief diagnosis:";

/// Separator between notes in the user message
pub const NOTE_SEPARATOR: &str = "\n\n";

/// Build the system + user messages for the given notes, in the order given.
/// An empty slice still yields both messages.
pub fn build_messages(details: &[MedicalDetail]) -> Vec<ChatMessage> {
    let combined = details
        .iter()
        .map(|d| d.details.as_str())
        .collect::<Vec<_>>()
        .join(NOTE_SEPARATOR);

    vec![
        ChatMessage::system(SYSTEM_PROMPT),
        ChatMessage::user(format!("{}\n\n{}", USER_PREAMBLE, combined)),
    ]
}
