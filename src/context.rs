use crate::config::script::Script;
use crate::models::chat::Conversation;

/// Behavioral preamble for the interviewer role. Kept free of any
/// per-request or time-dependent data so assembled payloads stay
/// deterministic for a given history and script.
const PREAMBLE: &str = "You are a virtual interviewer assistant conducting a structured interview.\n\
Rules:\n\
- The script below is the only source of questions you may ask. Do not invent questions outside of it.\n\
- Do not answer the questions yourself.\n\
- Ask exactly one question per turn, in a conversational manner.\n\
- Use follow-up questions only if they exist in the script.\n\
- Wait for the user's reply before advancing to the next question.\n\
- When all questions are finished, summarize the answers and give closing suggestions.\n\
Response style: format output in Markdown, using headings, bold and bullet points where helpful.";

/// Renders the conversation as a linear transcript, one line per turn in
/// insertion order: `"{sender}: {text}"`. Never reordered, deduplicated
/// or truncated.
pub fn render_transcript(conversation: &Conversation) -> String {
    conversation.messages
        .iter()
        .map(|msg| format!("{}: {}", msg.sender, msg.text))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Assembles the full context payload for one completion call: preamble,
/// transcript of every prior turn, and the verbatim script text. The full
/// history is embedded on every call; bounding the window is a deliberate
/// non-feature here.
pub fn assemble_context(script: &Script, conversation: &Conversation) -> String {
    let transcript = render_transcript(conversation);

    let mut payload = String::new();
    payload.push_str(PREAMBLE);
    payload.push_str("\n\nConversation so far:\n");
    if transcript.is_empty() {
        payload.push_str("(none)\n");
    } else {
        payload.push_str(&transcript);
        payload.push('\n');
    }
    payload.push_str(&format!("\nScript '{}':\n{}\n", script.name, script.content));
    if transcript.is_empty() {
        payload.push_str("\nBegin the interview by asking the first question from the script.");
    }
    payload
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::chat::{ ChatMessage, Sender };

    fn script() -> Script {
        Script {
            name: "cardio".to_string(),
            content: "1. Chest Pain - Have you had any pain in your chest?".to_string(),
        }
    }

    fn conversation_with(turns: &[(Sender, &str)]) -> Conversation {
        Conversation {
            id: "c1".to_string(),
            messages: turns
                .iter()
                .map(|(sender, text)| ChatMessage {
                    sender: *sender,
                    text: text.to_string(),
                    timestamp: 1_700_000_000,
                })
                .collect(),
        }
    }

    #[test]
    fn transcript_renders_turns_in_order() {
        let conversation = conversation_with(
            &[
                (Sender::User, "hello"),
                (Sender::Bot, "Hi there"),
                (Sender::User, "how are you"),
            ]
        );
        assert_eq!(render_transcript(&conversation), "user: hello\nbot: Hi there\nuser: how are you");
    }

    #[test]
    fn payload_is_deterministic_for_identical_inputs() {
        let conversation = conversation_with(&[(Sender::User, "hello"), (Sender::Bot, "Hi there")]);
        let first = assemble_context(&script(), &conversation);
        let second = assemble_context(&script(), &conversation);
        assert_eq!(first, second);
    }

    #[test]
    fn payload_embeds_script_and_history() {
        let conversation = conversation_with(&[(Sender::User, "hello"), (Sender::Bot, "Hi there")]);
        let payload = assemble_context(&script(), &conversation);
        assert!(payload.contains("user: hello"));
        assert!(payload.contains("bot: Hi there"));
        assert!(payload.contains("Have you had any pain in your chest?"));
        assert!(!payload.contains("Begin the interview"));
    }

    #[test]
    fn empty_history_instructs_first_question() {
        let payload = assemble_context(&script(), &Conversation::empty("c1"));
        assert!(payload.contains("Begin the interview by asking the first question"));
        assert!(payload.contains("Conversation so far:\n(none)"));
    }
}
