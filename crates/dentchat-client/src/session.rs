//! Conversation session state and the submission state machine.

use crate::message::Message;

/// Per-session settings. Injected so tests and alternate deployments can
/// swap the prompt and copy without touching module globals.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// System instruction sent with every relay request.
    pub system_prompt: String,
    /// Bot message seeded as the first history entry.
    pub greeting: String,
    /// Shown to the user when a submission fails for any reason.
    pub failure_notice: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            system_prompt: DENTAL_SYSTEM_PROMPT.to_string(),
            greeting: GREETING.to_string(),
            failure_notice: FAILURE_NOTICE.to_string(),
        }
    }
}

const DENTAL_SYSTEM_PROMPT: &str = "\
You are a dental assistant bot. You MUST:
1. ONLY answer questions related to dentistry, dental procedures, and oral health
2. If a question is not related to dentistry, respond: \"Извините, я могу отвечать только на вопросы, связанные со стоматологией.\"
3. Never engage in general conversation or other medical topics
4. Always provide dental-specific information in Russian
5. Always include a reminder that this is for information only and the patient should consult a dentist for specific medical advice
6. Use emojis occasionally to make responses more engaging
7. Be concise but informative
8. Structure complex answers with bullet points for better readability";

const GREETING: &str = "Здравствуйте! 🦷 Я стоматологический ассистент. Задайте мне \
вопрос о стоматологии, и я постараюсь помочь. Помните, что мои ответы носят \
информационный характер и не заменяют консультацию врача.";

const FAILURE_NOTICE: &str =
    "Произошла ошибка при получении ответа. Пожалуйста, попробуйте позже.";

/// Where the session is in its submission cycle. Modeled as an explicit
/// state value so a double submission has no representable effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Idle,
    Awaiting,
}

/// Conversation state: history, input draft, and submission phase.
///
/// The history is append-only and always starts with the greeting. Exactly
/// one request may be outstanding; while it is, `submit` refuses new input.
#[derive(Debug)]
pub struct ChatSession {
    messages: Vec<Message>,
    draft: String,
    phase: Phase,
    failure_notice: String,
}

impl ChatSession {
    pub fn new(config: &ChatConfig) -> Self {
        Self {
            messages: vec![Message::bot(config.greeting.clone())],
            draft: String::new(),
            phase: Phase::Idle,
            failure_notice: config.failure_notice.clone(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn draft(&self) -> &str {
        &self.draft
    }

    pub fn set_draft(&mut self, draft: impl Into<String>) {
        self.draft = draft.into();
    }

    /// True strictly between an accepted submission and its settling.
    pub fn is_loading(&self) -> bool {
        self.phase == Phase::Awaiting
    }

    /// Try to submit the current draft.
    ///
    /// A whitespace-only draft is a no-op, as is submitting while a request
    /// is already in flight. On acceptance the trimmed text is appended as a
    /// user message, the draft is cleared, and the text to send is returned.
    pub fn submit(&mut self) -> Option<String> {
        if self.phase == Phase::Awaiting {
            return None;
        }
        let text = self.draft.trim();
        if text.is_empty() {
            return None;
        }
        let text = text.to_string();
        self.messages.push(Message::user(text.clone()));
        self.draft.clear();
        self.phase = Phase::Awaiting;
        Some(text)
    }

    /// Settle the in-flight submission: append the bot's reply, or the
    /// configured failure notice if anything went wrong, and go idle again.
    /// Settling an idle session does nothing.
    pub fn settle<E>(&mut self, outcome: Result<String, E>) {
        if self.phase != Phase::Awaiting {
            return;
        }
        match outcome {
            Ok(reply) => self.messages.push(Message::bot(reply)),
            Err(_) => self.messages.push(Message::error(self.failure_notice.clone())),
        }
        self.phase = Phase::Idle;
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;

    fn session() -> ChatSession {
        ChatSession::new(&ChatConfig::default())
    }

    #[test]
    fn test_new_session_starts_with_greeting() {
        let session = session();
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].kind, MessageKind::Bot);
        assert!(session.messages()[0].content.starts_with("Здравствуйте!"));
        assert!(!session.is_loading());
    }

    #[test]
    fn test_submit_appends_trimmed_user_message_and_clears_draft() {
        let mut session = session();
        session.set_draft("  болит зуб  ");

        let sent = session.submit();

        assert_eq!(sent.as_deref(), Some("болит зуб"));
        assert_eq!(session.messages().len(), 2);
        assert_eq!(session.messages()[1], Message::user("болит зуб"));
        assert_eq!(session.draft(), "");
        assert!(session.is_loading());
    }

    #[test]
    fn test_whitespace_only_draft_is_a_no_op() {
        let mut session = session();
        session.set_draft("   \t  ");

        assert_eq!(session.submit(), None);
        assert_eq!(session.messages().len(), 1);
        assert!(!session.is_loading());
        // The draft is kept; only an accepted submission clears it.
        assert_eq!(session.draft(), "   \t  ");
    }

    #[test]
    fn test_second_submit_while_loading_appends_nothing() {
        let mut session = session();
        session.set_draft("first");
        assert!(session.submit().is_some());

        session.set_draft("second");
        assert_eq!(session.submit(), None);
        assert_eq!(session.messages().len(), 2);
        assert!(session.is_loading());
    }

    #[test]
    fn test_settle_ok_appends_bot_message_and_goes_idle() {
        let mut session = session();
        session.set_draft("вопрос");
        session.submit().unwrap();

        session.settle(Ok::<_, ()>("Чистите зубы дважды в день.".to_string()));

        assert_eq!(session.messages().len(), 3);
        assert_eq!(
            session.messages()[2],
            Message::bot("Чистите зубы дважды в день.")
        );
        assert!(!session.is_loading());
    }

    #[test]
    fn test_settle_err_appends_failure_notice_and_goes_idle() {
        let mut session = session();
        session.set_draft("вопрос");
        session.submit().unwrap();

        session.settle(Err::<String, _>("boom"));

        assert_eq!(session.messages().len(), 3);
        assert_eq!(session.messages()[2].kind, MessageKind::Error);
        assert_eq!(
            session.messages()[2].content,
            "Произошла ошибка при получении ответа. Пожалуйста, попробуйте позже."
        );
        assert!(!session.is_loading());
    }

    #[test]
    fn test_settle_while_idle_is_a_no_op() {
        let mut session = session();
        session.settle(Ok::<_, ()>("stray reply".to_string()));
        assert_eq!(session.messages().len(), 1);
    }

    #[test]
    fn test_session_survives_failures_and_keeps_order() {
        let mut session = session();

        session.set_draft("раз");
        session.submit().unwrap();
        session.settle(Err::<String, _>("down"));

        session.set_draft("два");
        session.submit().unwrap();
        session.settle(Ok::<_, ()>("ответ".to_string()));

        let kinds: Vec<_> = session.messages().iter().map(|m| m.kind).collect();
        assert_eq!(
            kinds,
            vec![
                MessageKind::Bot, // greeting, still first
                MessageKind::User,
                MessageKind::Error,
                MessageKind::User,
                MessageKind::Bot,
            ]
        );
    }

    #[test]
    fn test_custom_config_is_injected() {
        let config = ChatConfig {
            system_prompt: "test prompt".to_string(),
            greeting: "hello".to_string(),
            failure_notice: "failed".to_string(),
        };
        let mut session = ChatSession::new(&config);
        assert_eq!(session.messages()[0], Message::bot("hello"));

        session.set_draft("q");
        session.submit().unwrap();
        session.settle(Err::<String, _>(()));
        assert_eq!(session.messages()[2], Message::error("failed"));
    }
}
