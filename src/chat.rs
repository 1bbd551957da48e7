//! Vet chat assistant: per-session conversation state and reply formatting.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::models::{ChatRole, ChatTurn};
use crate::ui::rich_text;

/// Messages (user and assistant) sent back as context with each question.
pub const HISTORY_LIMIT: usize = 10;
const TRANSCRIPT_LIMIT: usize = 100;

pub const CONNECTION_APOLOGY: &str =
    "I apologize, but I'm having trouble connecting right now. Please try again in a moment.";

#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptEntry {
    pub role: ChatRole,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    history: VecDeque<ChatTurn>,
    transcript: VecDeque<TranscriptEntry>,
}

impl Conversation {
    /// Context for the next request, oldest first.
    pub fn history(&self) -> Vec<ChatTurn> {
        self.history.iter().cloned().collect()
    }

    pub fn transcript(&self) -> impl Iterator<Item = &TranscriptEntry> {
        self.transcript.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.transcript.is_empty()
    }

    /// A completed exchange enters both the history and the transcript.
    pub fn record_exchange(&mut self, question: &str, answer: &str) {
        for (role, content) in [(ChatRole::User, question), (ChatRole::Assistant, answer)] {
            self.history.push_back(ChatTurn {
                role,
                content: content.to_string(),
            });
            self.push_transcript(role, content);
        }
        while self.history.len() > HISTORY_LIMIT {
            self.history.pop_front();
        }
    }

    /// A failed exchange is shown but never sent back as context.
    pub fn record_failure(&mut self, question: &str) {
        self.push_transcript(ChatRole::User, question);
        self.push_transcript(ChatRole::Assistant, CONNECTION_APOLOGY);
    }

    fn push_transcript(&mut self, role: ChatRole, text: &str) {
        self.transcript.push_back(TranscriptEntry {
            role,
            text: text.to_string(),
        });
        while self.transcript.len() > TRANSCRIPT_LIMIT {
            self.transcript.pop_front();
        }
    }
}

/// Conversations kept at once; the least recently used one goes first.
pub const SESSION_LIMIT: usize = 1000;

#[derive(Debug, Default)]
struct Entry {
    conversation: Conversation,
    last_used: u64,
}

#[derive(Debug, Default)]
struct Table {
    entries: HashMap<String, Entry>,
    clock: u64,
}

impl Table {
    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn evict_past(&mut self, limit: usize) {
        while self.entries.len() > limit {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(key, _)| key.clone())
            else {
                return;
            };
            self.entries.remove(&oldest);
            debug!(evicted = %oldest, "chat session table full");
        }
    }
}

/// Conversations keyed by session, bounded to `limit` entries.
#[derive(Debug, Clone)]
pub struct ChatSessions {
    inner: Arc<Mutex<Table>>,
    limit: usize,
}

impl Default for ChatSessions {
    fn default() -> Self {
        Self::with_limit(SESSION_LIMIT)
    }
}

impl ChatSessions {
    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: Arc::default(),
            limit: limit.max(1),
        }
    }

    pub async fn snapshot(&self, key: &str) -> Conversation {
        let mut table = self.inner.lock().await;
        let now = table.tick();
        match table.entries.get_mut(key) {
            Some(entry) => {
                entry.last_used = now;
                entry.conversation.clone()
            }
            None => Conversation::default(),
        }
    }

    pub async fn update(&self, key: &str, apply: impl FnOnce(&mut Conversation)) {
        let mut table = self.inner.lock().await;
        let now = table.tick();
        let entry = table.entries.entry(key.to_string()).or_default();
        entry.last_used = now;
        apply(&mut entry.conversation);
        table.evict_past(self.limit);
    }

    pub async fn clear(&self, key: &str) {
        self.inner.lock().await.entries.remove(key);
    }

    pub async fn session_count(&self) -> usize {
        self.inner.lock().await.entries.len()
    }
}

/// Replies become HTML: blank-line paragraphs, `**bold**` and `- ` bullet lists.
/// The text is escaped before any markup is added.
pub fn format_reply(message: &str) -> String {
    let mut html = String::new();
    for para in message.split("\n\n").map(str::trim).filter(|para| !para.is_empty()) {
        let para = rich_text(para);
        if !(para.starts_with("- ") || para.contains("\n- ")) {
            html.push_str(&format!("<p>{para}</p>"));
            continue;
        }
        let mut in_list = false;
        for line in para.lines().map(str::trim).filter(|line| !line.is_empty()) {
            match line.strip_prefix("- ") {
                Some(item) => {
                    if !in_list {
                        html.push_str("<ul>");
                        in_list = true;
                    }
                    html.push_str(&format!("<li>{item}</li>"));
                }
                None => {
                    if in_list {
                        html.push_str("</ul>");
                        in_list = false;
                    }
                    html.push_str(&format!("<p>{line}</p>"));
                }
            }
        }
        if in_list {
            html.push_str("</ul>");
        }
    }
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_keeps_last_ten_messages() {
        let mut conversation = Conversation::default();
        for i in 0..7 {
            conversation.record_exchange(&format!("q{i}"), &format!("a{i}"));
        }
        let history = conversation.history();
        assert_eq!(history.len(), HISTORY_LIMIT);
        assert_eq!(history[0].content, "q2");
        assert_eq!(history[0].role, ChatRole::User);
        assert_eq!(history[9].content, "a6");
        assert_eq!(conversation.transcript().count(), 14);
    }

    #[test]
    fn failures_stay_out_of_history() {
        let mut conversation = Conversation::default();
        conversation.record_failure("hello?");
        assert!(conversation.history().is_empty());
        let last = conversation.transcript().last().unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.text, CONNECTION_APOLOGY);
    }

    #[test]
    fn format_reply_handles_bold_paragraphs_and_lists() {
        let html = format_reply("**Watch** for vomiting.\n\nSigns:\n- lethargy\n- no appetite\n\n");
        assert_eq!(
            html,
            "<p><strong>Watch</strong> for vomiting.</p><p>Signs:</p><ul><li>lethargy</li><li>no appetite</li></ul>"
        );
    }

    #[test]
    fn format_reply_escapes_markup() {
        assert_eq!(format_reply("<script>x</script>"), "<p>&lt;script&gt;x&lt;/script&gt;</p>");
    }

    #[tokio::test]
    async fn sessions_are_isolated_and_clearable() {
        let sessions = ChatSessions::default();
        sessions.update("a", |c| c.record_exchange("hi", "hello")).await;
        assert!(sessions.snapshot("b").await.is_empty());
        assert!(!sessions.snapshot("a").await.is_empty());
        sessions.clear("a").await;
        assert!(sessions.snapshot("a").await.is_empty());
    }

    #[test]
    fn list_lines_after_bullets_start_a_new_paragraph() {
        assert_eq!(
            format_reply("- rest\n- water\nCall your vet if it persists."),
            "<ul><li>rest</li><li>water</li></ul><p>Call your vet if it persists.</p>"
        );
    }

    #[tokio::test]
    async fn sessions_evict_least_recently_used_past_limit() {
        let sessions = ChatSessions::with_limit(2);
        sessions.update("token:a", |c| c.record_exchange("q", "a")).await;
        sessions.update("token:b", |c| c.record_exchange("q", "b")).await;
        // Reading "a" makes "b" the oldest.
        assert!(!sessions.snapshot("token:a").await.is_empty());
        sessions.update("token:c", |c| c.record_exchange("q", "c")).await;

        assert_eq!(sessions.session_count().await, 2);
        assert!(!sessions.snapshot("token:a").await.is_empty());
        assert!(sessions.snapshot("token:b").await.is_empty());
        assert!(!sessions.snapshot("token:c").await.is_empty());
    }

    #[tokio::test]
    async fn reading_an_unknown_session_does_not_store_it() {
        let sessions = ChatSessions::default();
        assert!(sessions.snapshot("token:nobody").await.is_empty());
        assert_eq!(sessions.session_count().await, 0);
    }
}
