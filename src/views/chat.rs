use crate::chat::{format_reply, Conversation};
use crate::models::{ChatRole, User};
use crate::ui::{self, escape, Nav};

const WELCOME: &str = "Hi! I'm your AI vet assistant. Ask me anything about your pets' health, diet, behavior or care.";

#[derive(Debug, Clone, Default)]
pub struct ChatPage {
    pub conversation: Conversation,
    pub pet_count: usize,
    pub include_pet_context: bool,
    pub error: Option<String>,
}

impl ChatPage {
    pub fn render(&self, user: Option<&User>) -> String {
        let mut messages = format!(r#"<div class="message assistant"><p>{WELCOME}</p></div>"#);
        for entry in self.conversation.transcript() {
            let (class, html) = match entry.role {
                ChatRole::User => ("user", format!("<p>{}</p>", escape(&entry.text))),
                ChatRole::Assistant => ("assistant", format_reply(&entry.text)),
            };
            messages.push_str(&format!(r#"<div class="message {class}">{html}</div>"#));
        }

        let context = if self.include_pet_context && self.pet_count > 0 {
            format!(
                "Answers take your {} pet{} into account.",
                self.pet_count,
                if self.pet_count == 1 { "" } else { "s" }
            )
        } else {
            "Pet context is off.".to_string()
        };

        let body = format!(
            r#"{header}
<section class="card form-grid">
  <div class="chat-log" id="chatMessages">{messages}</div>
  {error}
  <form class="chat-form" method="post" action="/chat">
    <input type="text" name="message" placeholder="Ask about symptoms, diet, behavior..." autocomplete="off" required autofocus />
    <button type="submit"><i class="fas fa-paper-plane"></i> Send</button>
  </form>
  <form method="post" action="/chat/clear"><button class="ghost small" type="submit"><i class="fas fa-broom"></i> Clear conversation</button></form>
  <p class="hint">{context} This assistant offers general guidance only. Contact your vet in an emergency.</p>
</section>"#,
            header = ui::page_header("Vet Chat", "AI-powered pet health assistant", ""),
            error = ui::inline_error(self.error.as_deref()),
            context = escape(&context),
        );
        ui::app_page("Vet Chat", Nav::Chat, user, &body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transcript_is_rendered_in_order() {
        let mut conversation = Conversation::default();
        conversation.record_exchange("Is <chocolate> bad?", "**Yes.** Keep it away.");
        let page = ChatPage {
            conversation,
            pet_count: 2,
            include_pet_context: true,
            error: None,
        };
        let html = page.render(None);
        let question = html.find("Is &lt;chocolate&gt; bad?").unwrap();
        let answer = html.find("<strong>Yes.</strong> Keep it away.").unwrap();
        assert!(question < answer);
        assert!(html.contains("your 2 pets"));
    }
}
