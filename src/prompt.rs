//! Review prompt template.
//!
//! The model is asked, in Russian, to act as a professional reviewer: open
//! with a compliment, then criticise the merge request without holding back
//! (spelling included) while ranking code defects first, and answer in
//! Markdown ready to paste into a GitLab merge request comment.

use crate::models::ChatMessage;

const PROMPT_HEAD: &str = "Ты — профессиональный ревьюер кода.
Проанализируй следующий diff:

";

const PROMPT_TAIL: &str = "

Выдай подробные замечания и рекомендации. Начни с комплемента разработчику за его работу, а потом выдай всю правду о его мерж реквесте, без стеснения, докапывайся даже до орфографических ошибок, но помни что приоритет номер 1 - ошибки в коде.  Ответ на русском, с красивой Markdown-разметкой для публикации в GitLab Merge Request: с заголовками, списками, примерами кода.";

/// Render the prompt with `diff` inserted verbatim.
pub fn render_review_prompt(diff: &str) -> String {
    let mut prompt = String::with_capacity(PROMPT_HEAD.len() + diff.len() + PROMPT_TAIL.len());
    prompt.push_str(PROMPT_HEAD);
    prompt.push_str(diff);
    prompt.push_str(PROMPT_TAIL);
    prompt
}

/// Build the single-message conversation sent upstream.
pub fn build_messages(diff: &str) -> Vec<ChatMessage> {
    vec![ChatMessage::user(render_review_prompt(diff))]
}
