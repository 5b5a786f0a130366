//! HTML pages for the browser routes.
//!
//! Templates are inline strings; every interpolated value goes through
//! [`escape_html`].

use std::fmt::Write;

use crate::conversations::{ConversationTurn, Role};
use crate::translate::languages::{Language, AUTO};

/// Everything the translate page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatePage {
    pub input_text: String,
    pub source_lang: String,
    pub target_lang: String,
    pub translation: String,
    pub error: Option<String>,
    pub audio_url: Option<String>,
}

impl Default for TranslatePage {
    fn default() -> Self {
        Self {
            input_text: String::new(),
            source_lang: AUTO.to_string(),
            target_lang: Language::English.code().to_string(),
            translation: String::new(),
            error: None,
            audio_url: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatPage {
    pub turns: Vec<ConversationTurn>,
    pub error: Option<String>,
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

const STYLE: &str = r#"
:root { --neon-pink: #ff007f; --neon-blue: #00f3ff; --glass-bg: rgba(255,255,255,0.05); }
* { margin: 0; padding: 0; box-sizing: border-box; font-family: 'SF Pro Display', system-ui, sans-serif; }
body { background: linear-gradient(135deg, #1a1a1a, #0a0a0a); min-height: 100vh; color: white; padding: 1rem; }
.container { max-width: 800px; margin: 2rem auto; }
.header { text-align: center; margin-bottom: 2rem; }
.header h1 { font-size: 2.8rem; background: linear-gradient(45deg, var(--neon-pink), var(--neon-blue));
  -webkit-background-clip: text; -webkit-text-fill-color: transparent; margin-bottom: 0.5rem; }
.header nav a { color: var(--neon-blue); margin: 0 0.5rem; }
.lang-selectors { display: grid; grid-template-columns: 1fr 1fr; gap: 1rem; margin-bottom: 2rem; }
select { background: var(--glass-bg); border: 2px solid rgba(255,255,255,0.1); border-radius: 10px;
  padding: 0.8rem; color: white; font-size: 1rem; }
.panel { background: var(--glass-bg); border-radius: 20px; padding: 2rem; border: 1px solid rgba(255,255,255,0.1);
  box-shadow: 0 10px 30px rgba(0,0,0,0.3); }
textarea { width: 100%; height: 150px; background: rgba(0,0,0,0.3); border: 2px solid rgba(255,255,255,0.1);
  border-radius: 15px; padding: 1rem; color: white; font-size: 1.1rem; resize: none; margin: 1rem 0; }
button { background: linear-gradient(45deg, var(--neon-pink), var(--neon-blue)); border: none; padding: 1rem 2rem;
  border-radius: 15px; color: white; font-size: 1.1rem; cursor: pointer; width: 100%; font-weight: bold; }
.result-box { margin-top: 2rem; padding: 1.5rem; background: rgba(255,255,255,0.02); border-radius: 15px;
  border: 1px solid rgba(255,255,255,0.08); }
.result-text { font-size: 1.2rem; line-height: 1.6; white-space: pre-wrap; }
.error-box { color: var(--neon-pink); margin-top: 1rem; padding: 1rem; border: 1px solid var(--neon-pink);
  border-radius: 10px; background: rgba(255,0,127,0.1); }
audio { width: 100%; margin-top: 1rem; }
.turn { margin: 0.75rem 0; padding: 0.75rem 1rem; border-radius: 12px; white-space: pre-wrap; }
.turn.user { background: rgba(255,0,127,0.12); }
.turn.assistant { background: rgba(0,243,255,0.08); }
.turn .who { font-weight: bold; margin-right: 0.5rem; }
.reset { background: none; color: var(--neon-blue); width: auto; padding: 0.5rem; font-weight: normal; }
"#;

fn page_open(out: &mut String, title: &str, subtitle: &str) {
    let _ = write!(
        out,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <style>{STYLE}</style>\n</head>\n<body>\n<div class=\"container\">\n\
         <div class=\"header\"><h1>{title}</h1><p>{subtitle}</p>\
         <nav><a href=\"/\">Translate</a><a href=\"/chat\">Chat</a></nav></div>\n",
        title = escape_html(title),
        subtitle = escape_html(subtitle),
    );
}

fn page_close(out: &mut String) {
    out.push_str("</div>\n</body>\n</html>\n");
}

fn error_box(out: &mut String, error: Option<&str>) {
    if let Some(error) = error.filter(|e| !e.is_empty()) {
        let _ = write!(out, "<div class=\"error-box\">{}</div>\n", escape_html(error));
    }
}

fn language_options(out: &mut String, selected: &str) {
    for lang in Language::all() {
        let mark = if lang.code() == selected { " selected" } else { "" };
        let _ = write!(
            out,
            "<option value=\"{}\"{}>{}</option>",
            lang.code(),
            mark,
            lang.name()
        );
    }
}

pub fn render_translate_page(page: &TranslatePage) -> String {
    let mut out = String::with_capacity(8 * 1024);
    page_open(&mut out, "TikTranslate Pro", "AI-Powered Multilingual Translation");

    out.push_str("<form method=\"POST\" action=\"/\">\n<div class=\"lang-selectors\">\n");
    out.push_str("<select name=\"source_lang\">");
    let auto_mark = if page.source_lang == AUTO { " selected" } else { "" };
    let _ = write!(out, "<option value=\"{AUTO}\"{auto_mark}>Detect Language</option>");
    language_options(&mut out, &page.source_lang);
    out.push_str("</select>\n<select name=\"target_lang\">");
    language_options(&mut out, &page.target_lang);
    out.push_str("</select>\n</div>\n");

    let _ = write!(
        out,
        "<div class=\"panel\">\n<textarea name=\"text\" placeholder=\"Type or paste your text here...\">{}</textarea>\n\
         <button type=\"submit\">Translate Now</button>\n",
        escape_html(&page.input_text)
    );

    if !page.translation.is_empty() {
        let _ = write!(
            out,
            "<div class=\"result-box\"><div class=\"result-text\">{}</div>",
            escape_html(&page.translation)
        );
        if let Some(url) = &page.audio_url {
            let _ = write!(
                out,
                "<audio controls src=\"{}\" type=\"audio/mpeg\"></audio>",
                escape_html(url)
            );
        }
        out.push_str("</div>\n");
    }
    error_box(&mut out, page.error.as_deref());

    out.push_str("</div>\n</form>\n");
    page_close(&mut out);
    out
}

pub fn render_chat_page(page: &ChatPage) -> String {
    let mut out = String::with_capacity(8 * 1024);
    page_open(&mut out, "TikGPT", "Chat with a pretrained language model");

    out.push_str("<div class=\"panel\">\n<div class=\"conversation\">\n");
    for turn in &page.turns {
        let (class, who) = match turn.role {
            Role::User => ("user", "You"),
            Role::Assistant => ("assistant", "AI"),
        };
        let _ = write!(
            out,
            "<div class=\"turn {class}\"><span class=\"who\">{who}:</span>{}</div>\n",
            escape_html(&turn.content)
        );
    }
    out.push_str("</div>\n");
    error_box(&mut out, page.error.as_deref());

    out.push_str(
        "<form method=\"POST\" action=\"/chat\">\n\
         <textarea name=\"prompt\" placeholder=\"Say something...\"></textarea>\n\
         <button type=\"submit\">Send</button>\n</form>\n",
    );
    if !page.turns.is_empty() {
        out.push_str(
            "<form method=\"POST\" action=\"/chat/reset\">\
             <button class=\"reset\" type=\"submit\">Start over</button></form>\n",
        );
    }
    out.push_str("</div>\n");
    page_close(&mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        assert_eq!(
            escape_html(r#"<script>alert("x") & 'y'</script>"#),
            "&lt;script&gt;alert(&quot;x&quot;) &amp; &#x27;y&#x27;&lt;/script&gt;"
        );
    }

    #[test]
    fn translate_page_marks_selection_and_echoes_input() {
        let page = TranslatePage {
            input_text: "<b>hi</b>".to_string(),
            source_lang: "auto".to_string(),
            target_lang: "fr".to_string(),
            translation: "salut".to_string(),
            error: None,
            audio_url: Some("/static/tts_abc.mp3".to_string()),
        };
        let html = render_translate_page(&page);
        assert!(html.contains("<option value=\"auto\" selected>Detect Language</option>"));
        assert!(html.contains("<option value=\"fr\" selected>French</option>"));
        assert!(html.contains("&lt;b&gt;hi&lt;/b&gt;"));
        assert!(html.contains("<div class=\"result-text\">salut</div>"));
        assert!(html.contains("src=\"/static/tts_abc.mp3\""));
        assert!(!html.contains("error-box\">"));
    }

    #[test]
    fn empty_page_has_no_result_or_audio() {
        let html = render_translate_page(&TranslatePage::default());
        assert!(!html.contains("class=\"result-text\""));
        assert!(!html.contains("<audio"));
        assert!(html.contains("<option value=\"en\" selected>English</option>"));
    }

    #[test]
    fn chat_page_lists_turns_in_order() {
        let page = ChatPage {
            turns: vec![
                ConversationTurn::user("first"),
                ConversationTurn::assistant("second"),
            ],
            error: Some("Please enter a prompt.".to_string()),
        };
        let html = render_chat_page(&page);
        let first = html.find("first").unwrap();
        let second = html.find("second").unwrap();
        assert!(first < second);
        assert!(html.contains("Please enter a prompt."));
        assert!(html.contains("/chat/reset"));
    }
}
