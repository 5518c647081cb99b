/*
 * markup.rs
 * Copyright (c) 2025 Posit, PBC
 *
 * Rendering code to markup for the editor and output panes.
 */

use tracing::warn;

/// Why a renderer could not produce markup
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RenderError {
    #[error("Unsupported language '{0}'")]
    UnsupportedLanguage(String),

    #[error("Renderer unavailable: {0}")]
    Unavailable(String),
}

/// Turns code into display markup
pub trait MarkupRenderer: Send {
    fn render(&self, code: &str, language: &str) -> Result<String, RenderError>;
}

/// Renders code as escaped lines inside a language-tagged `<pre>`
///
/// Each line is wrapped in `<span class="line">` so a host can attach
/// line highlights without re-parsing the markup.
#[derive(Debug, Clone, Default)]
pub struct PlainMarkupRenderer;

impl MarkupRenderer for PlainMarkupRenderer {
    fn render(&self, code: &str, language: &str) -> Result<String, RenderError> {
        if !is_language_id(language) {
            return Err(RenderError::UnsupportedLanguage(language.to_string()));
        }

        let mut html = format!("<pre class=\"code language-{language}\"><code>");
        for (idx, line) in code.split('\n').enumerate() {
            if idx > 0 {
                html.push('\n');
            }
            html.push_str("<span class=\"line\">");
            html.push_str(&escape_html(line));
            html.push_str("</span>");
        }
        html.push_str("</code></pre>");
        Ok(html)
    }
}

/// Render with `renderer`, falling back to escaped plain text on failure
///
/// Always returns markup; a renderer failure is logged and never surfaces.
pub fn render_or_fallback(renderer: &dyn MarkupRenderer, code: &str, language: &str) -> String {
    match renderer.render(code, language) {
        Ok(markup) => markup,
        Err(err) => {
            warn!(error = %err, language, "Markup renderer failed, showing plain text");
            fallback_markup(code)
        }
    }
}

pub fn fallback_markup(code: &str) -> String {
    format!("<pre class=\"plain\">{}</pre>", escape_html(code))
}

fn is_language_id(language: &str) -> bool {
    !language.is_empty()
        && language
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == '+')
}

/// Escape HTML special characters
fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Broken;

    impl MarkupRenderer for Broken {
        fn render(&self, _code: &str, _language: &str) -> Result<String, RenderError> {
            Err(RenderError::Unavailable("grammar failed to load".to_string()))
        }
    }

    #[test]
    fn test_plain_render_escapes_and_splits_lines() {
        let markup = PlainMarkupRenderer
            .render("const a = <div/>;\nb && c", "tsx")
            .unwrap();
        assert_eq!(
            markup,
            "<pre class=\"code language-tsx\"><code>\
             <span class=\"line\">const a = &lt;div/&gt;;</span>\n\
             <span class=\"line\">b &amp;&amp; c</span>\
             </code></pre>"
        );
    }

    #[test]
    fn test_malformed_language_is_rejected() {
        assert_eq!(
            PlainMarkupRenderer.render("x", "\"><script>"),
            Err(RenderError::UnsupportedLanguage("\"><script>".to_string()))
        );
        assert!(PlainMarkupRenderer.render("x", "").is_err());
    }

    #[test]
    fn test_fallback_on_renderer_failure() {
        assert_eq!(
            render_or_fallback(&Broken, "if (a < b) {}", "tsx"),
            "<pre class=\"plain\">if (a &lt; b) {}</pre>"
        );
    }

    #[test]
    fn test_fallback_on_bad_language() {
        let markup = render_or_fallback(&PlainMarkupRenderer, "'q'", "");
        assert_eq!(markup, "<pre class=\"plain\">&#39;q&#39;</pre>");
    }

    #[test]
    fn test_empty_code() {
        assert_eq!(
            PlainMarkupRenderer.render("", "tsx").unwrap(),
            "<pre class=\"code language-tsx\"><code><span class=\"line\"></span></code></pre>"
        );
    }
}
