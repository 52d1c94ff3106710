//! Content rendering
//!
//! [`Render`] turns message content into a safe markup fragment.
//! [`HtmlRenderer`] is the default implementation:
//!
//! - part lists render part by part and join with `\n`; a part that fails
//!   renders as its escaped raw JSON instead
//! - text that looks like HTML is shown verbatim (escaped) in an HTML code
//!   block
//! - other text goes through escaping, fence detection, and inline code

pub mod markup;
pub mod text;

use chatscribe_models::providers::{Content, ContentPart};
use tracing::warn;

use crate::error::RenderError;

pub use text::Fragment;

/// URL prefixes an embedded image may use.
const IMAGE_SCHEMES: &[&str] = &["https://", "http://", "data:image/"];

/// Detail hint shown when an image part carries none.
const DEFAULT_DETAIL: &str = "standard";

/// Renders message content into a markup fragment.
///
/// Implementations must be deterministic: the same content always renders
/// to byte-identical markup.
pub trait Render: Send + Sync {
    /// Render one message's content.
    fn render(&self, content: &Content) -> Result<String, RenderError>;
}

/// Default HTML renderer.
#[derive(Debug, Clone, Copy, Default)]
pub struct HtmlRenderer;

impl HtmlRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Render scalar text.
    pub fn render_text(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }
        if text::looks_like_html(text) {
            return text::code_block("html", &text::escape_html(text));
        }
        format!(
            r#"<div class="content-text">{}</div>"#,
            text::render_prose(text)
        )
    }

    /// Render one structured part.
    pub fn render_part(&self, part: &ContentPart) -> Result<String, RenderError> {
        match part {
            ContentPart::Text { text } => Ok(self.render_text(text)),
            ContentPart::Image { url, detail } => image(url, detail.as_deref()),
            ContentPart::Other(raw) => Ok(self.render_text(&serde_json::to_string(raw)?)),
        }
    }
}

impl Render for HtmlRenderer {
    fn render(&self, content: &Content) -> Result<String, RenderError> {
        match content {
            Content::Text(text) => Ok(self.render_text(text)),
            Content::Parts(parts) => Ok(parts
                .iter()
                .map(|part| {
                    self.render_part(part).unwrap_or_else(|e| {
                        warn!("Falling back to raw JSON for content part: {}", e);
                        markup::raw_json(&part.to_value().to_string())
                    })
                })
                .filter(|html| !html.is_empty())
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}

fn image(url: &str, detail: Option<&str>) -> Result<String, RenderError> {
    if !IMAGE_SCHEMES.iter().any(|scheme| url.starts_with(scheme)) {
        return Err(RenderError::UnsupportedImageUrl(url.to_string()));
    }
    Ok(format!(
        r#"<div class="image-container"><img src="{}" alt="image" title="detail: {}"></div>"#,
        text::escape_html(url),
        text::escape_html(detail.unwrap_or(DEFAULT_DETAIL)),
    ))
}

/// Fence detection over raw text, exposed for inspection and tests.
pub fn render_fragments(text: &str) -> Vec<Fragment> {
    text::split_fences(text)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn plain_text_is_wrapped() {
        let html = HtmlRenderer.render(&Content::text("hello")).unwrap();
        assert_eq!(html, r#"<div class="content-text">hello</div>"#);
    }

    #[test]
    fn empty_text_renders_nothing() {
        assert_eq!(HtmlRenderer.render(&Content::text("")).unwrap(), "");
    }

    #[test]
    fn html_shaped_text_becomes_code_block() {
        let html = HtmlRenderer
            .render(&Content::text("<script>alert(1)</script>"))
            .unwrap();
        assert_eq!(
            html,
            r#"<pre><code class="language-html">&lt;script&gt;alert(1)&lt;/script&gt;</code></pre>"#
        );
    }

    #[test]
    fn html_shaped_text_skips_fence_parsing() {
        let html = HtmlRenderer
            .render(&Content::text("<p>x</p>\n```py\nprint(1)\n```"))
            .unwrap();
        assert!(html.starts_with(r#"<pre><code class="language-html">"#));
        assert!(!html.contains("language-py"));
    }

    #[test]
    fn fenced_text_renders_in_order() {
        let html = HtmlRenderer
            .render(&Content::text("a\n```py\nprint(1)\n```\nb"))
            .unwrap();
        assert_eq!(
            html,
            "<div class=\"content-text\">a\n<pre><code class=\"language-py\">print(1)</code></pre>\nb</div>"
        );
    }

    #[test]
    fn rendering_is_idempotent() {
        let content = Content::Parts(vec![
            ContentPart::text("use `cargo`\n```toml\n[a]\n```"),
            ContentPart::image("https://x.test/a.png", None),
        ]);
        let first = HtmlRenderer.render(&content).unwrap();
        let second = HtmlRenderer.render(&content).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn image_part_embeds_detail_hint() {
        let content = Content::Parts(vec![ContentPart::image(
            "https://x.test/a.png",
            Some("low".to_string()),
        )]);
        let html = HtmlRenderer.render(&content).unwrap();
        assert!(html.contains(r#"src="https://x.test/a.png""#));
        assert!(html.contains("detail: low"));
    }

    #[test]
    fn image_without_detail_uses_standard() {
        let html = HtmlRenderer
            .render_part(&ContentPart::image("data:image/png;base64,AA==", None))
            .unwrap();
        assert!(html.contains("detail: standard"));
    }

    #[test]
    fn unsafe_image_falls_back_to_raw_json() {
        let content = Content::Parts(vec![
            ContentPart::text("before"),
            ContentPart::image("javascript:alert(1)", None),
            ContentPart::text("after"),
        ]);
        let html = HtmlRenderer.render(&content).unwrap();
        let pieces: Vec<&str> = html.split('\n').collect();
        assert_eq!(pieces.len(), 3);
        assert!(pieces[1].contains("javascript:alert(1)"));
        assert!(pieces[1].contains("&quot;image_url&quot;"));
        assert!(pieces[2].contains("after"));
    }

    #[test]
    fn unknown_part_renders_as_json_text() {
        let content = Content::Parts(vec![ContentPart::Other(json!({"type": "audio", "id": 7}))]);
        let html = HtmlRenderer.render(&content).unwrap();
        assert!(html.contains("&quot;type&quot;:&quot;audio&quot;"));
    }

    #[test]
    fn fragments_are_exposed() {
        let fragments = render_fragments("```js\nfoo()");
        assert_eq!(
            fragments,
            vec![Fragment::Code {
                language: "plaintext".to_string(),
                code: "foo()".to_string(),
            }]
        );
    }
}
