//! Page template wrapped around a closed document's fragments

use crate::render::text::escape_html;

/// Document title used when none is configured
pub const DEFAULT_TITLE: &str = "AI Conversation";

const STYLE: &str = r#"body { font-family: -apple-system, "Segoe UI", Roboto, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; background: #f7f7f8; color: #374151; line-height: 1.6; }
#conversation { display: flex; flex-direction: column; }
.message { margin: 16px 0; padding: 14px 18px; border-radius: 14px; white-space: pre-wrap; word-wrap: break-word; max-width: 85%; }
.user { background: #e9f2ff; border: 1px solid #d1e3ff; align-self: flex-start; }
.assistant { background: #ffffff; border: 1px solid #e5e7eb; align-self: flex-end; }
.system { background: #fff7e6; border: 1px solid #ffe2a8; align-self: center; }
.tool { background: #f3f4f6; border: 1px dashed #d1d5db; font-family: monospace; }
.divider { text-align: center; margin: 24px 0; color: #6b7280; font-size: 14px; border-top: 1px solid #d1d5db; padding-top: 6px; }
.content-text { display: inline; }
.tool-call-container { border: 1px solid #e5e7eb; border-radius: 8px; margin: 8px 0; }
.tool-call-header { background: #f9fafb; padding: 4px 10px; font-weight: 600; }
.image-container img { max-width: 100%; border-radius: 8px; }
pre { background: #f6f8fa; padding: 10px; border-radius: 6px; overflow-x: auto; }"#;

const HIGHLIGHT_CSS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.7.0/styles/github.min.css";
const HIGHLIGHT_JS: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/highlight.js/11.7.0/highlight.min.js";

/// Opening markup up to the conversation container
pub fn header(title: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
{STYLE}
</style>
<link rel="stylesheet" href="{HIGHLIGHT_CSS}">
<script src="{HIGHLIGHT_JS}"></script>
</head>
<body>
<div id="conversation">
"#,
        title = escape_html(title),
    )
}

/// Closing markup
pub fn footer() -> &'static str {
    "\n</div>\n<script>hljs.highlightAll();</script>\n</body>\n</html>\n"
}

/// Full page around `fragments`, one per line
pub fn render_page(title: &str, fragments: &[String]) -> String {
    let mut page = header(title);
    page.push_str(&fragments.join("\n"));
    page.push_str(footer());
    page
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_wraps_fragments_in_order() {
        let page = render_page("t", &["<p>1</p>".to_string(), "<p>2</p>".to_string()]);
        let first = page.find("<p>1</p>").unwrap();
        let second = page.find("<p>2</p>").unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(first < second);
        assert!(page.trim_end().ends_with("</html>"));
    }

    #[test]
    fn test_title_is_escaped() {
        assert!(header("<chat>").contains("<title>&lt;chat&gt;</title>"));
    }
}
