//! Text pipeline: escaping, code fences, inline code, bare image links.
//!
//! Escaping always runs first, so everything downstream works on text that
//! is already safe to embed; fence bodies are copied through verbatim.

use std::sync::LazyLock;

use regex::Regex;

/// Fence marker opening or closing a code block.
const FENCE: &str = "```";

/// Language tag used when a fence carries none, and for unterminated fences.
const PLAIN: &str = "plaintext";

static HTML_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<[a-z][\s\S]*>").expect("valid regex"));

// Runs on escaped text, so `"` and `<` can never appear inside a match.
static IMAGE_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(https?://\S+?\.(?:png|jpg|jpeg|gif|webp)|data:image/(?:png|jpg|jpeg|gif|webp);base64,[a-zA-Z0-9+/]+={0,2})",
    )
    .expect("valid regex")
});

/// One piece of text after fence detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    /// Lines outside any fence, joined with `\n`.
    Prose(String),
    /// Body of a fenced block.
    Code { language: String, code: String },
}

/// Escape the five HTML-significant characters.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Whether `text` contains something shaped like an HTML tag.
pub fn looks_like_html(text: &str) -> bool {
    HTML_TAG.is_match(text)
}

/// Split text into prose and fenced code, in order.
///
/// A line starting with the fence marker opens a block (the rest of the line
/// is the language tag) or closes the open one. An unterminated block still
/// yields its lines, tagged `plaintext`.
pub fn split_fences(text: &str) -> Vec<Fragment> {
    let mut fragments = Vec::new();
    let mut prose: Vec<&str> = Vec::new();
    let mut code: Vec<&str> = Vec::new();
    let mut language: Option<String> = None;

    for line in text.split('\n') {
        match (&language, line.strip_prefix(FENCE)) {
            (None, Some(tag)) => {
                if !prose.is_empty() {
                    fragments.push(Fragment::Prose(prose.join("\n")));
                    prose.clear();
                }
                let tag = tag.split_whitespace().next().unwrap_or(PLAIN);
                language = Some(tag.to_string());
            }
            (Some(open), Some(_)) => {
                fragments.push(Fragment::Code {
                    language: open.clone(),
                    code: code.join("\n"),
                });
                code.clear();
                language = None;
            }
            (Some(_), None) => code.push(line),
            (None, None) => prose.push(line),
        }
    }

    if !prose.is_empty() {
        fragments.push(Fragment::Prose(prose.join("\n")));
    }
    if language.is_some() && !code.is_empty() {
        fragments.push(Fragment::Code {
            language: PLAIN.to_string(),
            code: code.join("\n"),
        });
    }

    fragments
}

/// Wrap backtick-delimited spans in `<code>`.
///
/// Tokens at odd positions of the backtick split are code. With an odd
/// number of backticks the last one has no partner; it is kept literally and
/// the text after it stays plain.
pub fn inline_code(text: &str, plain: impl Fn(&str) -> String) -> String {
    let parts: Vec<&str> = text.split('`').collect();
    let unmatched = parts.len() % 2 == 0;
    let mut out = String::with_capacity(text.len());

    for (i, part) in parts.iter().enumerate() {
        if unmatched && i == parts.len() - 1 {
            out.push('`');
            out.push_str(&plain(part));
        } else if i % 2 == 1 {
            out.push_str("<code>");
            out.push_str(part);
            out.push_str("</code>");
        } else {
            out.push_str(&plain(part));
        }
    }

    out
}

/// Replace bare image links in escaped prose with embedded images.
pub fn embed_image_links(text: &str) -> String {
    IMAGE_LINK
        .replace_all(text, r#"<div class="image-container"><img src="$1" alt="image"></div>"#)
        .into_owned()
}

/// Markup for one fenced block. `code` must already be escaped.
pub fn code_block(language: &str, code: &str) -> String {
    format!(r#"<pre><code class="language-{language}">{code}</code></pre>"#)
}

/// Full text pipeline for prose that is not HTML-shaped.
pub fn render_prose(text: &str) -> String {
    let escaped = escape_html(text);
    split_fences(&escaped)
        .into_iter()
        .map(|fragment| match fragment {
            Fragment::Prose(prose) => inline_code(&prose, embed_image_links),
            Fragment::Code { language, code } => code_block(&language, &code),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
