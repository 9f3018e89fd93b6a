//! Speech markup sanitizer.
//!
//! Rules, in order: escape XML metacharacters, turn `*word*` into emphasis,
//! turn ellipses into timed breaks, collapse whitespace, ensure terminal
//! punctuation. A text made only of ellipses becomes a bare pause. A text
//! ending in a break counts as terminated.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::turn::Emotion;

/// Break length used for ellipses
pub const DEFAULT_PAUSE_MS: u32 = 700;

static ELLIPSIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.{3,}|…").unwrap());
static ELLIPSIS_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:\s*(?:\.{3,}|…))+\s*$").unwrap());
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\s](?:[^*]*[^*\s])?)\*").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static EMPHASIS_PADDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(<emphasis>)\s+|\s+(</emphasis>)").unwrap());
static SPACE_BEFORE_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(/>)\s+([.!?,;:])").unwrap());

const TERMINAL: [char; 3] = ['.', '!', '?'];
const CLOSERS: [char; 5] = ['"', '\'', ')', ']', '”'];

/// Self-closing pause directive
pub fn break_tag(pause_ms: u32) -> String {
    format!(r#"<break time="{}ms"/>"#, pause_ms)
}

fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn is_terminated(text: &str) -> bool {
    // Ignore trailing closing tags, quotes and brackets: `*wow*!` and `"Stop!"` are both ended
    let without_tags = text.trim_end_matches("</emphasis>");
    if without_tags.ends_with("/>") {
        return true;
    }
    without_tags
        .trim_end_matches(CLOSERS)
        .ends_with(TERMINAL)
}

/// Sanitize free text into a markup-safe body (no `<speak>` envelope).
pub fn sanitize_text(text: &str, pause_ms: u32) -> String {
    let pause = break_tag(pause_ms);

    if ELLIPSIS_ONLY.is_match(text) {
        return pause;
    }

    let escaped = escape_xml(text);
    // Emphasis first: a break inside `*...*` would leave a space before the closing marker
    let emphasized = EMPHASIS.replace_all(&escaped, "<emphasis>$1</emphasis>");
    let with_breaks = ELLIPSIS.replace_all(&emphasized, format!(" {} ", pause).as_str());
    let collapsed = WHITESPACE.replace_all(&with_breaks, " ");
    let unpadded = EMPHASIS_PADDING.replace_all(collapsed.trim(), "$1$2");
    let tidied = SPACE_BEFORE_PUNCT.replace_all(&unpadded, "$1$2");

    let mut body = tidied.into_owned();
    if body.is_empty() {
        return body;
    }
    if !is_terminated(&body) {
        body.push('.');
    }
    body
}

/// Full speech markup for one turn, optionally styled with an emotion.
pub fn to_speech_markup(text: &str, emotion: Option<Emotion>, pause_ms: u32) -> String {
    let body = sanitize_text(text, pause_ms);

    // A bare pause has nothing to style
    if body == break_tag(pause_ms) {
        return format!("<speak>{}</speak>", body);
    }

    match emotion {
        Some(emotion) => format!(
            r#"<speak><speechify:style emotion="{}">{}</speechify:style></speak>"#,
            emotion.as_str(),
            body
        ),
        None => format!("<speak>{}</speak>", body),
    }
}
