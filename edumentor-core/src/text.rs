use regex::{Captures, Regex};
use std::sync::OnceLock;

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.*?)\*\*").expect("valid bold regex"))
}

fn italic_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*(.*?)\*").expect("valid italic regex"))
}

fn dash_bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^- ").expect("valid dash bullet regex"))
}

fn speech_markup_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[*#=_~^{}\[\]|<>]").expect("valid speech markup regex"))
}

fn emoji_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // Watch/hourglass through misc symbols and arrows, plus the astral emoji planes.
        Regex::new(r"[\x{231A}-\x{2BFF}\x{1F000}-\x{1FAFF}\x{FE0F}\x{200D}]")
            .expect("valid emoji regex")
    })
}

fn emoticon_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(:|;|=)[-~]?[)D]").expect("valid emoticon regex"))
}

fn escaped_newline_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\\n+").expect("valid escaped newline regex"))
}

/// Token set used by [`format_markup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkupStyle {
    pub bold_open: &'static str,
    pub bold_close: &'static str,
    pub italic_open: &'static str,
    pub italic_close: &'static str,
    pub line_break: &'static str,
}

impl MarkupStyle {
    pub const HTML: MarkupStyle = MarkupStyle {
        bold_open: "<strong>",
        bold_close: "</strong>",
        italic_open: "<em>",
        italic_close: "</em>",
        line_break: "<ul><li>",
    };

    pub const TERMINAL: MarkupStyle = MarkupStyle {
        bold_open: "\x1b[1m",
        bold_close: "\x1b[22m",
        italic_open: "\x1b[3m",
        italic_close: "\x1b[23m",
        line_break: "\n",
    };
}

pub const BULLET_GLYPH: &str = "🔹";

/// Display-only markup pass. Order matters: bold before italic, line breaks
/// before bullet substitution.
pub fn format_markup(text: &str, style: &MarkupStyle) -> String {
    let out = bold_re().replace_all(text, |caps: &Captures| {
        format!("{}{}{}", style.bold_open, &caps[1], style.bold_close)
    });
    let out = italic_re().replace_all(&out, |caps: &Captures| {
        format!("{}{}{}", style.italic_open, &caps[1], style.italic_close)
    });
    let out = out.replace('\n', style.line_break);
    let out = out.replace('•', BULLET_GLYPH);
    dash_bullet_re()
        .replace_all(&out, format!("{BULLET_GLYPH} ").as_str())
        .into_owned()
}

/// Strips markup, emoji and emoticons before handing text to a speech engine.
pub fn clean_for_speech(text: &str) -> String {
    let out = speech_markup_re().replace_all(text, "");
    let out = emoji_re().replace_all(&out, "");
    let out = emoticon_re().replace_all(&out, "");
    escaped_newline_re().replace_all(&out, ". ").into_owned()
}
