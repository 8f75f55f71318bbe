//! Text cleanup applied to every extraction result.

use std::sync::LazyLock;

use regex::Regex;

/// Whitespace other than newlines.
static HORIZONTAL_WS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\S\n]+").unwrap());

/// Spaces hugging a newline.
static SPACED_NEWLINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ?\n ?").unwrap());

/// Anything that is not a word character, whitespace or common punctuation/symbol.
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[^\w\s.,;:!?'"()\[\]{}<>@#$%\&*+=/\\|\~\^_`\-–—•·…‘’“”«»€£¥©®™°§±×]"#).unwrap()
});

static EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Cleaned text with counts derived from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    pub text: String,
    pub word_count: usize,
    pub character_count: usize,
}

/// Normalize extracted text.
///
/// Steps, in order: unify line endings, drop stray characters, collapse
/// horizontal whitespace to one space, collapse three or more newlines to two,
/// trim. Stripping runs first so removed symbols never leave double spaces.
pub fn normalize(raw: &str) -> NormalizedText {
    let text = raw.replace("\r\n", "\n").replace('\r', "\n");
    let text = DISALLOWED.replace_all(&text, "");
    let text = HORIZONTAL_WS.replace_all(&text, " ");
    let text = SPACED_NEWLINE.replace_all(&text, "\n");
    let text = EXCESS_NEWLINES.replace_all(&text, "\n\n");
    let text = text.trim().to_string();

    NormalizedText {
        word_count: word_count(&text),
        character_count: character_count(&text),
        text,
    }
}

/// Whitespace-separated, non-empty tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length in Unicode scalar values.
pub fn character_count(text: &str) -> usize {
    text.chars().count()
}
