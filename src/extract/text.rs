//! Plain-text family: raw text, markdown and CSV pass through; HTML and RTF
//! are reduced to their readable text.

use scraper::{Html, Node};

/// Flavor of text input, sniffed from the leading bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFormat {
    Plain,
    Html,
    Rtf,
}

impl TextFormat {
    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "text/html" => Self::Html,
            "application/rtf" | "text/rtf" => Self::Rtf,
            _ => Self::Plain,
        }
    }
}

/// Result of reading a text buffer.
#[derive(Debug, Clone)]
pub struct TextExtraction {
    pub text: String,
    pub format: TextFormat,
    pub warnings: Vec<String>,
}

/// Decode a text buffer and strip markup for HTML/RTF.
pub fn extract_text(bytes: &[u8], format: TextFormat) -> TextExtraction {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut warnings = Vec::new();

    let decoded = String::from_utf8_lossy(bytes);
    if decoded.contains('\u{FFFD}') && std::str::from_utf8(bytes).is_err() {
        warnings.push("Input was not valid UTF-8; undecodable bytes were replaced".to_string());
    }

    let text = match format {
        TextFormat::Plain => decoded.into_owned(),
        TextFormat::Html => html_to_text(&decoded),
        TextFormat::Rtf => rtf_to_text(&decoded),
    };

    TextExtraction {
        text,
        format,
        warnings,
    }
}

const HTML_SKIPPED: &[&str] = &["script", "style", "noscript", "template", "head"];
const HTML_BLOCKS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "tr", "table", "section", "article", "header", "footer",
    "h1", "h2", "h3", "h4", "h5", "h6", "blockquote", "pre", "hr",
];

/// Visible text of an HTML document, with block elements on their own lines.
fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();

    for node in document.root_element().descendants() {
        match node.value() {
            Node::Element(element) => {
                if HTML_BLOCKS.contains(&element.name()) && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            Node::Text(text) => {
                let hidden = node.ancestors().any(|a| {
                    a.value()
                        .as_element()
                        .map(|e| HTML_SKIPPED.contains(&e.name()))
                        .unwrap_or(false)
                });
                if !hidden {
                    out.push_str(text);
                }
            }
            _ => {}
        }
    }

    out
}

/// RTF destinations whose content is metadata, not body text.
const RTF_SKIPPED_DESTINATIONS: &[&str] = &[
    "fonttbl",
    "colortbl",
    "stylesheet",
    "info",
    "pict",
    "header",
    "footer",
    "listtable",
    "listoverridetable",
    "generator",
];

/// Windows-1252 assignments for 0x80 - 0x9F; `None` marks unassigned bytes.
const CP1252_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'), None, Some('\u{201A}'), Some('\u{0192}'),
    Some('\u{201E}'), Some('\u{2026}'), Some('\u{2020}'), Some('\u{2021}'),
    Some('\u{02C6}'), Some('\u{2030}'), Some('\u{0160}'), Some('\u{2039}'),
    Some('\u{0152}'), None, Some('\u{017D}'), None,
    None, Some('\u{2018}'), Some('\u{2019}'), Some('\u{201C}'),
    Some('\u{201D}'), Some('\u{2022}'), Some('\u{2013}'), Some('\u{2014}'),
    Some('\u{02DC}'), Some('\u{2122}'), Some('\u{0161}'), Some('\u{203A}'),
    Some('\u{0153}'), None, Some('\u{017E}'), Some('\u{0178}'),
];

/// Decode one `\'hh` byte. RTF writers default to the ANSI code page, which
/// matches Latin-1 everywhere except 0x80 - 0x9F.
fn cp1252_char(byte: u8) -> Option<char> {
    match byte {
        0x80..=0x9F => CP1252_HIGH[(byte - 0x80) as usize],
        _ => Some(byte as char),
    }
}

/// Strip RTF control words and groups, keeping body text.
fn rtf_to_text(rtf: &str) -> String {
    let chars: Vec<char> = rtf.chars().collect();
    let mut out = String::new();
    // Depth at which a skipped destination started, if any.
    let mut skip_from: Option<usize> = None;
    let mut depth = 0usize;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            '{' => {
                depth += 1;
                i += 1;
            }
            '}' => {
                if skip_from == Some(depth) {
                    skip_from = None;
                }
                depth = depth.saturating_sub(1);
                i += 1;
            }
            '\\' => {
                i += 1;
                let Some(&next) = chars.get(i) else { break };
                if matches!(next, '\\' | '{' | '}') {
                    if skip_from.is_none() {
                        out.push(next);
                    }
                    i += 1;
                    continue;
                }
                if next == '*' {
                    skip_from.get_or_insert(depth);
                    i += 1;
                    continue;
                }
                if next == '\'' {
                    let hex: String = chars.iter().skip(i + 1).take(2).collect();
                    if let Ok(byte) = u8::from_str_radix(&hex, 16) {
                        if skip_from.is_none() {
                            if let Some(ch) = cp1252_char(byte) {
                                out.push(ch);
                            }
                        }
                    }
                    i += 3;
                    continue;
                }
                if !next.is_ascii_alphabetic() {
                    // Control symbol such as \~ or \-.
                    if next == '~' && skip_from.is_none() {
                        out.push(' ');
                    }
                    i += 1;
                    continue;
                }

                let start = i;
                while i < chars.len() && chars[i].is_ascii_alphabetic() {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let num_start = i;
                if i < chars.len() && (chars[i] == '-' || chars[i].is_ascii_digit()) {
                    i += 1;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
                let param: Option<i32> = chars[num_start..i]
                    .iter()
                    .collect::<String>()
                    .parse()
                    .ok();
                if i < chars.len() && chars[i] == ' ' {
                    i += 1;
                }

                if RTF_SKIPPED_DESTINATIONS.contains(&word.as_str()) {
                    skip_from.get_or_insert(depth);
                    continue;
                }
                if skip_from.is_some() {
                    continue;
                }
                match word.as_str() {
                    "par" | "line" | "sect" | "page" => out.push('\n'),
                    "tab" | "cell" => out.push('\t'),
                    "row" => out.push('\n'),
                    "u" => {
                        if let Some(code) = param {
                            let code = if code < 0 { code + 65536 } else { code };
                            if let Some(ch) = char::from_u32(code as u32) {
                                out.push(ch);
                            }
                            // Skip the single-character ANSI fallback.
                            if i < chars.len() && chars[i] != '\\' && chars[i] != '{' {
                                i += 1;
                            }
                        }
                    }
                    _ => {}
                }
            }
            '\r' | '\n' => i += 1,
            _ => {
                if skip_from.is_none() {
                    out.push(c);
                }
                i += 1;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_verbatim() {
        let input = "Jane Doe\nEngineer, 10 years\nSkills: Rust, Go";
        let result = extract_text(input.as_bytes(), TextFormat::Plain);
        assert_eq!(result.text, input);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_strips_bom() {
        let result = extract_text(b"\xEF\xBB\xBFHello", TextFormat::Plain);
        assert_eq!(result.text, "Hello");
    }

    #[test]
    fn test_invalid_utf8_warns() {
        let result = extract_text(b"Caf\xE9 manager", TextFormat::Plain);
        assert!(result.text.starts_with("Caf"));
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn test_html_visible_text() {
        let html = "<html><head><title>x</title><style>p{}</style></head>\
                    <body><h1>Jane Doe</h1><p>Rust developer</p><script>alert(1)</script></body></html>";
        let result = extract_text(html.as_bytes(), TextFormat::Html);
        assert!(result.text.contains("Jane Doe"));
        assert!(result.text.contains("Rust developer"));
        assert!(!result.text.contains("alert"));
        assert!(!result.text.contains("p{}"));
        assert!(result.text.find("Jane Doe") < result.text.find("Rust developer"));
    }

    #[test]
    fn test_rtf_hex_escapes_use_windows_1252() {
        let rtf = r"{\rtf1\ansi\ansicpg1252 2019\'962024 \'93Lead\'94 Caf\'e9\'81}";
        let result = extract_text(rtf.as_bytes(), TextFormat::Rtf);
        assert_eq!(result.text, "2019\u{2013}2024 \u{201C}Lead\u{201D} Caf\u{E9}");
        assert_eq!(
            crate::normalize::normalize(&result.text).text,
            "2019\u{2013}2024 \u{201C}Lead\u{201D} Caf\u{E9}"
        );
    }

    #[test]
    fn test_rtf_body_text() {
        let rtf = r"{\rtf1\ansi{\fonttbl{\f0 Times;}}{\*\generator Writer;}\f0 Jane Doe\par Caf\'e9 owner\tab 2020}";
        let result = extract_text(rtf.as_bytes(), TextFormat::Rtf);
        assert_eq!(result.text, "Jane Doe\nCaf\u{e9} owner\t2020");
    }

    #[test]
    fn test_rtf_unicode_escape() {
        let rtf = r"{\rtf1 Na\u239?ve}";
        let result = extract_text(rtf.as_bytes(), TextFormat::Rtf);
        assert_eq!(result.text, "Na\u{ef}ve");
    }
}
