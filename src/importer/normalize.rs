//! Text Normalizer
//!
//! Maps locale punctuation variants onto ASCII before any pattern runs, and
//! renders whatever the pipeline could not consume into paragraph-wrapped
//! HTML for the notes field.

/// Normalize line endings and punctuation variants, strip trailing
/// replacement characters left behind by lossy decoding of malformed input,
/// and trim.
pub fn normalize(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");
    let mut out: String = text
        .chars()
        .map(|c| match c {
            // en dash, em dash, minus sign
            '\u{2013}' | '\u{2014}' | '\u{2212}' => '-',
            // right single quote
            '\u{2019}' => '\'',
            other => other,
        })
        .collect();
    while out.ends_with('\u{FFFD}') {
        out.pop();
    }
    out.trim().to_string()
}

/// Wrap the leftover free text into `<p>` paragraphs, dropping blank lines
/// and lines consisting solely of stray punctuation.
pub fn to_html(text: &str) -> String {
    let mut paragraphs = Vec::new();
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || !line.chars().any(char::is_alphanumeric) {
            continue;
        }
        paragraphs.push(format!("<p>{}</p>", html_escape::encode_text(line)));
    }
    paragraphs.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashes_and_quotes_become_ascii() {
        assert_eq!(normalize("1d4–1 — l’ombre"), "1d4-1 - l'ombre");
        assert_eq!(normalize("2d6−1"), "2d6-1");
    }

    #[test]
    fn test_crlf_becomes_lf() {
        assert_eq!(normalize("a\r\nb\rc"), "a\nb\nc");
    }

    #[test]
    fn test_trailing_replacement_characters_are_stripped() {
        assert_eq!(normalize("fine text\u{FFFD}\u{FFFD}"), "fine text");
    }

    #[test]
    fn test_to_html_wraps_paragraphs() {
        let html = to_html("He mutters constantly.\n\nCarries a lantern.");
        assert_eq!(
            html,
            "<p>He mutters constantly.</p>\n<p>Carries a lantern.</p>"
        );
    }

    #[test]
    fn test_to_html_drops_punctuation_only_lines() {
        assert_eq!(to_html("\n , . \n...\n"), "");
    }

    #[test]
    fn test_to_html_escapes_markup() {
        assert_eq!(to_html("<keeper only>"), "<p>&lt;keeper only&gt;</p>");
    }
}
