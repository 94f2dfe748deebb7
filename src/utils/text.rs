/// Repairs double-escaped control characters in free text: the literal
/// two-character sequences `\n` and `\t` become a newline and a tab. Missing
/// text becomes an empty string.
pub fn unescape_text(text: Option<&str>) -> String {
    match text {
        None => String::new(),
        Some(text) => text.replace("\\n", "\n").replace("\\t", "\t"),
    }
}

#[cfg(test)]
mod tests {
    use super::unescape_text;

    #[test]
    fn converts_escaped_newlines() {
        assert_eq!(unescape_text(Some("a\\nb")), "a\nb");
    }

    #[test]
    fn leaves_plain_text_untouched() {
        assert_eq!(unescape_text(Some("plain text")), "plain text");
        assert_eq!(unescape_text(Some("already\nreal")), "already\nreal");
    }

    #[test]
    fn missing_text_is_empty() {
        assert_eq!(unescape_text(None), "");
    }

    #[test]
    fn converts_consecutive_newlines() {
        assert_eq!(unescape_text(Some("a\\n\\n\\nb")), "a\n\n\nb");
    }

    #[test]
    fn converts_tabs_and_newlines_together() {
        assert_eq!(
            unescape_text(Some("col1\\tcol2\\nrow2")),
            "col1\tcol2\nrow2"
        );
    }

    #[test]
    fn is_idempotent() {
        let samples = ["x\\ny", "\\t\\t", "no escapes", "", "back\\slash", "\\\\n"];
        for sample in samples {
            let once = unescape_text(Some(sample));
            assert_eq!(unescape_text(Some(&once)), once, "sample: {:?}", sample);
        }
    }
}
