//! Escaping for untrusted submission text.
//!
//! HTML email bodies get [`escape_html`] / [`escape_html_multiline`]; the
//! plain-text body uses the raw values. Anything that lands in a header
//! (subject line, display names) goes through [`header_safe`].

/// Replace `&`, `<`, `>`, `"` and `'` with their HTML entities.
///
/// Every other character is copied unchanged, and every input character is
/// replaced at most once, so `&lt;` in the input becomes `&amp;lt;`.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// [`escape_html`], then turn line breaks (`\n` or `\r\n`) into `<br>`.
#[must_use]
pub fn escape_html_multiline(text: &str) -> String {
    escape_html(text).replace("\r\n", "\n").replace('\n', "<br>")
}

/// Make untrusted text safe to place in a single-line header.
///
/// Control characters (CR and LF included) become spaces, runs of whitespace
/// collapse to one space, and the ends are trimmed.
#[must_use]
pub fn header_safe(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_all_five_characters_once() {
        assert_eq!(escape_html("<b>&'\""), "&lt;b&gt;&amp;&#039;&quot;");
    }

    #[test]
    fn existing_entities_are_escaped_again() {
        assert_eq!(escape_html("&lt;"), "&amp;lt;");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(escape_html("Hello, wörld 42"), "Hello, wörld 42");
        assert_eq!(escape_html(""), "");
    }

    #[test]
    fn newlines_become_br() {
        assert_eq!(
            escape_html_multiline("line 1\nline <2>\r\nline 3"),
            "line 1<br>line &lt;2&gt;<br>line 3"
        );
    }

    #[test]
    fn plain_escape_keeps_newlines() {
        assert_eq!(escape_html("a\nb"), "a\nb");
    }

    #[test]
    fn header_safe_strips_line_breaks() {
        assert_eq!(
            header_safe("Mallory\r\nBcc: victim@example.com"),
            "Mallory Bcc: victim@example.com"
        );
    }

    #[test]
    fn header_safe_collapses_whitespace() {
        assert_eq!(header_safe("  Jo \t  Doe\u{0}  "), "Jo Doe");
        assert_eq!(header_safe("Jo"), "Jo");
    }
}
