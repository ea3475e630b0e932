//! HTML text helpers.

/// Escape text for use inside element content or a quoted attribute
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("X-Bacon"), "X-Bacon");
        assert_eq!(
            escape_html(r#"<b>"Molho" & 'picles'</b>"#),
            "&lt;b&gt;&quot;Molho&quot; &amp; &#39;picles&#39;&lt;/b&gt;"
        );
    }
}
