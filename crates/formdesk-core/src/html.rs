//! HTML escaping and text truncation helpers.
//!
//! Every submitted value that ends up in a ticket body or subject passes through
//! [`escape_html`] exactly once.

/// Escape `& < > " '` for safe interpolation into HTML text or attribute values.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len() + input.len() / 8);
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Truncate to at most `max_chars` characters, never splitting a UTF-8 sequence.
pub fn truncate_chars(input: &str, max_chars: usize) -> &str {
    match input.char_indices().nth(max_chars) {
        Some((idx, _)) => &input[..idx],
        None => input,
    }
}

/// Truncate already-escaped text without leaving a dangling partial entity
/// (e.g. `&am`) at the cut point.
pub fn truncate_escaped(escaped: &str, max_chars: usize) -> String {
    let cut = truncate_chars(escaped, max_chars);
    if cut.len() == escaped.len() {
        return cut.to_string();
    }
    match cut.rfind('&') {
        Some(amp) if !cut[amp..].contains(';') => cut[..amp].to_string(),
        _ => cut.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROBE: &str = r#"<b onclick="x()">Tom & 'Jerry'</b>"#;

    #[test]
    fn escapes_all_five_special_characters() {
        let escaped = escape_html(PROBE);
        for raw in ['<', '>', '"', '\''] {
            assert!(!escaped.contains(raw), "raw {raw:?} left in {escaped}");
        }
        assert_eq!(
            escaped,
            "&lt;b onclick=&quot;x()&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn every_ampersand_starts_an_entity() {
        let escaped = escape_html(PROBE);
        for (idx, _) in escaped.match_indices('&') {
            let rest = &escaped[idx..];
            assert!(
                ["&amp;", "&lt;", "&gt;", "&quot;", "&#39;"]
                    .iter()
                    .any(|entity| rest.starts_with(entity)),
                "bare ampersand at {idx} in {escaped}"
            );
        }
    }

    #[test]
    fn escaping_twice_only_rewrites_ampersands() {
        let once = escape_html(PROBE);
        let twice = escape_html(&once);
        assert_eq!(twice, once.replace('&', "&amp;"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
    }

    #[test]
    fn truncate_escaped_drops_partial_entity() {
        let escaped = escape_html("abc&def");
        assert_eq!(escaped, "abc&amp;def");
        assert_eq!(truncate_escaped(&escaped, 5), "abc");
        assert_eq!(truncate_escaped(&escaped, 8), "abc&amp;");
        assert_eq!(truncate_escaped(&escaped, 100), "abc&amp;def");
    }
}
