//! Escaping of the HTML-significant characters.
//!
//! Source text is escaped exactly once, at parser entry. Structural and
//! inline matching then run over the escaped form, so a literal `<` or `&`
//! typed by the user can never be mistaken for markup. Entities are decoded
//! again only when the inline formatter builds display text.

/// Escape `&`, `<` and `>` as `&amp;`, `&lt;` and `&gt;`.
pub fn escape_reserved(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / 8);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Decode the entity starting at byte offset `at`, if any.
///
/// Returns the decoded character and the entity's length in bytes. Only the
/// three entities produced by [`escape_reserved`] are recognized.
pub fn decode_entity_at(text: &str, at: usize) -> Option<(char, usize)> {
    let rest = text.get(at..)?;
    const ENTITIES: [(&str, char); 3] = [("&amp;", '&'), ("&lt;", '<'), ("&gt;", '>')];
    ENTITIES
        .iter()
        .find(|(entity, _)| rest.starts_with(entity))
        .map(|(entity, ch)| (*ch, entity.len()))
}

/// Reverse [`escape_reserved`].
#[cfg(test)]
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < text.len() {
        if let Some((ch, len)) = decode_entity_at(text, i) {
            out.push(ch);
            i += len;
            continue;
        }
        // `i` always sits on a char boundary.
        let ch = match text[i..].chars().next() {
            Some(ch) => ch,
            None => break,
        };
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_reserved() {
        assert_eq!(escape_reserved("a < b && c > d"), "a &lt; b &amp;&amp; c &gt; d");
        assert_eq!(escape_reserved("plain"), "plain");
    }

    #[test]
    fn test_escape_is_not_reapplied_to_entities() {
        // An entity typed by the user is escaped, not interpreted.
        assert_eq!(escape_reserved("&lt;"), "&amp;lt;");
        assert_eq!(unescape(&escape_reserved("&lt;")), "&lt;");
    }

    #[test]
    fn test_decode_entity_at() {
        let text = "x&gt;y";
        assert_eq!(decode_entity_at(text, 1), Some(('>', 4)));
        assert_eq!(decode_entity_at(text, 0), None);
        assert_eq!(decode_entity_at(text, 99), None);
    }

    #[test]
    fn test_unescape_roundtrip_with_unicode() {
        let source = "Müller <müller@example.com> & Söhne";
        assert_eq!(unescape(&escape_reserved(source)), source);
    }
}
