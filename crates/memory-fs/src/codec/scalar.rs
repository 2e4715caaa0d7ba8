//! Scalar emission and unquoting rules shared by the frontmatter
//! serializer and parser.

/// Quotes `s` when it would otherwise be ambiguous in the hand-rolled
/// frontmatter grammar: empty, all-whitespace, a YAML-ambiguous bare
/// token, a pure numeric form, or containing any of the reserved
/// punctuation characters.
pub fn quote_if_needed(s: &str) -> String {
    if needs_quoting(s) {
        quote(s)
    } else {
        s.to_string()
    }
}

fn needs_quoting(s: &str) -> bool {
    if s.is_empty() || s.trim().is_empty() {
        return true;
    }
    if is_ambiguous_token(s) {
        return true;
    }
    if is_pure_numeric(s) {
        return true;
    }
    s.chars().any(|c| matches!(c, ':' | '#' | '{' | '}' | '[' | ']' | ',' | '&' | '*' | '?' | '|' | '>' | '!' | '%' | '@' | '`'))
}

fn is_ambiguous_token(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "true" | "false" | "yes" | "no" | "on" | "off" | "null" | "~"
    )
}

fn is_pure_numeric(s: &str) -> bool {
    !s.is_empty() && s.parse::<f64>().is_ok()
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// Dual of `quote_if_needed`: strips surrounding quotes and unescapes if
/// present, otherwise returns the bare token unchanged.
pub fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.len() >= 2 && trimmed.starts_with('"') && trimmed.ends_with('"') {
        let inner = &trimmed[1..trimmed.len() - 1];
        let mut out = String::with_capacity(inner.len());
        let mut chars = inner.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                match chars.next() {
                    Some('\\') => out.push('\\'),
                    Some('"') => out.push('"'),
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => out.push('\\'),
                }
            } else {
                out.push(c);
            }
        }
        out
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quotes_ambiguous_tokens() {
        for tok in ["true", "FALSE", "yes", "no", "on", "off", "null", "~", "", "   ", "123", "4.5"] {
            assert!(needs_quoting(tok), "{tok:?} should need quoting");
        }
    }

    #[test]
    fn leaves_plain_words_bare() {
        assert!(!needs_quoting("hello"));
        assert!(!needs_quoting("typescript"));
    }

    #[test]
    fn quote_unquote_round_trip() {
        let s = "a:b \"quoted\" \\backslash";
        let quoted = quote(s);
        assert_eq!(unquote(&quoted), s);
    }
}
