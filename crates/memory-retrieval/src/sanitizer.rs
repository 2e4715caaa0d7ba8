use regex::Regex;
use std::sync::OnceLock;

fn trailing_prefix_token() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+\*$").unwrap())
}

fn column_prefix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*:").unwrap())
}

fn operator_word(token: &str) -> bool {
    matches!(token.to_ascii_uppercase().as_str(), "AND" | "OR" | "NOT" | "NEAR")
}

/// Strips FTS5 syntax that would otherwise be interpreted as query
/// operators: unpaired `*`, the bareword operators AND/OR/NOT/NEAR,
/// column prefixes (`foo:`), and `{}()[]`. Quoted phrases and trailing
/// `word*` prefix tokens survive untouched.
pub fn sanitize_query(raw: &str) -> String {
    let mut tokens: Vec<String> = Vec::new();
    let mut rest = raw;

    while !rest.trim_start().is_empty() {
        rest = rest.trim_start();
        if let Some(stripped) = rest.strip_prefix('"') {
            if let Some(end) = stripped.find('"') {
                tokens.push(format!("\"{}\"", &stripped[..end]));
                rest = &stripped[end + 1..];
                continue;
            } else {
                // Unterminated quote: treat the rest of the line as a
                // bare (unquoted) run of tokens instead of swallowing it.
                rest = stripped;
                continue;
            }
        }

        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        let (token, remainder) = rest.split_at(end);
        rest = remainder;
        if let Some(sanitized) = sanitize_token(token) {
            tokens.push(sanitized);
        }
    }

    tokens.join(" ")
}

fn sanitize_token(token: &str) -> Option<String> {
    if operator_word(token) {
        return None;
    }

    let without_brackets: String = token.chars().filter(|c| !"{}()[]".contains(*c)).collect();
    if without_brackets.is_empty() {
        return None;
    }

    let without_prefix = column_prefix().replace(&without_brackets, "").into_owned();
    if without_prefix.is_empty() {
        return None;
    }

    let final_token = if trailing_prefix_token().is_match(&without_prefix) {
        without_prefix
    } else {
        without_prefix.replace('*', "")
    };

    if final_token.is_empty() {
        None
    } else {
        Some(final_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_unpaired_star_but_keeps_trailing_prefix() {
        assert_eq!(sanitize_query("wild*card *nope*"), "wildcard nope");
    }

    #[test]
    fn keeps_a_genuine_trailing_prefix_token() {
        assert_eq!(sanitize_query("cat* dog"), "cat* dog");
    }

    #[test]
    fn strips_bareword_operators() {
        assert_eq!(sanitize_query("cats AND dogs OR NOT birds"), "cats dogs birds");
    }

    #[test]
    fn strips_column_prefixes_and_brackets() {
        assert_eq!(sanitize_query("title:foo {bar} [baz] (qux)"), "foo bar baz qux");
    }

    #[test]
    fn preserves_quoted_phrases() {
        assert_eq!(sanitize_query("\"exact phrase\" AND extra"), "\"exact phrase\" extra");
    }

    #[test]
    fn all_noise_collapses_to_empty() {
        assert_eq!(sanitize_query("AND OR {} ()"), "");
    }
}
