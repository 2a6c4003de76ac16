//! Tokenizer and flag-map parser for one command's parenthesized argument
//! string, e.g. the `-L5 -restore -seq "XorConstant -> ReverseBuffer"` in
//! `munge(-L5 -restore -seq "XorConstant -> ReverseBuffer")`.

use std::collections::BTreeMap;

/// Split `input` on whitespace, honoring `"..."` quoting so a value like a
/// sequence text form (which itself contains spaces and `->`) survives as
/// one token.
#[must_use]
pub fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' => in_quotes = !in_quotes,
            c if c.is_whitespace() && !in_quotes => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Parse tokens of the form `-FlagNNN` (name directly fused to a numeric
/// value, e.g. `-L5`), `-Flag value` (space-separated), or bare `-Flag`
/// (boolean, maps to `"true"`) into a name -> value map. Flag names are
/// stored without their leading `-`.
#[must_use]
pub fn parse_flags(tokens: &[String]) -> BTreeMap<String, String> {
    let mut map = BTreeMap::new();
    let mut i = 0;
    while i < tokens.len() {
        let token = &tokens[i];
        if let Some(rest) = token.strip_prefix('-') {
            if let Some((name, value)) = split_fused_numeric(rest) {
                map.insert(name.to_string(), value.to_string());
                i += 1;
                continue;
            }
            let takes_value = tokens.get(i + 1).is_some_and(|next| !next.starts_with('-'));
            if takes_value {
                map.insert(rest.to_string(), tokens[i + 1].clone());
                i += 2;
            } else {
                map.insert(rest.to_string(), "true".to_string());
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    map
}

/// Split `-L5`-style fused flag text into its alphabetic name and numeric
/// value. Returns `None` for flags with no fused digits (`-restore`) so the
/// caller falls back to the boolean/space-separated cases.
fn split_fused_numeric(rest: &str) -> Option<(&str, &str)> {
    let split_at = rest.find(|c: char| c.is_ascii_digit())?;
    let (name, value) = rest.split_at(split_at);
    (!name.is_empty() && !value.is_empty() && name.chars().all(char::is_alphabetic)).then_some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_respects_quotes() {
        let tokens = tokenize(r#"-L5 -seq "XorConstant -> ReverseBuffer" -restore"#);
        assert_eq!(tokens, vec!["-L5", "-seq", "XorConstant -> ReverseBuffer", "-restore"]);
    }

    #[test]
    fn parse_flags_handles_bool_and_valued() {
        let tokens = tokenize("-L5 -restore -text hello");
        let flags = parse_flags(&tokens);
        assert_eq!(flags.get("L").map(String::as_str), Some("5"));
        assert_eq!(flags.get("restore").map(String::as_str), Some("true"));
        assert_eq!(flags.get("text").map(String::as_str), Some("hello"));
    }

    #[test]
    fn parse_flags_handles_multi_digit_fused_values() {
        let tokens = tokenize("-L12 -P100");
        let flags = parse_flags(&tokens);
        assert_eq!(flags.get("L").map(String::as_str), Some("12"));
        assert_eq!(flags.get("P").map(String::as_str), Some("100"));
    }

    #[test]
    fn parse_flags_keeps_digit_free_booleans_as_bool() {
        let tokens = tokenize("-no-cutlist -remove-inverse");
        let flags = parse_flags(&tokens);
        assert_eq!(flags.get("no-cutlist").map(String::as_str), Some("true"));
        assert_eq!(flags.get("remove-inverse").map(String::as_str), Some("true"));
    }
}
