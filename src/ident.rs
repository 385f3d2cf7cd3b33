//! Identity derivation helpers: token splitting and pluralization for
//! service names and operation ids.

/// Split a camelCase / snake_case identifier into lowercase tokens.
/// `"getService"` and `"get_service"` both yield `["get", "service"]`.
pub(crate) fn tokens(name: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut current = String::new();
    for ch in name.chars() {
        if ch == '_' || ch == '-' {
            if !current.is_empty() {
                out.push(current.clone());
                current.clear();
            }
        } else if ch.is_uppercase() {
            if !current.is_empty() {
                out.push(current.clone());
                current.clear();
            }
            current.extend(ch.to_lowercase());
        } else {
            current.push(ch);
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// The leading verb token of an identifier, if any.
pub(crate) fn verb_token(name: &str) -> Option<String> {
    tokens(name).into_iter().next()
}

/// The subject token (second token) of an identifier, if any.
pub(crate) fn subject_token(name: &str) -> Option<String> {
    tokens(name).into_iter().nth(1)
}

/// Naive English pluralization, enough for resource/group names.
pub(crate) fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    let lower = word.to_lowercase();
    if lower.ends_with('s')
        || lower.ends_with('x')
        || lower.ends_with('z')
        || lower.ends_with("ch")
        || lower.ends_with("sh")
    {
        return format!("{word}es");
    }
    if let Some(stem) = word.strip_suffix('y') {
        let preceded_by_vowel = stem
            .chars()
            .last()
            .map(|c| "aeiou".contains(c.to_ascii_lowercase()))
            .unwrap_or(false);
        if !preceded_by_vowel {
            return format!("{stem}ies");
        }
    }
    format!("{word}s")
}
