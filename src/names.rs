//! Identifier casefolding and hostname checks.
//!
//! Oper names and TLS listener names are used as lookup keys, so they are
//! folded to a canonical lowercase form first. Names that could be confused
//! with masks, prefixes or protocol separators are rejected outright.

use thiserror::Error;

/// Characters that may not appear anywhere in a name.
///
/// Space and `,` separate targets, `*` and `?` are mask wildcards, `.` marks
/// a server name, `!` and `@` split a hostmask and `:` starts a trailing
/// parameter.
const FORBIDDEN_CHARS: &[char] = &[' ', ',', '*', '?', '.', '!', '@', ':'];

/// Characters that may not start a name (channel and membership prefixes).
const FORBIDDEN_LEADING: &[char] = &['#', '-', '~', '&', '%', '+'];

/// Errors from [`casefold_name`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("name is empty")]
    Empty,
    #[error("name {name:?} contains invalid character {ch:?}")]
    InvalidCharacter { name: String, ch: char },
    #[error("name {name:?} may not start with {ch:?}")]
    InvalidLeading { name: String, ch: char },
}

/// Fold a string to lowercase using full Unicode case mapping.
pub fn casefold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Casefold a name, rejecting ones that are not valid identifiers.
pub fn casefold_name(name: &str) -> Result<String, NameError> {
    let folded = casefold(name);

    let Some(first) = folded.chars().next() else {
        return Err(NameError::Empty);
    };

    if let Some(ch) = folded
        .chars()
        .find(|c| FORBIDDEN_CHARS.contains(c) || c.is_control() || c.is_whitespace())
    {
        return Err(NameError::InvalidCharacter {
            name: name.to_string(),
            ch,
        });
    }

    if FORBIDDEN_LEADING.contains(&first) {
        return Err(NameError::InvalidLeading {
            name: name.to_string(),
            ch: first,
        });
    }

    Ok(folded)
}

/// Validate hostname per RFC 952/1123 rules.
pub fn is_hostname(hostname: &str) -> bool {
    if hostname.is_empty() || hostname.len() > 253 {
        return false;
    }

    hostname.split('.').all(|label| {
        !label.is_empty()
            && label.len() <= 63
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    })
}
