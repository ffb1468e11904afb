use regex::Regex;
use std::sync::LazyLock;

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A[^@\s]+@([^@\s]+\.)+[^@\s]+\z").expect("valid email regex"));

/// Trims and lowercases an address. Blank input stays blank so that
/// validation can report it.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[cfg(test)]
mod tests {
    use super::{is_valid_email, normalize_email};

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Ada@Example.com "), "ada@example.com");
        assert_eq!(normalize_email("   "), "");
    }

    #[test]
    fn email_format_requires_dotted_domain() {
        assert!(is_valid_email("test@fakemail.com"));
        assert!(is_valid_email("a.b+c@mail.example.co"));
        assert!(!is_valid_email("test@localhost"));
        assert!(!is_valid_email("no-at-sign.com"));
        assert!(!is_valid_email("two@@example.com"));
        assert!(!is_valid_email("spaced out@example.com"));
        assert!(!is_valid_email(""));
    }
}
