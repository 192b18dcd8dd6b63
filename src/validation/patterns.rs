//! Compiled patterns shared by the field rules.

use regex::Regex;
use std::sync::LazyLock;

pub static NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\p{L} '\-]{2,50}$").expect("name pattern"));

pub static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Indian mobile numbers: ten digits starting with 6-9.
pub static PHONE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[6-9][0-9]{9}$").expect("phone pattern"));

pub static PINCODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{5}$").expect("pincode pattern"));

pub static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^https?://[^\s/$.?#][^\s]*\.[^\s]+$").expect("url pattern")
});

pub static USERNAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{4,20}$").expect("username pattern"));

pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

pub const PASSWORD_MIN_LENGTH: usize = 8;

pub const TEXTAREA_MIN_LENGTH: usize = 10;

pub const DEFAULT_FILE_EXTENSIONS: [&str; 4] = ["pdf", "doc", "docx", "txt"];

pub fn is_strong_password(value: &str) -> bool {
    value.chars().count() >= PASSWORD_MIN_LENGTH
        && value.chars().any(|c| c.is_ascii_lowercase())
        && value.chars().any(|c| c.is_ascii_uppercase())
        && value.chars().any(|c| c.is_ascii_digit())
        && value.chars().any(|c| PASSWORD_SYMBOLS.contains(c))
}

/// Keys such as `name`, `fullName` or `writer_name` carry a person's name.
pub fn denotes_name(key: &str) -> bool {
    key.to_ascii_lowercase().ends_with("name")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_pattern() {
        assert!(NAME.is_match("Jane Doe"));
        assert!(NAME.is_match("O'Neil-Smith"));
        assert!(NAME.is_match("Zoë"));
        assert!(!NAME.is_match("J"));
        assert!(!NAME.is_match("Jane2"));
        assert!(!NAME.is_match(&"a".repeat(51)));
    }

    #[test]
    fn test_url_pattern() {
        assert!(URL.is_match("https://example.com/sample"));
        assert!(URL.is_match("http://docs.google.com/d/abc"));
        assert!(!URL.is_match("ftp://example.com"));
        assert!(!URL.is_match("example.com"));
        assert!(!URL.is_match("https://"));
    }

    #[test]
    fn test_password_strength() {
        assert!(is_strong_password("Secr3t!pass"));
        assert!(!is_strong_password("secr3t!pass"));
        assert!(!is_strong_password("SECR3T!PASS"));
        assert!(!is_strong_password("Secret!pass"));
        assert!(!is_strong_password("Secr3tpass"));
        assert!(!is_strong_password("S3t!a"));
    }

    #[test]
    fn test_denotes_name() {
        assert!(denotes_name("name"));
        assert!(denotes_name("fullName"));
        assert!(denotes_name("writer_name"));
        assert!(!denotes_name("topic"));
    }
}
