//! Shared utilities for the execfind codebase

use std::fmt;

/// A string wrapper that masks its contents in Debug/Display output.
/// Prevents accidental logging of API keys and other secrets.
#[derive(Clone)]
pub struct SecretString(String);

impl SecretString {
    pub fn new(s: String) -> Self {
        Self(s)
    }

    /// Intentionally access the raw secret value (for headers, URLs, etc.)
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl PartialEq<&str> for SecretString {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Cap a string at `max` bytes in place, backing up to the nearest char
/// boundary so multi-byte text never splits mid-character.
pub fn cap_bytes(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

/// Normalize a URL cell from the input table: trim, drop obvious junk values,
/// and prefix `https://` when no scheme is present.
pub fn clean_url(raw: &str) -> Option<String> {
    let url = raw.trim();
    if url.is_empty() || url.eq_ignore_ascii_case("nan") || url.eq_ignore_ascii_case("none") {
        return None;
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        Some(url.to_string())
    } else {
        Some(format!("https://{}", url))
    }
}

/// Extract the bare domain from a website URL (for domain-keyed APIs).
pub fn domain_of(url: &str) -> String {
    url.trim_start_matches("https://")
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap_or("")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_hides_in_debug() {
        let secret = SecretString::new("my-api-key-123".to_string());
        let debug_output = format!("{:?}", secret);
        assert_eq!(debug_output, "***");
        assert!(!debug_output.contains("my-api-key"));
    }

    #[test]
    fn test_secret_string_hides_in_display() {
        let secret = SecretString::new("my-api-key-123".to_string());
        assert_eq!(format!("{}", secret), "***");
    }

    #[test]
    fn test_secret_string_expose_returns_value() {
        let secret: SecretString = "test-key".to_string().into();
        assert_eq!(secret.expose(), "test-key");
        assert!(secret == "test-key");
    }

    #[test]
    fn test_clean_url_adds_scheme() {
        assert_eq!(
            clean_url("acme.com").as_deref(),
            Some("https://acme.com")
        );
        assert_eq!(
            clean_url("  http://acme.com ").as_deref(),
            Some("http://acme.com")
        );
    }

    #[test]
    fn test_clean_url_rejects_junk() {
        assert!(clean_url("").is_none());
        assert!(clean_url("   ").is_none());
        assert!(clean_url("nan").is_none());
        assert!(clean_url("None").is_none());
    }

    #[test]
    fn test_cap_bytes_respects_char_boundaries() {
        let mut s = "é".repeat(10);
        cap_bytes(&mut s, 5);
        // each é is two bytes; 5 lands mid-character and backs up to 4
        assert_eq!(s.len(), 4);
        assert_eq!(s, "éé");

        let mut short = "abc".to_string();
        cap_bytes(&mut short, 10);
        assert_eq!(short, "abc");
    }

    #[test]
    fn test_domain_of() {
        assert_eq!(domain_of("https://acme.com/about"), "acme.com");
        assert_eq!(domain_of("http://acme.com"), "acme.com");
        assert_eq!(domain_of("acme.com"), "acme.com");
    }
}
