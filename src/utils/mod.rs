pub mod retry;

use once_cell::sync::Lazy;
use regex::Regex;

// Compiled once at startup; the pattern is a compile-time constant in practice.
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("hardcoded email regex is invalid")
});

const MAX_INPUT_LEN: usize = 500;

/// Validate the general `local@domain.tld` shape. Anything without an `@`
/// and a dot in the domain part is rejected.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

/// Trim and cap free-text input before it is forwarded anywhere.
pub fn sanitize_input(input: &str) -> String {
    let trimmed = input.trim();
    trimmed.chars().take(MAX_INPUT_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_addresses() {
        assert!(is_valid_email("ok@example.com"));
        assert!(is_valid_email("first.last+tag@sub.example.org"));
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("missing-domain@"));
        assert!(!is_valid_email("no-dot@domain"));
        assert!(!is_valid_email("spaces in@example.com"));
    }

    #[test]
    fn sanitize_trims_and_caps() {
        assert_eq!(sanitize_input("  hola  "), "hola");
        let long = "x".repeat(600);
        assert_eq!(sanitize_input(&long).len(), 500);
    }
}
