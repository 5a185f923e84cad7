//! Regex utilities for the pattern resolver
//! Extracted to a separate crate for compilation optimization

use once_cell::sync::Lazy;
use regex::Regex;

/// Semantic version strings (`X.Y.Z` with optional pre-release/build suffix)
pub mod semver {
    use super::*;

    pub static SEMVER_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(
            r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)(?:-[0-9A-Za-z.-]+)?(?:\+[0-9A-Za-z.-]+)?$",
        )
        .expect("Invalid regex pattern")
    });

    /// Check whether `text` is a semantic version
    pub fn is_valid(text: &str) -> bool {
        SEMVER_PATTERN.is_match(text.trim())
    }
}

/// Owner e-mail addresses
pub mod email {
    use super::*;

    pub static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9-]+(?:\.[A-Za-z0-9-]+)*\.[A-Za-z]{2,}$")
            .expect("Invalid regex pattern")
    });

    pub fn is_valid(text: &str) -> bool {
        EMAIL_PATTERN.is_match(text.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semver_detection() {
        assert!(semver::is_valid("1.0.0"));
        assert!(semver::is_valid("2.10.3-rc.1"));
        assert!(semver::is_valid("0.1.0+build.5"));

        assert!(!semver::is_valid("1.0"));
        assert!(!semver::is_valid("v1.0.0"));
        assert!(!semver::is_valid("01.0.0"));
        assert!(!semver::is_valid("latest"));
    }

    #[test]
    fn test_email_detection() {
        assert!(email::is_valid("a@co.com"));
        assert!(email::is_valid("first.last+infra@example.co.uk"));

        assert!(!email::is_valid("platform-team"));
        assert!(!email::is_valid("a@co"));
        assert!(!email::is_valid("@co.com"));
    }
}
