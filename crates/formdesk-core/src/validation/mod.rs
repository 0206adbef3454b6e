//! Pure validation helpers shared by the intake pipeline and the geocode proxy.

use crate::html::{escape_html, truncate_escaped};
use regex::Regex;
use std::sync::LazyLock;

/// Maximum length of a sanitized ticket subject, in characters.
pub const MAX_SUBJECT_LENGTH: usize = 200;

/// Maximum length of a single ticket tag, in characters.
pub const MAX_TAG_LENGTH: usize = 100;

// local-part@domain.tld, no whitespace anywhere, TLD of two or more characters
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@.]{2,}$").expect("email pattern is a valid regex")
});

static POSTAL_CODE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9 \-]{2,20}$").expect("postal code pattern is a valid regex")
});

/// Conservative email shape check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Postal codes: 2-20 characters of letters, digits, spaces and hyphens.
pub fn is_valid_postal_code(postal_code: &str) -> bool {
    POSTAL_CODE_RE.is_match(postal_code)
}

/// Whether a value fits the per-field cap, counted in characters.
pub fn within_length(value: &str, max_chars: usize) -> bool {
    value.chars().nth(max_chars).is_none()
}

/// HTML-escape a client-supplied subject and cap it at [`MAX_SUBJECT_LENGTH`].
pub fn sanitize_subject(subject: &str) -> String {
    truncate_escaped(&escape_html(subject.trim()), MAX_SUBJECT_LENGTH)
}
