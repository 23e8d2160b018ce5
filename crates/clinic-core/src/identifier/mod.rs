//! Identifier classification
//!
//! Login and search accept one free-form text box that may hold an
//! email address, a phone number, a national id, or a plain username.
//! Classification is a pure function of the text (plus the configured
//! default region for phone numbers) and never fails - anything that
//! matches no stronger rule is a username.
//!
//! The rule order is significant and fixed: email, then phone, then
//! national id (only where the caller expects one), then username.

/// Classified kind of a free-form identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Email,
    Phone,
    NationalId,
    Username,
}

impl IdentifierKind {
    /// Query parameter name used for point search, e.g. `?phone=...`
    pub fn query_param(&self) -> &'static str {
        match self {
            IdentifierKind::Email => "email",
            IdentifierKind::Phone => "phone",
            IdentifierKind::NationalId => "nationalId",
            IdentifierKind::Username => "name",
        }
    }
}

/// Classify an identifier in a context that may expect a national id,
/// such as patient lookup
pub fn classify(text: &str, default_region: &str) -> IdentifierKind {
    let text = text.trim();

    if is_valid_email(text) {
        IdentifierKind::Email
    } else if is_valid_phone(text, default_region) {
        IdentifierKind::Phone
    } else if !text.is_empty() && text.chars().all(|c| c.is_ascii_digit()) {
        IdentifierKind::NationalId
    } else {
        IdentifierKind::Username
    }
}

/// Classify an identifier where a national id is not meaningful,
/// such as staff search and login
pub fn classify_search(text: &str, default_region: &str) -> IdentifierKind {
    let text = text.trim();

    if is_valid_email(text) {
        IdentifierKind::Email
    } else if is_valid_phone(text, default_region) {
        IdentifierKind::Phone
    } else {
        IdentifierKind::Username
    }
}

/// Syntactic email address check
///
/// Deliberately permissive: one `@`, a non-empty local part without
/// whitespace, and a domain with at least one interior dot. The server
/// remains the authority on deliverability.
pub fn is_valid_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };

    if local.is_empty() || local.chars().any(|c| c.is_whitespace()) {
        return false;
    }

    if domain.starts_with('.') || domain.ends_with('.') || domain.contains("..") {
        return false;
    }

    domain.contains('.')
        && domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Phone number check under the given default region
///
/// Accepts the international `+<country><subscriber>` form for any
/// region, and the national `0<subscriber>` form for the default
/// region. Spaces, dashes and parentheses are ignored.
pub fn is_valid_phone(text: &str, default_region: &str) -> bool {
    let digits: String = text
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();

    if let Some(rest) = digits.strip_prefix('+') {
        // International form: country code plus subscriber number
        return rest.len() >= 10 && rest.len() <= 14 && rest.chars().all(|c| c.is_ascii_digit());
    }

    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return false;
    }

    match default_region {
        // Kenyan national format: leading trunk zero plus nine digits
        "KE" => digits.len() == 10 && digits.starts_with('0'),
        // Other regions: accept a plausible national number length
        _ => (8..=12).contains(&digits.len()) && digits.starts_with('0'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_wins_over_everything() {
        assert_eq!(classify("a@b.com", "KE"), IdentifierKind::Email);
        assert_eq!(classify_search("jane.w@clinic.co.ke", "KE"), IdentifierKind::Email);
    }

    #[test]
    fn kenyan_national_phone_is_phone() {
        assert_eq!(classify("0712345678", "KE"), IdentifierKind::Phone);
        assert_eq!(classify_search("0712345678", "KE"), IdentifierKind::Phone);
    }

    #[test]
    fn international_phone_is_phone_in_any_region() {
        assert_eq!(classify("+254712345678", "KE"), IdentifierKind::Phone);
        assert_eq!(classify("+254 712 345 678", "US"), IdentifierKind::Phone);
    }

    #[test]
    fn plain_text_is_username() {
        assert_eq!(classify("jdoe", "KE"), IdentifierKind::Username);
        assert_eq!(classify_search("Jane Doe", "KE"), IdentifierKind::Username);
    }

    #[test]
    fn all_digit_text_is_national_id_only_in_id_context() {
        // Too short for a phone number, all digits
        assert_eq!(classify("12345678", "KE"), IdentifierKind::NationalId);
        // Search context never yields national id
        assert_eq!(classify_search("12345678", "KE"), IdentifierKind::Username);
    }

    #[test]
    fn malformed_emails_fall_through() {
        assert_eq!(classify("a@b", "KE"), IdentifierKind::Username);
        assert_eq!(classify("@b.com", "KE"), IdentifierKind::Username);
        assert_eq!(classify("a b@c.com", "KE"), IdentifierKind::Username);
        assert_eq!(classify("a@.com", "KE"), IdentifierKind::Username);
    }

    #[test]
    fn phone_parsing_never_panics_on_garbage() {
        assert_eq!(classify("+", "KE"), IdentifierKind::Username);
        assert_eq!(classify("07-12(34)56 78", "KE"), IdentifierKind::Phone);
        assert_eq!(classify("", "KE"), IdentifierKind::Username);
    }

    #[test]
    fn query_param_names_match_the_backend() {
        assert_eq!(IdentifierKind::Email.query_param(), "email");
        assert_eq!(IdentifierKind::Phone.query_param(), "phone");
        assert_eq!(IdentifierKind::NationalId.query_param(), "nationalId");
        assert_eq!(IdentifierKind::Username.query_param(), "name");
    }
}
