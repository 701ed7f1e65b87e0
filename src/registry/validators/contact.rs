//! Contact details: email, French postal codes and phone numbers

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Validation, all_digits, compact};

static EMAIL_LOCAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+$").expect("valid email local-part regex"));

static DOMAIN_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9](?:[A-Za-z0-9-]*[A-Za-z0-9])?$").expect("valid domain label regex")
});

static TLD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z]{2,}$").expect("valid TLD regex"));

const EMAIL_MAX_LEN: usize = 254;
const LOCAL_MAX_LEN: usize = 64;

pub fn validate_email(raw: &str) -> Validation {
    let email = raw.trim();

    if email.is_empty() {
        return Validation::invalid("email is empty");
    }
    if email.len() > EMAIL_MAX_LEN {
        return Validation::invalid(format!("email longer than {} characters", EMAIL_MAX_LEN));
    }

    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return Validation::invalid("email must contain exactly one @");
    };

    if local.is_empty() || local.len() > LOCAL_MAX_LEN {
        return Validation::invalid("email local part must be 1 to 64 characters");
    }
    if !EMAIL_LOCAL.is_match(local)
        || local.starts_with('.')
        || local.ends_with('.')
        || local.contains("..")
    {
        return Validation::invalid("email local part is malformed");
    }

    let labels: Vec<&str> = domain.split('.').collect();
    if labels.len() < 2 || !labels.iter().all(|l| DOMAIN_LABEL.is_match(l)) {
        return Validation::invalid("email domain is malformed");
    }
    if !labels.last().is_some_and(|tld| TLD.is_match(tld)) {
        return Validation::invalid("email top-level domain is malformed");
    }

    Validation::ok(format!("{}@{}", local, domain.to_lowercase()))
}

pub fn validate_postal_code_fr(raw: &str) -> Validation {
    let code = raw.trim();

    if code.is_empty() {
        return Validation::invalid("postal code is empty");
    }
    if code.len() != 5 || !all_digits(code) {
        return Validation::invalid("postal code must be exactly 5 digits");
    }

    // 20xxx covers Corsica (2A/2B departments)
    match code[..2].parse::<u8>() {
        Ok(1..=95) | Ok(97) | Ok(98) => Validation::ok(code),
        _ => Validation::invalid("postal code department prefix is unknown"),
    }
}

pub fn validate_phone_fr(raw: &str) -> Validation {
    let phone = compact(raw, &['.', '-', '(', ')']);

    if phone.is_empty() {
        return Validation::invalid("phone number is empty");
    }

    let subscriber = if let Some(rest) = phone.strip_prefix("+33") {
        rest
    } else if let Some(rest) = phone.strip_prefix("0033") {
        rest
    } else if phone.len() == 10 && phone.starts_with('0') {
        &phone[1..]
    } else {
        return Validation::invalid("phone number must start with 0, +33 or 0033");
    };

    if subscriber.len() != 9 || !all_digits(subscriber) {
        return Validation::invalid("phone number must have 9 digits after the prefix");
    }
    if subscriber.starts_with('0') {
        return Validation::invalid("phone number area digit must be 1 to 9");
    }

    Validation::ok(format!("+33{}", subscriber))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_valid() {
        assert!(validate_email("jean.dupont@example.fr").valid);
        assert!(validate_email("a+tag@sub.example.co.uk").valid);
        assert_eq!(
            validate_email("  Compta@AZALS.Example.COM ")
                .normalized
                .as_deref(),
            Some("Compta@azals.example.com")
        );
    }

    #[test]
    fn test_email_invalid() {
        for email in [
            "",
            "plainaddress",
            "a@b@example.com",
            "@example.com",
            ".jean@example.com",
            "jean.@example.com",
            "je..an@example.com",
            "jean@localhost",
            "jean@-example.com",
            "jean@example.c",
            "jean@example.123",
            "jéan@example.com",
        ] {
            assert!(!validate_email(email).valid, "{} should be invalid", email);
        }
    }

    #[test]
    fn test_email_length_limits() {
        let long_local = format!("{}@example.com", "a".repeat(65));
        assert!(!validate_email(&long_local).valid);

        let long_domain = format!("a@{}.com", "b".repeat(250));
        assert!(!validate_email(&long_domain).valid);
    }

    #[test]
    fn test_postal_code_fr() {
        assert!(validate_postal_code_fr("75008").valid);
        assert!(validate_postal_code_fr("20000").valid);
        assert!(validate_postal_code_fr("97400").valid);
        assert!(!validate_postal_code_fr("00100").valid);
        assert!(!validate_postal_code_fr("96000").valid);
        assert!(!validate_postal_code_fr("7500").valid);
        assert!(!validate_postal_code_fr("75 008").valid);
    }

    #[test]
    fn test_phone_fr() {
        assert_eq!(
            validate_phone_fr("01 23 45 67 89").normalized.as_deref(),
            Some("+33123456789")
        );
        assert_eq!(
            validate_phone_fr("+33 6.12.34.56.78").normalized.as_deref(),
            Some("+33612345678")
        );
        assert_eq!(
            validate_phone_fr("0033612345678").normalized.as_deref(),
            Some("+33612345678")
        );
        assert!(!validate_phone_fr("0012345678").valid);
        assert!(!validate_phone_fr("06123456").valid);
        assert!(!validate_phone_fr("+44 20 7946 0958").valid);
        assert!(!validate_phone_fr("").valid);
    }

    #[test]
    fn test_phone_normalization_is_stable() {
        let once = validate_phone_fr("06-12-34-56-78").normalized.unwrap();
        let twice = validate_phone_fr(&once).normalized.unwrap();
        assert_eq!(once, twice);
    }
}
