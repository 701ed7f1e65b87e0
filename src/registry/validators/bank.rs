//! Bank identifiers: IBAN and BIC

use super::{Validation, compact};

/// IBAN lengths for the countries we trade with most. Other countries only
/// get the generic 15..=34 bound.
const IBAN_LENGTHS: &[(&str, usize)] = &[
    ("AT", 20),
    ("BE", 16),
    ("CH", 21),
    ("DE", 22),
    ("ES", 24),
    ("FR", 27),
    ("GB", 22),
    ("IE", 22),
    ("IT", 27),
    ("LU", 20),
    ("MC", 27),
    ("NL", 18),
    ("PT", 25),
];

/// Remainder mod 97 of an alphanumeric string read as ISO 7064 digits
/// (letters count as 10..35). Computed piecewise, no big integers.
pub(crate) fn mod97(chars: impl Iterator<Item = char>) -> Option<u32> {
    let mut remainder = 0u32;
    for c in chars {
        let value = c.to_digit(36)?;
        remainder = if value < 10 {
            (remainder * 10 + value) % 97
        } else {
            (remainder * 100 + value) % 97
        };
    }
    Some(remainder)
}

pub fn validate_iban(raw: &str) -> Validation {
    let iban = compact(raw, &['-']).to_ascii_uppercase();

    if iban.is_empty() {
        return Validation::invalid("IBAN is empty");
    }
    if !iban.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Validation::invalid("IBAN contains invalid characters");
    }
    if !(15..=34).contains(&iban.len()) {
        return Validation::invalid(format!(
            "IBAN length {} outside 15..34",
            iban.len()
        ));
    }

    let (country, rest) = iban.split_at(2);
    if !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Validation::invalid("IBAN must start with a country code");
    }
    if !rest[..2].chars().all(|c| c.is_ascii_digit()) {
        return Validation::invalid("IBAN check digits must be numeric");
    }

    if let Some((_, expected)) = IBAN_LENGTHS.iter().find(|(code, _)| *code == country) {
        if iban.len() != *expected {
            return Validation::invalid(format!(
                "{} IBAN must be {} characters, got {}",
                country,
                expected,
                iban.len()
            ));
        }
    }

    let rearranged = iban[4..].chars().chain(iban[..4].chars());
    match mod97(rearranged) {
        Some(1) => Validation::ok(iban),
        _ => Validation::invalid("IBAN checksum mismatch"),
    }
}

pub fn validate_bic(raw: &str) -> Validation {
    let bic = compact(raw, &[]).to_ascii_uppercase();

    if bic.is_empty() {
        return Validation::invalid("BIC is empty");
    }
    if !bic.is_ascii() || !(bic.len() == 8 || bic.len() == 11) {
        return Validation::invalid("BIC must be 8 or 11 characters");
    }

    let bank = &bic[0..4];
    let country = &bic[4..6];
    let location = &bic[6..8];
    let branch = &bic[8..];

    if !bank.chars().all(|c| c.is_ascii_alphabetic()) {
        return Validation::invalid("BIC bank code must be letters");
    }
    if !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Validation::invalid("BIC country code must be letters");
    }
    if !location
        .chars()
        .chain(branch.chars())
        .all(|c| c.is_ascii_alphanumeric())
    {
        return Validation::invalid("BIC location and branch must be alphanumeric");
    }

    Validation::ok(bic)
}
