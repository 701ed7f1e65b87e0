//! Identifier and contact validators
//!
//! Every validator takes the raw user input and returns a [`Validation`]:
//! invalid input is a normal outcome, not an error. Registry errors only
//! arise when the payload has no `value` field.

pub mod bank;
pub mod company;
pub mod contact;

use serde::Serialize;
use serde_json::Value;

use super::{Entry, EntryFn, EntryKind, FieldType, Input, RegistryError};
use crate::domain::BusinessModule;

pub use bank::{validate_bic, validate_iban};
pub use company::{validate_siren, validate_siret, validate_vat_fr, vat_key_fr};
pub use contact::{validate_email, validate_phone_fr, validate_postal_code_fr};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Validation {
    pub valid: bool,
    /// Canonical form, present only when valid
    pub normalized: Option<String>,
    pub error: Option<String>,
}

impl Validation {
    pub fn ok(normalized: impl Into<String>) -> Self {
        Self {
            valid: true,
            normalized: Some(normalized.into()),
            error: None,
        }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            normalized: None,
            error: Some(reason.into()),
        }
    }
}

/// Remove the separators people type inside identifiers
pub(crate) fn compact(raw: &str, separators: &[char]) -> String {
    raw.chars()
        .filter(|c| !c.is_whitespace() && !separators.contains(c))
        .collect()
}

/// Luhn checksum over ASCII digits
pub(crate) fn luhn_valid(digits: &str) -> bool {
    let sum: u32 = digits
        .bytes()
        .rev()
        .enumerate()
        .map(|(i, b)| {
            let d = u32::from(b - b'0');
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();

    sum % 10 == 0
}

pub(crate) fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn run(input: &Input<'_>, validate: fn(&str) -> Validation) -> Result<Value, RegistryError> {
    let value = input.str_field("value")?;
    Ok(serde_json::to_value(validate(value))?)
}

fn validator(name: &str, module: BusinessModule, description: &str, handler: EntryFn) -> Entry {
    Entry::new(EntryKind::Validator, name, module, description, handler)
        .required("value", FieldType::String)
}

pub(crate) fn entries() -> Vec<Entry> {
    vec![
        validator(
            "iban",
            BusinessModule::Treasury,
            "International Bank Account Number (ISO 13616 mod-97)",
            |input| run(input, validate_iban),
        ),
        validator(
            "bic",
            BusinessModule::Treasury,
            "Bank Identifier Code (ISO 9362)",
            |input| run(input, validate_bic),
        ),
        validator(
            "siren",
            BusinessModule::Commercial,
            "French company identifier (9 digits, Luhn)",
            |input| run(input, validate_siren),
        ),
        validator(
            "siret",
            BusinessModule::Commercial,
            "French establishment identifier (14 digits, Luhn)",
            |input| run(input, validate_siret),
        ),
        validator(
            "vat_fr",
            BusinessModule::Accounting,
            "French intra-community VAT number",
            |input| run(input, validate_vat_fr),
        ),
        validator(
            "email",
            BusinessModule::Commercial,
            "Email address",
            |input| run(input, validate_email),
        ),
        validator(
            "postal_code_fr",
            BusinessModule::Commercial,
            "French postal code",
            |input| run(input, validate_postal_code_fr),
        ),
        validator(
            "phone_fr",
            BusinessModule::Commercial,
            "French phone number, normalized to E.164",
            |input| run(input, validate_phone_fr),
        ),
    ]
}
