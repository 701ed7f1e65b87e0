//! Generators: document numbers, derived identifiers and references

use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use super::validators::bank::mod97;
use super::validators::{validate_iban, validate_siren, vat_key_fr};
use super::{Entry, EntryFn, EntryKind, FieldType, Input, RegistryError};
use crate::domain::BusinessModule;

/// `PREFIX-YEAR-SEQUENCE`, sequence zero-padded to `padding` digits.
/// Longer sequences are never truncated.
pub fn document_number(
    prefix: &str,
    year: u32,
    sequence: u32,
    padding: u32,
) -> Result<String, RegistryError> {
    let prefix = prefix.trim();
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RegistryError::invalid("prefix", "must be non-empty and alphanumeric"));
    }
    if !(1900..=9999).contains(&year) {
        return Err(RegistryError::invalid("year", "must be between 1900 and 9999"));
    }
    if sequence == 0 {
        return Err(RegistryError::invalid("sequence", "must start at 1"));
    }
    if !(1..=10).contains(&padding) {
        return Err(RegistryError::invalid("padding", "must be between 1 and 10"));
    }

    Ok(format!(
        "{}-{}-{:0width$}",
        prefix.to_uppercase(),
        year,
        sequence,
        width = padding as usize
    ))
}

/// French intra-community VAT number of a company
pub fn vat_number_fr(siren: &str) -> Result<String, RegistryError> {
    let check = validate_siren(siren);
    let siren = check
        .normalized
        .ok_or_else(|| RegistryError::invalid("siren", check.error.unwrap_or_default()))?;
    let key = vat_key_fr(&siren).ok_or_else(|| RegistryError::invalid("siren", "not numeric"))?;

    Ok(format!("FR{:02}{}", key, siren))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IbanCheck {
    pub check_digits: String,
    pub iban: String,
}

/// Compute the two IBAN check digits for a country and BBAN
pub fn iban_check_digits(country: &str, bban: &str) -> Result<IbanCheck, RegistryError> {
    let country = country.trim().to_ascii_uppercase();
    if country.len() != 2 || !country.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(RegistryError::invalid("country", "must be a 2-letter country code"));
    }

    let bban: String = bban
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_uppercase();
    if bban.is_empty() || bban.len() > 30 || !bban.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RegistryError::invalid("bban", "must be 1 to 30 alphanumeric characters"));
    }

    let remainder = mod97(bban.chars().chain(country.chars()).chain("00".chars()))
        .ok_or_else(|| RegistryError::invalid("bban", "must be alphanumeric"))?;
    let check_digits = format!("{:02}", 98 - remainder);
    let iban = format!("{}{}{}", country, check_digits, bban);

    // The length table may still reject it (e.g. a short French BBAN)
    let validation = validate_iban(&iban);
    if !validation.valid {
        return Err(RegistryError::invalid(
            "bban",
            validation.error.unwrap_or_default(),
        ));
    }

    Ok(IbanCheck { check_digits, iban })
}

/// Random short reference, `PREFIX-` followed by 12 hex characters
pub fn reference(prefix: &str) -> Result<String, RegistryError> {
    let prefix = prefix.trim();
    if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(RegistryError::invalid("prefix", "must be non-empty and alphanumeric"));
    }

    let id = Uuid::new_v4().simple().to_string();
    Ok(format!("{}-{}", prefix.to_uppercase(), id[..12].to_uppercase()))
}

fn generator(name: &str, module: BusinessModule, description: &str, handler: EntryFn) -> Entry {
    Entry::new(EntryKind::Generator, name, module, description, handler)
}

fn document_number_entry(input: &Input<'_>) -> Result<Value, RegistryError> {
    let number = document_number(
        input.str_field("prefix")?,
        input.u32_field("year")?,
        input.u32_field("sequence")?,
        input.opt_u32_field("padding")?.unwrap_or(5),
    )?;
    Ok(json!({ "value": number }))
}

pub(crate) fn entries() -> Vec<Entry> {
    use BusinessModule::*;
    use FieldType::Integer;

    let text = FieldType::String;

    vec![
        generator(
            "document_number",
            Accounting,
            "Sequential document number such as FAC-2026-00042",
            document_number_entry,
        )
        .required("prefix", text)
        .required("year", Integer)
        .required("sequence", Integer)
        .optional("padding", Integer),
        generator("vat_number_fr", Accounting, "French VAT number from a SIREN", |input| {
            Ok(json!({ "value": vat_number_fr(input.str_field("siren")?)? }))
        })
        .required("siren", text),
        generator(
            "iban_check_digits",
            Treasury,
            "IBAN check digits for a country and BBAN",
            |input| {
                let check = iban_check_digits(input.str_field("country")?, input.str_field("bban")?)?;
                Ok(serde_json::to_value(check)?)
            },
        )
        .required("country", text)
        .required("bban", text),
        generator("reference", Registry, "Random short reference", |input| {
            let prefix = input.opt_str_field("prefix")?.unwrap_or("REF");
            Ok(json!({ "value": reference(prefix)? }))
        })
        .optional("prefix", text)
        .nondeterministic(),
    ]
}
