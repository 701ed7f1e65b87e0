//! Formatting and normalization of identifiers and text.
//!
//! Every transformer is idempotent: feeding its output back in returns the
//! same string.

use serde_json::{Value, json};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use super::validators::{all_digits, compact, validate_iban};
use super::{Entry, EntryFn, EntryKind, FieldType, Input, RegistryError};
use crate::domain::BusinessModule;

/// Group characters by `size`, separated by single spaces
fn group(s: &str, sizes: &[usize]) -> String {
    let mut out = String::with_capacity(s.len() + sizes.len());
    let mut rest = s;
    for &size in sizes {
        if rest.is_empty() {
            break;
        }
        let (head, tail) = rest.split_at(size.min(rest.len()));
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(head);
        rest = tail;
    }
    out
}

/// IBAN in its printed form: groups of four
pub fn format_iban(raw: &str) -> Result<String, RegistryError> {
    let check = validate_iban(raw);
    let iban = check.normalized.ok_or_else(|| {
        RegistryError::invalid("value", check.error.unwrap_or_default())
    })?;

    let sizes = vec![4; iban.len().div_ceil(4)];
    Ok(group(&iban, &sizes))
}

pub fn format_siren(raw: &str) -> Result<String, RegistryError> {
    let siren = compact(raw, &['.', '-']);
    if siren.len() != 9 || !all_digits(&siren) {
        return Err(RegistryError::invalid("value", "SIREN must be exactly 9 digits"));
    }
    Ok(group(&siren, &[3, 3, 3]))
}

/// `XXX XXX XXX XXXXX`: SIREN groups then the establishment number
pub fn format_siret(raw: &str) -> Result<String, RegistryError> {
    let siret = compact(raw, &['.', '-']);
    if siret.len() != 14 || !all_digits(&siret) {
        return Err(RegistryError::invalid("value", "SIRET must be exactly 14 digits"));
    }
    Ok(group(&siret, &[3, 3, 3, 5]))
}

/// Drop whitespace, dots and hyphens, upper-case the rest
pub fn normalize_identifier(raw: &str) -> String {
    compact(raw, &['.', '-']).to_uppercase()
}

pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// ASCII-friendly slug: accents stripped, lower-case, `-` separated
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for c in raw.nfd().filter(|c| !is_combining_mark(*c)) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };

    // `ß` → `SS` would be lower-cased back to `Ss` on a second pass
    let mut upper = first.to_uppercase();
    let mut out = match (upper.next(), upper.next()) {
        (Some(single), None) => single.to_string(),
        _ => first.to_string(),
    };
    out.extend(chars.flat_map(char::to_lowercase));
    out
}

/// `jean-pierre  DE la fontaine` → `Jean-Pierre De La Fontaine`
pub fn title_case(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            word.split('-')
                .map(capitalize)
                .collect::<Vec<_>>()
                .join("-")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn currency_symbol(currency: &str) -> &str {
    match currency {
        "EUR" => "€",
        "USD" => "$",
        "GBP" => "£",
        other => other,
    }
}

/// Largest absolute amount `format_amount_fr` can print to the cent
pub const MAX_FORMATTED_AMOUNT: f64 = 1e13;

/// French amount formatting: `1 234,50 €`
pub fn format_amount_fr(amount: f64, currency: &str) -> Result<String, RegistryError> {
    if !amount.is_finite() || amount.abs() > MAX_FORMATTED_AMOUNT {
        return Err(RegistryError::invalid(
            "amount",
            format!("must be a finite number within ±{:e}", MAX_FORMATTED_AMOUNT),
        ));
    }

    let cents = (super::calculations::round_amount(amount).abs() * 100.0).round() as u64;
    let units = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(units.len() + units.len() / 3);
    for (i, digit) in units.chars().enumerate() {
        if i > 0 && (units.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    let currency = currency.trim().to_uppercase();
    Ok(format!(
        "{}{},{:02} {}",
        sign,
        grouped,
        fraction,
        currency_symbol(&currency)
    ))
}

fn transformer(name: &str, module: BusinessModule, description: &str, handler: EntryFn) -> Entry {
    Entry::new(EntryKind::Transformer, name, module, description, handler)
}

fn text(input: &Input<'_>, transform: fn(&str) -> String) -> Result<Value, RegistryError> {
    Ok(json!({ "value": transform(input.str_field("value")?) }))
}

fn checked(
    input: &Input<'_>,
    transform: fn(&str) -> Result<String, RegistryError>,
) -> Result<Value, RegistryError> {
    Ok(json!({ "value": transform(input.str_field("value")?)? }))
}

pub(crate) fn entries() -> Vec<Entry> {
    use BusinessModule::*;
    use FieldType::Number;

    let value = FieldType::String;

    vec![
        transformer("format_iban", Treasury, "IBAN grouped by four characters", |input| {
            checked(input, format_iban)
        })
        .required("value", value),
        transformer("format_siren", Commercial, "SIREN as XXX XXX XXX", |input| {
            checked(input, format_siren)
        })
        .required("value", value),
        transformer("format_siret", Commercial, "SIRET as XXX XXX XXX XXXXX", |input| {
            checked(input, format_siret)
        })
        .required("value", value),
        transformer(
            "normalize_identifier",
            Registry,
            "Identifier without separators, upper-cased",
            |input| text(input, normalize_identifier),
        )
        .required("value", value),
        transformer("normalize_email", Commercial, "Trimmed, lower-cased email", |input| {
            text(input, normalize_email)
        })
        .required("value", value),
        transformer("slugify", Registry, "URL slug without accents", |input| {
            text(input, slugify)
        })
        .required("value", value),
        transformer("title_case", Hr, "Capitalized person or company name", |input| {
            text(input, title_case)
        })
        .required("value", value),
        transformer(
            "format_amount_fr",
            Accounting,
            "Amount in French notation with currency symbol",
            |input| {
                let amount = input.f64_field("amount")?;
                let currency = input.opt_str_field("currency")?.unwrap_or("EUR");
                Ok(json!({ "value": format_amount_fr(amount, currency)? }))
            },
        )
        .required("amount", Number)
        .optional("currency", value),
    ]
}
