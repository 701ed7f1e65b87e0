//! French company identifiers: SIREN, SIRET and intra-community VAT number

use super::{Validation, all_digits, compact, luhn_valid};

/// La Poste establishments share one SIREN and do not follow Luhn
const LA_POSTE_SIREN: &str = "356000000";

pub fn validate_siren(raw: &str) -> Validation {
    let siren = compact(raw, &['.', '-']);

    if siren.is_empty() {
        return Validation::invalid("SIREN is empty");
    }
    if siren.len() != 9 || !all_digits(&siren) {
        return Validation::invalid("SIREN must be exactly 9 digits");
    }
    if !luhn_valid(&siren) {
        return Validation::invalid("SIREN checksum mismatch");
    }

    Validation::ok(siren)
}

pub fn validate_siret(raw: &str) -> Validation {
    let siret = compact(raw, &['.', '-']);

    if siret.is_empty() {
        return Validation::invalid("SIRET is empty");
    }
    if siret.len() != 14 || !all_digits(&siret) {
        return Validation::invalid("SIRET must be exactly 14 digits");
    }

    let valid = if siret.starts_with(LA_POSTE_SIREN) {
        let digit_sum: u32 = siret.bytes().map(|b| u32::from(b - b'0')).sum();
        digit_sum % 5 == 0
    } else {
        luhn_valid(&siret)
    };

    if valid {
        Validation::ok(siret)
    } else {
        Validation::invalid("SIRET checksum mismatch")
    }
}

/// VAT key of a French company: `(12 + 3 * (siren mod 97)) mod 97`
pub fn vat_key_fr(siren: &str) -> Option<u32> {
    let siren: u64 = siren.parse().ok()?;
    Some(((12 + 3 * (siren % 97)) % 97) as u32)
}

pub fn validate_vat_fr(raw: &str) -> Validation {
    let vat = compact(raw, &['.', '-']).to_ascii_uppercase();

    if vat.is_empty() {
        return Validation::invalid("VAT number is empty");
    }
    let Some(digits) = vat.strip_prefix("FR") else {
        return Validation::invalid("French VAT number must start with FR");
    };
    if digits.len() != 11 || !all_digits(digits) {
        return Validation::invalid("French VAT number must be FR followed by 11 digits");
    }

    let (key, siren) = digits.split_at(2);
    if !luhn_valid(siren) {
        return Validation::invalid("SIREN part of the VAT number is invalid");
    }

    let expected = vat_key_fr(siren);
    if key.parse::<u32>().ok() != expected {
        return Validation::invalid("VAT key does not match the SIREN");
    }

    Validation::ok(vat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_siren() {
        assert!(validate_siren("732829320").valid);
        assert_eq!(
            validate_siren("443 061 841").normalized.as_deref(),
            Some("443061841")
        );
        assert!(!validate_siren("123456789").valid);
        assert!(!validate_siren("73282932").valid);
        assert!(!validate_siren("73282932A").valid);
        assert!(!validate_siren("").valid);
    }

    #[test]
    fn test_siret() {
        assert!(validate_siret("73282932000074").valid);
        assert!(validate_siret("443 061 841 00047").valid);
        assert_eq!(
            validate_siret("12345678901234").error.as_deref(),
            Some("SIRET checksum mismatch")
        );
        assert!(!validate_siret("7328293200007").valid);
    }

    #[test]
    fn test_siret_la_poste_exception() {
        // digit sum 45, fails Luhn
        assert!(validate_siret("35600000049837").valid);
        // Luhn-valid but digit sum 26
        assert!(!validate_siret("35600000000048").valid);
    }

    #[test]
    fn test_vat_fr() {
        assert_eq!(vat_key_fr("404833048"), Some(83));
        assert!(validate_vat_fr("FR83404833048").valid);
        assert_eq!(
            validate_vat_fr("fr 83 404 833 048").normalized.as_deref(),
            Some("FR83404833048")
        );
        assert_eq!(
            validate_vat_fr("FR84404833048").error.as_deref(),
            Some("VAT key does not match the SIREN")
        );
        assert!(!validate_vat_fr("DE83404833048").valid);
        assert!(!validate_vat_fr("FR8340483304").valid);
        assert!(!validate_vat_fr("FR00123456789").valid);
    }
}
