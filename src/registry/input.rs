//! Typed field readers over a JSON object payload.
//!
//! Entries read their arguments by name. Values may arrive as native JSON
//! types or as strings (CSV batches carry every cell as a string), so the
//! numeric and boolean readers accept both.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use super::RegistryError;

#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    fields: &'a Map<String, Value>,
}

impl<'a> Input<'a> {
    /// Borrow a payload, which must be a JSON object
    pub fn new(payload: &'a Value) -> Result<Self, RegistryError> {
        payload
            .as_object()
            .map(Self::from_map)
            .ok_or_else(|| RegistryError::InvalidPayload("expected a JSON object".to_string()))
    }

    pub fn from_map(fields: &'a Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Field value, treating explicit `null` and empty strings as absent
    fn raw(&self, field: &str) -> Option<&'a Value> {
        self.fields.get(field).filter(|v| match v {
            Value::Null => false,
            Value::String(s) => !s.trim().is_empty(),
            _ => true,
        })
    }

    pub fn str_field(&self, field: &str) -> Result<&'a str, RegistryError> {
        self.opt_str_field(field)?
            .ok_or_else(|| RegistryError::missing(field))
    }

    pub fn opt_str_field(&self, field: &str) -> Result<Option<&'a str>, RegistryError> {
        match self.raw(field) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(RegistryError::invalid(field, "expected a string")),
        }
    }

    pub fn f64_field(&self, field: &str) -> Result<f64, RegistryError> {
        self.opt_f64_field(field)?
            .ok_or_else(|| RegistryError::missing(field))
    }

    pub fn opt_f64_field(&self, field: &str) -> Result<Option<f64>, RegistryError> {
        let value = match self.raw(field) {
            None => return Ok(None),
            Some(Value::Number(n)) => n.as_f64(),
            // French exports use a decimal comma
            Some(Value::String(s)) => s.trim().replace(',', ".").parse::<f64>().ok(),
            Some(_) => None,
        };

        match value {
            Some(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(RegistryError::invalid(field, "expected a number")),
        }
    }

    pub fn u32_field(&self, field: &str) -> Result<u32, RegistryError> {
        self.opt_u32_field(field)?
            .ok_or_else(|| RegistryError::missing(field))
    }

    pub fn opt_u32_field(&self, field: &str) -> Result<Option<u32>, RegistryError> {
        let value = match self.raw(field) {
            None => return Ok(None),
            Some(Value::Number(n)) => n.as_u64(),
            Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
            Some(_) => None,
        };

        value
            .and_then(|v| u32::try_from(v).ok())
            .map(Some)
            .ok_or_else(|| RegistryError::invalid(field, "expected a non-negative integer"))
    }

    pub fn opt_bool_field(&self, field: &str) -> Result<Option<bool>, RegistryError> {
        match self.raw(field) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Some(true)),
                "false" | "0" | "no" => Ok(Some(false)),
                _ => Err(RegistryError::invalid(field, "expected a boolean")),
            },
            Some(_) => Err(RegistryError::invalid(field, "expected a boolean")),
        }
    }

    /// ISO date (`YYYY-MM-DD`)
    pub fn date_field(&self, field: &str) -> Result<NaiveDate, RegistryError> {
        let raw = self.str_field(field)?;
        NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
            .map_err(|_| RegistryError::invalid(field, "expected a date formatted YYYY-MM-DD"))
    }

    pub fn array_field(&self, field: &str) -> Result<&'a [Value], RegistryError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Err(RegistryError::missing(field)),
            Some(Value::Array(items)) => Ok(items.as_slice()),
            Some(_) => Err(RegistryError::invalid(field, "expected an array")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rejects_non_object_payload() {
        let payload = json!([1, 2, 3]);
        assert!(matches!(
            Input::new(&payload),
            Err(RegistryError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_numbers_accept_strings_and_decimal_comma() {
        let payload = json!({ "a": 12.5, "b": "7,25", "c": " 3 " });
        let input = Input::new(&payload).unwrap();

        assert_eq!(input.f64_field("a").unwrap(), 12.5);
        assert_eq!(input.f64_field("b").unwrap(), 7.25);
        assert_eq!(input.u32_field("c").unwrap(), 3);
    }

    #[test]
    fn test_missing_and_invalid_fields_are_named() {
        let payload = json!({ "rate": "abc", "months": -2, "empty": "  " });
        let input = Input::new(&payload).unwrap();

        let err = input.f64_field("amount").unwrap_err();
        assert!(matches!(err, RegistryError::MissingField { .. }));
        assert_eq!(err.field(), Some("amount"));

        let err = input.f64_field("rate").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidField { .. }));
        assert_eq!(err.field(), Some("rate"));

        assert!(input.u32_field("months").is_err());
        assert_eq!(input.opt_str_field("empty").unwrap(), None);
    }

    #[test]
    fn test_bool_and_date_readers() {
        let payload = json!({ "flag": "yes", "other": false, "date": "2026-02-28" });
        let input = Input::new(&payload).unwrap();

        assert_eq!(input.opt_bool_field("flag").unwrap(), Some(true));
        assert_eq!(input.opt_bool_field("other").unwrap(), Some(false));
        assert_eq!(input.opt_bool_field("absent").unwrap(), None);
        assert_eq!(
            input.date_field("date").unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
    }
}
