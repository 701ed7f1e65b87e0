//! Payment terms

use chrono::{Datelike, Days, NaiveDate};

use crate::registry::RegistryError;

/// Longest payment term allowed between businesses, in days
pub const MAX_PAYMENT_DAYS: u32 = 60;

fn last_day_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)?.pred_opt()
}

/// Due date for "N days" or, with `end_of_month`, "N days end of month"
/// terms: add the days, then move to the last day of the resulting month.
pub fn payment_due_date(
    invoice_date: NaiveDate,
    days: u32,
    end_of_month: bool,
) -> Result<NaiveDate, RegistryError> {
    if days > MAX_PAYMENT_DAYS {
        return Err(RegistryError::invalid(
            "days",
            format!("payment terms cannot exceed {} days", MAX_PAYMENT_DAYS),
        ));
    }

    let due = invoice_date
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or_else(|| RegistryError::invalid("invoice_date", "date out of range"))?;

    if end_of_month {
        last_day_of_month(due)
            .ok_or_else(|| RegistryError::invalid("invoice_date", "date out of range"))
    } else {
        Ok(due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_net_days() {
        assert_eq!(
            payment_due_date(date(2026, 1, 15), 30, false).unwrap(),
            date(2026, 2, 14)
        );
        assert_eq!(
            payment_due_date(date(2026, 3, 1), 0, false).unwrap(),
            date(2026, 3, 1)
        );
    }

    #[test]
    fn test_end_of_month() {
        assert_eq!(
            payment_due_date(date(2026, 1, 15), 30, true).unwrap(),
            date(2026, 2, 28)
        );
        assert_eq!(
            payment_due_date(date(2028, 1, 31), 0, true).unwrap(),
            date(2028, 1, 31)
        );
        assert_eq!(
            payment_due_date(date(2026, 11, 20), 45, true).unwrap(),
            date(2027, 1, 31)
        );
        assert_eq!(
            payment_due_date(date(2028, 1, 20), 30, true).unwrap(),
            date(2028, 2, 29)
        );
    }

    #[test]
    fn test_statutory_cap() {
        let err = payment_due_date(date(2026, 1, 1), 90, false).unwrap_err();
        assert_eq!(err.field(), Some("days"));
    }
}
