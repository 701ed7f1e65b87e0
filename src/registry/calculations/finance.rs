//! Treasury formulas: loans, late payment penalties and DSO

use serde::Serialize;

use super::{non_negative, round_amount, round_to};
use crate::registry::RegistryError;

/// Fixed indemnity for recovery costs owed on any late B2B payment (EUR)
pub const FIXED_RECOVERY_INDEMNITY: f64 = 40.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoanAnnuity {
    pub payment: f64,
    pub total_paid: f64,
    pub total_interest: f64,
}

/// Constant monthly payment for a loan of `months` instalments
pub fn loan_annuity(
    principal: f64,
    annual_rate: f64,
    months: u32,
) -> Result<LoanAnnuity, RegistryError> {
    if principal <= 0.0 {
        return Err(RegistryError::invalid("principal", "must be positive"));
    }
    non_negative("annual_rate", annual_rate)?;
    if months == 0 {
        return Err(RegistryError::invalid("months", "must be at least 1"));
    }

    let n = f64::from(months);
    let monthly_rate = annual_rate / 100.0 / 12.0;
    let payment = if monthly_rate == 0.0 {
        principal / n
    } else {
        principal * monthly_rate / (1.0 - (1.0 + monthly_rate).powf(-n))
    };

    let payment = round_amount(payment);
    let total_paid = round_amount(payment * n);
    Ok(LoanAnnuity {
        payment,
        total_paid,
        total_interest: round_amount(total_paid - principal),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatePenalty {
    pub interest: f64,
    pub indemnity: f64,
    pub total: f64,
}

/// Simple interest over `days_late` (365-day year) plus the fixed indemnity
pub fn late_payment_penalty(
    amount: f64,
    days_late: u32,
    annual_rate: f64,
    fixed_indemnity: f64,
) -> Result<LatePenalty, RegistryError> {
    non_negative("amount", amount)?;
    non_negative("annual_rate", annual_rate)?;
    non_negative("fixed_indemnity", fixed_indemnity)?;

    if days_late == 0 {
        return Ok(LatePenalty {
            interest: 0.0,
            indemnity: 0.0,
            total: 0.0,
        });
    }

    let interest = round_amount(amount * annual_rate / 100.0 * f64::from(days_late) / 365.0);
    let indemnity = round_amount(fixed_indemnity);
    Ok(LatePenalty {
        interest,
        indemnity,
        total: round_amount(interest + indemnity),
    })
}

/// Days sales outstanding over a period, one decimal
pub fn days_sales_outstanding(
    receivables: f64,
    revenue: f64,
    period_days: u32,
) -> Result<f64, RegistryError> {
    non_negative("receivables", receivables)?;
    if revenue <= 0.0 {
        return Err(RegistryError::invalid("revenue", "must be positive"));
    }
    if period_days == 0 {
        return Err(RegistryError::invalid("period_days", "must be at least 1"));
    }

    Ok(round_to(receivables / revenue * f64::from(period_days), 1))
}
