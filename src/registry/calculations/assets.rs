//! Fixed asset depreciation schedules

use serde::Serialize;

use super::{non_negative, round_amount};
use crate::registry::RegistryError;

/// Longest depreciation plan accepted, in years
pub const MAX_DEPRECIATION_YEARS: u32 = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepreciationYear {
    pub year: u32,
    pub amount: f64,
    pub accumulated: f64,
    pub net_book_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DepreciationSchedule {
    /// Declining-balance coefficient, absent for straight-line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coefficient: Option<f64>,
    /// Nominal annual rate in percent
    pub rate: f64,
    /// Regular yearly amount, straight-line only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_amount: Option<f64>,
    pub schedule: Vec<DepreciationYear>,
}

impl DepreciationSchedule {
    pub fn total(&self) -> f64 {
        self.schedule.last().map(|y| y.accumulated).unwrap_or(0.0)
    }
}

fn check_cost(cost: f64) -> Result<f64, RegistryError> {
    if cost <= 0.0 {
        return Err(RegistryError::invalid("cost", "must be positive"));
    }
    Ok(cost)
}

fn check_years(years: u32, min: u32) -> Result<u32, RegistryError> {
    if years < min {
        return Err(RegistryError::invalid(
            "years",
            format!("must be at least {}", min),
        ));
    }
    if years > MAX_DEPRECIATION_YEARS {
        return Err(RegistryError::invalid(
            "years",
            format!("must not exceed {}", MAX_DEPRECIATION_YEARS),
        ));
    }
    Ok(years)
}

/// Equal annual amounts; the last year absorbs rounding so the net book
/// value lands exactly on the residual value.
pub fn straight_line_depreciation(
    cost: f64,
    residual_value: f64,
    years: u32,
) -> Result<DepreciationSchedule, RegistryError> {
    check_cost(cost)?;
    non_negative("residual_value", residual_value)?;
    if residual_value >= cost {
        return Err(RegistryError::invalid(
            "residual_value",
            "must be lower than the cost",
        ));
    }
    check_years(years, 1)?;

    let base = cost - residual_value;
    let annual = round_amount(base / f64::from(years));
    let mut accumulated = 0.0;
    let mut schedule = Vec::with_capacity(years as usize);

    for year in 1..=years {
        let amount = if year == years {
            round_amount(base - accumulated)
        } else {
            annual
        };
        accumulated = round_amount(accumulated + amount);
        schedule.push(DepreciationYear {
            year,
            amount,
            accumulated,
            net_book_value: round_amount(cost - accumulated),
        });
    }

    Ok(DepreciationSchedule {
        coefficient: None,
        rate: round_amount(100.0 / f64::from(years)),
        annual_amount: Some(annual),
        schedule,
    })
}

/// Fiscal coefficient applied to the straight-line rate
fn declining_coefficient(years: u32) -> f64 {
    match years {
        0..=4 => 1.25,
        5..=6 => 1.75,
        _ => 2.25,
    }
}

/// French declining-balance depreciation. Each year takes the larger of the
/// declining amount and the straight-line amount over the remaining years;
/// once straight-line wins it is kept until the end.
pub fn declining_balance_depreciation(
    cost: f64,
    years: u32,
) -> Result<DepreciationSchedule, RegistryError> {
    check_cost(cost)?;
    check_years(years, 3)?;

    let coefficient = declining_coefficient(years);
    let rate = coefficient / f64::from(years);

    let mut net_book_value = round_amount(cost);
    let mut accumulated = 0.0;
    let mut linear: Option<f64> = None;
    let mut schedule = Vec::with_capacity(years as usize);

    for year in 1..=years {
        let remaining = f64::from(years - year + 1);
        let amount = if year == years {
            net_book_value
        } else if let Some(linear) = linear {
            linear
        } else {
            let declining = round_amount(net_book_value * rate);
            let straight = round_amount(net_book_value / remaining);
            if straight >= declining {
                linear = Some(straight);
                straight
            } else {
                declining
            }
        };

        accumulated = round_amount(accumulated + amount);
        net_book_value = round_amount(net_book_value - amount);
        schedule.push(DepreciationYear {
            year,
            amount,
            accumulated,
            net_book_value,
        });
    }

    Ok(DepreciationSchedule {
        coefficient: Some(coefficient),
        rate: round_amount(rate * 100.0),
        annual_amount: None,
        schedule,
    })
}
