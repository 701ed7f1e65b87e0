//! Stock valuation and replenishment

use serde::Serialize;

use super::{non_negative, round_amount, round_to};
use crate::registry::RegistryError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedCost {
    pub quantity: f64,
    /// Unit cost, four decimals
    pub unit_cost: f64,
    pub total_value: f64,
}

/// Weighted average unit cost (CUMP) after receiving goods
pub fn weighted_average_cost(
    stock_quantity: f64,
    stock_unit_cost: f64,
    received_quantity: f64,
    received_unit_cost: f64,
) -> Result<WeightedCost, RegistryError> {
    non_negative("stock_quantity", stock_quantity)?;
    non_negative("stock_unit_cost", stock_unit_cost)?;
    non_negative("received_quantity", received_quantity)?;
    non_negative("received_unit_cost", received_unit_cost)?;

    let quantity = stock_quantity + received_quantity;
    let total = stock_quantity * stock_unit_cost + received_quantity * received_unit_cost;
    let unit_cost = if quantity == 0.0 {
        0.0
    } else {
        round_to(total / quantity, 4)
    };

    Ok(WeightedCost {
        quantity,
        unit_cost,
        total_value: round_amount(total),
    })
}

pub fn reorder_point(
    daily_usage: f64,
    lead_time_days: f64,
    safety_stock: f64,
) -> Result<f64, RegistryError> {
    non_negative("daily_usage", daily_usage)?;
    non_negative("lead_time_days", lead_time_days)?;
    non_negative("safety_stock", safety_stock)?;

    Ok(round_to(daily_usage * lead_time_days + safety_stock, 2))
}
