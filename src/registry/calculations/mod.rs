//! Numeric business formulas
//!
//! Monetary results are rounded to cents, half away from zero. Rates are
//! percentages: `20.0` means 20 %.

pub mod assets;
pub mod commercial;
pub mod finance;
pub mod inventory;
pub mod terms;

use serde::Serialize;
use serde_json::Value;

use super::{Entry, EntryFn, EntryKind, FieldType, Input, RegistryError};
use crate::domain::BusinessModule;

pub use assets::{
    DepreciationSchedule, DepreciationYear, declining_balance_depreciation,
    straight_line_depreciation,
};
pub use commercial::{
    InvoiceLine, InvoiceTotals, LineTotal, Margin, VatAmounts, VatBucket, gross_margin,
    ht_from_ttc, invoice_totals, line_total, vat,
};
pub use finance::{
    LatePenalty, LoanAnnuity, days_sales_outstanding, late_payment_penalty, loan_annuity,
};
pub use inventory::{WeightedCost, reorder_point, weighted_average_cost};
pub use terms::payment_due_date;

/// Round to `decimals` places, half away from zero.
///
/// The value is first snapped to 1e-6 of the target unit so binary
/// artefacts such as `1.005 * 100 == 100.49999999999999` round the way a
/// person computing by hand would.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    let scaled = (value * factor * 1e6).round() / 1e6;
    // + 0.0 turns -0.0 into 0.0
    scaled.round() / factor + 0.0
}

pub fn round_amount(value: f64) -> f64 {
    round_to(value, 2)
}

pub(crate) fn non_negative(field: &str, value: f64) -> Result<f64, RegistryError> {
    if value < 0.0 {
        return Err(RegistryError::invalid(field, "must not be negative"));
    }
    Ok(value)
}

pub(crate) fn percentage(field: &str, value: f64) -> Result<f64, RegistryError> {
    if !(0.0..=100.0).contains(&value) {
        return Err(RegistryError::invalid(field, "must be between 0 and 100"));
    }
    Ok(value)
}

fn to_json<T: Serialize>(value: T) -> Result<Value, RegistryError> {
    Ok(serde_json::to_value(value)?)
}

fn calculation(name: &str, module: BusinessModule, description: &str, handler: EntryFn) -> Entry {
    Entry::new(EntryKind::Calculation, name, module, description, handler)
}

fn invoice_line(index: usize, value: &Value) -> Result<InvoiceLine, RegistryError> {
    let prefix = format!("lines[{}]", index);
    let fields = value
        .as_object()
        .ok_or_else(|| RegistryError::invalid(&prefix, "expected an object"))?;
    let input = Input::from_map(fields);

    let read = || -> Result<InvoiceLine, RegistryError> {
        Ok(InvoiceLine {
            quantity: input.f64_field("quantity")?,
            unit_price: input.f64_field("unit_price")?,
            vat_rate: input.f64_field("vat_rate")?,
            discount_percent: input.opt_f64_field("discount_percent")?.unwrap_or(0.0),
        })
    };
    read().map_err(|e| e.nested(&prefix))
}

pub(crate) fn entries() -> Vec<Entry> {
    use BusinessModule::*;
    use FieldType::{Array, Boolean, Date, Integer, Number};

    vec![
        calculation("vat", Accounting, "VAT amount and TTC total from an HT amount", |input| {
            to_json(vat(input.f64_field("amount_ht")?, input.f64_field("rate")?)?)
        })
        .required("amount_ht", Number)
        .required("rate", Number),
        calculation("ht_from_ttc", Accounting, "HT amount and VAT from a TTC amount", |input| {
            to_json(ht_from_ttc(
                input.f64_field("amount_ttc")?,
                input.f64_field("rate")?,
            )?)
        })
        .required("amount_ttc", Number)
        .required("rate", Number),
        calculation("line_total", Commercial, "Discounted total of one document line", |input| {
            to_json(line_total(
                input.f64_field("quantity")?,
                input.f64_field("unit_price")?,
                input.opt_f64_field("discount_percent")?.unwrap_or(0.0),
            )?)
        })
        .required("quantity", Number)
        .required("unit_price", Number)
        .optional("discount_percent", Number),
        calculation(
            "invoice_totals",
            Commercial,
            "Invoice HT/VAT/TTC totals with a per-rate VAT breakdown",
            |input| {
                let lines = input
                    .array_field("lines")?
                    .iter()
                    .enumerate()
                    .map(|(i, line)| invoice_line(i, line))
                    .collect::<Result<Vec<_>, _>>()?;
                let global = input
                    .opt_f64_field("global_discount_percent")?
                    .unwrap_or(0.0);
                to_json(invoice_totals(&lines, global)?)
            },
        )
        .required("lines", Array)
        .optional("global_discount_percent", Number),
        calculation("gross_margin", Commercial, "Margin, margin rate and markup rate", |input| {
            to_json(gross_margin(
                input.f64_field("selling_price")?,
                input.f64_field("cost_price")?,
            )?)
        })
        .required("selling_price", Number)
        .required("cost_price", Number),
        calculation("loan_annuity", Treasury, "Constant monthly payment of a loan", |input| {
            to_json(loan_annuity(
                input.f64_field("principal")?,
                input.f64_field("annual_rate")?,
                input.u32_field("months")?,
            )?)
        })
        .required("principal", Number)
        .required("annual_rate", Number)
        .required("months", Integer),
        calculation(
            "straight_line_depreciation",
            Accounting,
            "Linear depreciation schedule",
            |input| {
                to_json(straight_line_depreciation(
                    input.f64_field("cost")?,
                    input.opt_f64_field("residual_value")?.unwrap_or(0.0),
                    input.u32_field("years")?,
                )?)
            },
        )
        .required("cost", Number)
        .optional("residual_value", Number)
        .required("years", Integer),
        calculation(
            "declining_balance_depreciation",
            Accounting,
            "French declining-balance (dégressif) depreciation schedule",
            |input| {
                to_json(declining_balance_depreciation(
                    input.f64_field("cost")?,
                    input.u32_field("years")?,
                )?)
            },
        )
        .required("cost", Number)
        .required("years", Integer),
        calculation("payment_due_date", Accounting, "Due date from payment terms", |input| {
            let due = payment_due_date(
                input.date_field("invoice_date")?,
                input.u32_field("days")?,
                input.opt_bool_field("end_of_month")?.unwrap_or(false),
            )?;
            Ok(serde_json::json!({ "due_date": due.format("%Y-%m-%d").to_string() }))
        })
        .required("invoice_date", Date)
        .required("days", Integer)
        .optional("end_of_month", Boolean),
        calculation(
            "late_payment_penalty",
            Treasury,
            "Late payment interest plus the fixed recovery indemnity",
            |input| {
                to_json(late_payment_penalty(
                    input.f64_field("amount")?,
                    input.u32_field("days_late")?,
                    input.f64_field("annual_rate")?,
                    input
                        .opt_f64_field("fixed_indemnity")?
                        .unwrap_or(finance::FIXED_RECOVERY_INDEMNITY),
                )?)
            },
        )
        .required("amount", Number)
        .required("days_late", Integer)
        .required("annual_rate", Number)
        .optional("fixed_indemnity", Number),
        calculation(
            "weighted_average_cost",
            Inventory,
            "Weighted average unit cost (CUMP) after a receipt",
            |input| {
                to_json(weighted_average_cost(
                    input.f64_field("stock_quantity")?,
                    input.f64_field("stock_unit_cost")?,
                    input.f64_field("received_quantity")?,
                    input.f64_field("received_unit_cost")?,
                )?)
            },
        )
        .required("stock_quantity", Number)
        .required("stock_unit_cost", Number)
        .required("received_quantity", Number)
        .required("received_unit_cost", Number),
        calculation("reorder_point", Inventory, "Stock level triggering a reorder", |input| {
            let point = reorder_point(
                input.f64_field("daily_usage")?,
                input.f64_field("lead_time_days")?,
                input.opt_f64_field("safety_stock")?.unwrap_or(0.0),
            )?;
            Ok(serde_json::json!({ "reorder_point": point }))
        })
        .required("daily_usage", Number)
        .required("lead_time_days", Number)
        .optional("safety_stock", Number),
        calculation(
            "days_sales_outstanding",
            Treasury,
            "Average customer payment delay in days (DSO)",
            |input| {
                let dso = days_sales_outstanding(
                    input.f64_field("receivables")?,
                    input.f64_field("revenue")?,
                    input.opt_u32_field("period_days")?.unwrap_or(365),
                )?;
                Ok(serde_json::json!({ "dso": dso }))
            },
        )
        .required("receivables", Number)
        .required("revenue", Number)
        .optional("period_days", Integer),
    ]
}
