//! Sales document arithmetic: VAT, line totals, invoice totals and margins

use serde::Serialize;
use std::collections::BTreeMap;

use super::{non_negative, percentage, round_amount, round_to};
use crate::registry::RegistryError;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VatAmounts {
    pub amount_ht: f64,
    pub vat_amount: f64,
    pub amount_ttc: f64,
}

/// VAT on an HT amount. Negative amounts are allowed (credit notes).
pub fn vat(amount_ht: f64, rate: f64) -> Result<VatAmounts, RegistryError> {
    non_negative("rate", rate)?;

    let amount_ht = round_amount(amount_ht);
    let vat_amount = round_amount(amount_ht * rate / 100.0);
    Ok(VatAmounts {
        amount_ht,
        vat_amount,
        amount_ttc: round_amount(amount_ht + vat_amount),
    })
}

/// Split a TTC amount into its HT base and VAT
pub fn ht_from_ttc(amount_ttc: f64, rate: f64) -> Result<VatAmounts, RegistryError> {
    non_negative("rate", rate)?;

    let amount_ttc = round_amount(amount_ttc);
    let amount_ht = round_amount(amount_ttc / (1.0 + rate / 100.0));
    Ok(VatAmounts {
        amount_ht,
        vat_amount: round_amount(amount_ttc - amount_ht),
        amount_ttc,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineTotal {
    pub gross: f64,
    pub discount_amount: f64,
    pub total_ht: f64,
}

pub fn line_total(
    quantity: f64,
    unit_price: f64,
    discount_percent: f64,
) -> Result<LineTotal, RegistryError> {
    non_negative("unit_price", unit_price)?;
    percentage("discount_percent", discount_percent)?;

    let gross = round_amount(quantity * unit_price);
    let discount_amount = round_amount(gross * discount_percent / 100.0);
    Ok(LineTotal {
        gross,
        discount_amount,
        total_ht: round_amount(gross - discount_amount),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct InvoiceLine {
    pub quantity: f64,
    pub unit_price: f64,
    pub vat_rate: f64,
    pub discount_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VatBucket {
    pub rate: f64,
    pub base: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvoiceTotals {
    pub total_ht: f64,
    pub total_vat: f64,
    pub total_ttc: f64,
    pub vat_breakdown: Vec<VatBucket>,
}

/// Invoice totals. VAT is computed once per rate on the summed bases, then
/// rounded, rather than rounded line by line.
pub fn invoice_totals(
    lines: &[InvoiceLine],
    global_discount_percent: f64,
) -> Result<InvoiceTotals, RegistryError> {
    percentage("global_discount_percent", global_discount_percent)?;

    // keyed by rate in hundredths of a percent so 5.5 and 5.50 share a bucket
    let mut buckets: BTreeMap<i64, (f64, f64)> = BTreeMap::new();

    for (i, line) in lines.iter().enumerate() {
        non_negative("vat_rate", line.vat_rate).map_err(|e| e.nested(&format!("lines[{}]", i)))?;
        let net = line_total(line.quantity, line.unit_price, line.discount_percent)
            .map_err(|e| e.nested(&format!("lines[{}]", i)))?
            .total_ht;
        let net = round_amount(net * (1.0 - global_discount_percent / 100.0));

        let key = (line.vat_rate * 100.0).round() as i64;
        let bucket = buckets.entry(key).or_insert((line.vat_rate, 0.0));
        bucket.1 = round_amount(bucket.1 + net);
    }

    let vat_breakdown: Vec<VatBucket> = buckets
        .into_values()
        .map(|(rate, base)| VatBucket {
            rate: round_to(rate, 2),
            base,
            amount: round_amount(base * rate / 100.0),
        })
        .collect();

    let total_ht = round_amount(vat_breakdown.iter().map(|b| b.base).sum());
    let total_vat = round_amount(vat_breakdown.iter().map(|b| b.amount).sum());

    Ok(InvoiceTotals {
        total_ht,
        total_vat,
        total_ttc: round_amount(total_ht + total_vat),
        vat_breakdown,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Margin {
    pub margin: f64,
    /// Margin over selling price, in percent
    pub margin_rate: Option<f64>,
    /// Margin over cost price, in percent
    pub markup_rate: Option<f64>,
}

pub fn gross_margin(selling_price: f64, cost_price: f64) -> Result<Margin, RegistryError> {
    non_negative("selling_price", selling_price)?;
    non_negative("cost_price", cost_price)?;

    let margin = round_amount(selling_price - cost_price);
    let rate_on = |base: f64| (base != 0.0).then(|| round_to(margin / base * 100.0, 2));

    Ok(Margin {
        margin,
        margin_rate: rate_on(selling_price),
        markup_rate: rate_on(cost_price),
    })
}
