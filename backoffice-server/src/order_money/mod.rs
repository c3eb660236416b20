//! Money calculation utilities using rust_decimal for precision
//!
//! All order money is `Decimal` with two fractional digits. Every derived
//! field (line total, subtotal, tax, total) is rounded half-up exactly once,
//! when it is produced; nothing unrounded is carried into the next step.
//! Storage uses integer cents, see [`to_cents`] / [`from_cents`].

use rust_decimal::prelude::*;
use serde::Serialize;

/// Rounding strategy for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Round a monetary value to 2dp, half away from zero
#[inline]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// Convert a monetary value to integer cents (rounded to 2dp first).
///
/// Returns `None` when the value does not fit in an `i64`.
pub fn to_cents(value: Decimal) -> Option<i64> {
    let mut rounded = round_money(value);
    rounded.rescale(DECIMAL_PLACES);
    i64::try_from(rounded.mantissa()).ok()
}

/// Convert integer cents back to a 2dp `Decimal`
#[inline]
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, DECIMAL_PLACES)
}

/// `round(unit_price * quantity, 2)`
pub fn line_total(unit_price: Decimal, quantity: i32) -> Decimal {
    round_money(unit_price * Decimal::from(quantity))
}

/// Sum of already-rounded line totals; empty yields 0.00
pub fn subtotal<I>(line_totals: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    round_money(line_totals.into_iter().fold(Decimal::ZERO, |acc, v| acc + v))
}

/// `round(subtotal * rate / 100, 2)` where `rate_percent` is e.g. `8` for 8%
pub fn tax_amount(subtotal: Decimal, rate_percent: Decimal) -> Decimal {
    round_money(subtotal * rate_percent / Decimal::ONE_HUNDRED)
}

/// Parse a tax rate leniently.
///
/// Accepts surrounding whitespace and a trailing `%`. Anything that is not a
/// non-negative number (including an absent value) becomes 0.
pub fn parse_rate_lenient(raw: Option<&str>) -> Decimal {
    let Some(raw) = raw else {
        return Decimal::ZERO;
    };
    match parse_rate_strict(raw) {
        Ok(rate) => rate,
        Err(reason) => {
            tracing::warn!(raw_value = %raw, %reason, "Unusable tax rate, treating as 0");
            Decimal::ZERO
        }
    }
}

/// Parse a tax rate strictly: a non-negative decimal, optional trailing `%`.
pub fn parse_rate_strict(raw: &str) -> Result<Decimal, String> {
    let trimmed = raw.trim();
    let numeric = trimmed.strip_suffix('%').unwrap_or(trimmed).trim_end();
    let rate = numeric
        .parse::<Decimal>()
        .map_err(|_| format!("'{raw}' is not a number"))?;
    if rate < Decimal::ZERO {
        return Err(format!("tax rate must be non-negative, got {rate}"));
    }
    Ok(rate.normalize())
}

/// The three derived monetary fields of an order, always written together
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct OrderTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total_amount: Decimal,
}

impl OrderTotals {
    /// Totals of an order with no items
    pub const ZERO: OrderTotals = OrderTotals {
        subtotal: Decimal::ZERO,
        tax_amount: Decimal::ZERO,
        total_amount: Decimal::ZERO,
    };

    /// Levy `rate_percent` on an already-known subtotal
    pub fn levy(subtotal: Decimal, rate_percent: Decimal) -> Self {
        let subtotal = round_money(subtotal);
        let tax_amount = tax_amount(subtotal, rate_percent);
        Self {
            subtotal,
            tax_amount,
            total_amount: round_money(subtotal + tax_amount),
        }
    }

    /// Derive totals from line totals and a tax rate
    pub fn from_line_totals<I>(line_totals: I, rate_percent: Decimal) -> Self
    where
        I: IntoIterator<Item = Decimal>,
    {
        Self::levy(subtotal(line_totals), rate_percent)
    }

    /// `total_amount == subtotal + tax_amount`
    pub fn is_consistent(&self) -> bool {
        self.total_amount == self.subtotal + self.tax_amount
    }
}

#[cfg(test)]
mod tests;
