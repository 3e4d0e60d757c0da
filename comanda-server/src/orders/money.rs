//! Money calculation helpers
//!
//! All arithmetic runs through `Decimal` (2 places, half-up) and
//! converts to `f64` only at the storage/serialization edge.

use rust_decimal::prelude::*;

const DECIMAL_PLACES: u32 = 2;

fn to_decimal(value: f64) -> Decimal {
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or(0.0)
}

/// Round a monetary value to 2 decimal places, half-up
pub fn round2(value: f64) -> f64 {
    to_f64(to_decimal(value))
}

/// Line total for one item: quantity × price-at-order
pub fn line_total(quantity: i32, price_at_order: f64) -> f64 {
    to_f64(Decimal::from(quantity) * to_decimal(price_at_order))
}

/// Order total over (quantity, price-at-order) pairs
///
/// Callers pass non-cancelled items only; summation happens in Decimal
/// so repeated recomputation cannot drift.
pub fn order_total(items: impl IntoIterator<Item = (i32, f64)>) -> f64 {
    let sum = items
        .into_iter()
        .map(|(quantity, price)| Decimal::from(quantity) * to_decimal(price))
        .sum::<Decimal>();
    to_f64(sum)
}

/// Tax amount for a bill at the configured rate
pub fn tax_amount(subtotal: f64, rate: f64) -> f64 {
    to_f64(to_decimal(subtotal) * to_decimal(rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_totals_round_half_up() {
        assert_eq!(line_total(3, 1.005), 3.02);
        assert_eq!(line_total(2, 10.0), 20.0);
    }

    #[test]
    fn order_total_sums_in_decimal() {
        // 0.1 + 0.2 style drift must not leak into totals
        let total = order_total(vec![(1, 0.1), (1, 0.2)]);
        assert_eq!(total, 0.3);
    }

    #[test]
    fn tax_at_ten_percent() {
        assert_eq!(tax_amount(20.0, 0.10), 2.0);
        assert_eq!(tax_amount(9.99, 0.10), 1.0);
    }

    #[test]
    fn empty_order_totals_zero() {
        assert_eq!(order_total(std::iter::empty()), 0.0);
    }
}
