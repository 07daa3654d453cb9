//! Money helpers.
//!
//! Amounts are exact decimals; rounding happens only where a document total is
//! produced.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Round an amount to cents, half away from zero.
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// `rate` percent of `amount`, rounded to cents.
pub fn percent_of(amount: Decimal, rate: Decimal) -> Decimal {
    round_money(amount * rate / Decimal::ONE_HUNDRED)
}

/// Line total: quantity times unit price, rounded to cents.
pub fn line_total(quantity: Decimal, unit_price: Decimal) -> Decimal {
    round_money(quantity * unit_price)
}

/// Subtotal, tax and grand total of an order document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentTotals {
    pub subtotal: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl DocumentTotals {
    /// Totals over already-rounded line totals with `tax_rate` percent applied
    /// to the subtotal.
    pub fn from_lines(line_totals: impl IntoIterator<Item = Decimal>, tax_rate: Decimal) -> Self {
        let subtotal: Decimal = line_totals.into_iter().sum();
        let tax_amount = percent_of(subtotal, tax_rate);
        Self {
            subtotal,
            tax_amount,
            total: subtotal + tax_amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn document_totals_apply_rate_once_on_subtotal() {
        let lines = [line_total(dec!(3), dec!(4.99)), line_total(dec!(0.5), dec!(1.25))];
        assert_eq!(lines, [dec!(14.97), dec!(0.63)]);
        let totals = DocumentTotals::from_lines(lines, dec!(23));
        assert_eq!(totals.subtotal, dec!(15.60));
        assert_eq!(totals.tax_amount, dec!(3.59));
        assert_eq!(totals.total, dec!(19.19));
    }

    #[test]
    fn empty_document_is_zero() {
        assert_eq!(
            DocumentTotals::from_lines(Vec::<Decimal>::new(), dec!(23)),
            DocumentTotals::default()
        );
    }

    #[test]
    fn rounds_half_away_from_zero() {
        assert_eq!(round_money(dec!(1.005)), dec!(1.01));
        assert_eq!(round_money(dec!(-1.005)), dec!(-1.01));
        assert_eq!(round_money(dec!(2.004)), dec!(2.00));
    }

    #[test]
    fn vat_on_subtotal() {
        assert_eq!(percent_of(dec!(100), dec!(23)), dec!(23.00));
        assert_eq!(percent_of(dec!(19.99), dec!(6)), dec!(1.20));
    }
}
