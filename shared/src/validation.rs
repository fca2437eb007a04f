//! Validation helpers shared by the backend services
//!
//! These are pure checks over quantities and allocations; the services
//! translate the error strings into their bilingual error surface.

use rust_decimal::Decimal;

/// Validate that a quantity is strictly positive
pub fn validate_positive_quantity(qty: Decimal) -> Result<(), &'static str> {
    if qty <= Decimal::ZERO {
        return Err("Quantity must be greater than zero");
    }
    Ok(())
}

/// Validate that an amount is zero or positive
pub fn validate_non_negative_amount(amount: Decimal) -> Result<(), &'static str> {
    if amount < Decimal::ZERO {
        return Err("Amount cannot be negative");
    }
    Ok(())
}

/// Validate that the cited lot quantities cover a requested line quantity
///
/// Excess is allowed; the allocator consumes oldest lots first up to the
/// requested amount.
pub fn validate_allocation_coverage(
    requested: Decimal,
    cited: &[Decimal],
) -> Result<(), &'static str> {
    let total: Decimal = cited.iter().copied().sum();
    if total < requested {
        return Err("Cited lot quantities do not cover the requested quantity");
    }
    Ok(())
}

/// Check that applied payment slices plus the unapplied remainder add up to
/// the paid amount
pub fn payment_totals_consistent(
    monto_pagado: Decimal,
    aplicados: &[Decimal],
    saldo_restante: Decimal,
) -> bool {
    let applied: Decimal = aplicados.iter().copied().sum();
    applied + saldo_restante == monto_pagado
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn positive_quantity_rejects_zero_and_negative() {
        assert!(validate_positive_quantity(Decimal::ZERO).is_err());
        assert!(validate_positive_quantity(dec("-3")).is_err());
        assert!(validate_positive_quantity(dec("0.5")).is_ok());
    }

    #[test]
    fn coverage_allows_excess_but_not_shortfall() {
        assert!(validate_allocation_coverage(dec("120"), &[dec("100"), dec("50")]).is_ok());
        assert!(validate_allocation_coverage(dec("120"), &[dec("100"), dec("20")]).is_ok());
        assert!(validate_allocation_coverage(dec("120"), &[dec("100"), dec("19")]).is_err());
    }

    #[test]
    fn payment_totals_balance() {
        assert!(payment_totals_consistent(
            dec("350"),
            &[dec("200"), dec("150")],
            Decimal::ZERO
        ));
        assert!(payment_totals_consistent(dec("350"), &[dec("300")], dec("50")));
        assert!(!payment_totals_consistent(dec("350"), &[dec("300")], dec("40")));
    }
}
