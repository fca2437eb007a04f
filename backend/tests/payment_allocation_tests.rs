//! Payment allocator tests
//!
//! Tests for oldest-first payment application:
//! - balances are settled in sale-date order
//! - applied slices plus the unapplied remainder equal the paid amount
//! - a sale is completada exactly when its balance reaches zero

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::{payment_totals_consistent, plan_payment_allocation, OutstandingSale};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn sale(saldo: &str) -> OutstandingSale {
    OutstandingSale {
        venta_id: Uuid::new_v4(),
        saldo: dec(saldo),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Two pending sales (200 then 300, oldest first), payment of 350:
    /// the first is settled, the second drops to 150
    #[test]
    fn test_payment_splits_across_sales() {
        let ventas = [sale("200"), sale("300")];
        let plan = plan_payment_allocation(dec("350"), &ventas);

        assert_eq!(plan.aplicaciones.len(), 2);

        assert_eq!(plan.aplicaciones[0].venta_id, ventas[0].venta_id);
        assert_eq!(plan.aplicaciones[0].saldo_previo, dec("200"));
        assert_eq!(plan.aplicaciones[0].pago_aplicado, dec("200"));
        assert_eq!(plan.aplicaciones[0].saldo_restante, Decimal::ZERO);

        assert_eq!(plan.aplicaciones[1].venta_id, ventas[1].venta_id);
        assert_eq!(plan.aplicaciones[1].saldo_previo, dec("300"));
        assert_eq!(plan.aplicaciones[1].pago_aplicado, dec("150"));
        assert_eq!(plan.aplicaciones[1].saldo_restante, dec("150"));

        assert_eq!(plan.restante, Decimal::ZERO);
    }

    /// A settled sale flips to completada, a partially paid one stays
    /// pendiente
    #[test]
    fn test_status_follows_balance() {
        let ventas = [sale("200"), sale("300")];
        let plan = plan_payment_allocation(dec("350"), &ventas);

        let completada = plan.aplicaciones[0].saldo_restante == Decimal::ZERO;
        let pendiente = plan.aplicaciones[1].saldo_restante > Decimal::ZERO;
        assert!(completada);
        assert!(pendiente);
    }

    /// Auto mode rejects amounts above the total outstanding debt before
    /// any balance changes
    #[test]
    fn test_auto_mode_amount_guard() {
        let ventas = [sale("200"), sale("300")];
        let total_deuda: Decimal = ventas.iter().map(|v| v.saldo).sum();

        let monto = dec("600");
        let rechazado = monto > total_deuda;
        assert!(rechazado);

        // Within the limit the full amount is applied.
        let plan = plan_payment_allocation(dec("500"), &ventas);
        assert_eq!(plan.restante, Decimal::ZERO);
        assert!(plan.aplicaciones.iter().all(|a| a.saldo_restante == Decimal::ZERO));
    }

    /// Explicit-sales mode demands the exact combined balance
    #[test]
    fn test_explicit_mode_exact_amount() {
        let ventas = [sale("120"), sale("80")];
        let total_deuda: Decimal = ventas.iter().map(|v| v.saldo).sum();

        assert_eq!(total_deuda, dec("200"));
        assert!(dec("150") != total_deuda);
        assert!(dec("200") == total_deuda);
    }

    /// An amount exceeding every balance leaves the excess unapplied
    #[test]
    fn test_unapplied_remainder() {
        let ventas = [sale("100")];
        let plan = plan_payment_allocation(dec("130"), &ventas);

        assert_eq!(plan.aplicaciones.len(), 1);
        assert_eq!(plan.aplicaciones[0].pago_aplicado, dec("100"));
        assert_eq!(plan.restante, dec("30"));
        assert!(payment_totals_consistent(dec("130"), &[dec("100")], dec("30")));
    }

    /// A payment smaller than the first balance touches only that sale
    #[test]
    fn test_partial_payment_touches_first_sale_only() {
        let ventas = [sale("200"), sale("300")];
        let plan = plan_payment_allocation(dec("50"), &ventas);

        assert_eq!(plan.aplicaciones.len(), 1);
        assert_eq!(plan.aplicaciones[0].saldo_restante, dec("150"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn sales_strategy() -> impl Strategy<Value = Vec<OutstandingSale>> {
        prop::collection::vec(1i64..=1000i64, 1..10).prop_map(|saldos| {
            saldos
                .into_iter()
                .map(|s| OutstandingSale {
                    venta_id: Uuid::new_v4(),
                    saldo: Decimal::from(s),
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Applied slices plus the unapplied remainder always equal the
        /// paid amount
        #[test]
        fn prop_allocation_totals_balance(
            ventas in sales_strategy(),
            monto in 1i64..=5000i64
        ) {
            let monto = Decimal::from(monto);
            let plan = plan_payment_allocation(monto, &ventas);

            let aplicados: Vec<Decimal> =
                plan.aplicaciones.iter().map(|a| a.pago_aplicado).collect();
            prop_assert!(payment_totals_consistent(monto, &aplicados, plan.restante));
        }

        /// No sale is ever over-settled
        #[test]
        fn prop_no_sale_over_settled(
            ventas in sales_strategy(),
            monto in 1i64..=5000i64
        ) {
            let plan = plan_payment_allocation(Decimal::from(monto), &ventas);

            for aplicacion in &plan.aplicaciones {
                prop_assert!(aplicacion.pago_aplicado <= aplicacion.saldo_previo);
                prop_assert!(aplicacion.saldo_restante >= Decimal::ZERO);
                prop_assert_eq!(
                    aplicacion.saldo_restante,
                    aplicacion.saldo_previo - aplicacion.pago_aplicado
                );
            }
        }

        /// Sales are settled strictly in the given (oldest-first) order:
        /// only the last touched sale may remain partially paid
        #[test]
        fn prop_only_last_allocation_partial(
            ventas in sales_strategy(),
            monto in 1i64..=5000i64
        ) {
            let plan = plan_payment_allocation(Decimal::from(monto), &ventas);

            if plan.aplicaciones.len() > 1 {
                for aplicacion in &plan.aplicaciones[..plan.aplicaciones.len() - 1] {
                    prop_assert_eq!(aplicacion.saldo_restante, Decimal::ZERO);
                }
            }
        }

        /// A remainder only exists when every balance was settled
        #[test]
        fn prop_remainder_implies_all_settled(
            ventas in sales_strategy(),
            monto in 1i64..=5000i64
        ) {
            let plan = plan_payment_allocation(Decimal::from(monto), &ventas);

            if plan.restante > Decimal::ZERO {
                prop_assert_eq!(plan.aplicaciones.len(), ventas.len());
                for aplicacion in &plan.aplicaciones {
                    prop_assert_eq!(aplicacion.saldo_restante, Decimal::ZERO);
                }
            }
        }
    }
}
