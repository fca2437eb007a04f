//! Sales engine tests
//!
//! Tests for FIFO lot allocation:
//! - oldest-dated lots are consumed first
//! - cited excess is left untouched
//! - consumed quantities always cover the requested quantity exactly

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

use shared::{plan_line_allocation, validate_allocation_coverage, LotCandidate};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, 8, 0, 0).unwrap()
}

fn candidate(cantidad: &str, fecha: DateTime<Utc>) -> LotCandidate {
    LotCandidate {
        lote_id: Uuid::new_v4(),
        cantidad_citada: dec(cantidad),
        fecha_produccion: fecha,
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Two lots, requested quantity spans both: the older lot is drained
    /// before the newer one is touched
    #[test]
    fn test_fifo_spans_lots_oldest_first() {
        let l1 = candidate("100", day(1));
        let l2 = candidate("50", day(2));
        let plan = plan_line_allocation(dec("120"), &[l2.clone(), l1.clone()]);

        assert_eq!(plan.faltante, Decimal::ZERO);
        assert_eq!(plan.consumos.len(), 2);
        assert_eq!(plan.consumos[0].lote_id, l1.lote_id);
        assert_eq!(plan.consumos[0].cantidad, dec("100"));
        assert_eq!(plan.consumos[1].lote_id, l2.lote_id);
        assert_eq!(plan.consumos[1].cantidad, dec("20"));
    }

    /// A single lot covering the request is the only one consumed
    #[test]
    fn test_single_lot_covers_request() {
        let l1 = candidate("100", day(1));
        let l2 = candidate("50", day(2));
        let plan = plan_line_allocation(dec("80"), &[l1.clone(), l2]);

        assert_eq!(plan.consumos.len(), 1);
        assert_eq!(plan.consumos[0].lote_id, l1.lote_id);
        assert_eq!(plan.consumos[0].cantidad, dec("80"));
    }

    /// Cited lots that are not needed stay out of the plan entirely
    #[test]
    fn test_excess_citations_left_untouched() {
        let lots = [
            candidate("30", day(3)),
            candidate("30", day(1)),
            candidate("30", day(2)),
        ];
        let plan = plan_line_allocation(dec("30"), &lots);

        assert_eq!(plan.consumos.len(), 1);
        assert_eq!(plan.consumos[0].lote_id, lots[1].lote_id);
    }

    /// Under-covering citations report the shortfall
    #[test]
    fn test_shortfall_is_reported() {
        let plan = plan_line_allocation(dec("120"), &[candidate("100", day(1))]);
        assert_eq!(plan.faltante, dec("20"));
    }

    /// Coverage validation matches the planner's shortfall behavior
    #[test]
    fn test_coverage_validation_agrees_with_planner() {
        assert!(validate_allocation_coverage(dec("120"), &[dec("100"), dec("50")]).is_ok());
        assert!(validate_allocation_coverage(dec("120"), &[dec("100")]).is_err());
    }

    /// Full consumption drains a lot to zero; sale total follows quantity
    /// times unit price
    #[test]
    fn test_scenario_lots_and_totals() {
        // Product P: L1 produced=100 (day 1), L2 produced=50 (day 2),
        // sale requests 120 citing both fully.
        let l1 = candidate("100", day(1));
        let l2 = candidate("50", day(2));
        let plan = plan_line_allocation(dec("120"), &[l1.clone(), l2.clone()]);

        // L1 fully consumed, L2 partially
        let consumido_l1 = plan
            .consumos
            .iter()
            .find(|c| c.lote_id == l1.lote_id)
            .unwrap()
            .cantidad;
        let consumido_l2 = plan
            .consumos
            .iter()
            .find(|c| c.lote_id == l2.lote_id)
            .unwrap()
            .cantidad;
        assert_eq!(consumido_l1, dec("100"));
        assert_eq!(consumido_l2, dec("20"));

        // Lot bookkeeping after consumption
        let disponible_l1 = dec("100") - consumido_l1;
        let disponible_l2 = dec("50") - consumido_l2;
        assert_eq!(disponible_l1, Decimal::ZERO);
        assert_eq!(disponible_l2, dec("30"));

        // Available stock over disponible lots: L1 is agotado now
        let agotado_l1 = disponible_l1 <= Decimal::ZERO;
        assert!(agotado_l1);
        let stock_disponible = disponible_l2;
        assert_eq!(stock_disponible, dec("30"));

        // Sale totals
        let precio_unitario = dec("12.50");
        let total = dec("120") * precio_unitario;
        assert_eq!(total, dec("1500.00"));
    }

    /// Balance and status derivation at creation time
    #[test]
    fn test_balance_and_status() {
        let total = dec("1500");
        let pago_inicial = dec("500");
        let saldo = total - pago_inicial;
        assert_eq!(saldo, dec("1000"));

        let completada = saldo == Decimal::ZERO;
        assert!(!completada);
        assert!((total - total) == Decimal::ZERO);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    /// Strategy for generating cited lots with positive quantities and
    /// arbitrary dates
    fn lots_strategy() -> impl Strategy<Value = Vec<LotCandidate>> {
        prop::collection::vec((1i64..=1000i64, 1u32..=28u32), 1..8).prop_map(|specs| {
            specs
                .into_iter()
                .map(|(qty, d)| LotCandidate {
                    lote_id: Uuid::new_v4(),
                    cantidad_citada: Decimal::from(qty),
                    fecha_produccion: day(d),
                })
                .collect()
        })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Consumed quantities sum exactly to the requested quantity when
        /// the citations cover it
        #[test]
        fn prop_consumption_conserves_requested(lots in lots_strategy()) {
            let citado: Decimal = lots.iter().map(|l| l.cantidad_citada).sum();
            let solicitado = citado.min(Decimal::from(500));

            let plan = plan_line_allocation(solicitado, &lots);
            let consumido: Decimal = plan.consumos.iter().map(|c| c.cantidad).sum();

            prop_assert_eq!(plan.faltante, Decimal::ZERO);
            prop_assert_eq!(consumido, solicitado);
        }

        /// No lot is ever consumed beyond its cited quantity
        #[test]
        fn prop_consumption_bounded_by_citation(lots in lots_strategy()) {
            let citado: Decimal = lots.iter().map(|l| l.cantidad_citada).sum();
            let plan = plan_line_allocation(citado, &lots);

            for consumo in &plan.consumos {
                let lote = lots.iter().find(|l| l.lote_id == consumo.lote_id).unwrap();
                prop_assert!(consumo.cantidad <= lote.cantidad_citada);
                prop_assert!(consumo.cantidad > Decimal::ZERO);
            }
        }

        /// Consumption order follows ascending production dates
        #[test]
        fn prop_consumption_is_fifo_ordered(lots in lots_strategy()) {
            let citado: Decimal = lots.iter().map(|l| l.cantidad_citada).sum();
            let plan = plan_line_allocation(citado, &lots);

            let fechas: Vec<_> = plan
                .consumos
                .iter()
                .map(|c| {
                    lots.iter()
                        .find(|l| l.lote_id == c.lote_id)
                        .unwrap()
                        .fecha_produccion
                })
                .collect();

            for ventana in fechas.windows(2) {
                prop_assert!(ventana[0] <= ventana[1]);
            }
        }

        /// Shortfall plus consumption always equals the requested quantity
        #[test]
        fn prop_shortfall_accounts_for_everything(
            lots in lots_strategy(),
            extra in 0i64..=500i64
        ) {
            let citado: Decimal = lots.iter().map(|l| l.cantidad_citada).sum();
            let solicitado = citado + Decimal::from(extra);

            let plan = plan_line_allocation(solicitado, &lots);
            let consumido: Decimal = plan.consumos.iter().map(|c| c.cantidad).sum();

            prop_assert_eq!(consumido + plan.faltante, solicitado);
        }
    }
}
