//! Production lot tests
//!
//! Tests for lot bookkeeping invariants:
//! - available quantity is always produced minus sold
//! - a lot with nothing left is agotado
//! - produced quantity can never drop below the quantity already sold
//! - available stock is the sum over disponible lots only

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// In-memory mirror of a lot's depletion bookkeeping
#[derive(Debug, Clone, PartialEq, Eq)]
struct SimLot {
    producida: Decimal,
    vendida: Decimal,
    estado: &'static str,
}

impl SimLot {
    fn new(producida: Decimal) -> Self {
        Self {
            producida,
            vendida: Decimal::ZERO,
            estado: "disponible",
        }
    }

    fn disponible(&self) -> Decimal {
        self.producida - self.vendida
    }

    /// Mirror of the allocator's consume operation
    fn consume(&mut self, cantidad: Decimal) -> Result<(), &'static str> {
        if cantidad > self.disponible() {
            return Err("Insufficient lot quantity");
        }
        self.vendida += cantidad;
        if self.disponible() <= Decimal::ZERO {
            self.estado = "agotado";
        }
        Ok(())
    }

    /// Mirror of the allocator's produced-quantity adjustment
    fn adjust_produced(&mut self, nueva: Decimal) -> Result<(), &'static str> {
        if nueva < self.vendida {
            return Err("Produced below sold");
        }
        self.producida = nueva;
        if self.disponible() <= Decimal::ZERO {
            self.estado = "agotado";
        }
        Ok(())
    }
}

/// Mirror of the stock ledger's derived figure: available over disponible
/// lots only
fn stock_disponible(lotes: &[SimLot]) -> Decimal {
    lotes
        .iter()
        .filter(|l| l.estado == "disponible")
        .map(|l| l.disponible())
        .sum()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_new_lot_starts_full() {
        let lote = SimLot::new(dec("100"));
        assert_eq!(lote.disponible(), dec("100"));
        assert_eq!(lote.estado, "disponible");
    }

    #[test]
    fn test_consume_decrements_available() {
        let mut lote = SimLot::new(dec("100"));
        lote.consume(dec("30")).unwrap();
        assert_eq!(lote.vendida, dec("30"));
        assert_eq!(lote.disponible(), dec("70"));
        assert_eq!(lote.estado, "disponible");
    }

    #[test]
    fn test_full_consumption_exhausts_lot() {
        let mut lote = SimLot::new(dec("100"));
        lote.consume(dec("100")).unwrap();
        assert_eq!(lote.disponible(), Decimal::ZERO);
        assert_eq!(lote.estado, "agotado");
    }

    #[test]
    fn test_over_consumption_rejected() {
        let mut lote = SimLot::new(dec("50"));
        let antes = lote.clone();
        assert!(lote.consume(dec("60")).is_err());
        // Nothing changed on failure
        assert_eq!(lote, antes);
    }

    #[test]
    fn test_produced_cannot_drop_below_sold() {
        let mut lote = SimLot::new(dec("100"));
        lote.consume(dec("40")).unwrap();
        assert!(lote.adjust_produced(dec("30")).is_err());
        assert!(lote.adjust_produced(dec("40")).is_ok());
        assert_eq!(lote.estado, "agotado");
    }

    #[test]
    fn test_raising_produced_reopens_nothing() {
        // Raising the produced quantity of an agotado lot leaves the
        // status alone: terminal states do not revert automatically.
        let mut lote = SimLot::new(dec("10"));
        lote.consume(dec("10")).unwrap();
        assert_eq!(lote.estado, "agotado");
        lote.adjust_produced(dec("20")).unwrap();
        assert_eq!(lote.estado, "agotado");
        assert_eq!(lote.disponible(), dec("10"));
    }

    #[test]
    fn test_stock_available_ignores_non_disponible_lots() {
        let mut danado = SimLot::new(dec("40"));
        danado.estado = "dañado";

        let lotes = vec![SimLot::new(dec("100")), danado, SimLot::new(dec("25"))];
        assert_eq!(stock_disponible(&lotes), dec("125"));
    }

    #[test]
    fn test_stock_available_after_sale_scenario() {
        // L1 (100, older) and L2 (50): a sale of 120 drains L1 and takes
        // 20 from L2.
        let mut l1 = SimLot::new(dec("100"));
        let mut l2 = SimLot::new(dec("50"));
        l1.consume(dec("100")).unwrap();
        l2.consume(dec("20")).unwrap();

        assert_eq!(l1.estado, "agotado");
        assert_eq!(l2.disponible(), dec("30"));
        assert_eq!(stock_disponible(&[l1, l2]), dec("30"));
    }

    #[test]
    fn test_expiration_date_derivation() {
        use chrono::{Duration, TimeZone, Utc};

        let fecha_produccion = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap();
        let dias_expiracion = 30i64;
        let fecha_vencimiento = fecha_produccion + Duration::days(dias_expiracion);
        assert_eq!(fecha_vencimiento, Utc.with_ymd_and_hms(2024, 7, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_lot_cost_snapshot() {
        let cantidad_producida = dec("200");
        let costo_unitario = dec("4.25");
        let costo_lote = cantidad_producida * costo_unitario;
        assert_eq!(costo_lote, dec("850.00"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=10000i64).prop_map(Decimal::from)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// available == produced - sold holds after any sequence of valid
        /// consumptions
        #[test]
        fn prop_available_is_produced_minus_sold(
            producida in quantity_strategy(),
            consumos in prop::collection::vec(1i64..=500i64, 0..10)
        ) {
            let mut lote = SimLot::new(producida);
            for consumo in consumos {
                let _ = lote.consume(Decimal::from(consumo));
            }
            prop_assert_eq!(lote.disponible(), lote.producida - lote.vendida);
            prop_assert!(lote.vendida <= lote.producida);
        }

        /// A lot is agotado exactly when nothing is left
        #[test]
        fn prop_agotado_iff_empty(
            producida in quantity_strategy(),
            consumos in prop::collection::vec(1i64..=500i64, 0..20)
        ) {
            let mut lote = SimLot::new(producida);
            for consumo in consumos {
                let _ = lote.consume(Decimal::from(consumo));
            }
            if lote.disponible() <= Decimal::ZERO {
                prop_assert_eq!(lote.estado, "agotado");
            } else {
                prop_assert_eq!(lote.estado, "disponible");
            }
        }

        /// Stock availability equals the sum over disponible lots
        #[test]
        fn prop_stock_sums_disponible_lots(
            cantidades in prop::collection::vec(1i64..=1000i64, 1..8),
            agotar in prop::collection::vec(any::<bool>(), 1..8)
        ) {
            let mut lotes: Vec<SimLot> = cantidades
                .iter()
                .map(|q| SimLot::new(Decimal::from(*q)))
                .collect();

            for (lote, drenar) in lotes.iter_mut().zip(agotar.iter()) {
                if *drenar {
                    let todo = lote.disponible();
                    lote.consume(todo).unwrap();
                }
            }

            let esperado: Decimal = lotes
                .iter()
                .filter(|l| l.estado == "disponible")
                .map(|l| l.disponible())
                .sum();
            prop_assert_eq!(stock_disponible(&lotes), esperado);
        }

        /// Rejected consumption leaves the lot untouched
        #[test]
        fn prop_rejected_consumption_is_noop(
            producida in 1i64..=100i64,
            exceso in 1i64..=100i64
        ) {
            let producida = Decimal::from(producida);
            let mut lote = SimLot::new(producida);
            let antes = lote.clone();

            let resultado = lote.consume(producida + Decimal::from(exceso));
            prop_assert!(resultado.is_err());
            prop_assert_eq!(lote, antes);
        }
    }
}
