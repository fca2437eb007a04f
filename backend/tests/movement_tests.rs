//! Inventory movement tests
//!
//! Tests for the recorder's stock effects:
//! - ENTRADA adds, SALIDA subtracts and never goes negative
//! - AJUSTE carries a sign
//! - the running counter reflects the full movement history

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Mirror of the recorder's effect on the running stock counter
fn apply_movement(
    stock_actual: Decimal,
    tipo: &str,
    cantidad: Decimal,
) -> Result<Decimal, &'static str> {
    match tipo {
        "ENTRADA" => {
            if cantidad <= Decimal::ZERO {
                return Err("Quantity must be positive");
            }
            Ok(stock_actual + cantidad)
        }
        "SALIDA" => {
            if cantidad <= Decimal::ZERO {
                return Err("Quantity must be positive");
            }
            if stock_actual < cantidad {
                return Err("Insufficient stock");
            }
            Ok(stock_actual - cantidad)
        }
        "AJUSTE" => {
            if cantidad == Decimal::ZERO {
                return Err("Adjustment cannot be zero");
            }
            Ok(stock_actual + cantidad)
        }
        _ => Err("Invalid movement type"),
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_entrada_adds_stock() {
        assert_eq!(apply_movement(dec("100"), "ENTRADA", dec("50")).unwrap(), dec("150"));
    }

    #[test]
    fn test_salida_subtracts_stock() {
        assert_eq!(apply_movement(dec("100"), "SALIDA", dec("30")).unwrap(), dec("70"));
    }

    #[test]
    fn test_salida_insufficient_stock_rejected() {
        assert!(apply_movement(dec("20"), "SALIDA", dec("30")).is_err());
    }

    #[test]
    fn test_salida_exact_stock_allowed() {
        assert_eq!(apply_movement(dec("30"), "SALIDA", dec("30")).unwrap(), Decimal::ZERO);
    }

    #[test]
    fn test_ajuste_is_signed() {
        assert_eq!(apply_movement(dec("100"), "AJUSTE", dec("15")).unwrap(), dec("115"));
        assert_eq!(apply_movement(dec("100"), "AJUSTE", dec("-15")).unwrap(), dec("85"));
    }

    #[test]
    fn test_ajuste_zero_rejected() {
        assert!(apply_movement(dec("100"), "AJUSTE", Decimal::ZERO).is_err());
    }

    #[test]
    fn test_entrada_salida_require_positive_quantity() {
        assert!(apply_movement(dec("100"), "ENTRADA", dec("-5")).is_err());
        assert!(apply_movement(dec("100"), "SALIDA", dec("0")).is_err());
    }

    /// Sequential movement codes carry the MOV prefix zero-padded to six
    #[test]
    fn test_movement_code_format() {
        let format = |n: i64| format!("MOV-{:06}", n);
        assert_eq!(format(1), "MOV-000001");
        assert_eq!(format(417), "MOV-000417");
        assert_eq!(format(1000000), "MOV-1000000");
    }

    /// Movement cost snapshots quantity times the unit figure
    #[test]
    fn test_cost_snapshot() {
        let cantidad = dec("12");
        let costo_unitario = dec("3.50");
        assert_eq!(cantidad * costo_unitario, dec("42.00"));
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (1i64..=1000i64).prop_map(Decimal::from)
    }

    fn movement_strategy() -> impl Strategy<Value = (&'static str, Decimal)> {
        prop_oneof![
            quantity_strategy().prop_map(|q| ("ENTRADA", q)),
            quantity_strategy().prop_map(|q| ("SALIDA", q)),
            (quantity_strategy(), any::<bool>())
                .prop_map(|(q, neg)| ("AJUSTE", if neg { -q } else { q })),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// The counter equals the starting value plus the net of all
        /// accepted movements
        #[test]
        fn prop_counter_reflects_history(
            inicial in 0i64..=10000i64,
            movimientos in prop::collection::vec(movement_strategy(), 0..20)
        ) {
            let mut actual = Decimal::from(inicial);
            let mut neto = Decimal::ZERO;

            for (tipo, cantidad) in &movimientos {
                if let Ok(nuevo) = apply_movement(actual, tipo, *cantidad) {
                    let delta = match *tipo {
                        "SALIDA" => -*cantidad,
                        _ => *cantidad,
                    };
                    neto += delta;
                    actual = nuevo;
                }
            }

            prop_assert_eq!(actual, Decimal::from(inicial) + neto);
        }

        /// SALIDA never drives the counter negative
        #[test]
        fn prop_salida_never_negative(
            inicial in 0i64..=1000i64,
            salidas in prop::collection::vec(quantity_strategy(), 1..20)
        ) {
            let mut actual = Decimal::from(inicial);
            for salida in salidas {
                let _ = apply_movement(actual, "SALIDA", salida).map(|n| actual = n);
                prop_assert!(actual >= Decimal::ZERO);
            }
        }
    }
}
