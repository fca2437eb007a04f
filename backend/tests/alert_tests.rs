//! Alert generator tests
//!
//! Tests for threshold classification and the expiry window:
//! - stock below the minimum raises stock_bajo, above the maximum raises
//!   almacenamiento_maximo, never both
//! - a lot alerts only inside the expiry window
//! - regenerating from unchanged state yields the same alert set

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use shared::{expires_within, stock_alert_kind, AlertType};

// Helper to create Decimal from string
fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    /// Stock minimum 50, available 40: exactly one stock_bajo alert
    #[test]
    fn test_low_stock_alert() {
        let kind = stock_alert_kind(dec("40"), dec("50"), dec("2000"));
        assert_eq!(kind, Some(AlertType::StockBajo));
    }

    /// Above the maximum raises the storage alert
    #[test]
    fn test_over_max_alert() {
        let kind = stock_alert_kind(dec("2500"), dec("50"), dec("2000"));
        assert_eq!(kind, Some(AlertType::AlmacenamientoMaximo));
    }

    /// Inside the band no alert is raised
    #[test]
    fn test_no_alert_inside_band() {
        assert_eq!(stock_alert_kind(dec("500"), dec("50"), dec("2000")), None);
    }

    /// Threshold boundaries: equality raises nothing on either side
    #[test]
    fn test_threshold_boundaries() {
        assert_eq!(stock_alert_kind(dec("50"), dec("50"), dec("2000")), None);
        assert_eq!(stock_alert_kind(dec("2000"), dec("50"), dec("2000")), None);
        assert_eq!(
            stock_alert_kind(dec("49.99"), dec("50"), dec("2000")),
            Some(AlertType::StockBajo)
        );
    }

    /// Expiry window includes today through `dias` days out, nothing past
    #[test]
    fn test_expiry_window() {
        let ahora = now();
        assert!(expires_within(ahora + Duration::days(3), ahora, 7));
        assert!(expires_within(ahora + Duration::days(7), ahora, 7));
        assert!(expires_within(ahora, ahora, 7));
        assert!(!expires_within(ahora + Duration::days(8), ahora, 7));
        // Already expired lots are not "near expiry"
        assert!(!expires_within(ahora - Duration::days(1), ahora, 7));
    }

    /// Regenerating alerts over unchanged state yields the same set
    #[test]
    fn test_regeneration_is_idempotent() {
        let stocks = [
            ("pan", dec("40")),
            ("miel", dec("800")),
            ("yogurt", dec("2300")),
        ];
        let minimo = dec("50");
        let maximo = dec("2000");

        let generar = || -> Vec<(&str, AlertType)> {
            stocks
                .iter()
                .filter_map(|(nombre, disponible)| {
                    stock_alert_kind(*disponible, minimo, maximo).map(|t| (*nombre, t))
                })
                .collect()
        };

        let primera = generar();
        let segunda = generar();
        assert_eq!(primera, segunda);
        assert_eq!(
            primera,
            vec![
                ("pan", AlertType::StockBajo),
                ("yogurt", AlertType::AlmacenamientoMaximo)
            ]
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod property_tests {
    use super::*;

    fn quantity_strategy() -> impl Strategy<Value = Decimal> {
        (0i64..=100000i64).prop_map(Decimal::from)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// A product never carries both stock alerts at once
        #[test]
        fn prop_alert_kinds_exclusive(
            disponible in quantity_strategy(),
            minimo in quantity_strategy(),
            extra in quantity_strategy()
        ) {
            let maximo = minimo + extra;
            let kind = stock_alert_kind(disponible, minimo, maximo);

            match kind {
                Some(AlertType::StockBajo) => prop_assert!(disponible < minimo),
                Some(AlertType::AlmacenamientoMaximo) => prop_assert!(disponible > maximo),
                Some(AlertType::Vencimiento) => prop_assert!(false, "stock check yielded expiry"),
                None => prop_assert!(disponible >= minimo && disponible <= maximo),
            }
        }

        /// Classification is deterministic over unchanged inputs
        #[test]
        fn prop_classification_idempotent(
            disponible in quantity_strategy(),
            minimo in quantity_strategy(),
            maximo in quantity_strategy()
        ) {
            prop_assert_eq!(
                stock_alert_kind(disponible, minimo, maximo),
                stock_alert_kind(disponible, minimo, maximo)
            );
        }

        /// The expiry window is exactly [ahora, ahora + dias]
        #[test]
        fn prop_expiry_window_bounds(offset_horas in -2000i64..=2000i64, dias in 0i64..=60i64) {
            let ahora = now();
            let vencimiento = ahora + Duration::hours(offset_horas);
            let dentro = expires_within(vencimiento, ahora, dias);

            let esperado = vencimiento >= ahora && vencimiento <= ahora + Duration::days(dias);
            prop_assert_eq!(dentro, esperado);
        }
    }
}
