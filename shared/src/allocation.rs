//! Pure allocation algorithms of the inventory core
//!
//! The FIFO lot walk, the oldest-first payment walk and the threshold
//! checks live here so the backend services and the test suites exercise
//! the same code paths.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::models::AlertType;

// ---------------------------------------------------------------------------
// FIFO lot allocation
// ---------------------------------------------------------------------------

/// A lot cited by the caller for one sale line
#[derive(Debug, Clone)]
pub struct LotCandidate {
    pub lote_id: Uuid,
    pub cantidad_citada: Decimal,
    pub fecha_produccion: DateTime<Utc>,
}

/// Planned consumption of one lot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedConsumption {
    pub lote_id: Uuid,
    pub cantidad: Decimal,
}

/// Outcome of planning one line
#[derive(Debug, Clone)]
pub struct LinePlan {
    pub consumos: Vec<PlannedConsumption>,
    /// Quantity the cited lots could not cover (zero for valid input)
    pub faltante: Decimal,
}

/// Plan the per-lot consumption for one line: oldest production date first,
/// each lot consumed up to its cited quantity, stopping once the requested
/// quantity is covered. Cited excess is left untouched.
pub fn plan_line_allocation(
    cantidad_solicitada: Decimal,
    candidatos: &[LotCandidate],
) -> LinePlan {
    let mut ordenados: Vec<&LotCandidate> = candidatos.iter().collect();
    ordenados.sort_by_key(|c| c.fecha_produccion);

    let mut consumos = Vec::new();
    let mut restante = cantidad_solicitada;

    for candidato in ordenados {
        if restante <= Decimal::ZERO {
            break;
        }
        let usar = candidato.cantidad_citada.min(restante);
        if usar <= Decimal::ZERO {
            continue;
        }
        consumos.push(PlannedConsumption {
            lote_id: candidato.lote_id,
            cantidad: usar,
        });
        restante -= usar;
    }

    LinePlan {
        consumos,
        faltante: restante.max(Decimal::ZERO),
    }
}

// ---------------------------------------------------------------------------
// Oldest-first payment allocation
// ---------------------------------------------------------------------------

/// A sale with an outstanding balance, ordered oldest-first by the caller
#[derive(Debug, Clone)]
pub struct OutstandingSale {
    pub venta_id: Uuid,
    pub saldo: Decimal,
}

/// Planned application of a payment slice to one sale
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedAllocation {
    pub venta_id: Uuid,
    pub saldo_previo: Decimal,
    pub pago_aplicado: Decimal,
    pub saldo_restante: Decimal,
}

/// Outcome of planning a payment
#[derive(Debug, Clone)]
pub struct PaymentPlan {
    pub aplicaciones: Vec<PlannedAllocation>,
    /// Amount left unapplied after all balances were covered
    pub restante: Decimal,
}

/// Walk the sales in the given order, applying `min(remaining, balance)` to
/// each until the amount is exhausted.
pub fn plan_payment_allocation(monto: Decimal, ventas: &[OutstandingSale]) -> PaymentPlan {
    let mut aplicaciones = Vec::new();
    let mut restante = monto;

    for venta in ventas {
        if restante <= Decimal::ZERO {
            break;
        }
        let aplicado = restante.min(venta.saldo);
        aplicaciones.push(PlannedAllocation {
            venta_id: venta.venta_id,
            saldo_previo: venta.saldo,
            pago_aplicado: aplicado,
            saldo_restante: venta.saldo - aplicado,
        });
        restante -= aplicado;
    }

    PaymentPlan {
        aplicaciones,
        restante,
    }
}

// ---------------------------------------------------------------------------
// Threshold checks
// ---------------------------------------------------------------------------

/// Classify a product's available stock against the two thresholds
pub fn stock_alert_kind(
    disponible: Decimal,
    minimo: Decimal,
    maximo: Decimal,
) -> Option<AlertType> {
    if disponible < minimo {
        Some(AlertType::StockBajo)
    } else if disponible > maximo {
        Some(AlertType::AlmacenamientoMaximo)
    } else {
        None
    }
}

/// Whether a lot expires inside the alert window: not already past, and at
/// most `dias` days away
pub fn expires_within(fecha_vencimiento: DateTime<Utc>, ahora: DateTime<Utc>, dias: i64) -> bool {
    fecha_vencimiento >= ahora && fecha_vencimiento <= ahora + Duration::days(dias)
}
