//! Common types used across the platform

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl Pagination {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) as i64 - 1) * self.per_page as i64
    }

    pub fn limit(&self) -> i64 {
        self.per_page as i64
    }
}

/// Pagination metadata returned with paginated responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Time bucketing for historical aggregates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodGranularity {
    Diario,
    Mensual,
}

impl PeriodGranularity {
    /// Postgres `date_trunc` unit for this granularity
    pub fn date_trunc_unit(&self) -> &'static str {
        match self {
            PeriodGranularity::Diario => "day",
            PeriodGranularity::Mensual => "month",
        }
    }
}

/// One bucket of a historical series, in ascending period order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub period: String,
    pub total: Decimal,
}
