//! HTTP handlers for the Almacen inventory and sales platform

mod alert;
mod category;
mod health;
mod history;
mod lot;
mod movement;
mod parameter;
mod payment;
mod product;
mod sale;
mod stock;

pub use alert::*;
pub use category::*;
pub use health::*;
pub use history::*;
pub use lot::*;
pub use movement::*;
pub use parameter::*;
pub use payment::*;
pub use product::*;
pub use sale::*;
pub use stock::*;

use serde::Deserialize;
use shared::Pagination;

/// Optional pagination query parameters
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl PageQuery {
    pub fn into_pagination(self) -> Pagination {
        let defaults = Pagination::default();
        Pagination {
            page: self.page.unwrap_or(defaults.page),
            per_page: self.per_page.unwrap_or(defaults.per_page),
        }
    }
}
