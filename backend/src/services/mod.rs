//! Business logic services for the Almacen inventory and sales platform

pub mod alert;
pub mod category;
pub mod history;
pub mod lot;
pub mod movement;
pub mod parameter;
pub mod payment;
pub mod product;
pub mod sale;
pub mod sequence;
pub mod stock;

pub use alert::AlertService;
pub use category::CategoryService;
pub use history::HistoryService;
pub use lot::LotService;
pub use movement::MovementService;
pub use parameter::ParameterService;
pub use payment::PaymentService;
pub use product::ProductService;
pub use sale::SaleService;
pub use sequence::SequenceService;
pub use stock::StockService;
