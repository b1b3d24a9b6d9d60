//! Domain layer: models and the services that own them.

pub mod export_service;
pub mod mappers;
pub mod menu_service;
pub mod models;
pub mod order_queue_service;
pub mod sales_service;

pub use export_service::ExportService;
pub use menu_service::MenuService;
pub use order_queue_service::OrderQueueService;
