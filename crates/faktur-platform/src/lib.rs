pub mod book;
pub mod config;
pub mod contracts;
pub mod db;
pub mod transfer;

pub use book::InvoiceBook;
pub use config::AppConfig;
pub use contracts::ImportedInvoice;
pub use db::open_store;
pub use transfer::{ImportOutcome, export_invoices, import_invoices};
