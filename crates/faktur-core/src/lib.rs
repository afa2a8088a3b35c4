pub mod currency;
pub mod error;
pub mod events;
pub mod models;
pub mod standards;
pub mod storage;

pub use currency::{Currency, CurrencyConfig};
pub use error::{ImportError, ValidationError};
pub use events::{DomainEvent, DomainEventKind};
pub use models::{
    DiscountConfig, DiscountMode, Frequency, Invoice, InvoiceStatus, LineItem, Parties, Party,
    RecurringTemplate, ReportBucket, TemplateState,
};
pub use standards::{PpnProfile, TaxProfile};
pub use storage::InvoiceStore;
