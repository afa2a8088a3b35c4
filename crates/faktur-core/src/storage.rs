use std::sync::Arc;

use async_trait::async_trait;

use crate::models::{Invoice, RecurringTemplate};

/// Load-all/save-all persistence for the two stored collections.
///
/// Saves overwrite the whole collection; implementations must make each save
/// atomic so a reader never observes a partially written collection.
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    async fn load_invoices(&self) -> anyhow::Result<Vec<Invoice>>;
    async fn save_invoices(&self, invoices: &[Invoice]) -> anyhow::Result<()>;
    async fn load_templates(&self) -> anyhow::Result<Vec<RecurringTemplate>>;
    async fn save_templates(&self, templates: &[RecurringTemplate]) -> anyhow::Result<()>;
}

#[async_trait]
impl<T> InvoiceStore for Arc<T>
where
    T: InvoiceStore + ?Sized,
{
    async fn load_invoices(&self) -> anyhow::Result<Vec<Invoice>> {
        (**self).load_invoices().await
    }

    async fn save_invoices(&self, invoices: &[Invoice]) -> anyhow::Result<()> {
        (**self).save_invoices(invoices).await
    }

    async fn load_templates(&self) -> anyhow::Result<Vec<RecurringTemplate>> {
        (**self).load_templates().await
    }

    async fn save_templates(&self, templates: &[RecurringTemplate]) -> anyhow::Result<()> {
        (**self).save_templates(templates).await
    }
}
