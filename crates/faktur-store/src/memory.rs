use async_trait::async_trait;
use faktur_core::{Invoice, InvoiceStore, RecurringTemplate};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryStore {
    invoices: RwLock<Vec<Invoice>>,
    templates: RwLock<Vec<RecurringTemplate>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(invoices: Vec<Invoice>, templates: Vec<RecurringTemplate>) -> Self {
        Self {
            invoices: RwLock::new(invoices),
            templates: RwLock::new(templates),
        }
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn load_invoices(&self) -> anyhow::Result<Vec<Invoice>> {
        Ok(self.invoices.read().await.clone())
    }

    async fn save_invoices(&self, invoices: &[Invoice]) -> anyhow::Result<()> {
        *self.invoices.write().await = invoices.to_vec();
        Ok(())
    }

    async fn load_templates(&self) -> anyhow::Result<Vec<RecurringTemplate>> {
        Ok(self.templates.read().await.clone())
    }

    async fn save_templates(&self, templates: &[RecurringTemplate]) -> anyhow::Result<()> {
        *self.templates.write().await = templates.to_vec();
        Ok(())
    }
}
