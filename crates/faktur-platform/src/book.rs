use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use faktur_core::{
    Currency, DomainEvent, DomainEventKind, Invoice, InvoiceStatus, InvoiceStore,
    RecurringTemplate,
};
use faktur_finance::{apply_status, increment_invoice_number, next_invoice_number};
use faktur_recurring::{
    RecurrenceEngine, RecurrenceScheduler, TemplateRequest, create_template, delete_template,
    search_templates, toggle_active, update_template, upsert_template,
};
use serde_json::json;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::transfer::{export_invoices, import_invoices};

/// Invoice and template bookkeeping on top of a store. Every mutation reads
/// the full collection, changes it and writes it back. Writers, including the
/// scheduler from [`InvoiceBook::recurrence_scheduler`], are serialized on one
/// lock within this process.
pub struct InvoiceBook<S>
where
    S: InvoiceStore,
{
    store: Arc<S>,
    engine: RecurrenceEngine,
    default_currency: Currency,
    write_lock: Arc<Mutex<()>>,
    events: RwLock<Vec<DomainEvent>>,
}

impl<S> InvoiceBook<S>
where
    S: InvoiceStore,
{
    pub fn new(store: S, engine: RecurrenceEngine) -> Self {
        Self {
            store: Arc::new(store),
            engine,
            default_currency: Currency::default(),
            write_lock: Arc::new(Mutex::new(())),
            events: RwLock::new(Vec::new()),
        }
    }

    /// Currency given to drafts from [`InvoiceBook::new_draft`].
    pub fn with_default_currency(mut self, currency: Currency) -> Self {
        self.default_currency = currency;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// A scheduler over the same store that takes this book's writer lock.
    pub fn recurrence_scheduler(&self) -> RecurrenceScheduler<Arc<S>> {
        RecurrenceScheduler::with_write_lock(
            Arc::clone(&self.store),
            self.engine,
            Arc::clone(&self.write_lock),
        )
    }

    /// Events recorded since the last call, oldest first.
    pub async fn take_events(&self) -> Vec<DomainEvent> {
        std::mem::take(&mut *self.events.write().await)
    }

    pub async fn list(&self) -> Result<Vec<Invoice>> {
        self.store
            .load_invoices()
            .await
            .context("failed to load invoices")
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Invoice>> {
        Ok(self.list().await?.into_iter().find(|invoice| invoice.id == id))
    }

    pub async fn next_number(&self) -> Result<String> {
        Ok(next_invoice_number(&self.list().await?))
    }

    /// An unsaved draft carrying the next number and the default currency.
    pub async fn new_draft(&self, now: DateTime<Utc>) -> Result<Invoice> {
        let mut draft = Invoice::draft(self.next_number().await?, now);
        draft.currency = self.default_currency;
        Ok(draft)
    }

    /// Case-insensitive match on number, payer, biller or ISO issue date.
    pub async fn search(&self, query: &str) -> Result<Vec<Invoice>> {
        let query = query.trim().to_lowercase();
        let invoices = self.list().await?;
        if query.is_empty() {
            return Ok(invoices);
        }

        Ok(invoices
            .into_iter()
            .filter(|invoice| {
                invoice.invoice_number.to_lowercase().contains(&query)
                    || invoice.parties.to.name.to_lowercase().contains(&query)
                    || invoice.parties.from.name.to_lowercase().contains(&query)
                    || invoice
                        .issue_date
                        .is_some_and(|issued| issued.to_string().contains(&query))
            })
            .collect())
    }

    /// Inserts or replaces by id. A nil id gets a fresh one.
    pub async fn save(&self, mut invoice: Invoice, now: DateTime<Utc>) -> Result<Invoice> {
        let _guard = self.write_lock.lock().await;
        if invoice.id.is_nil() {
            invoice.id = Uuid::new_v4();
        }

        let mut invoices = self.list().await?;
        match invoices.iter_mut().find(|stored| stored.id == invoice.id) {
            Some(stored) => *stored = invoice.clone(),
            None => invoices.push(invoice.clone()),
        }
        self.persist_invoices(&invoices).await?;

        self.record(DomainEvent::new(
            invoice.id,
            DomainEventKind::InvoiceSaved,
            now,
            json!({ "invoiceNumber": invoice.invoice_number }),
        ))
        .await;
        Ok(invoice)
    }

    pub async fn delete(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut invoices = self.list().await?;
        let before = invoices.len();
        invoices.retain(|invoice| invoice.id != id);
        if invoices.len() == before {
            debug!(%id, "delete ignored, invoice not found");
            return Ok(false);
        }
        self.persist_invoices(&invoices).await?;

        self.record(DomainEvent::new(
            id,
            DomainEventKind::InvoiceDeleted,
            now,
            json!({}),
        ))
        .await;
        Ok(true)
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: InvoiceStatus,
        now: DateTime<Utc>,
    ) -> Result<Option<Invoice>> {
        let _guard = self.write_lock.lock().await;
        let mut invoices = self.list().await?;
        let Some(position) = invoices.iter().position(|invoice| invoice.id == id) else {
            debug!(%id, "status update ignored, invoice not found");
            return Ok(None);
        };

        let previous = invoices[position].status;
        let updated = apply_status(invoices[position].clone(), status, now.date_naive());
        invoices[position] = updated.clone();
        self.persist_invoices(&invoices).await?;

        self.record(DomainEvent::new(
            id,
            DomainEventKind::InvoiceStatusChanged,
            now,
            json!({ "from": previous.as_str(), "to": status.as_str() }),
        ))
        .await;
        Ok(Some(updated))
    }

    /// Stores a copy of `id` as a new draft numbered one past the original.
    pub async fn duplicate(&self, id: Uuid, now: DateTime<Utc>) -> Result<Option<Invoice>> {
        let Some(original) = self.get(id).await? else {
            return Ok(None);
        };

        let copy = Invoice {
            id: Uuid::new_v4(),
            invoice_number: increment_invoice_number(&original.invoice_number),
            status: InvoiceStatus::Draft,
            paid_date: None,
            paid_amount: None,
            created_at: now,
            ..original
        };
        self.save(copy, now).await.map(Some)
    }

    /// Returns how many invoices were added. A rejected payload leaves the
    /// store untouched.
    pub async fn import_json(&self, payload: &str, now: DateTime<Utc>) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let existing = self.list().await?;
        let outcome = import_invoices(&existing, payload, now).inspect_err(|err| {
            warn!("invoice import rejected: {err}");
        })?;

        if outcome.added > 0 {
            self.persist_invoices(&outcome.invoices).await?;
        }
        self.record(DomainEvent::new(
            Uuid::nil(),
            DomainEventKind::InvoicesImported,
            now,
            json!({ "added": outcome.added }),
        ))
        .await;
        Ok(outcome.added)
    }

    pub async fn export_json(&self) -> Result<String> {
        export_invoices(&self.list().await?).context("failed to serialize invoices")
    }

    /// Removes every stored invoice and returns how many there were.
    pub async fn clear(&self) -> Result<usize> {
        let _guard = self.write_lock.lock().await;
        let removed = self.list().await?.len();
        self.persist_invoices(&[]).await?;
        info!(removed, "invoice history cleared");
        Ok(removed)
    }

    pub async fn templates(&self) -> Result<Vec<RecurringTemplate>> {
        self.store
            .load_templates()
            .await
            .context("failed to load recurring templates")
    }

    pub async fn search_templates(&self, query: &str) -> Result<Vec<RecurringTemplate>> {
        let templates = self.templates().await?;
        Ok(search_templates(&templates, query)
            .into_iter()
            .cloned()
            .collect())
    }

    /// Creates a template from `source`, or re-creates `existing` when given.
    /// Validation failures surface as [`faktur_core::ValidationError`].
    pub async fn save_template(
        &self,
        existing: Option<Uuid>,
        request: &TemplateRequest,
        source: &Invoice,
        now: DateTime<Utc>,
    ) -> Result<RecurringTemplate> {
        let _guard = self.write_lock.lock().await;
        let mut templates = self.templates().await?;

        let template = match existing.and_then(|id| templates.iter().find(|t| t.id == id)) {
            Some(stored) => update_template(stored, request, source, now)?,
            None => create_template(request, source, now)?,
        };
        upsert_template(&mut templates, template.clone());
        self.persist_templates(&templates).await?;

        info!(template_id = %template.id, name = %template.name, "recurring template saved");
        Ok(template)
    }

    pub async fn toggle_template(&self, id: Uuid) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut templates = self.templates().await?;
        if !toggle_active(&mut templates, id) {
            return Ok(false);
        }
        self.persist_templates(&templates).await?;
        Ok(true)
    }

    pub async fn delete_template(&self, id: Uuid) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        let mut templates = self.templates().await?;
        if !delete_template(&mut templates, id) {
            return Ok(false);
        }
        self.persist_templates(&templates).await?;
        Ok(true)
    }

    /// Generates from a template right away, whatever its due date.
    pub async fn generate_from_template(
        &self,
        id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Invoice>> {
        let _guard = self.write_lock.lock().await;
        let mut templates = self.templates().await?;
        let Some(template) = templates.iter_mut().find(|template| template.id == id) else {
            return Ok(None);
        };

        let mut invoices = self.list().await?;
        let Some(invoice) = self.engine.generate_now(template, &invoices, now) else {
            debug!(%id, "template expired, nothing generated");
            return Ok(None);
        };

        invoices.push(invoice.clone());
        self.persist_invoices(&invoices).await?;
        self.persist_templates(&templates).await?;

        self.record(DomainEvent::new(
            id,
            DomainEventKind::InvoiceGenerated,
            now,
            json!({ "invoiceId": invoice.id, "invoiceNumber": invoice.invoice_number }),
        ))
        .await;
        Ok(Some(invoice))
    }

    async fn persist_invoices(&self, invoices: &[Invoice]) -> Result<()> {
        self.store
            .save_invoices(invoices)
            .await
            .context("failed to save invoices")
    }

    async fn persist_templates(&self, templates: &[RecurringTemplate]) -> Result<()> {
        self.store
            .save_templates(templates)
            .await
            .context("failed to save recurring templates")
    }

    async fn record(&self, event: DomainEvent) {
        info!(
            aggregate_id = %event.aggregate_id,
            kind = ?event.kind,
            payload = %event.payload,
            "invoice book event"
        );
        self.events.write().await.push(event);
    }
}
