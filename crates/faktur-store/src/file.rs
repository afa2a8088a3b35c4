use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use faktur_core::{Invoice, InvoiceStore, RecurringTemplate};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

pub const INVOICES_KEY: &str = "savedInvoices";
pub const TEMPLATES_KEY: &str = "recurringInvoices";

/// Key/value store keeping each collection as one JSON array file under a
/// data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    async fn read_key<T: DeserializeOwned>(&self, key: &str) -> Result<Vec<T>> {
        let path = self.path_for(key);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(key, "no stored collection yet");
                return Ok(Vec::new());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read {}", path.display()));
            }
        };

        serde_json::from_slice(&raw)
            .with_context(|| format!("stored collection {} is not valid", path.display()))
    }

    async fn write_key<T: Serialize>(&self, key: &str, values: &[T]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .with_context(|| format!("failed to create {}", self.root.display()))?;

        let path = self.path_for(key);
        let staging = self.root.join(format!("{key}.json.tmp"));
        let serialized = serde_json::to_vec_pretty(values)?;

        tokio::fs::write(&staging, serialized)
            .await
            .with_context(|| format!("failed to write {}", staging.display()))?;
        tokio::fs::rename(&staging, &path)
            .await
            .with_context(|| format!("failed to replace {}", path.display()))?;

        debug!(key, count = values.len(), "collection saved");
        Ok(())
    }
}

#[async_trait]
impl InvoiceStore for JsonFileStore {
    async fn load_invoices(&self) -> Result<Vec<Invoice>> {
        self.read_key(INVOICES_KEY).await
    }

    async fn save_invoices(&self, invoices: &[Invoice]) -> Result<()> {
        self.write_key(INVOICES_KEY, invoices).await
    }

    async fn load_templates(&self) -> Result<Vec<RecurringTemplate>> {
        self.read_key(TEMPLATES_KEY).await
    }

    async fn save_templates(&self, templates: &[RecurringTemplate]) -> Result<()> {
        self.write_key(TEMPLATES_KEY, templates).await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, Utc};
    use faktur_core::{Frequency, LineItem, TemplateState};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;

    #[tokio::test]
    async fn missing_files_load_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("data"));

        assert!(store.load_invoices().await.unwrap().is_empty());
        assert!(store.load_templates().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn collections_round_trip_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());

        let mut invoice = Invoice::draft("INV-001", Utc::now());
        invoice.items = vec![LineItem::new("Retainer", 1, Decimal::new(150_050, 2))];
        invoice.due_date = NaiveDate::from_ymd_opt(2024, 7, 14);

        let template = RecurringTemplate {
            id: Uuid::new_v4(),
            name: "Monthly retainer".to_string(),
            frequency: Frequency::Monthly,
            start_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            end_date: None,
            next_due_date: None,
            last_generated_at: None,
            days_between_invoices: 30,
            state: TemplateState::Active,
            invoice_template: invoice.clone(),
            created_at: Utc::now(),
        };

        store.save_invoices(&[invoice.clone()]).await.unwrap();
        store.save_templates(&[template.clone()]).await.unwrap();

        assert_eq!(store.load_invoices().await.unwrap(), vec![invoice]);
        assert_eq!(store.load_templates().await.unwrap(), vec![template]);
        assert!(dir.path().join("savedInvoices.json").exists());
        assert!(!dir.path().join("savedInvoices.json.tmp").exists());
    }

    #[tokio::test]
    async fn corrupt_collection_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("savedInvoices.json"), b"{not json").unwrap();

        let store = JsonFileStore::new(dir.path());
        let err = store.load_invoices().await.unwrap_err();
        assert!(err.to_string().contains("is not valid"));
    }
}
