use std::collections::HashSet;

use chrono::{DateTime, Utc};
use faktur_core::{ImportError, Invoice};
use serde_json::Value;

use crate::contracts::ImportedInvoice;

#[derive(Debug, Clone)]
pub struct ImportOutcome {
    /// Existing invoices followed by the newly added ones.
    pub invoices: Vec<Invoice>,
    pub added: usize,
}

pub fn export_invoices(invoices: &[Invoice]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(invoices)
}

/// Merges a JSON export into `existing`. Entries whose id is already present,
/// either stored or earlier in the payload, are dropped. Nothing is merged
/// unless every entry parses.
pub fn import_invoices(
    existing: &[Invoice],
    payload: &str,
    now: DateTime<Utc>,
) -> Result<ImportOutcome, ImportError> {
    let Value::Array(entries) = serde_json::from_str::<Value>(payload)? else {
        return Err(ImportError::NotAnArray);
    };

    let parsed = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<ImportedInvoice>(entry)
                .map(|imported| imported.into_invoice(now))
                .map_err(|source| ImportError::InvalidEntry { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut seen: HashSet<_> = existing.iter().map(|invoice| invoice.id).collect();
    let mut invoices = existing.to_vec();
    let mut added = 0;

    for invoice in parsed {
        if seen.insert(invoice.id) {
            invoices.push(invoice);
            added += 1;
        }
    }

    Ok(ImportOutcome { invoices, added })
}
