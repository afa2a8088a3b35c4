use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use faktur_core::{DomainEventKind, InvoiceStore};
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::engine::{CycleOutcome, RecurrenceEngine};

#[async_trait]
pub trait PollLoop {
    async fn tick(&self, now: DateTime<Utc>) -> Result<TickOutcome>;
}

#[derive(Debug)]
pub enum TickOutcome {
    /// Another tick was still running; nothing was read or written.
    Overlapped,
    Completed(CycleOutcome),
}

/// Drives the recurrence engine against a store: read, evaluate, write back.
///
/// Every other writer of the same store must hold `write_lock` around its own
/// read-modify-write so a tick never saves over a concurrent change.
pub struct RecurrenceScheduler<S>
where
    S: InvoiceStore,
{
    store: S,
    engine: RecurrenceEngine,
    in_progress: Mutex<()>,
    write_lock: Arc<Mutex<()>>,
}

impl<S> RecurrenceScheduler<S>
where
    S: InvoiceStore,
{
    pub fn new(store: S, engine: RecurrenceEngine) -> Self {
        Self::with_write_lock(store, engine, Arc::new(Mutex::new(())))
    }

    /// Shares `write_lock` with the other writers of `store`.
    pub fn with_write_lock(
        store: S,
        engine: RecurrenceEngine,
        write_lock: Arc<Mutex<()>>,
    ) -> Self {
        Self {
            store,
            engine,
            in_progress: Mutex::new(()),
            write_lock,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[async_trait]
impl<S> PollLoop for RecurrenceScheduler<S>
where
    S: InvoiceStore,
{
    async fn tick(&self, now: DateTime<Utc>) -> Result<TickOutcome> {
        let Ok(_guard) = self.in_progress.try_lock() else {
            debug!("recurrence tick skipped, previous tick still running");
            return Ok(TickOutcome::Overlapped);
        };
        let _write = self.write_lock.lock().await;

        let mut invoices = self
            .store
            .load_invoices()
            .await
            .context("failed to load invoices")?;
        let mut templates = self
            .store
            .load_templates()
            .await
            .context("failed to load recurring templates")?;

        let outcome = self.engine.run_cycle(&mut templates, &invoices, now);

        if !outcome.generated.is_empty() {
            invoices.extend(outcome.generated.iter().cloned());
            self.store
                .save_invoices(&invoices)
                .await
                .context("failed to save generated invoices")?;
        }
        if outcome.templates_changed {
            self.store
                .save_templates(&templates)
                .await
                .context("failed to save recurring templates")?;
        }

        for event in &outcome.events {
            match event.kind {
                DomainEventKind::InvoiceGenerated => info!(
                    template_id = %event.aggregate_id,
                    payload = %event.payload,
                    "invoice generated from recurring template"
                ),
                DomainEventKind::TemplateExpired => info!(
                    template_id = %event.aggregate_id,
                    "recurring template expired"
                ),
                _ => {}
            }
        }

        Ok(TickOutcome::Completed(outcome))
    }
}

/// Ticks once immediately and then every `interval` until `shutdown`
/// resolves. A failed tick is logged and polling continues.
pub async fn run_polling<L, F>(poller: &L, interval: Duration, shutdown: F)
where
    L: PollLoop + Sync,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("recurrence polling stopped");
                break;
            }
            _ = ticker.tick() => {
                match poller.tick(Utc::now()).await {
                    Ok(TickOutcome::Completed(outcome)) => debug!(
                        generated = outcome.generated.len(),
                        expired = outcome.expired_count(),
                        "recurrence tick completed"
                    ),
                    Ok(TickOutcome::Overlapped) => {}
                    Err(err) => error!("recurrence tick failed: {err:#}"),
                }
            }
        }
    }
}
