use std::any::Any;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinError;
use tracing::{error, info, warn};

use crate::metrics::{Metrics, TimedOperation};
use extract::{BatchEntry, ExtractionResult, Extractor};
use fetch::Fetcher;

/// Runs fetch and extraction for every hall ticket of a batch.
///
/// Each hall ticket gets its own task, so a panic while parsing one page is
/// reported on that entry alone. Entries come back in request order.
#[derive(Clone)]
pub struct BatchOrchestrator {
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<Extractor>,
    metrics: Arc<Metrics>,
    permits: Arc<Semaphore>,
    include_trace: bool,
}

impl BatchOrchestrator {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<Extractor>,
        metrics: Arc<Metrics>,
        max_concurrent: usize,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            metrics,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            include_trace: false,
        }
    }

    pub fn with_trace(mut self, include_trace: bool) -> Self {
        self.include_trace = include_trace;
        self
    }

    pub async fn run(&self, hall_tickets: Vec<String>) -> Vec<BatchEntry> {
        info!(size = hall_tickets.len(), "Processing batch");
        self.metrics.record_batch(hall_tickets.len());

        let handles: Vec<_> = hall_tickets
            .iter()
            .map(|hall_ticket| {
                let this = self.clone();
                let hall_ticket = hall_ticket.clone();
                tokio::spawn(async move { this.process(hall_ticket).await })
            })
            .collect();

        let mut entries = Vec::with_capacity(handles.len());
        for (hall_ticket, handle) in hall_tickets.into_iter().zip(handles) {
            let entry = match handle.await {
                Ok(entry) => entry,
                Err(e) => {
                    let details = join_failure(e);
                    error!(
                        hall_ticket = %hall_ticket,
                        error = %details,
                        "Result processing aborted"
                    );
                    BatchEntry {
                        identifier: hall_ticket,
                        result: ExtractionResult::fault(details),
                        trace: None,
                    }
                }
            };
            self.metrics.record_outcome(&entry.result);
            entries.push(entry);
        }

        entries
    }

    async fn process(&self, hall_ticket: String) -> BatchEntry {
        let _permit = match self.permits.acquire().await {
            Ok(permit) => permit,
            Err(e) => return failed(hall_ticket, ExtractionResult::fault(e.to_string())),
        };

        let timer = TimedOperation::start();
        let raw = match self.fetcher.fetch(&hall_ticket).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(hall_ticket = %hall_ticket, error = %e, "Fetch failed");
                return failed(hall_ticket, ExtractionResult::transport_failure(e.to_string()));
            }
        };
        self.metrics.record_fetch(timer.elapsed());

        let timer = TimedOperation::start();
        let extraction = self.extractor.extract(&raw);
        self.metrics.record_extract(timer.elapsed());

        info!(
            hall_ticket = %hall_ticket,
            success = extraction.result.is_success(),
            absent = extraction.trace.absent,
            "Result extracted"
        );

        BatchEntry {
            identifier: hall_ticket,
            result: extraction.result,
            trace: self.include_trace.then_some(extraction.trace),
        }
    }
}

fn failed(identifier: String, result: ExtractionResult) -> BatchEntry {
    BatchEntry {
        identifier,
        result,
        trace: None,
    }
}

fn join_failure(err: JoinError) -> String {
    if err.is_panic() {
        panic_message(err.into_panic())
    } else {
        err.to_string()
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "panic with non-string payload".to_string()
    }
}
