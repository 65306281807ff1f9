use anyhow::Result;
use metrics::{counter, histogram};
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

use crate::payload::AddEventsRequest;
use crate::sbs::decoder::SbsMessage;

/// Delivery seam for outbound batches.
/// The production implementation is `crate::dataset::DatasetSink`.
#[async_trait::async_trait]
pub trait EventSink: Send + Sync {
    async fn deliver(&self, payload: AddEventsRequest) -> Result<()>;
}

/// Accumulates decoded messages and ships them to the sink in fixed-size
/// batches.
///
/// Delivery is at-most-once: the buffer is cleared whether or not the sink
/// accepted the batch. A failed delivery is logged and counted, never
/// retried, and never stalls ingestion beyond the send itself.
pub struct BatchForwarder<S: EventSink> {
    sink: S,
    /// One session identifier per process run, shared by every batch
    session: String,
    source: String,
    capacity: usize,
    buffer: Vec<SbsMessage>,
}

impl<S: EventSink> BatchForwarder<S> {
    pub fn new(sink: S, source: impl Into<String>, capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            sink,
            session: Uuid::new_v4().to_string(),
            source: source.into(),
            capacity,
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Append one message, flushing synchronously when the buffer reaches
    /// capacity. The buffer never exceeds capacity when this returns.
    pub async fn offer(&mut self, message: SbsMessage) {
        self.buffer.push(message);
        if self.buffer.len() >= self.capacity {
            self.flush().await;
        }
    }

    /// Ship the buffered batch and clear the buffer. No-op when empty.
    pub async fn flush(&mut self) {
        if self.buffer.is_empty() {
            return;
        }

        let batch = std::mem::replace(&mut self.buffer, Vec::with_capacity(self.capacity));
        let size = batch.len();
        let payload = AddEventsRequest::from_batch(&self.session, &self.source, batch);

        info!("Sending batch of {} messages to the ingestion endpoint", size);
        let start = Instant::now();
        match self.sink.deliver(payload).await {
            Ok(()) => {
                counter!("sbs.forward.batches_total").increment(1);
                counter!("sbs.forward.messages_total").increment(size as u64);
                histogram!("sbs.forward.delivery_ms").record(start.elapsed().as_millis() as f64);
            }
            Err(e) => {
                // At-most-once: the batch is dropped, ingestion continues
                warn!("Failed to deliver batch of {} messages, dropping: {:#}", size, e);
                counter!("sbs.forward.delivery_failed_total").increment(1);
            }
        }
    }

    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tokio::sync::Mutex;

    /// In-memory sink that records every delivered payload and can be told
    /// to fail deliveries.
    #[derive(Clone, Default)]
    pub struct RecordingSink {
        pub delivered: Arc<Mutex<Vec<AddEventsRequest>>>,
        pub fail: Arc<AtomicBool>,
    }

    impl RecordingSink {
        pub fn failing() -> Self {
            let sink = Self::default();
            sink.fail.store(true, Ordering::SeqCst);
            sink
        }

        pub async fn batch_sizes(&self) -> Vec<usize> {
            self.delivered
                .lock()
                .await
                .iter()
                .map(|payload| payload.events.len())
                .collect()
        }
    }

    #[async_trait::async_trait]
    impl EventSink for RecordingSink {
        async fn deliver(&self, payload: AddEventsRequest) -> Result<()> {
            if self.fail.load(Ordering::SeqCst) {
                anyhow::bail!("simulated delivery failure");
            }
            self.delivered.lock().await.push(payload);
            Ok(())
        }
    }

    pub fn sample_message(seq: usize) -> SbsMessage {
        let line = format!(
            "MSG,3,1,1,{seq:06X},{seq},2023/06/01,12:34:56,2023/06/01,12:34:57,,36000,,,51.45735,1.02826,,,0,0,0,0"
        );
        match crate::sbs::decoder::decode(&line) {
            crate::sbs::decoder::DecodeOutcome::Accepted(message) => *message,
            crate::sbs::decoder::DecodeOutcome::Rejected(reason) => {
                panic!("sample line rejected: {reason}")
            }
        }
    }
}
