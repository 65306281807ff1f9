use serde::Serialize;
use serde_json::{Map, Value};

use crate::sbs::decoder::SbsMessage;

/// Parser name the ingestion endpoint routes these events through
pub const PARSER: &str = "adsb";

/// Severity attached to every event (informational)
pub const SEVERITY: u8 = 3;

/// Identifies this collector in each event's attributes
pub const COLLECTOR: &str = concat!("adsb-collector/", env!("CARGO_PKG_VERSION"));

/// One addEvents document, shipped per batch.
///
/// Event order matches arrival order; downstream consumers rely on
/// chronological ordering within a batch.
#[derive(Debug, Clone, Serialize)]
pub struct AddEventsRequest {
    pub session: String,
    #[serde(rename = "sessionInfo")]
    pub session_info: Map<String, Value>,
    pub events: Vec<Event>,
    pub threads: Vec<Value>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub parser: &'static str,
    /// The record's decode timestamp, Unix nanoseconds as a decimal string
    pub ts: String,
    pub sev: u8,
    pub attrs: EventAttrs,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventAttrs {
    pub message: SbsMessage,
    pub source: String,
    pub collector: &'static str,
    pub parser: &'static str,
}

impl AddEventsRequest {
    /// Build one outbound document from a batch of decoded messages,
    /// preserving arrival order.
    pub fn from_batch(session: &str, source: &str, batch: Vec<SbsMessage>) -> Self {
        let events = batch
            .into_iter()
            .map(|message| Event {
                parser: PARSER,
                ts: message.timestamp.clone(),
                sev: SEVERITY,
                attrs: EventAttrs {
                    message,
                    source: source.to_string(),
                    collector: COLLECTOR,
                    parser: PARSER,
                },
            })
            .collect();

        Self {
            session: session.to_string(),
            session_info: Map::new(),
            events,
            threads: Vec::new(),
        }
    }
}
