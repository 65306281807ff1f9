//! adsb-collector - forwards SBS-1 BaseStation messages to DataSet
//!
//! Connects to a dump1090 receiver's SBS output over TCP, decodes each CSV
//! line into a typed record, accumulates records into fixed-size batches,
//! and ships each batch to a DataSet addEvents endpoint as one JSON payload.

pub mod commands;
pub mod config;
pub mod dataset;
pub mod forwarder;
pub mod metrics;
pub mod payload;
pub mod sbs;

pub use config::{Args, CollectorConfig};
pub use dataset::DatasetSink;
pub use forwarder::{BatchForwarder, EventSink};
pub use sbs::{SbsClient, SbsClientConfig, SbsMessage};
