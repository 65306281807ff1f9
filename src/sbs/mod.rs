pub mod client;
pub mod decoder;

pub use client::{SbsClient, SbsClientConfig};
pub use decoder::{DecodeOutcome, RejectReason, SbsMessage, decode};
