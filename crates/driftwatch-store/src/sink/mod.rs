//! Finding sinks
//!
//! - `jsonl`: one finding per line, appended to a results file
//! - `sqlite`: one row per finding in the `findings` table

mod jsonl;
mod sqlite;

pub use jsonl::JsonlSink;
pub use sqlite::SqliteSink;

use crate::errors::Result;
use driftwatch_core::findings::Finding;
use sha2::{Digest, Sha256};

/// Canonical serialized form of a finding
///
/// # Errors
///
/// Returns `Serialization` if the finding cannot be encoded.
pub fn canonical_json(finding: &Finding) -> Result<String> {
    Ok(serde_json::to_string(finding)?)
}

/// SHA-256 of the canonical JSON, hex encoded
///
/// # Errors
///
/// Returns `Serialization` if the finding cannot be encoded.
pub fn finding_digest(finding: &Finding) -> Result<String> {
    let json = canonical_json(finding)?;
    Ok(hex::encode(Sha256::digest(json.as_bytes())))
}
