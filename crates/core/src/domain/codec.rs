// Update result document codec
//
// Wire shape: {"error": <string|null>, "timestamp": "20210210T085735Z"}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::timestamp;
use super::update::UpdateResult;

#[derive(Debug, Serialize, Deserialize)]
struct ResultDocument {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    timestamp: Option<String>,
}

/// Serialize a result into the JSON body of a result file
///
/// Fails for timestamps outside four-digit years, which `decode` could not
/// read back.
pub fn encode(result: &UpdateResult) -> Result<Vec<u8>> {
    let doc = ResultDocument {
        error: result.error().map(str::to_string),
        timestamp: Some(timestamp::format(&result.timestamp())?),
    };
    Ok(serde_json::to_vec(&doc)?)
}

/// Parse the JSON body of a result file
///
/// A missing `error` means success. A missing or null `timestamp` decodes
/// as the Unix epoch so age checks see the result as arbitrarily old.
/// Malformed JSON and unparseable timestamps are errors.
pub fn decode(bytes: &[u8]) -> Result<UpdateResult> {
    let doc: ResultDocument = serde_json::from_slice(bytes)?;

    let ts = match doc.timestamp {
        Some(raw) => timestamp::parse(&raw)?,
        None => DateTime::<Utc>::UNIX_EPOCH,
    };

    Ok(UpdateResult::new(doc.error, ts))
}
