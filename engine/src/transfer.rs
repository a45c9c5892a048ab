//! Transfer envelope - the portable export/import document.
//!
//! The envelope is the bridge between an attempt collection and a file a
//! user can carry between machines. Parsing is strict about the parts that
//! matter (an attempts array of structurally valid records) and forgiving
//! about the rest: `version` falls back to the current format version and
//! unknown future versions are still accepted, so newer exports keep
//! importing on older builds.

use crate::{error::Result, validate, Error, QuizAttempt};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Version of the transfer format written on export.
pub const TRANSFER_FORMAT_VERSION: u32 = 1;

/// A portable attempt document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferEnvelope {
    /// Transfer format version
    pub version: u32,
    /// ISO-8601 stamp of when the export was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
    /// The exported attempt collection
    pub attempts: Vec<QuizAttempt>,
}

impl TransferEnvelope {
    /// Build an export payload.
    ///
    /// The engine holds no clock; the caller supplies the `exported_at`
    /// stamp.
    pub fn new(attempts: Vec<QuizAttempt>, exported_at: impl Into<String>) -> Self {
        Self {
            version: TRANSFER_FORMAT_VERSION,
            exported_at: Some(exported_at.into()),
            attempts,
        }
    }

    /// Serialize to pretty JSON (human-diffable).
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::InvalidJson(e.to_string()))
    }

    /// Parse a transfer document.
    ///
    /// Fails when the text is not valid JSON, the top level is not an
    /// object, the `attempts` array is missing, or any attempt fails
    /// validation. Nothing is partially accepted.
    pub fn from_json(text: &str) -> Result<Self> {
        let parsed: Value =
            serde_json::from_str(text).map_err(|e| Error::InvalidJson(e.to_string()))?;

        let obj = parsed.as_object().ok_or(Error::NotAnObject)?;

        let raw_attempts = obj
            .get("attempts")
            .and_then(Value::as_array)
            .ok_or(Error::MissingAttempts)?;
        let attempts = validate::validate_attempts(raw_attempts)?;

        let version = obj
            .get("version")
            .and_then(Value::as_u64)
            .and_then(|v| u32::try_from(v).ok())
            .unwrap_or(TRANSFER_FORMAT_VERSION);

        let exported_at = obj
            .get("exportedAt")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            version,
            exported_at,
            attempts,
        })
    }
}
