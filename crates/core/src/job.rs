// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job record envelope
//!
//! A persisted job is a fixed envelope around an opaque caller payload.
//! Bookkeeping lives in [`JobMeta`], kept structurally separate from the
//! payload so caller fields can never collide with internal ones; both
//! halves are flattened onto one flat record on the wire, whose field
//! names are part of the store contract.

use crate::error::ValidationError;
use crate::keys::{app_type_key, sanitize_key};
use crate::status::WfStatus;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Owner recorded when the payload carries no `user` field
pub const ANONYMOUS_USER: &str = "anonymous_user";

/// Wire names reserved for bookkeeping; rejected inside payloads
const RESERVED: [&str; 12] = [
    "user",
    "userid",
    "__type__",
    "__app__",
    "__display__",
    "_state",
    "__wfstatus__",
    "__index__",
    "__wfindex__",
    "_attempts",
    "__app_type__",
    "__ref__",
];

/// Internal bookkeeping fields of a canonical job record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobMeta {
    /// Sanitized owner id, safe as a store path segment
    pub user: String,
    /// Raw owner id as submitted
    pub userid: String,
    #[serde(rename = "__type__")]
    pub job_type: String,
    #[serde(rename = "__app__")]
    pub app: String,
    /// Precomputed derived view of the input; may be an empty object
    #[serde(rename = "__display__")]
    pub display: Value,
    /// Current pipeline stage indicator
    #[serde(rename = "_state")]
    pub state: String,
    #[serde(rename = "__wfstatus__")]
    pub status: WfStatus,
    #[serde(rename = "__index__", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(
        rename = "__wfindex__",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub status_index: Option<String>,
    /// Processing attempts consumed on the current stage
    #[serde(rename = "_attempts", default)]
    pub attempts: u32,
}

/// Canonical persisted job record: bookkeeping plus opaque payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(flatten)]
    pub meta: JobMeta,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl JobRecord {
    /// Owner id pair `(sanitized, raw)` derived from a payload.
    ///
    /// Removes the payload's `user` field; ownership lives in the meta
    /// half of the envelope (`user` sanitized, `userid` raw).
    pub fn take_owner(payload: &mut Map<String, Value>) -> (String, String) {
        let userid = payload
            .remove("user")
            .as_ref()
            .and_then(Value::as_str)
            .unwrap_or(ANONYMOUS_USER)
            .to_string();
        let user = sanitize_key(&userid);
        (user, userid)
    }

    /// Merge a patch of payload fields into the record
    pub fn apply_patch(&mut self, patch: Map<String, Value>) {
        for (k, v) in patch {
            self.payload.insert(k, v);
        }
    }

    /// Derive the owner-mirror record referencing this record's canonical key
    pub fn to_mirror(&self, canonical_key: &str) -> MirrorRecord {
        MirrorRecord {
            payload: self.payload.clone(),
            userid: self.meta.userid.clone(),
            job_type: self.meta.job_type.clone(),
            app: self.meta.app.clone(),
            display: self.meta.display.clone(),
            index: self.meta.index.clone(),
            app_type: app_type_key(&self.meta.app, &self.meta.job_type),
            canonical: canonical_key.to_string(),
        }
    }
}

/// Denormalized owner-scoped copy of a job.
///
/// Carries no `_state` or `__wfstatus__`; the canonical record is the
/// source of truth and the mirror may lag it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorRecord {
    pub userid: String,
    #[serde(rename = "__type__")]
    pub job_type: String,
    #[serde(rename = "__app__")]
    pub app: String,
    #[serde(rename = "__display__")]
    pub display: Value,
    #[serde(rename = "__index__", default, skip_serializing_if = "Option::is_none")]
    pub index: Option<String>,
    #[serde(rename = "__app_type__")]
    pub app_type: String,
    /// Back-reference to the canonical job key
    #[serde(rename = "__ref__")]
    pub canonical: String,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

/// Check that a submitted payload is an object free of reserved field names.
///
/// Returns the payload's object map on success.
pub fn validate_payload(payload: Value) -> Result<Map<String, Value>, ValidationError> {
    let Value::Object(map) = payload else {
        return Err(ValidationError::NotAnObject);
    };
    for key in map.keys() {
        // `user` is caller-supplied ownership, not a collision
        if key != "user" && RESERVED.contains(&key.as_str()) {
            return Err(ValidationError::ReservedField(key.clone()));
        }
    }
    Ok(map)
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
