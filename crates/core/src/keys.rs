// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key and index derivation utilities
//!
//! Pure functions that derive store path segments and composite
//! secondary-index values. The derived strings are part of the wire
//! contract: any external reader of the store must compute them the
//! same way.

use crate::status::WfStatus;

/// Field name carrying the composite owner/status/index value
pub const WFSTATUS_INDEX_KEY: &str = "__wfindex__";
/// Field name carrying the combined app+type key on mirror records
pub const APP_JOBTYPE_KEY: &str = "__app_type__";

/// Characters that may not appear in a store path segment
const FORBIDDEN: [char; 6] = ['.', '#', '$', '/', '[', ']'];

/// Sanitize an untrusted identifier for use as a store path segment.
///
/// Contract: forbidden path characters (`. # $ / [ ]`) and ASCII control
/// characters are replaced with `_`; an empty input yields `"_"`. The
/// function is deterministic and idempotent.
pub fn sanitize_key(raw: &str) -> String {
    if raw.is_empty() {
        return "_".to_string();
    }
    raw.chars()
        .map(|c| {
            if FORBIDDEN.contains(&c) || c.is_ascii_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Combined app+type key written on owner-mirror records
pub fn app_type_key(app: &str, job_type: &str) -> String {
    format!("{}__{}", app, job_type)
}

/// Composite prefix from the caller-supplied index id/field.
///
/// At least one of the two parts is expected to be present; present parts
/// are joined with `:` in `(id, field)` order.
pub fn index_prefix(index_id: Option<&str>, index_field: Option<&str>) -> String {
    match (index_id, index_field) {
        (Some(id), Some(field)) => format!("{}:{}", id, field),
        (Some(id), None) => id.to_string(),
        (None, Some(field)) => field.to_string(),
        (None, None) => String::new(),
    }
}

/// Composite secondary-index value for a job.
///
/// Deterministic in `(user, status, index_id, index_field)`; the layout
/// (`user:status_code[:id][:field]`) keeps all of one owner's jobs, and
/// within them all jobs of one status, contiguous under lexicographic
/// ordering so the store can answer prefix/range queries.
pub fn index_key(
    user: &str,
    status: WfStatus,
    index_id: Option<&str>,
    index_field: Option<&str>,
) -> String {
    let mut key = format!("{}:{}", user, status.code());
    if let Some(id) = index_id {
        key.push(':');
        key.push_str(id);
    }
    if let Some(field) = index_field {
        key.push(':');
        key.push_str(field);
    }
    key
}

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;
