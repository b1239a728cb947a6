// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Ordered key generation
//!
//! The store generates unique child keys that sort in generation order,
//! so a collection read back in key order is a creation-time log.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates unique, lexicographically ordered keys
pub trait KeyGen: Send + Sync {
    fn next(&self) -> String;
}

/// Production key generator: millisecond timestamp plus a process-wide
/// counter, both zero-padded so string order equals generation order.
#[derive(Clone, Default)]
pub struct OrderedKeyGen {
    counter: Arc<AtomicU64>,
}

impl OrderedKeyGen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyGen for OrderedKeyGen {
    fn next(&self) -> String {
        let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
        let seq = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{:013}-{:08}", millis, seq)
    }
}

/// Sequential key generator for deterministic tests
#[derive(Clone)]
pub struct SequentialKeyGen {
    prefix: String,
    counter: Arc<AtomicU64>,
}

impl SequentialKeyGen {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            counter: Arc::new(AtomicU64::new(1)),
        }
    }
}

impl Default for SequentialKeyGen {
    fn default() -> Self {
        Self::new("key")
    }
}

impl KeyGen for SequentialKeyGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        format!("{}-{:06}", self.prefix, n)
    }
}
