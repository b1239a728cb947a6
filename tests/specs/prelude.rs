//! Shared helpers for the behavioral specs

pub use jobflow_core::config::{StageDefaults, WorkflowConfig};
pub use jobflow_core::keygen::SequentialKeyGen;
pub use jobflow_core::stage::StageSpec;
pub use jobflow_core::status::WfStatus;
pub use jobflow_engine::{stage_fn, AddOptions, EventHandlers, Runtime, StageOutcome};
pub use jobflow_store::{JobStore, JobUpdate, MemoryStore, TaskFilter};
pub use serde_json::json;
pub use std::sync::Arc;
pub use std::time::Duration;

/// Upper bound on how long a spec waits for a pipeline to settle
pub const SPEC_WAIT_MAX_MS: u64 = 5_000;

const POLL_MS: u64 = 5;

/// A runtime over a fresh in-memory store with deterministic keys and a
/// fast worker poll, plus a handle to the store for direct inspection.
pub fn runtime() -> (MemoryStore, Runtime) {
    let store = MemoryStore::with_keygen(Box::new(SequentialKeyGen::new("job")));
    let rt = Runtime::new(Arc::new(store.clone()))
        .with_poll_interval(Duration::from_millis(POLL_MS));
    (store, rt)
}

/// Poll a predicate until it holds or the wait budget runs out
pub async fn wait_for<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..(SPEC_WAIT_MAX_MS / POLL_MS) {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(POLL_MS)).await;
    }
    check()
}

/// Wait until one job's status matches, returning its final record
pub async fn wait_for_status(
    wf: &jobflow_engine::Workflow,
    key: &str,
    want: WfStatus,
) -> jobflow_core::job::JobRecord {
    for _ in 0..(SPEC_WAIT_MAX_MS / POLL_MS) {
        if let Some(record) = wf.job_data(key).await.unwrap() {
            if record.meta.status == want {
                return record;
            }
        }
        tokio::time::sleep(Duration::from_millis(POLL_MS)).await;
    }
    panic!("job {key} never reached status {want:?}");
}
