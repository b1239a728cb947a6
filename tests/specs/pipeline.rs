//! Pipeline execution specs
//!
//! Verify jobs flow through worker pools: success, payload patches,
//! stage chaining, and retry exhaustion.

use crate::prelude::*;

#[tokio::test]
async fn single_stage_pipeline_runs_to_success() {
    let (_store, rt) = runtime();
    let wf = rt
        .workflow(WorkflowConfig::new("billing", "invoice"), EventHandlers::new())
        .unwrap();

    wf.on(
        "invoice",
        stage_fn(|job| async move {
            let amount = job.payload["amount"].as_i64().unwrap_or(0);
            let mut patch = serde_json::Map::new();
            patch.insert("total".to_string(), json!(amount + 1));
            StageOutcome::Resolve(Some(patch))
        }),
    )
    .unwrap();

    let handle = wf
        .add(json!({"user": "u1", "amount": 42}), AddOptions::new())
        .await
        .unwrap();

    let record = wait_for_status(&wf, &handle.id, WfStatus::Succeeded).await;
    assert_eq!(record.meta.state, "invoice_finished");
    assert_eq!(record.meta.attempts, 0);
    assert_eq!(record.payload["total"], json!(43));

    rt.shutdown("billing").await.unwrap();
}

#[tokio::test]
async fn multi_stage_pipeline_chains_states() {
    let (_store, rt) = runtime();
    let config = WorkflowConfig::new("billing", "invoice")
        .with_stages(vec![StageSpec::new("fetch"), StageSpec::new("publish")]);
    let wf = rt.workflow(config, EventHandlers::new()).unwrap();

    wf.on(
        "fetch",
        stage_fn(|_job| async move {
            let mut patch = serde_json::Map::new();
            patch.insert("fetched".to_string(), json!(true));
            StageOutcome::Resolve(Some(patch))
        }),
    )
    .unwrap();
    wf.on(
        "publish",
        stage_fn(|job| async move {
            // the second stage sees the first stage's patch
            assert_eq!(job.payload["fetched"], json!(true));
            StageOutcome::Resolve(None)
        }),
    )
    .unwrap();

    let handle = wf
        .add(json!({"user": "u1"}), AddOptions::new())
        .await
        .unwrap();

    let record = wait_for_status(&wf, &handle.id, WfStatus::Succeeded).await;
    assert_eq!(record.meta.state, "publish_finished");
    assert_eq!(record.payload["fetched"], json!(true));

    rt.shutdown("billing").await.unwrap();
}

#[tokio::test]
async fn only_the_last_stage_completes_the_job() {
    let (_store, rt) = runtime();
    let config = WorkflowConfig::new("billing", "invoice")
        .with_stages(vec![StageSpec::new("fetch"), StageSpec::new("publish")]);
    let wf = rt.workflow(config, EventHandlers::new()).unwrap();

    // only the first stage gets a handler; the job parks in its finished state
    wf.on(
        "fetch",
        stage_fn(|_job| async move { StageOutcome::Resolve(None) }),
    )
    .unwrap();

    let handle = wf
        .add(json!({"user": "u1"}), AddOptions::new())
        .await
        .unwrap();

    let settled = {
        let wf = &wf;
        let key = handle.id.clone();
        let mut last = None;
        for _ in 0..1000 {
            last = wf.job_data(&key).await.unwrap();
            if last
                .as_ref()
                .is_some_and(|r| r.meta.state == "fetch_finished")
            {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        last.unwrap()
    };
    assert_eq!(settled.meta.state, "fetch_finished");
    // still in progress, not succeeded
    assert_eq!(settled.meta.status, WfStatus::Progress(1));

    rt.shutdown("billing").await.unwrap();
}

#[tokio::test]
async fn rejecting_handler_exhausts_retries_then_fails() {
    let (_store, rt) = runtime();
    let mut spec = StageSpec::new("invoice");
    spec.retries = Some(1);
    let config = WorkflowConfig::new("billing", "invoice").with_stages(vec![spec]);
    let wf = rt.workflow(config, EventHandlers::new()).unwrap();

    let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    wf.on(
        "invoice",
        stage_fn(move |_job| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                StageOutcome::Reject("upstream unavailable".to_string())
            }
        }),
    )
    .unwrap();

    let handle = wf
        .add(json!({"user": "u1"}), AddOptions::new())
        .await
        .unwrap();

    let record = wait_for_status(&wf, &handle.id, WfStatus::Failed).await;
    assert_eq!(record.meta.state, "invoice_error");
    // one initial attempt plus one retry
    assert_eq!(record.meta.attempts, 2);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 2);

    rt.shutdown("billing").await.unwrap();
}

#[tokio::test]
async fn success_resets_the_attempt_counter() {
    let (_store, rt) = runtime();
    let mut spec = StageSpec::new("invoice");
    spec.retries = Some(3);
    let config = WorkflowConfig::new("billing", "invoice").with_stages(vec![spec]);
    let wf = rt.workflow(config, EventHandlers::new()).unwrap();

    let calls = Arc::new(std::sync::atomic::AtomicU32::new(0));
    let counter = Arc::clone(&calls);
    wf.on(
        "invoice",
        stage_fn(move |_job| {
            let counter = Arc::clone(&counter);
            async move {
                // fail twice, then resolve
                if counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst) < 2 {
                    StageOutcome::Reject("flaky".to_string())
                } else {
                    StageOutcome::Resolve(None)
                }
            }
        }),
    )
    .unwrap();

    let handle = wf
        .add(json!({"user": "u1"}), AddOptions::new())
        .await
        .unwrap();

    let record = wait_for_status(&wf, &handle.id, WfStatus::Succeeded).await;
    assert_eq!(record.meta.attempts, 0);
    assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 3);

    rt.shutdown("billing").await.unwrap();
}
