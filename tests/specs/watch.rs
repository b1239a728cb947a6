//! Status observation specs
//!
//! Verify status handlers see the job's lifecycle and stop at the first
//! terminal status.

use crate::prelude::*;
use std::sync::Mutex;

#[tokio::test]
async fn status_handler_observes_the_full_lifecycle() {
    let (_store, rt) = runtime();
    let wf = rt
        .workflow(WorkflowConfig::new("billing", "invoice"), EventHandlers::new())
        .unwrap();

    let seen: Arc<Mutex<Vec<WfStatus>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handlers = EventHandlers::new().on_status_change(move |status, _record| {
        sink.lock().unwrap().push(status);
    });

    let handle = wf
        .add(json!({"user": "u1"}), AddOptions::new().with_handlers(handlers))
        .await
        .unwrap();

    // subscription confirmed before any worker can claim the job
    let subscribed = wait_for(|| seen.lock().unwrap().contains(&WfStatus::Created)).await;
    assert!(subscribed, "handler never saw the initial status");

    wf.on("invoice", stage_fn(|_job| async { StageOutcome::Resolve(None) }))
        .unwrap();
    wait_for_status(&wf, &handle.id, WfStatus::Succeeded).await;

    let settled = wait_for(|| {
        seen.lock().unwrap().contains(&WfStatus::Succeeded)
    })
    .await;
    assert!(settled, "handler never saw the terminal status");

    let statuses = seen.lock().unwrap().clone();
    assert!(statuses.contains(&WfStatus::Created));
    assert!(statuses.contains(&WfStatus::Progress(1)));
    assert!(statuses.contains(&WfStatus::Succeeded));

    rt.shutdown("billing").await.unwrap();
}

#[tokio::test]
async fn notifications_stop_after_the_first_terminal_status() {
    let (store, rt) = runtime();
    let wf = rt
        .workflow(WorkflowConfig::new("billing", "invoice"), EventHandlers::new())
        .unwrap();

    let seen: Arc<Mutex<Vec<WfStatus>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handlers = EventHandlers::new().on_status_change(move |status, _record| {
        sink.lock().unwrap().push(status);
    });

    let handle = wf
        .add(json!({"user": "u1"}), AddOptions::new().with_handlers(handlers))
        .await
        .unwrap();

    handle
        .job
        .update(JobUpdate::default().with_status(WfStatus::Failed))
        .await
        .unwrap();

    let settled = wait_for(|| seen.lock().unwrap().contains(&WfStatus::Failed)).await;
    assert!(settled, "handler never saw the failure");
    let count_at_terminal = seen.lock().unwrap().len();

    // writes past the terminal status reach no handler
    store
        .update_job(
            "billing",
            "invoice",
            &handle.id,
            JobUpdate::default().with_status(WfStatus::Succeeded),
        )
        .await
        .unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(seen.lock().unwrap().len(), count_at_terminal);
}

#[tokio::test]
async fn workflow_default_handler_applies_when_no_per_call_handler() {
    let (_store, rt) = runtime();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handlers = EventHandlers::new().on_status_change(move |status, _record| {
        sink.lock().unwrap().push(status);
    });
    let wf = rt
        .workflow(WorkflowConfig::new("billing", "invoice"), handlers)
        .unwrap();

    wf.add(json!({"user": "u1"}), AddOptions::new()).await.unwrap();

    let settled = wait_for(|| seen.lock().unwrap().contains(&WfStatus::Created)).await;
    assert!(settled, "default handler never ran");
}
