//! Job creation specs
//!
//! Verify the records `add` writes: canonical bookkeeping, owner mirror,
//! and the flat wire shape both serialize to.

use crate::prelude::*;

#[tokio::test]
async fn job_creation_writes_canonical_record() {
    let (_store, rt) = runtime();
    let wf = rt
        .workflow(WorkflowConfig::new("billing", "invoice"), EventHandlers::new())
        .unwrap();

    let handle = wf
        .add(json!({"user": "u1", "amount": 42}), AddOptions::new())
        .await
        .unwrap();

    let record = wf.job_data(&handle.id).await.unwrap().unwrap();
    let wire = serde_json::to_value(&record).unwrap();
    assert_eq!(wire["user"], json!("u1"));
    assert_eq!(wire["userid"], json!("u1"));
    assert_eq!(wire["__app__"], json!("billing"));
    assert_eq!(wire["__type__"], json!("invoice"));
    assert_eq!(wire["_state"], json!("invoice_pending"));
    assert_eq!(wire["__wfstatus__"], json!(0));
    assert_eq!(wire["_attempts"], json!(0));
    assert_eq!(wire["amount"], json!(42));
    assert!(wire.get("__index__").is_none());
    assert!(wire.get("__wfindex__").is_none());
}

#[tokio::test]
async fn owner_mirror_references_the_canonical_record() {
    let (store, rt) = runtime();
    let wf = rt
        .workflow(WorkflowConfig::new("billing", "invoice"), EventHandlers::new())
        .unwrap();

    let handle = wf
        .add(json!({"user": "u1", "amount": 42}), AddOptions::new())
        .await
        .unwrap();

    // the mirror write is detached from `add`
    let mut mirrors = Vec::new();
    for _ in 0..1000 {
        mirrors = store.mirrors("u1").await.unwrap();
        if !mirrors.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(mirrors.len(), 1, "mirror was never written");
    let (key, mirror) = &mirrors[0];
    assert_eq!(key, &handle.mirror_key);
    assert_eq!(mirror.canonical, handle.id);

    let wire = serde_json::to_value(mirror).unwrap();
    assert_eq!(wire["__ref__"], json!(handle.id));
    assert_eq!(wire["__app_type__"], json!("billing__invoice"));
    assert_eq!(wire["amount"], json!(42));
    // canonical state never leaks into the mirror
    assert!(wire.get("_state").is_none());
    assert!(wire.get("__wfstatus__").is_none());
}

#[tokio::test]
async fn concurrent_submissions_get_distinct_keys() {
    let (_store, rt) = runtime();
    let wf = Arc::new(
        rt.workflow(WorkflowConfig::new("billing", "invoice"), EventHandlers::new())
            .unwrap(),
    );

    let mut handles = Vec::new();
    for i in 0..10 {
        let wf = Arc::clone(&wf);
        handles.push(tokio::spawn(async move {
            wf.add(json!({"user": "u1", "seq": i}), AddOptions::new()).await
        }));
    }

    let mut keys = std::collections::HashSet::new();
    for h in handles {
        let handle = h.await.unwrap().unwrap();
        assert!(keys.insert(handle.id), "duplicate canonical key");
    }
}

#[tokio::test]
async fn missing_owner_falls_back_to_anonymous() {
    let (_store, rt) = runtime();
    let wf = rt
        .workflow(WorkflowConfig::new("billing", "invoice"), EventHandlers::new())
        .unwrap();

    let handle = wf.add(json!({"amount": 1}), AddOptions::new()).await.unwrap();
    let record = wf.job_data(&handle.id).await.unwrap().unwrap();
    assert_eq!(record.meta.user, "anonymous_user");
    assert_eq!(record.meta.userid, "anonymous_user");
}

#[tokio::test]
async fn owner_id_is_sanitized_but_preserved_raw() {
    let (_store, rt) = runtime();
    let wf = rt
        .workflow(WorkflowConfig::new("billing", "invoice"), EventHandlers::new())
        .unwrap();

    let handle = wf
        .add(json!({"user": "alice@example.com"}), AddOptions::new())
        .await
        .unwrap();
    let record = wf.job_data(&handle.id).await.unwrap().unwrap();
    assert_eq!(record.meta.user, "alice@example_com");
    assert_eq!(record.meta.userid, "alice@example.com");
}

#[tokio::test]
async fn reserved_payload_fields_are_rejected() {
    let (_store, rt) = runtime();
    let wf = rt
        .workflow(WorkflowConfig::new("billing", "invoice"), EventHandlers::new())
        .unwrap();

    assert!(wf
        .add(json!({"_state": "sneaky"}), AddOptions::new())
        .await
        .is_err());
    assert!(wf.add(json!([1, 2, 3]), AddOptions::new()).await.is_err());
}

#[tokio::test]
async fn indexed_jobs_are_queryable_by_owner_and_status() {
    let (_store, rt) = runtime();
    let wf = rt
        .workflow(WorkflowConfig::new("billing", "invoice"), EventHandlers::new())
        .unwrap();

    wf.add(
        json!({"user": "u1"}),
        AddOptions::new().with_index_id("order1"),
    )
    .await
    .unwrap();
    wf.add(
        json!({"user": "u2"}),
        AddOptions::new().with_index_id("order2"),
    )
    .await
    .unwrap();

    let mut filter = TaskFilter::default();
    filter.user = Some("u1".to_string());
    filter.status = Some(WfStatus::Created);
    let hits = wf.filtered_tasks(filter).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].1.meta.index.as_deref(), Some("order1"));
}
