//! End-to-end execution with the standard job registry.

use std::{sync::Arc, time::Duration};

use geoflow::{
    config::EngineConfig,
    jobs::{JobRegistry, RegionCatalog},
    workflow::{
        adapters::memory::InMemoryWorkflowStore,
        domain::{WorkflowDefinition, WorkflowStatus},
        services::{
            TaskRunner, TaskWorker, WorkerTick, WorkflowCreationService, WorkflowQueryService,
        },
    },
};
use mockable::DefaultClock;
use rstest::rstest;
use serde_json::{Value, json};

const CATALOG: &str = r#"{
    "type": "FeatureCollection",
    "features": [{
        "type": "Feature",
        "properties": {"name": "Brazil"},
        "geometry": {"type": "Polygon", "coordinates": [[
            [-74.0, -34.0], [-34.0, -34.0], [-34.0, 5.0], [-74.0, 5.0], [-74.0, -34.0]
        ]]}
    }]
}"#;

const FIELD: &str = r#"{
    "type": "Feature",
    "geometry": {"type": "Polygon", "coordinates": [[
        [-63.624885020050996, -10.311050368263523],
        [-63.624885020050996, -10.367865108370523],
        [-63.61278302732815, -10.367865108370523],
        [-63.61278302732815, -10.311050368263523],
        [-63.624885020050996, -10.311050368263523]
    ]]}
}"#;

const DEFINITION: &str = r#"{
    "name": "example_workflow",
    "steps": [
        {"taskType": "polygonArea", "stepNumber": 1},
        {"taskType": "analysis", "stepNumber": 2},
        {"taskType": "notification", "stepNumber": 3},
        {"taskType": "report", "stepNumber": 4, "dependsOn": 3}
    ]
}"#;

#[rstest]
#[tokio::test(flavor = "multi_thread")]
#[expect(
    clippy::float_arithmetic,
    reason = "compares the computed area within a tolerance"
)]
async fn example_workflow_runs_to_completion() -> Result<(), eyre::Report> {
    let store = Arc::new(InMemoryWorkflowStore::new());
    let clock = Arc::new(DefaultClock);
    let config = EngineConfig::from_json_str(r#"{"notification_delay_ms": 5}"#)?;
    let registry = JobRegistry::new(
        Arc::clone(&store),
        Arc::clone(&clock),
        &config,
        RegionCatalog::from_geojson(CATALOG)?,
    );
    let runner = TaskRunner::new(Arc::clone(&store), Arc::clone(&clock), registry)
        .with_job_timeout(Some(Duration::from_secs(5)));
    let worker = TaskWorker::new(runner, Arc::clone(&store), config.poll_interval());
    let created = WorkflowCreationService::new(Arc::clone(&store), clock)
        .create("client-1", FIELD, &WorkflowDefinition::from_json_str(DEFINITION)?)
        .await?;

    let tick = worker.run_pending().await?;

    assert_eq!(tick, WorkerTick { processed: 4, failed: 0 });
    let queries = WorkflowQueryService::new(store);
    let status = queries.status(created.workflow.id()).await?;
    assert_eq!(status.status, WorkflowStatus::Completed);
    assert_eq!((status.completed_tasks, status.total_tasks), (4, 4));

    let results = queries.results(created.workflow.id()).await?;
    let entries = results
        .final_result
        .as_array()
        .ok_or_else(|| eyre::eyre!("final result is not an array"))?;
    assert_eq!(entries.len(), 4);
    assert!(entries.contains(&json!("Brazil")));
    let area = entries
        .iter()
        .find(|entry| entry.get("unit") == Some(&json!("square meters")))
        .and_then(|entry| entry.get("area"))
        .and_then(Value::as_f64)
        .ok_or_else(|| eyre::eyre!("no area entry"))?;
    assert!((area - 8_382_049.35).abs() < 1.0, "unexpected area {area}");
    let report_tasks = entries
        .iter()
        .find_map(|entry| entry.get("tasks"))
        .and_then(Value::as_array)
        .ok_or_else(|| eyre::eyre!("no report entry"))?;
    assert_eq!(report_tasks.len(), 3);
    Ok(())
}
