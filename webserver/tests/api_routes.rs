//! Route tests for the task API
//!
//! Each test drives the real router in-process against a `MockTaskApi`.

mod helpers;

use axum::http::StatusCode;
use serde_json::{json, Value};

use fixtures::{active_task, create_body, task_in};
use helpers::{delete, get, post_empty, post_json, router_with, send};
use shared::{
    ApiError, DoneNotification, ErrorKind, ErrorResponse, Task, TaskAck, TaskId, TaskList, TaskStatus,
    TaskStatusResponse,
};
use webserver::MockTaskApi;

#[tokio::test]
async fn test_create_task_returns_ack() {
    let mut api = MockTaskApi::new();
    api.expect_create_task()
        .withf(|request| request.num_instances == 2 && request.bucket_name == "patients-2024")
        .times(1)
        .returning(|_| {
            Ok(TaskAck {
                task_id: TaskId::from("t1"),
                status: TaskStatus::Active,
            })
        });

    let (status, body): (_, Value) = send(router_with(api), post_json("/task", create_body())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"taskId": "t1", "status": "active"}));
}

#[tokio::test]
async fn test_malformed_create_body_is_bad_request() {
    let mut api = MockTaskApi::new();
    api.expect_create_task().never();

    let (status, body): (_, ErrorResponse) =
        send(router_with(api), post_json("/task", json!({"population": "lots"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.error.is_empty());
}

#[tokio::test]
async fn test_error_kinds_map_to_status_codes() {
    let cases = [
        (ErrorKind::Configuration, StatusCode::BAD_REQUEST),
        (ErrorKind::ResourceConflict, StatusCode::CONFLICT),
        (ErrorKind::Provider, StatusCode::BAD_GATEWAY),
        (ErrorKind::Store, StatusCode::INTERNAL_SERVER_ERROR),
    ];

    for (kind, expected) in cases {
        let mut api = MockTaskApi::new();
        api.expect_create_task()
            .returning(move |_| Err(ApiError::new(kind, "nope")));

        let (status, body): (_, ErrorResponse) = send(router_with(api), post_json("/task", create_body())).await;
        assert_eq!(status, expected, "kind {kind:?}");
        assert_eq!(body.error, "nope");
    }
}

#[tokio::test]
async fn test_list_tasks() {
    let mut api = MockTaskApi::new();
    api.expect_list_tasks().returning(|| {
        Ok(TaskList {
            tasks: vec![active_task("t1"), task_in("t2", TaskStatus::Completed)],
        })
    });

    let (status, body): (_, TaskList) = send(router_with(api), get("/task")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.tasks.len(), 2);
    assert_eq!(body.tasks[1].status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_task_status_passes_path_id() {
    let mut api = MockTaskApi::new();
    api.expect_task_status()
        .withf(|id| id.as_str() == "t1")
        .returning(|id| {
            Ok(TaskStatusResponse {
                task_id: id.clone(),
                status: TaskStatus::Active,
                elapsed_time: Some("2m5s".into()),
                running_instances: Some(2),
                task: active_task(id.as_str()),
            })
        });

    let (status, body): (_, Value) = send(router_with(api), get("/task/t1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["taskId"], "t1");
    assert_eq!(body["elapsedTime"], "2m5s");
    assert_eq!(body["runningInstances"], 2);
}

#[tokio::test]
async fn test_unknown_task_is_not_found() {
    let mut api = MockTaskApi::new();
    api.expect_task_status()
        .returning(|id| Err(ApiError::new(ErrorKind::NotFound, format!("Task '{id}' not found"))));

    let (status, body): (_, ErrorResponse) = send(router_with(api), get("/task/missing")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body.error, "Task 'missing' not found");
}

#[tokio::test]
async fn test_abort_task() {
    let mut api = MockTaskApi::new();
    api.expect_abort_task()
        .times(1)
        .returning(|id| Ok(task_in(id.as_str(), TaskStatus::Aborted)));

    let (status, body): (_, Task) = send(router_with(api), post_empty("/task/t1/abort")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, TaskStatus::Aborted);
}

#[tokio::test]
async fn test_abort_in_wrong_state_is_bad_request() {
    let mut api = MockTaskApi::new();
    api.expect_abort_task()
        .returning(|_| Err(ApiError::new(ErrorKind::InvalidState, "Cannot abort task 't1' while it is completed")));

    let (status, _): (_, ErrorResponse) = send(router_with(api), post_empty("/task/t1/abort")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_task() {
    let mut api = MockTaskApi::new();
    api.expect_delete_task().returning(|id| {
        Ok(TaskAck {
            task_id: id,
            status: TaskStatus::Deleted,
        })
    });

    let (status, body): (_, Value) = send(router_with(api), delete("/task/t1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"taskId": "t1", "status": "deleted"}));
}

#[tokio::test]
async fn test_done_ping_is_forwarded() {
    let mut api = MockTaskApi::new();
    api.expect_worker_done()
        .withf(|n: &DoneNotification| n.instance_id.as_str() == "i-1" && !n.is_failure())
        .times(1)
        .returning(|n| {
            Ok(TaskAck {
                task_id: n.task_id,
                status: TaskStatus::Active,
            })
        });

    let body = json!({"taskId": "t1", "instanceId": "i-1"});
    let (status, _): (_, TaskAck) = send(router_with(api), post_json("/task/t1/done", body)).await;

    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_failure_ping_carries_error() {
    let mut api = MockTaskApi::new();
    api.expect_worker_done()
        .withf(|n: &DoneNotification| n.error.as_deref() == Some("out of memory"))
        .returning(|n| {
            Ok(TaskAck {
                task_id: n.task_id,
                status: TaskStatus::Error,
            })
        });

    let body = json!({"taskId": "t1", "instanceId": "i-1", "error": "out of memory"});
    let (status, ack): (_, TaskAck) = send(router_with(api), post_json("/task/t1/done", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack.status, TaskStatus::Error);
}

#[tokio::test]
async fn test_done_ping_with_mismatched_task_id_is_rejected() {
    let mut api = MockTaskApi::new();
    api.expect_worker_done().never();

    let body = json!({"taskId": "other", "instanceId": "i-1"});
    let (status, error): (_, ErrorResponse) = send(router_with(api), post_json("/task/t1/done", body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error.error.contains("does not match"));
}

#[tokio::test]
async fn test_reconcile_task() {
    let mut api = MockTaskApi::new();
    api.expect_reconcile_task()
        .returning(|id| Ok(task_in(id.as_str(), TaskStatus::Completed)));

    let (status, body): (_, Task) = send(router_with(api), post_empty("/task/t1/reconcile")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.status, TaskStatus::Completed);
}

#[tokio::test]
async fn test_health_check() {
    let (status, body): (_, Value) = send(router_with(MockTaskApi::new()), get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
