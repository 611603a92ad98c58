#![allow(clippy::unwrap_used)]
// Integration tests for `BridgeClient` using wiremock.

use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bodhi_api::bridge::models::{
    DatabaseConfigRecord, MysqlConnectionRequest, NewPipelineTaskRecord, RedisConnectionRequest,
};
use bodhi_api::{BridgeClient, Error};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, BridgeClient) {
    let server = MockServer::start().await;
    let base_url = Url::parse(&server.uri()).unwrap();
    let client = BridgeClient::with_client(reqwest::Client::new(), base_url);
    (server, client)
}

fn invoke_path(command: &str) -> String {
    format!("/invoke/{command}")
}

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "ok": true, "data": data }))
}

fn task_json(id: &str, status: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": "nightly copy",
        "sourceDbId": "conn-src",
        "targetDbId": "conn-dst",
        "strategyId": "full",
        "status": status,
        "progress": 0,
        "logs": [],
        "createdAt": "2024-06-15T10:30:00Z",
        "updatedAt": "2024-06-15T10:30:00Z"
    })
}

// ── Registration tests ──────────────────────────────────────────────

#[tokio::test]
async fn test_add_redis_connection_sends_url_and_db() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(invoke_path("add_redis_connection")))
        .and(body_json(json!({ "url": "redis://localhost:6379", "db": 2 })))
        .respond_with(ok(json!("redis-7")))
        .expect(1)
        .mount(&server)
        .await;

    let id = client
        .add_redis_connection(&RedisConnectionRequest {
            url: "redis://localhost:6379".into(),
            db: 2,
        })
        .await
        .unwrap();

    assert_eq!(id, "redis-7");
}

#[tokio::test]
async fn test_add_mysql_connection() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(invoke_path("add_mysql_connection")))
        .and(body_json(json!({
            "host": "db.internal",
            "port": 3306,
            "username": "app",
            "password": "s3cret",
            "database": "orders"
        })))
        .respond_with(ok(json!("mysql-1")))
        .expect(1)
        .mount(&server)
        .await;

    let id = client
        .add_mysql_connection(&MysqlConnectionRequest {
            host: "db.internal".into(),
            port: 3306,
            username: "app".into(),
            password: "s3cret".into(),
            database: "orders".into(),
        })
        .await
        .unwrap();

    assert_eq!(id, "mysql-1");
}

#[tokio::test]
async fn test_add_postgres_connection_never_hits_the_bridge() {
    let (server, client) = setup().await;

    let result = client.add_postgres_connection();

    assert!(
        matches!(result, Err(Error::UnsupportedOperation(_))),
        "expected UnsupportedOperation, got: {result:?}"
    );
    assert!(server.received_requests().await.unwrap().is_empty());
}

// ── Persistence tests ───────────────────────────────────────────────

#[tokio::test]
async fn test_save_database_config_wraps_config_argument() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(invoke_path("save_database_config_to_db")))
        .respond_with(ok(json!("redis-7")))
        .expect(1)
        .mount(&server)
        .await;

    let record: DatabaseConfigRecord = serde_json::from_value(json!({
        "id": "redis-7",
        "name": "cache",
        "type": "redis",
        "host": "localhost",
        "port": 6379,
        "createdAt": "2024-06-15T10:30:00Z",
        "updatedAt": "2024-06-15T10:30:00Z"
    }))
    .unwrap();

    let confirmed = client.save_database_config(&record).await.unwrap();
    assert_eq!(confirmed, "redis-7");

    let requests = server.received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["config"]["id"], "redis-7");
    assert_eq!(sent["config"]["type"], "redis");
    assert_eq!(sent["config"]["createdAt"], "2024-06-15T10:30:00Z");
}

#[tokio::test]
async fn test_list_database_configs() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(invoke_path("get_all_database_configs_from_db")))
        .respond_with(ok(json!([
            {
                "id": "a",
                "name": "primary",
                "type": "mysql",
                "host": "10.0.0.5",
                "port": 3306,
                "createdAt": "2024-06-15T10:30:00Z",
                "updatedAt": "2024-06-15T10:30:00Z"
            },
            {
                "id": "b",
                "name": "cache",
                "type": "redis",
                "createdAt": "2024-06-15T10:30:00Z",
                "updatedAt": "2024-06-15T10:30:00Z"
            }
        ])))
        .mount(&server)
        .await;

    let configs = client.list_database_configs().await.unwrap();

    assert_eq!(configs.len(), 2);
    assert_eq!(configs[0].id, "a");
    assert_eq!(configs[0].port, Some(3306));
    assert_eq!(configs[1].db_type, "redis");
    assert!(configs[1].host.is_none());
}

#[tokio::test]
async fn test_remove_connection_reports_backend_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(invoke_path("remove_database_connection")))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "ok": false, "error": "connection not found" })),
        )
        .mount(&server)
        .await;

    let err = client.remove_connection("ghost").await.unwrap_err();

    assert_eq!(err.backend_message(), Some("connection not found"));
    assert!(
        matches!(err, Error::Backend { ref command, .. } if command == "remove_database_connection"),
        "expected Backend error, got: {err:?}"
    );
}

#[tokio::test]
async fn test_non_success_status_becomes_http_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(invoke_path("delete_database_config_from_db")))
        .respond_with(ResponseTemplate::new(500).set_body_string("database is locked"))
        .mount(&server)
        .await;

    let err = client.delete_database_config("a").await.unwrap_err();

    assert!(err.is_transient());
    assert!(
        matches!(err, Error::Http { status: 500, ref body } if body == "database is locked"),
        "expected Http error, got: {err:?}"
    );
}

#[tokio::test]
async fn test_malformed_envelope_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(invoke_path("test_database_connection")))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.test_connection("a").await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

// ── Pipeline task tests ─────────────────────────────────────────────

#[tokio::test]
async fn test_create_pipeline_task_returns_backend_task() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(invoke_path("create_pipeline_task")))
        .and(body_json(json!({
            "task": {
                "name": "nightly copy",
                "sourceDbId": "conn-src",
                "targetDbId": "conn-dst",
                "strategyId": "full"
            }
        })))
        .respond_with(ok(task_json("task-1", "pending")))
        .expect(1)
        .mount(&server)
        .await;

    let task = client
        .create_pipeline_task(&NewPipelineTaskRecord {
            name: "nightly copy".into(),
            source_db_id: "conn-src".into(),
            target_db_id: "conn-dst".into(),
            strategy_id: "full".into(),
            start_time: None,
            end_time: None,
            error: None,
            logs: Vec::new(),
        })
        .await
        .unwrap();

    assert_eq!(task.id, "task-1");
    assert_eq!(task.status, "pending");
}

#[tokio::test]
async fn test_start_pipeline_task_sends_task_id() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(invoke_path("start_pipeline_task")))
        .and(body_json(json!({ "taskId": "task-1" })))
        .respond_with(ok(json!(null)))
        .expect(1)
        .mount(&server)
        .await;

    client.start_pipeline_task("task-1").await.unwrap();
}

#[tokio::test]
async fn test_get_pipeline_task_missing_is_none() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(invoke_path("get_pipeline_task")))
        .respond_with(ok(json!(null)))
        .mount(&server)
        .await;

    let task = client.get_pipeline_task("gone").await.unwrap();
    assert!(task.is_none());
}
