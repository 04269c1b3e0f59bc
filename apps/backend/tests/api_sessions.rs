//! Session lifecycle API tests: creation, persistence, restore and import.

mod common;

use std::sync::Arc;

use axum::http::{header, StatusCode};
use drill_core::{ProgressBackend, StoreError};
use pretty_assertions::assert_eq;
use serde_json::json;
use uuid::Uuid;

use common::fixtures;
use common::TestContext;

#[tokio::test]
async fn test_health_check() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_create_session_from_tsv() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/sessions")
        .json(&fixtures::create_session_request("animals"))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["exercise_name"], "animals");
    assert_eq!(body["total_words"], 3);
    assert_eq!(body["tolerance"], 80);
    assert_eq!(body["ignore_accents"], false);
    assert_eq!(body["persisted"], true);
    assert_eq!(body["directions"][0]["label"], "English to Turkish");
    assert_eq!(body["directions"][1]["label"], "Turkish to English");
    assert_eq!(body["directions"][0]["practice"]["state"], "not_started");
    assert_eq!(body["directions"][0]["mistake_count"], 0);
}

#[tokio::test]
async fn test_create_session_from_csv_file_name() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/sessions")
        .json(&fixtures::create_csv_session_request(
            "dieren",
            "hond,\"dog, (the) hound\"\nkat,cat\n",
        ))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total_words"], 2);
    assert_eq!(body["directions"][0]["label"], "Dutch to English");
}

#[tokio::test]
async fn test_create_session_rejects_bad_table() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/sessions")
        .json(&json!({
            "name": "broken",
            "source_language": "English",
            "target_language": "Turkish",
            "content": "dog\tköpek\ncat\n"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "invalid_exercise");
}

#[tokio::test]
async fn test_create_session_rejects_same_languages() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let mut request = fixtures::create_session_request("animals");
    request["target_language"] = json!("English");
    let response = server.post("/api/sessions").json(&request).await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server.get(&format!("/api/sessions/{}", Uuid::new_v4())).await;
    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_progress_written_to_data_dir() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let id = TestContext::create_session(&server).await;

    let body = TestContext::answer_current(&server, id, "practice", "forward", false).await;
    assert_eq!(body["persisted"], true);
    ctx.flush().await;

    let saved: serde_json::Value =
        serde_json::from_slice(&std::fs::read(ctx.snapshot_path(id)).unwrap()).unwrap();
    assert_eq!(saved["source_language"], "English");
    assert_eq!(saved["practice_sets"]["English to Turkish"]["current_index"], 1);
    assert_eq!(saved["mistakes"]["English to Turkish"].as_array().unwrap().len(), 1);
    assert_eq!(
        saved["mistakes_sets"]["English to Turkish"]["word_list"]
            .as_array()
            .unwrap()
            .len(),
        1
    );
}

#[tokio::test]
async fn test_restore_after_restart() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let id = TestContext::create_session(&server).await;

    TestContext::answer_current(&server, id, "practice", "forward", true).await;
    TestContext::answer_current(&server, id, "practice", "forward", false).await;
    let question_before = TestContext::current_question(&server, id, "practice", "forward").await;
    ctx.flush().await;

    let restarted = ctx.restart();
    let server = restarted.server();

    server
        .get(&format!("/api/sessions/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server.post(&format!("/api/sessions/{}/restore", id)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["session_id"], id.to_string());
    assert_eq!(body["directions"][0]["practice"]["answered"], 2);
    assert_eq!(body["directions"][0]["practice"]["correct"], 1);
    assert_eq!(body["directions"][0]["mistake_count"], 1);

    let question_after = TestContext::current_question(&server, id, "practice", "forward").await;
    assert_eq!(question_after, question_before);
}

#[tokio::test]
async fn test_restore_without_saved_progress() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post(&format!("/api/sessions/{}/restore", Uuid::new_v4()))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_restore_malformed_snapshot() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let id = Uuid::new_v4();

    let path = ctx.snapshot_path(id);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, br#"{"source_language": "English"}"#).unwrap();

    let response = server.post(&format!("/api/sessions/{}/restore", id)).await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "malformed_snapshot");
}

#[tokio::test]
async fn test_download_then_import() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let id = TestContext::create_session(&server).await;
    TestContext::answer_current(&server, id, "practice", "backward", false).await;

    let response = server.get(&format!("/api/sessions/{}/snapshot", id)).await;
    response.assert_status_ok();
    let disposition = response.header(header::CONTENT_DISPOSITION);
    assert_eq!(
        disposition.to_str().unwrap(),
        "attachment; filename=\"animals_progress.json\""
    );
    let snapshot: serde_json::Value = response.json();
    assert_eq!(snapshot["exercise_name"], "animals");
    assert_eq!(snapshot["version"], 1);

    let response = server.post("/api/sessions/import").json(&snapshot).await;
    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_ne!(body["session_id"], id.to_string());
    assert_eq!(body["directions"][1]["practice"]["answered"], 1);
    assert_eq!(body["directions"][1]["mistake_count"], 1);
}

#[tokio::test]
async fn test_import_rejects_malformed_snapshot() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/sessions/import")
        .json(&json!({
            "source_language": "English",
            "target_language": "Turkish",
            "tolerance": 80
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = response.json();
    assert!(body["message"].as_str().unwrap().contains("exercise_data"));

    let response = server
        .post("/api/sessions/import")
        .json(&json!({
            "source_language": "English",
            "target_language": "Turkish",
            "exercise_data": [{"English": "dog", "Turkish": "köpek"}],
            "practice_sets": {
                "English to Turkish": {"word_list": [{"English": "dog", "Turkish": "köpek"}], "current_index": 5}
            }
        }))
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_import_minimal_snapshot_defaults() {
    let ctx = TestContext::new();
    let server = ctx.server();

    let response = server
        .post("/api/sessions/import")
        .json(&json!({
            "source_language": "Dutch",
            "target_language": "English",
            "exercise_data": [{"Dutch": "hond", "English": "dog"}]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let body: serde_json::Value = response.json();
    assert_eq!(body["tolerance"], 80);
    assert_eq!(body["ignore_accents"], false);
    assert_eq!(body["exercise_name"], "");
}

#[tokio::test]
async fn test_mistakes_listing() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let id = TestContext::create_session(&server).await;

    TestContext::answer_current(&server, id, "practice", "forward", false).await;
    TestContext::answer_current(&server, id, "practice", "backward", false).await;
    TestContext::answer_current(&server, id, "practice", "backward", false).await;

    let response = server.get(&format!("/api/sessions/{}/mistakes", id)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["directions"][0]["label"], "English to Turkish");
    assert_eq!(body["directions"][0]["pairs"].as_array().unwrap().len(), 1);
    assert_eq!(body["directions"][1]["pairs"].as_array().unwrap().len(), 2);
}

struct UnwritableBackend;

impl ProgressBackend for UnwritableBackend {
    fn put(&self, _key: &str, _bytes: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::PersistenceUnavailable("volume is read-only".to_string()))
    }

    fn get(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_failed_save_is_reported_and_progress_kept() {
    let ctx = TestContext::with_backend(Arc::new(UnwritableBackend));
    let server = ctx.server();
    let id = TestContext::create_session(&server).await;
    ctx.flush().await;

    let body = TestContext::answer_current(&server, id, "practice", "forward", false).await;
    assert_eq!(body["persisted"], false);
    assert_eq!(body["summary"]["answered"], 1);
    ctx.flush().await;

    let response = server.get(&format!("/api/sessions/{}", id)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["persisted"], false);
    assert_eq!(
        body["save_error"],
        "persistence unavailable: volume is read-only"
    );
    assert_eq!(body["directions"][0]["practice"]["answered"], 1);
    assert_eq!(body["directions"][0]["mistake_count"], 1);
}

#[tokio::test]
async fn test_successful_save_has_no_error() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let id = TestContext::create_session(&server).await;
    ctx.flush().await;

    let response = server.get(&format!("/api/sessions/{}", id)).await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["persisted"], true);
    assert!(body.get("save_error").is_none());
}

#[tokio::test]
async fn test_close_session() {
    let ctx = TestContext::new();
    let server = ctx.server();
    let id = TestContext::create_session(&server).await;
    TestContext::answer_current(&server, id, "practice", "forward", true).await;

    let response = server.delete(&format!("/api/sessions/{}", id)).await;
    response.assert_status(StatusCode::NO_CONTENT);
    assert!(ctx.state.sessions.lock().await.is_empty());

    server
        .get(&format!("/api/sessions/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .delete(&format!("/api/sessions/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let response = server.post(&format!("/api/sessions/{}/restore", id)).await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["directions"][0]["practice"]["answered"], 1);
}
