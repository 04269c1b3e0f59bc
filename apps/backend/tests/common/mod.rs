//! Common test utilities and fixtures for integration tests.
//!
//! This module provides shared test infrastructure including:
//! - TestContext with a temporary data directory and a running save queue
//! - Helpers for creating sessions and answering prompts

#![allow(dead_code)]

pub mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::http::StatusCode;
use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;
use uuid::Uuid;

use drill_core::ProgressBackend;
use vocab_drill_backend::config::Config;
use vocab_drill_backend::services::storage::FileStorage;
use vocab_drill_backend::{build_router, AppState};

/// Test context owning the app state and its data directory.
pub struct TestContext {
    pub state: AppState,
    data_dir: Arc<TempDir>,
    app: Router,
}

impl TestContext {
    /// Create a context over a fresh temporary data directory.
    ///
    /// Must be called from inside a tokio runtime.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp data dir");
        Self::over(Arc::new(dir))
    }

    /// Create a context whose progress goes to `backend` instead of disk.
    pub fn with_backend(backend: Arc<dyn ProgressBackend>) -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp data dir");
        Self::build(Arc::new(dir), backend)
    }

    fn over(data_dir: Arc<TempDir>) -> Self {
        let storage = FileStorage::new(data_dir.path()).expect("Failed to open file storage");
        Self::build(data_dir, Arc::new(storage))
    }

    fn build(data_dir: Arc<TempDir>, backend: Arc<dyn ProgressBackend>) -> Self {
        let state = AppState::new(Config::with_data_dir(data_dir.path()), backend);
        let app = build_router(state.clone());
        Self { state, data_dir, app }
    }

    /// A new context over the same data directory, as after a restart.
    pub fn restart(&self) -> Self {
        Self::over(Arc::clone(&self.data_dir))
    }

    /// Get a test server for the router.
    pub fn server(&self) -> TestServer {
        TestServer::new(self.app.clone()).unwrap()
    }

    pub fn data_dir(&self) -> &Path {
        self.data_dir.path()
    }

    /// Where a session's snapshot is written.
    pub fn snapshot_path(&self, id: Uuid) -> PathBuf {
        self.data_dir().join(id.to_string()).join("progress_data.json")
    }

    /// Wait for queued snapshots to reach disk.
    pub async fn flush(&self) {
        self.state.saver.flush().await;
    }

    /// Create a session from the standard word list and return its id.
    pub async fn create_session(server: &TestServer) -> Uuid {
        let response = server
            .post("/api/sessions")
            .json(&fixtures::create_session_request("animals"))
            .await;
        response.assert_status(StatusCode::CREATED);
        let body: serde_json::Value = response.json();
        body["session_id"]
            .as_str()
            .and_then(|s| Uuid::parse_str(s).ok())
            .expect("session_id in response")
    }

    /// Question currently shown in a set.
    pub async fn current_question(server: &TestServer, id: Uuid, mode: &str, direction: &str) -> String {
        let response = server.get(&fixtures::set_path(id, mode, direction, "current")).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        body["prompt"]["question"]
            .as_str()
            .expect("a current prompt")
            .to_string()
    }

    /// Answer the current prompt right or wrong and return the response body.
    pub async fn answer_current(
        server: &TestServer,
        id: Uuid,
        mode: &str,
        direction: &str,
        correctly: bool,
    ) -> serde_json::Value {
        let question = Self::current_question(server, id, mode, direction).await;
        let answer = if correctly {
            fixtures::expected_answer(direction, &question)
        } else {
            "zzzzzz"
        };

        let response = server
            .post(&fixtures::set_path(id, mode, direction, "answer"))
            .json(&fixtures::answer_request(answer))
            .await;
        response.assert_status_ok();
        response.json()
    }
}
