//! Test fixtures and factory functions for creating test data.

use serde_json::json;
use uuid::Uuid;

/// English to Turkish word list used by every test session.
pub const WORDS: &[(&str, &str)] = &[("dog", "köpek"), ("cat", "kedi"), ("bird", "kuş")];

/// `WORDS` as a tab-separated table.
pub fn tsv_table() -> String {
    WORDS
        .iter()
        .map(|(en, tr)| format!("{}\t{}\n", en, tr))
        .collect()
}

/// Create a session request body from the standard word list.
pub fn create_session_request(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "source_language": "English",
        "target_language": "Turkish",
        "format": "tsv",
        "content": tsv_table()
    })
}

/// Create a session request body from a CSV upload.
pub fn create_csv_session_request(name: &str, content: &str) -> serde_json::Value {
    json!({
        "name": name,
        "source_language": "Dutch",
        "target_language": "English",
        "file_name": format!("{}.csv", name),
        "content": content
    })
}

/// Expected answer for a prompt shown in `direction`.
pub fn expected_answer(direction: &str, question: &str) -> &'static str {
    WORDS
        .iter()
        .find_map(|(en, tr)| match direction {
            "forward" if *en == question => Some(*tr),
            "backward" if *tr == question => Some(*en),
            _ => None,
        })
        .unwrap_or_else(|| panic!("no {} answer for {:?}", direction, question))
}

/// Turkish letters in `WORDS` folded to their base letters.
pub fn without_accents(text: &str) -> String {
    text.replace('ö', "o").replace('ş', "s")
}

/// Answer request body.
pub fn answer_request(answer: &str) -> serde_json::Value {
    json!({ "answer": answer })
}

/// Path of a per-set route.
pub fn set_path(id: Uuid, mode: &str, direction: &str, action: &str) -> String {
    format!("/api/sessions/{}/{}/{}/{}", id, mode, direction, action)
}

/// Update settings request body.
pub fn update_settings_request(tolerance: Option<u32>, ignore_accents: Option<bool>) -> serde_json::Value {
    let mut obj = serde_json::Map::new();
    if let Some(t) = tolerance {
        obj.insert("tolerance".to_string(), json!(t));
    }
    if let Some(i) = ignore_accents {
        obj.insert("ignore_accents".to_string(), json!(i));
    }
    serde_json::Value::Object(obj)
}
