use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use llamachat::session::SessionManager;
use llamachat::storage::SqliteStorage;

#[allow(dead_code)]
pub fn create_temp_storage() -> (SqliteStorage, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("chat_sessions.db");
    let storage =
        SqliteStorage::new_with_path(db_path).expect("failed to create sqlite storage with path");
    (storage, tmp)
}

#[allow(dead_code)]
pub fn create_temp_manager() -> (SessionManager, TempDir) {
    let (storage, tmp) = create_temp_storage();
    let manager = SessionManager::load(storage).expect("failed to load sessions");
    (manager, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Build a `text/event-stream` body of chat-completion chunks ending in `[DONE]`
#[allow(dead_code)]
pub fn sse_body(deltas: &[&str]) -> String {
    let mut body = String::from(
        "data: {\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{\"role\":\"assistant\"}}]}\n\n",
    );
    for delta in deltas {
        let chunk = serde_json::json!({
            "object": "chat.completion.chunk",
            "choices": [{ "index": 0, "delta": { "content": delta } }]
        });
        body.push_str(&format!("data: {}\n\n", chunk));
    }
    body.push_str(
        "data: {\"object\":\"chat.completion.chunk\",\"choices\":[{\"index\":0,\"delta\":{},\"finish_reason\":\"stop\"}]}\n\n",
    );
    body.push_str("data: [DONE]\n\n");
    body
}
