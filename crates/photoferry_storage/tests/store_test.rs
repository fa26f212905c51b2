//! Tests for cache document stores.

use photoferry_storage::{CacheStore, JsonFileStore, MemoryStore};
use std::sync::Arc;
use tempfile::TempDir;

fn dir_entries(dir: &TempDir) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_load_before_first_save_is_none() {
    let temp_dir = TempDir::new().unwrap();
    let store = JsonFileStore::new(temp_dir.path().join("cache.json"));
    assert!(store.load().await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_creates_parent_directories_and_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("a/b/cache.json");
    let store = JsonFileStore::new(&path);

    store.save(br#"{"version":1}"#).await.unwrap();
    assert!(path.exists());
    assert_eq!(store.load().await.unwrap().unwrap(), br#"{"version":1}"#.to_vec());
}

#[tokio::test]
async fn test_save_replaces_document_and_leaves_no_temp_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let store = JsonFileStore::new(&path);

    store.save(b"first").await.unwrap();
    store.save(b"second").await.unwrap();

    assert_eq!(std::fs::read(&path).unwrap(), b"second");
    assert_eq!(dir_entries(&temp_dir), vec!["cache.json".to_string()]);
}

#[tokio::test]
async fn test_concurrent_saves_commit_one_whole_document() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let store = Arc::new(JsonFileStore::new(&path));

    let documents: Vec<Vec<u8>> = (0..8u8).map(|n| vec![b'a' + n; 64 * 1024]).collect();
    let handles: Vec<_> = documents
        .iter()
        .cloned()
        .map(|document| {
            let store = store.clone();
            tokio::spawn(async move { store.save(&document).await })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let committed = std::fs::read(&path).unwrap();
    assert!(documents.contains(&committed));
    assert_eq!(dir_entries(&temp_dir), vec!["cache.json".to_string()]);
}

#[tokio::test]
async fn test_stale_temp_file_does_not_affect_committed_document() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("cache.json");
    let store = JsonFileStore::new(&path);
    store.save(b"committed").await.unwrap();

    // A crash between write and rename leaves only the temp file behind
    std::fs::write(temp_dir.path().join("cache.json.tmp"), b"torn wri").unwrap();

    assert_eq!(store.load().await.unwrap().unwrap(), b"committed");
}

#[tokio::test]
async fn test_memory_store_round_trips() {
    let store = MemoryStore::new();
    assert!(store.load().await.unwrap().is_none());
    store.save(b"doc").await.unwrap();
    assert_eq!(store.snapshot().unwrap(), b"doc");
}
