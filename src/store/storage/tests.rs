use super::*;
use crate::store::DocumentMetadata;
use tempfile::TempDir;

fn sample(document_id: u32) -> IndexedDocument {
    IndexedDocument {
        id: format!("{}_1", document_id),
        content: "Rust, Tokio, PostgreSQL".to_string(),
        embedding: vec![0.5, 0.5],
        metadata: DocumentMetadata {
            document_id,
            display_name: "Ana Torres".to_string(),
            chunk_id: format!("{}_1", document_id),
        },
    }
}

async fn exercise(storage: &dyn BlobStorage) {
    assert!(!storage.exists("index").await.expect("exists"));
    assert!(matches!(
        storage.read("index").await,
        Err(RagError::Storage(_))
    ));

    storage
        .write("staging", &[sample(1), sample(2)])
        .await
        .expect("write");
    storage.rename("staging", "index").await.expect("rename");

    assert!(!storage.exists("staging").await.expect("exists"));
    assert_eq!(
        storage.read("index").await.expect("read"),
        vec![sample(1), sample(2)]
    );

    storage.write("index", &[sample(3)]).await.expect("overwrite");
    assert_eq!(storage.read("index").await.expect("read"), vec![sample(3)]);

    storage.delete("index").await.expect("delete");
    storage.delete("index").await.expect("second delete is a no-op");
    assert!(!storage.exists("index").await.expect("exists"));
}

#[tokio::test]
async fn in_memory_storage_lifecycle() {
    exercise(&InMemoryStorage::new()).await;
}

#[tokio::test]
async fn json_file_storage_lifecycle() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = JsonFileStorage::new(temp_dir.path().join("data"));
    exercise(&storage).await;
}

#[tokio::test]
async fn json_file_uses_camel_case_and_leaves_no_temp_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = JsonFileStorage::new(temp_dir.path());

    storage.write("vector_store", &[sample(4)]).await.expect("write");

    let raw = std::fs::read_to_string(storage.blob_path("vector_store")).expect("read file");
    assert!(raw.contains("\"documentId\":4"));
    assert!(raw.contains("\"displayName\":\"Ana Torres\""));
    assert!(!temp_dir.path().join("vector_store.json.tmp").exists());
}

#[tokio::test]
async fn corrupt_file_is_a_storage_error() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = JsonFileStorage::new(temp_dir.path());
    std::fs::write(storage.blob_path("vector_store"), "{not json").expect("write file");

    let result = storage.read("vector_store").await;
    assert!(matches!(result, Err(RagError::Storage(message)) if message.contains("Corrupt")));
}

#[tokio::test]
async fn renaming_missing_blob_fails() {
    let storage = InMemoryStorage::new();
    assert!(storage.rename("missing", "index").await.is_err());

    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage = JsonFileStorage::new(temp_dir.path());
    assert!(storage.rename("missing", "index").await.is_err());
}
