use tempfile::tempdir;

use reelbot::catalog::{Artifact, CatalogStore, FileCatalogStore};

#[tokio::test]
async fn a_missing_file_means_an_empty_catalog() {
    let dir = tempdir().unwrap();
    let store = FileCatalogStore::new(dir.path().join("catalog.json")).unwrap();

    assert!(store.all_keys().await.unwrap().is_empty());
    assert!(store.lookup_exact("inception").await.unwrap().is_none());
    assert!(store.list_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn an_empty_file_is_tolerated() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, "").unwrap();

    let store = FileCatalogStore::new(path).unwrap();
    assert!(store.all_keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn upserts_survive_a_reopen_with_classification_intact() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");

    {
        let store = FileCatalogStore::new(path.clone()).unwrap();
        store
            .upsert(
                "inception",
                "720p",
                Artifact::ExternalLink("https://x/1".to_string()),
            )
            .await
            .unwrap();
        store
            .upsert(
                "inception",
                "1080p",
                Artifact::TransferHandle("handle-1".to_string()),
            )
            .await
            .unwrap();
    }

    let store = FileCatalogStore::new(path).unwrap();
    let entry = store.lookup_exact("inception").await.unwrap().unwrap();

    let qualities: Vec<&String> = entry.artifacts.keys().collect();
    assert_eq!(qualities, ["720p", "1080p"]);
    assert_eq!(
        entry.artifacts.get("720p"),
        Some(&Artifact::ExternalLink("https://x/1".to_string()))
    );
    assert_eq!(
        entry.artifacts.get("1080p"),
        Some(&Artifact::TransferHandle("handle-1".to_string()))
    );
}

#[tokio::test]
async fn upsert_normalizes_the_name_and_overwrites_the_quality() {
    let dir = tempdir().unwrap();
    let store = FileCatalogStore::new(dir.path().join("catalog.json")).unwrap();

    store
        .upsert(
            "  The Matrix ",
            "720p",
            Artifact::TransferHandle("old".to_string()),
        )
        .await
        .unwrap();
    store
        .upsert(
            "the matrix",
            "720p",
            Artifact::TransferHandle("new".to_string()),
        )
        .await
        .unwrap();

    assert_eq!(store.all_keys().await.unwrap(), ["the matrix"]);
    let entry = store.lookup_exact("the matrix").await.unwrap().unwrap();
    assert_eq!(entry.artifacts.len(), 1);
    assert_eq!(
        entry.artifacts.get("720p"),
        Some(&Artifact::TransferHandle("new".to_string()))
    );
}

#[tokio::test]
async fn requests_are_recorded_and_survive_a_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("catalog.json");

    {
        let store = FileCatalogStore::new(path.clone()).unwrap();
        store.record_request("u1", "dune part two").await.unwrap();
        store.record_request("u2", "arrival").await.unwrap();
    }

    let store = FileCatalogStore::new(path).unwrap();
    let requests = store.list_requests().await.unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].caller_id, "u1");
    assert_eq!(requests[0].title, "dune part two");
    assert_eq!(requests[1].caller_id, "u2");
}
