use std::sync::{Arc, Mutex};

use httpmock::prelude::*;
use httpmock::Method::HEAD;
use hubsnap_common::error::HubError;
use hubsnap_common::model::RepoId;
use hubsnap_net::transfer::{HttpTransferEngine, ProgressFn, TransferEngine, TransferRequest};
use hubsnap_net::{file_metadata, list_files, repo_file_metadata, whoami, HubClient};
use serde_json::json;

const REPO: &str = "owner/name";

fn listing() -> serde_json::Value {
    json!({
        "id": REPO,
        "siblings": [
            { "rfilename": ".gitattributes" },
            { "rfilename": "config.json" },
            { "rfilename": "model.safetensors" },
            { "rfilename": "tokenizer.json" },
        ]
    })
}

#[tokio::test]
async fn lists_and_filters_with_bearer_token() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/models/owner/name")
                .header("authorization", "Bearer hf_secret");
            then.status(200).json_body(listing());
        })
        .await;

    let client = HubClient::new(&server.base_url(), Some("hf_secret".into())).unwrap();
    let repo = RepoId::model(REPO);

    let all = list_files(&client, &repo, &[] as &[&str]).await.unwrap();
    assert_eq!(
        all,
        vec![".gitattributes", "config.json", "model.safetensors", "tokenizer.json"]
    );

    let json = list_files(&client, &repo, &["*.json"]).await.unwrap();
    assert_eq!(json, vec!["config.json", "tokenizer.json"]);

    mock.assert_hits_async(2).await;
}

#[tokio::test]
async fn listing_errors_follow_the_taxonomy() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/models/private/repo");
            then.status(401);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/datasets/owner/broken");
            then.status(503);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/spaces/owner/odd");
            then.status(200).json_body(json!({ "files": [] }));
        })
        .await;

    let client = HubClient::new(&server.base_url(), None).unwrap();
    let none: &[&str] = &[];

    let err = list_files(&client, &RepoId::model("private/repo"), none)
        .await
        .unwrap_err();
    assert!(
        matches!(err, HubError::AuthorizationRequired { status: 401, .. }),
        "{err:?}"
    );

    let err = list_files(&client, &RepoId::dataset("owner/broken"), none)
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::Remote { status: 503, .. }), "{err:?}");

    let err = list_files(&client, &RepoId::space("owner/odd"), none)
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::Parse(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_hub_is_a_transport_error() {
    // Port 9 (discard) on localhost is expected to refuse connections.
    let client = HubClient::new("http://127.0.0.1:9", None).unwrap();
    let err = list_files(&client, &RepoId::model(REPO), &["*"])
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn metadata_probe_reads_redirect_headers() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(HEAD)
                .path("/owner/name/resolve/main/model.safetensors");
            then.status(302)
                .header("x-repo-commit", "5c0a4d1e")
                .header("x-linked-etag", "\"sha256-deadbeef\"")
                .header("etag", "W/\"redirect\"")
                .header("x-linked-size", "268435456")
                .header("location", "https://cdn.test/blobs/deadbeef");
        })
        .await;

    let client = HubClient::new(&server.base_url(), None).unwrap();
    let url = client
        .file_url(&RepoId::model(REPO), "model.safetensors")
        .unwrap();
    let metadata = file_metadata(&client, &url).await.unwrap();
    assert_eq!(metadata.commit_hash.as_deref(), Some("5c0a4d1e"));
    assert_eq!(metadata.etag.as_deref(), Some("sha256-deadbeef"));
    assert_eq!(metadata.size, Some(268_435_456));
    assert_eq!(metadata.location, "https://cdn.test/blobs/deadbeef");
}

#[tokio::test]
async fn repo_metadata_probes_in_selection_order_and_aborts_on_failure() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/models/owner/name");
            then.status(200).json_body(listing());
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/owner/name/resolve/main/config.json");
            then.status(200)
                .header("x-repo-commit", "c1")
                .header("etag", "\"config-etag\"");
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(HEAD).path("/owner/name/resolve/main/tokenizer.json");
            then.status(200)
                .header("x-repo-commit", "c1")
                .header("etag", "\"tokenizer-etag\"");
        })
        .await;
    let missing = server
        .mock_async(|when, then| {
            when.method(HEAD)
                .path("/owner/name/resolve/main/model.safetensors");
            then.status(404);
        })
        .await;

    let client = HubClient::new(&server.base_url(), None).unwrap();
    let repo = RepoId::model(REPO);

    let metadata = repo_file_metadata(&client, &repo, &["*.json"]).await.unwrap();
    let etags: Vec<_> = metadata.iter().map(|m| m.etag.clone().unwrap()).collect();
    assert_eq!(etags, vec!["config-etag", "tokenizer-etag"]);
    assert!(metadata[0].location.ends_with("/owner/name/resolve/main/config.json"));

    let err = repo_file_metadata(&client, &repo, &["*.json", "*.safetensors"])
        .await
        .unwrap_err();
    assert!(matches!(err, HubError::AuthorizationRequired { status: 404, .. }));
    missing.assert_hits_async(1).await;
}

#[tokio::test]
async fn whoami_returns_identity() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/api/whoami-v2")
                .header("authorization", "Bearer hf_secret");
            then.status(200).json_body(json!({
                "type": "user",
                "name": "someone",
                "orgs": [{ "name": "team" }]
            }));
        })
        .await;

    let client = HubClient::new(&server.base_url(), Some("hf_secret".into())).unwrap();
    let identity = whoami(&client).await.unwrap();
    assert_eq!(identity.name, "someone");
    assert_eq!(identity.kind.as_deref(), Some("user"));
    assert!(identity.get("orgs").is_some());

    let anonymous = HubClient::new(&server.base_url(), None).unwrap();
    assert!(whoami(&anonymous).await.is_err());
}

fn recording_progress() -> (ProgressFn, Arc<Mutex<Vec<f64>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let progress: ProgressFn = Arc::new(move |fraction| sink.lock().unwrap().push(fraction));
    (progress, seen)
}

#[tokio::test]
async fn http_engine_downloads_atomically() {
    let server = MockServer::start_async().await;
    let body = vec![7u8; 64 * 1024];
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/owner/name/resolve/main/weights/model.bin")
                .header("authorization", "Bearer hf_secret");
            then.status(200).body(body.clone());
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("model.bin");
    let client = HubClient::new(&server.base_url(), None).unwrap();
    let engine = HttpTransferEngine::new(client.http().clone());
    let (progress, seen) = recording_progress();

    engine
        .transfer(
            TransferRequest {
                url: client
                    .file_url(&RepoId::model(REPO), "weights/model.bin")
                    .unwrap(),
                destination: destination.clone(),
                token: Some("hf_secret".into()),
            },
            progress,
        )
        .await
        .unwrap();

    assert_eq!(std::fs::read(&destination).unwrap(), body);
    assert!(!dir.path().join(".model.bin.download").exists());
    let seen = seen.lock().unwrap();
    assert_eq!(seen.last().copied(), Some(1.0));
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
}

#[tokio::test]
async fn http_engine_failure_leaves_nothing_behind() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/owner/name/resolve/main/gone.bin");
            then.status(404);
        })
        .await;

    let dir = tempfile::tempdir().unwrap();
    let destination = dir.path().join("gone.bin");
    let client = HubClient::new(&server.base_url(), None).unwrap();
    let engine = HttpTransferEngine::new(client.http().clone());
    let (progress, seen) = recording_progress();

    let err = engine
        .transfer(
            TransferRequest {
                url: client.file_url(&RepoId::model(REPO), "gone.bin").unwrap(),
                destination: destination.clone(),
                token: None,
            },
            progress,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, HubError::AuthorizationRequired { status: 404, .. }));
    assert!(!destination.exists());
    assert!(!dir.path().join(".gone.bin.download").exists());
    assert!(seen.lock().unwrap().is_empty());
}
