//! Integration tests for the source-facing half of the pipeline
//!
//! These tests validate, against a mocked HTTP source:
//! - Cursor-threaded playlist traversal (each page fetched exactly once)
//! - Pages without an items field
//! - Retry behavior on transient failures
//! - Enrichment outcomes, including inconsistent upstream collections
//! - Schema registry lookups

use futures::TryStreamExt;
use serde_json::json;
use vidwatch_ingest::config::{RegistryConfig, YoutubeConfig};
use vidwatch_ingest::paginate::paginate;
use vidwatch_ingest::registry::{value_subject, SchemaRegistryClient};
use vidwatch_ingest::transform::{EnrichOutcome, Enricher};
use vidwatch_ingest::youtube::{YoutubeClient, PLAYLIST_ITEMS_ENDPOINT};
use vidwatch_ingest::IngestError;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PLAYLIST_ID: &str = "PLtest123";

fn test_client(server: &MockServer) -> YoutubeClient {
    YoutubeClient::new(&YoutubeConfig {
        api_key: "test-key".to_string(),
        playlist_id: PLAYLIST_ID.to_string(),
        base_url: server.uri(),
        timeout_secs: 5,
        max_retries: 3,
        retry_delay_ms: 1,
    })
    .expect("client should build")
}

/// Helper to build a playlistItems page payload
fn playlist_page(video_ids: &[&str], next: Option<&str>) -> serde_json::Value {
    let items: Vec<_> = video_ids
        .iter()
        .map(|id| json!({"contentDetails": {"videoId": id}}))
        .collect();

    match next {
        Some(token) => json!({"items": items, "nextPageToken": token}),
        None => json!({"items": items}),
    }
}

/// Helper to build a videos page payload
fn videos_page(details: Vec<serde_json::Value>) -> serde_json::Value {
    json!({ "items": details })
}

async fn collect_playlist_ids(
    client: &YoutubeClient,
    max_pages: u32,
) -> Result<Vec<String>, IngestError> {
    let fetch = |cursor: Option<String>| async move {
        client
            .playlist_items_page(PLAYLIST_ID, cursor.as_deref())
            .await
    };

    paginate(PLAYLIST_ITEMS_ENDPOINT, fetch, max_pages)
        .map_ok(|item| item.content_details.video_id)
        .try_collect()
        .await
}

#[tokio::test]
async fn traversal_threads_the_cursor_and_fetches_each_page_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("playlistId", PLAYLIST_ID))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(playlist_page(
            &["vidA", "vidB"],
            Some("page-2"),
        )))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["vidC"], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let ids = collect_playlist_ids(&client, 10).await.unwrap();

    assert_eq!(ids, vec!["vidA", "vidB", "vidC"]);
}

#[tokio::test]
async fn page_without_items_field_yields_nothing_but_keeps_going() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"nextPageToken": "page-2"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["vidZ"], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let ids = collect_playlist_ids(&client, 10).await.unwrap();

    assert_eq!(ids, vec!["vidZ"]);
}

#[tokio::test]
async fn transient_server_error_is_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(playlist_page(&["vidA"], None)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let ids = collect_playlist_ids(&client, 10).await.unwrap();

    assert_eq!(ids, vec!["vidA"]);
}

#[tokio::test]
async fn client_error_status_fails_without_retry() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = collect_playlist_ids(&client, 10).await;

    match result {
        Err(IngestError::SourceFetch { endpoint, .. }) => {
            assert_eq!(endpoint, PLAYLIST_ITEMS_ENDPOINT);
        },
        other => panic!("expected source fetch error, got {other:?}"),
    }
}

#[tokio::test]
async fn malformed_body_fails_the_traversal() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlistItems"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = collect_playlist_ids(&client, 10).await;

    assert!(matches!(result, Err(IngestError::SourceParse { .. })));
}

#[tokio::test]
async fn enrichment_produces_one_summary_per_resolved_video() {
    let server = MockServer::start().await;

    for (id, views) in [("vidA", "10"), ("vidB", "31")] {
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("id", id))
            .respond_with(ResponseTemplate::new(200).set_body_json(videos_page(vec![json!({
                "id": id,
                "snippet": {"title": format!("title of {id}")},
                "statistics": {"viewCount": views, "likeCount": "2"}
            })])))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = test_client(&server);
    let enricher = Enricher::new(&client, 10);

    let mut keys = Vec::new();
    for id in ["vidA", "vidB"] {
        let item = serde_json::from_value(json!({"contentDetails": {"videoId": id}})).unwrap();
        match enricher.enrich(item).await.unwrap() {
            EnrichOutcome::Summary(summary) => {
                assert_eq!(summary.video_id, id);
                assert_eq!(summary.likes, 2);
                assert_eq!(summary.comments, 0);
                keys.push(summary.video_id);
            },
            other => panic!("expected summary, got {other:?}"),
        }
    }

    assert_eq!(keys, vec!["vidA", "vidB"]);
}

#[tokio::test]
async fn unresolvable_video_id_is_rejected_with_its_identifier() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "ghost"))
        .respond_with(ResponseTemplate::new(200).set_body_json(videos_page(vec![])))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let enricher = Enricher::new(&client, 10);

    let item = serde_json::from_value(json!({"contentDetails": {"videoId": "ghost"}})).unwrap();
    match enricher.enrich(item).await.unwrap() {
        EnrichOutcome::Rejected { video_id, reason } => {
            assert_eq!(video_id, "ghost");
            assert!(reason.contains("no detail record"));
        },
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn registry_resolves_the_latest_subject_version() {
    let server = MockServer::start().await;

    let schema = r#"{"type":"record","name":"VideoSummary","fields":[{"name":"video_id","type":"string"}]}"#;
    Mock::given(method("GET"))
        .and(path("/subjects/youtube_videos-value/versions/latest"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "subject": "youtube_videos-value",
            "id": 42,
            "version": 3,
            "schema": schema
        })))
        .expect(1)
        .mount(&server)
        .await;

    let registry = SchemaRegistryClient::new(&RegistryConfig {
        base_url: server.uri(),
        timeout_secs: 5,
    })
    .unwrap();

    let registered = registry
        .latest_schema(&value_subject("youtube_videos"))
        .await
        .unwrap();

    assert_eq!(registered.id, 42);
    assert_eq!(registered.version, 3);
    assert_eq!(registered.schema, schema);
}

#[tokio::test]
async fn registry_error_status_names_the_subject() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/subjects/missing-value/versions/latest"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let registry = SchemaRegistryClient::new(&RegistryConfig {
        base_url: server.uri(),
        timeout_secs: 5,
    })
    .unwrap();

    match registry.latest_schema("missing-value").await {
        Err(IngestError::SchemaRegistry { subject, .. }) => {
            assert_eq!(subject, "missing-value");
        },
        other => panic!("expected registry error, got {other:?}"),
    }
}
