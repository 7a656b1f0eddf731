//! Resource surface: authentication, domains, spoolers, messages, batches.

use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use octosend_client::{Client, Error, SpoolerType};
use serde_json::json;

fn test_client(server: &MockServer) -> Client {
    Client::builder()
        .base_url(server.base_url())
        .api_key("test-key")
        .build()
        .unwrap()
}

fn spooler_record(token: &str) -> serde_json::Value {
    json!({
        "token": token,
        "type": "marketing",
        "domain": "news.example.com",
        "name": null,
        "state": "draft"
    })
}

#[tokio::test]
async fn authenticate_stores_key_and_sends_it_afterwards() {
    let server = MockServer::start_async().await;
    let auth = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/authenticate")
                .json_body(json!({ "username": "user@example.com", "password": "secret" }));
            then.status(200).json_body(json!({ "api-key": "k123" }));
        })
        .await;
    let lookup = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/domain/news.example.com")
                .header("X-RMTA-API-Key", "k123");
            then.status(200).json_body(json!({ "name": "news.example.com" }));
        })
        .await;

    let mut client = Client::builder().base_url(server.base_url()).build().unwrap();
    assert_eq!(client.api_key(), None);
    client.authenticate("user@example.com", "secret").await.unwrap();
    assert_eq!(client.api_key(), Some("k123"));

    let domain = client.domain("news.example.com").await.unwrap();
    assert_eq!(domain.name(), "news.example.com");
    auth.assert_async().await;
    lookup.assert_async().await;
}

#[tokio::test]
async fn non_2xx_reply_surfaces_status_headers_and_body() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/spooler/nope");
            then.status(403)
                .header("content-type", "application/json")
                .body(r#"{"error":"forbidden"}"#);
        })
        .await;

    let client = test_client(&server);
    let error = client.spooler("nope").await.unwrap_err();
    match error {
        Error::Api {
            status,
            headers,
            body,
        } => {
            assert_eq!(status.as_u16(), 403);
            assert_eq!(
                headers.get("content-type").unwrap(),
                "application/json"
            );
            assert!(body.contains("forbidden"));
        }
        other => panic!("expected Error::Api, got {other:?}"),
    }
}

#[tokio::test]
async fn spooler_setter_replaces_the_cached_record() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/spooler/tok1");
            then.status(200).json_body(spooler_record("tok1"));
        })
        .await;
    let rename = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/spooler/tok1/name")
                .json_body(json!({ "name": "october-campaign" }));
            then.status(200).json_body(json!({
                "token": "tok1",
                "type": "marketing",
                "domain": "news.example.com",
                "name": "october-campaign",
                "state": "draft"
            }));
        })
        .await;

    let client = test_client(&server);
    let mut spooler = client.spooler("tok1").await.unwrap();
    assert_eq!(spooler.name(), None);
    assert_eq!(spooler.kind(), SpoolerType::Marketing);

    spooler.set_name("october-campaign").await.unwrap();
    assert_eq!(spooler.name(), Some("october-campaign"));
    rename.assert_async().await;
}

#[tokio::test]
async fn lifecycle_calls_post_empty_objects() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/spooler/tok1");
            then.status(200).json_body(spooler_record("tok1"));
        })
        .await;
    let ready = server
        .mock_async(|when, then| {
            when.method(POST).path("/spooler/tok1/ready").json_body(json!({}));
            then.status(200).json_body(json!({}));
        })
        .await;
    let cancel = server
        .mock_async(|when, then| {
            when.method(POST).path("/spooler/tok1/cancel").json_body(json!({}));
            then.status(200).json_body(json!({}));
        })
        .await;

    let client = test_client(&server);
    let spooler = client.spooler("tok1").await.unwrap();
    spooler.ready().await.unwrap();
    spooler.cancel().await.unwrap();
    ready.assert_async().await;
    cancel.assert_async().await;
}

#[tokio::test]
async fn domain_creates_spooler_of_requested_type() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/domain/news.example.com");
            then.status(200).json_body(json!({ "name": "news.example.com" }));
        })
        .await;
    let create = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/spoolers/create")
                .json_body(json!({ "domain": "news.example.com", "type": "transactional" }));
            then.status(200).json_body(json!({
                "token": "tok9",
                "type": "transactional",
                "domain": "news.example.com"
            }));
        })
        .await;

    let client = test_client(&server);
    let domain = client.domain("news.example.com").await.unwrap();
    let spooler = domain.create_spooler(SpoolerType::Transactional).await.unwrap();
    assert_eq!(spooler.token(), "tok9");
    assert_eq!(spooler.kind(), SpoolerType::Transactional);
    assert_eq!(spooler.domain_name(), "news.example.com");
    create.assert_async().await;
}

#[tokio::test]
async fn draft_addresses_split_into_get_and_set() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/domain/news.example.com");
            then.status(200).json_body(json!({ "name": "news.example.com" }));
        })
        .await;
    let read = server
        .mock_async(|when, then| {
            when.method(GET).path("/domain/news.example.com/draft-addresses");
            then.status(200).json_body(json!(["qa@example.com"]));
        })
        .await;
    let write = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/domain/news.example.com/draft-addresses")
                .json_body(json!({ "addresses": ["qa@example.com", "dev@example.com"] }));
            then.status(200)
                .json_body(json!(["qa@example.com", "dev@example.com"]));
        })
        .await;

    let client = test_client(&server);
    let domain = client.domain("news.example.com").await.unwrap();

    let current = domain.draft_addresses().await.unwrap();
    assert_eq!(current, json!(["qa@example.com"]));

    let stored = domain
        .set_draft_addresses(&["qa@example.com".to_string(), "dev@example.com".to_string()])
        .await
        .unwrap();
    assert_eq!(stored, json!(["qa@example.com", "dev@example.com"]));
    read.assert_async().await;
    write.assert_async().await;
}

#[tokio::test]
async fn message_template_roundtrip_with_uploaded_attachment() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/spooler/tok1");
            then.status(200).json_body(spooler_record("tok1"));
        })
        .await;
    let upload = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/spooler/tok1/resources/attachment")
                .json_body(json!({
                    "type": "application/pdf",
                    "content": "aGVsbG8=",
                    "filename": "hello.pdf"
                }));
            then.status(200).json_body(json!(7));
        })
        .await;
    let save = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/spooler/tok1/message")
                .json_body(json!({ "subject": "hi there", "attachments": [7] }));
            then.status(200)
                .json_body(json!({ "subject": "hi there", "attachments": [7], "revision": 1 }));
        })
        .await;

    let client = test_client(&server);
    let spooler = client.spooler("tok1").await.unwrap();
    let mut message = spooler.new_message();
    message.set_subject("hi there");
    message
        .add_attachment("application/pdf", b"hello", Some("hello.pdf"))
        .await
        .unwrap();
    assert_eq!(message.attachments(), Some(&json!([7])));

    message.save().await.unwrap();
    assert_eq!(message.data().get("revision"), Some(&json!(1)));
    upload.assert_async().await;
    save.assert_async().await;
}

#[tokio::test]
async fn fetching_the_current_template_reads_its_fields() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/spooler/tok1");
            then.status(200).json_body(spooler_record("tok1"));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/spooler/tok1/message");
            then.status(200)
                .json_body(json!({ "subject": "welcome", "sender": "news@example.com" }));
        })
        .await;

    let client = test_client(&server);
    let spooler = client.spooler("tok1").await.unwrap();
    let message = spooler.message().await.unwrap();
    assert_eq!(message.subject(), Some("welcome"));
    assert_eq!(message.sender(), Some("news@example.com"));
}

#[tokio::test]
async fn batch_submits_all_mails_in_one_call() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/spooler/tok1");
            then.status(200).json_body(spooler_record("tok1"));
        })
        .await;
    let spool = server
        .mock_async(|when, then| {
            when.method(POST).path("/spooler/tok1/spool").json_body(json!({
                "mails": [
                    { "email": "alice@example.com" },
                    { "email": "bob@example.com", "subject": "just for bob" }
                ]
            }));
            then.status(200).json_body(json!({ "spooled": 2 }));
        })
        .await;

    let client = test_client(&server);
    let spooler = client.spooler("tok1").await.unwrap();
    let mut batch = spooler.batch();
    batch.mail("alice@example.com");
    batch.mail("bob@example.com").message().set_subject("just for bob");
    assert_eq!(batch.mails().len(), 2);

    let report = batch.spool().await.unwrap();
    assert_eq!(report, json!({ "spooled": 2 }));
    spool.assert_async().await;
}

#[tokio::test]
async fn single_mail_preview_wraps_payload_in_mails_array() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/spooler/tok1");
            then.status(200).json_body(spooler_record("tok1"));
        })
        .await;
    let preview = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/spooler/tok1/preview")
                .json_body(json!({ "mails": [{ "email": "alice@example.com" }] }));
            then.status(200).json_body(json!([{ "email": "alice@example.com", "html": "<p>hi</p>" }]));
        })
        .await;

    let client = test_client(&server);
    let spooler = client.spooler("tok1").await.unwrap();
    let mail = spooler.mail("alice@example.com");
    mail.preview().await.unwrap();
    preview.assert_async().await;
}

#[tokio::test]
async fn spooler_events_filter_counts_with_event_criterion() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/spooler/tok1");
            then.status(200).json_body(spooler_record("tok1"));
        })
        .await;
    let counter = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/events/spooler/tok1/count")
                .json_body(json!({ "event": "open" }));
            then.status(200).json_body(json!(5));
        })
        .await;

    let client = test_client(&server);
    let spooler = client.spooler("tok1").await.unwrap();
    let events = spooler.events("open");
    assert_eq!(events.count().await.unwrap(), 5);
    counter.assert_async().await;
}

#[tokio::test]
async fn global_statistics_and_timeline_pass_parameters_through() {
    let server = MockServer::start_async().await;
    let stats = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/statistics/global")
                .json_body(json!({ "period": "2026-08", "groupBy": "domain" }));
            then.status(200).json_body(json!({ "sent": 1200 }));
        })
        .await;
    let timeline = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/timeline/global")
                .json_body(json!({ "type": "marketing" }));
            then.status(200).json_body(json!([]));
        })
        .await;

    let client = test_client(&server);
    let report = client.statistics("2026-08", "domain").await.unwrap();
    assert_eq!(report, json!({ "sent": 1200 }));
    client.timeline(SpoolerType::Marketing).await.unwrap();
    stats.assert_async().await;
    timeline.assert_async().await;
}
