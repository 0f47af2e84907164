use std::io::Cursor;
use std::sync::Arc;

use deposit_engine::{
    AuthenticatedClient, ClientSettings, Credentials, DepositError, DigestingUploader,
    NoTokenProvider, PackagedPayload, UploadSettings, BAGIT_PACKAGING,
};
use md5::{Digest, Md5};
use reqwest::Method;
use url::Url;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> (AuthenticatedClient, Url) {
    let collection = Url::parse(&format!("{}/collection", server.uri())).unwrap();
    let client = AuthenticatedClient::new(
        &collection,
        Credentials::new("user", "pw"),
        Arc::new(NoTokenProvider),
        ClientSettings::default(),
    )
    .unwrap();
    (client, collection)
}

fn pseudo_random_bytes(len: usize) -> Vec<u8> {
    let mut state: u32 = 0x2545_f491;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state as u8
        })
        .collect()
}

#[tokio::test]
async fn content_md5_matches_digest_of_sent_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collection"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    let (client, collection) = client_for(&server);
    let settings = UploadSettings {
        chunk_size: 4096,
        ..UploadSettings::default()
    };

    // Empty, single chunk, and many chunks with a short tail.
    for len in [0usize, 10, 3 * 4096 + 17] {
        let bytes = pseudo_random_bytes(len);
        let expected = hex::encode(Md5::digest(&bytes));

        let payload = PackagedPayload::from_bytes(bytes.clone(), "application/zip", "bag.zip");
        let sent = DigestingUploader::new(&client, &settings)
            .upload(payload, &collection, Method::POST, false)
            .await
            .unwrap();
        assert_eq!(sent.content_md5, expected);
        assert_eq!(sent.bytes_sent, len as u64);

        let requests = server.received_requests().await.unwrap();
        let request = requests.last().unwrap();
        assert_eq!(request.body, bytes);
        assert_eq!(
            request.headers.get("Content-MD5").unwrap().to_str().unwrap(),
            expected
        );
        assert_eq!(hex::encode(Md5::digest(&request.body)), expected);
    }
}

#[tokio::test]
async fn protocol_headers_are_attached() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/collection"))
        .and(header("Content-Disposition", "attachment; filename=part-1.zip"))
        .and(header("Packaging", BAGIT_PACKAGING))
        .and(header("In-Progress", "true"))
        .and(header("Content-Type", "application/octet-stream"))
        .and(header("Expect", "100-continue"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    let (client, collection) = client_for(&server);
    let settings = UploadSettings::default();

    let payload = PackagedPayload::from_bytes(b"chunk".to_vec(), "application/octet-stream", "part-1.zip");
    let sent = DigestingUploader::new(&client, &settings)
        .upload(payload, &collection, Method::PUT, true)
        .await
        .unwrap();
    assert_eq!(sent.response.status, 200);
}

#[tokio::test]
async fn expect_continue_can_be_switched_off() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/collection"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;
    let (client, collection) = client_for(&server);
    let settings = UploadSettings {
        expect_continue: false,
        ..UploadSettings::default()
    };

    let payload = PackagedPayload::from_bytes(b"PK\x03\x04bag".to_vec(), "application/zip", "bag.zip");
    let sent = DigestingUploader::new(&client, &settings)
        .upload(payload, &collection, Method::POST, false)
        .await
        .unwrap();
    assert_eq!(sent.response.status, 201);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("expect").is_none());
    assert_eq!(requests[0].body, b"PK\x03\x04bag");
}

#[tokio::test]
async fn error_responses_are_returned_uninterpreted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("<error>disk full</error>"))
        .mount(&server)
        .await;
    let (client, collection) = client_for(&server);
    let settings = UploadSettings::default();

    let payload = PackagedPayload::from_bytes(b"zip".to_vec(), "application/zip", "bag.zip");
    let sent = DigestingUploader::new(&client, &settings)
        .upload(payload, &collection, Method::POST, false)
        .await
        .unwrap();
    assert_eq!(sent.response.status, 500);
    assert!(!sent.response.is_success());
    assert_eq!(sent.response.body, "<error>disk full</error>");
}

#[tokio::test]
async fn truncated_payload_aborts_before_sending() {
    let server = MockServer::start().await;
    let (client, collection) = client_for(&server);
    let settings = UploadSettings::default();

    let payload = PackagedPayload::new(Cursor::new(vec![1u8; 8]), 64, "application/zip", "bag.zip");
    let err = DigestingUploader::new(&client, &settings)
        .upload(payload, &collection, Method::POST, false)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        DepositError::PayloadTruncated {
            declared: 64,
            read: 8
        }
    ));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn payload_from_file_uploads_its_contents() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;
    let (client, collection) = client_for(&server);
    let settings = UploadSettings::default();

    let temp = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(temp.path(), b"PK\x03\x04 bag bytes").unwrap();
    let payload = PackagedPayload::from_file(temp.path(), "application/zip", "bag.zip")
        .await
        .unwrap();
    assert_eq!(payload.length(), 14);

    DigestingUploader::new(&client, &settings)
        .upload(payload, &collection, Method::POST, false)
        .await
        .unwrap();
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[0].body, b"PK\x03\x04 bag bytes");
}
