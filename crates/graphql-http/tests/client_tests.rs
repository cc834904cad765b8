//! Integration tests for the GraphQL client against a mock server.

use std::time::Duration;

use graphql_http::{CancellationToken, ClientError, GraphQLClient, GraphQLRequest};
use serde::Deserialize;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

async fn mount(mock_server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/graphql"))
        .respond_with(response)
        .mount(mock_server)
        .await;
}

fn endpoint(mock_server: &MockServer) -> String {
    format!("{}/graphql", mock_server.uri())
}

async fn received(mock_server: &MockServer) -> Vec<Request> {
    mock_server
        .received_requests()
        .await
        .expect("Request recording enabled")
}

fn header<'a>(request: &'a Request, name: &str) -> Option<&'a str> {
    request.headers.get(name).map(|v| v.to_str().unwrap())
}

#[derive(Debug, Deserialize, PartialEq)]
struct User {
    name: String,
}

#[derive(Debug, Deserialize, PartialEq)]
struct UserData {
    user: User,
}

#[tokio::test]
async fn test_json_request() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(json!({"data": {"user": {"name": "Ada"}}})),
    )
    .await;

    let client = GraphQLClient::new(endpoint(&mock_server))
        .header("X-Client", "tests")
        .build()
        .expect("Failed to build client");

    let request = GraphQLRequest::new("query User($id: ID!) { user(id: $id) { name } }")
        .variable("id", 1)
        .header("Authorization", "Bearer token123");

    let response = client.run::<UserData>(&request).await.expect("Request failed");
    assert!(response.is_success());
    assert_eq!(response.data.unwrap().user.name, "Ada");

    let requests = received(&mock_server).await;
    assert_eq!(requests.len(), 1);
    let sent = &requests[0];
    assert_eq!(
        std::str::from_utf8(&sent.body).unwrap(),
        r#"{"query":"query User($id: ID!) { user(id: $id) { name } }","variables":{"id":1}}"#
    );
    assert_eq!(header(sent, "content-type"), Some("application/json; charset=utf-8"));
    assert_eq!(header(sent, "accept"), Some("application/json"));
    assert_eq!(header(sent, "authorization"), Some("Bearer token123"));
    assert_eq!(header(sent, "x-client"), Some("tests"));
}

#[tokio::test]
async fn test_appended_headers_keep_every_value() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, ResponseTemplate::new(200).set_body_json(json!({"data": {}}))).await;

    let client = GraphQLClient::new(endpoint(&mock_server)).build().unwrap();
    let request = GraphQLRequest::new("{ a }")
        .append_header("X-Trace", "one")
        .append_header("X-Trace", "two");

    client.execute(&request).await.expect("Request failed");

    let requests = received(&mock_server).await;
    let values: Vec<_> = requests[0]
        .headers
        .get_all("x-trace")
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect();
    assert_eq!(values, vec!["one", "two"]);
}

#[tokio::test]
async fn test_request_header_overrides_client_default() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, ResponseTemplate::new(200).set_body_json(json!({"data": {}}))).await;

    let client = GraphQLClient::new(endpoint(&mock_server))
        .bearer_auth("default")
        .build()
        .unwrap();

    client
        .execute(&GraphQLRequest::new("{ a }").header("Authorization", "Bearer override"))
        .await
        .expect("Request failed");
    client
        .execute(&GraphQLRequest::new("{ a }").header("Accept", "application/graphql-response+json"))
        .await
        .expect("Request failed");

    let requests = received(&mock_server).await;
    let auth: Vec<_> = requests[0].headers.get_all("authorization").iter().collect();
    assert_eq!(auth, vec!["Bearer override"]);

    let auth: Vec<_> = requests[1].headers.get_all("authorization").iter().collect();
    assert_eq!(auth, vec!["Bearer default"]);
    let accept: Vec<_> = requests[1].headers.get_all("accept").iter().collect();
    assert_eq!(accept, vec!["application/graphql-response+json"]);
}

#[tokio::test]
async fn test_multipart_request() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(json!({"data": {"singleUpload": {"id": "f1"}}})),
    )
    .await;

    let client = GraphQLClient::new(endpoint(&mock_server))
        .multipart_boundary("XBOUNDARYX")
        .expect("Valid boundary")
        .build()
        .unwrap();

    let request = GraphQLRequest::new("mutation ($file: Upload!) { singleUpload(file: $file) { id } }")
        .file("file", "a.txt", "Alpha file content.\n");

    let response = client.execute(&request).await.expect("Request failed");
    assert_eq!(response.data.unwrap()["singleUpload"]["id"], "f1");

    let requests = received(&mock_server).await;
    let sent = &requests[0];
    assert_eq!(
        header(sent, "content-type"),
        Some("multipart/form-data; boundary=XBOUNDARYX")
    );

    let expected = concat!(
        "--XBOUNDARYX\r\n",
        "Content-Disposition: form-data; name=\"operations\"\r\n",
        "\r\n",
        r#"{"query":"mutation ($file: Upload!) { singleUpload(file: $file) { id } }","variables":{"file":null}}"#,
        "\r\n--XBOUNDARYX\r\n",
        "Content-Disposition: form-data; name=\"map\"\r\n",
        "\r\n",
        r#"{"0":["variables.file"]}"#,
        "\r\n--XBOUNDARYX\r\n",
        "Content-Disposition: form-data; name=\"0\"; filename=\"a.txt\"\r\n",
        "Content-Type: text/plain; charset=utf-8\r\n",
        "\r\n",
        "Alpha file content.\n",
        "\r\n--XBOUNDARYX--\r\n",
    );
    assert_eq!(std::str::from_utf8(&sent.body).unwrap(), expected);
}

#[tokio::test]
async fn test_upload_from_path() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let file_path = dir.path().join("report.csv");
    std::fs::write(&file_path, "a,b\n1,2\n").expect("Failed to write file");

    let mock_server = MockServer::start().await;
    mount(&mock_server, ResponseTemplate::new(200).set_body_json(json!({"data": {"ok": true}}))).await;

    let client = GraphQLClient::new(endpoint(&mock_server)).build().unwrap();
    let request = GraphQLRequest::new("mutation ($file: Upload!) { upload(file: $file) }")
        .file("file", "report.csv", file_path);

    #[derive(Deserialize)]
    struct Uploaded {
        ok: bool,
    }
    let data: Uploaded = client.run_data(&request).await.expect("Request failed");
    assert!(data.ok);

    let requests = received(&mock_server).await;
    let body = String::from_utf8_lossy(&requests[0].body);
    assert!(body.contains(concat!(
        "Content-Disposition: form-data; name=\"0\"; filename=\"report.csv\"\r\n",
        "Content-Type: text/csv; charset=utf-8\r\n",
        "\r\n",
        "a,b\n1,2\n",
    )));
}

#[tokio::test]
async fn test_forced_multipart_without_files() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, ResponseTemplate::new(200).set_body_json(json!({"data": {"a": 1}}))).await;

    let client = GraphQLClient::new(endpoint(&mock_server))
        .use_multipart()
        .build()
        .unwrap();

    client
        .execute(&GraphQLRequest::new("{ a }"))
        .await
        .expect("Request failed");

    let requests = received(&mock_server).await;
    let sent = &requests[0];
    assert!(
        header(sent, "content-type")
            .unwrap()
            .starts_with("multipart/form-data; boundary=")
    );
    let body = String::from_utf8_lossy(&sent.body);
    assert!(body.contains("name=\"map\"\r\n\r\n{}\r\n"));
}

#[tokio::test]
async fn test_errors_returned_with_data() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(200).set_body_json(json!({
            "data": {"user": {"name": "Ada"}},
            "errors": [
                {"message": "first", "path": ["user", "email"]},
                {"message": "second"}
            ]
        })),
    )
    .await;

    let client = GraphQLClient::new(endpoint(&mock_server)).build().unwrap();
    let request = GraphQLRequest::new("{ user { name email } }");

    let response = client.run::<UserData>(&request).await.expect("Request failed");
    assert!(response.has_errors());
    assert_eq!(response.errors.len(), 2);
    assert_eq!(response.errors[0].message, "first");
    assert_eq!(response.errors[1].message, "second");
    assert_eq!(response.data.as_ref().unwrap().user.name, "Ada");

    let err = client.run_data::<UserData>(&request).await.unwrap_err();
    match err {
        ClientError::GraphQL(errors) => assert_eq!(errors.len(), 2),
        other => panic!("Expected GraphQL error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_status() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, ResponseTemplate::new(500).set_body_string("upstream exploded")).await;

    let client = GraphQLClient::new(endpoint(&mock_server)).build().unwrap();
    let err = client
        .execute(&GraphQLRequest::new("{ a }"))
        .await
        .unwrap_err();

    match err {
        ClientError::HttpStatus { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message.as_deref(), Some("upstream exploded"));
        }
        other => panic!("Expected HttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_response() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, ResponseTemplate::new(200).set_body_string("<html>oops</html>")).await;

    let client = GraphQLClient::new(endpoint(&mock_server)).build().unwrap();
    let err = client
        .execute(&GraphQLRequest::new("{ a }"))
        .await
        .unwrap_err();
    assert!(err.is_decoding());
}

#[tokio::test]
async fn test_connection_refused() {
    // Nothing listens on the discard port.
    let client = GraphQLClient::new("http://127.0.0.1:9/graphql").build().unwrap();
    let err = client
        .execute(&GraphQLRequest::new("{ a }"))
        .await
        .unwrap_err();
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_timeout() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_json(json!({"data": {}}))
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let client = GraphQLClient::new(endpoint(&mock_server))
        .request_timeout(Duration::from_millis(100))
        .build()
        .unwrap();

    let err = client
        .execute(&GraphQLRequest::new("{ a }"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Timeout));
}

#[tokio::test]
async fn test_cancel_in_flight() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(200)
            .set_body_json(json!({"data": {}}))
            .set_delay(Duration::from_secs(5)),
    )
    .await;

    let client = GraphQLClient::new(endpoint(&mock_server)).build().unwrap();
    let token = CancellationToken::new();

    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let started = std::time::Instant::now();
    let err = client
        .run_with_cancel::<Value>(&GraphQLRequest::new("{ a }"), &token)
        .await
        .unwrap_err();

    assert!(matches!(err, ClientError::Cancelled));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn test_cookies_round_trip() {
    let mock_server = MockServer::start().await;
    mount(
        &mock_server,
        ResponseTemplate::new(200)
            .insert_header("set-cookie", "session=abc; Path=/")
            .set_body_json(json!({"data": {}})),
    )
    .await;

    let client = GraphQLClient::new(endpoint(&mock_server))
        .cookies()
        .build()
        .unwrap();
    let request = GraphQLRequest::new("{ a }");

    client.execute(&request).await.expect("First request failed");
    assert_eq!(client.cookie_header().unwrap().as_deref(), Some("session=abc"));

    client.execute(&request).await.expect("Second request failed");
    client.clear_cookies().unwrap();
    client.add_cookie("theme", "dark").unwrap();

    let requests = received(&mock_server).await;
    assert_eq!(header(&requests[0], "cookie"), None);
    assert_eq!(header(&requests[1], "cookie"), Some("session=abc"));
    assert_eq!(client.cookie_header().unwrap().as_deref(), Some("theme=dark"));
}

#[tokio::test]
async fn test_client_is_shareable() {
    let mock_server = MockServer::start().await;
    mount(&mock_server, ResponseTemplate::new(200).set_body_json(json!({"data": {"n": 1}}))).await;

    let client = GraphQLClient::new(endpoint(&mock_server)).build().unwrap();

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.execute(&GraphQLRequest::new("{ n }")).await })
        })
        .collect();

    for handle in handles {
        let response = handle.await.unwrap().expect("Request failed");
        assert_eq!(response.data.unwrap()["n"], 1);
    }
    assert_eq!(received(&mock_server).await.len(), 4);
}
