use serpgrab_http::{DEFAULT_USER_AGENT, HttpClient, HttpError};
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn has_default_user_agent(req: &Request) -> bool {
    req.headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        == Some(DEFAULT_USER_AGENT)
}

#[tokio::test]
async fn sends_fixed_user_agent_and_returns_markup() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("query", "weather"))
        .and(has_default_user_agent)
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("<html><body>날씨</body></html>", "text/html; charset=utf-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(DEFAULT_USER_AGENT).unwrap();
    let url = Url::parse(&format!("{}/search?query=weather", server.uri())).unwrap();
    let html = client.get_text(&url).await.unwrap();

    assert!(html.contains("날씨"));
}

#[tokio::test]
async fn non_success_status_carries_status_and_snippet() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/blocked"))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-request-id", "abc-123")
                .set_body_string("access denied for bots"),
        )
        .mount(&server)
        .await;

    let client = HttpClient::new(DEFAULT_USER_AGENT).unwrap();
    let url = Url::parse(&format!("{}/blocked", server.uri())).unwrap();
    let err = client.get_text(&url).await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(403));
    match err {
        HttpError::Api {
            message,
            request_id,
            ..
        } => {
            assert_eq!(message, "access denied for bots");
            assert_eq!(request_id, "abc-123");
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn does_not_retry_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let client = HttpClient::new(DEFAULT_USER_AGENT).unwrap();
    let url = Url::parse(&server.uri()).unwrap();
    let err = client.get_text(&url).await.unwrap_err();

    assert_eq!(err.status().map(|s| s.as_u16()), Some(503));
}

#[tokio::test]
async fn transport_failure_is_a_network_error() {
    let client = HttpClient::new(DEFAULT_USER_AGENT).unwrap();
    // Nothing listens on the discard port.
    let url = Url::parse("http://127.0.0.1:9/").unwrap();
    let err = client.get_text(&url).await.unwrap_err();

    assert!(matches!(err, HttpError::Network(_)), "got {err:?}");
    assert!(err.status().is_none());
}
