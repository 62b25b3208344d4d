//! Gateway tests against a mocked backend.

use mindwell_core::gateway::ApiClient;
use mindwell_core::GatewayError;
use mockito::Matcher;
use serde_json::json;

fn client(server: &mockito::ServerGuard) -> ApiClient {
    ApiClient::new(&server.url(), 2_000).unwrap()
}

#[tokio::test]
async fn login_returns_token_and_user() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/api/auth/login")
        .match_body(Matcher::Json(json!({"username": "ada@example.com", "password": "pw"})))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "access_token": "tok-123",
                "user": {"id": 1, "username": "ada", "email": "ada@example.com", "email_verified": true}
            })
            .to_string(),
        )
        .create_async()
        .await;

    let resp = client(&server).login("ada@example.com", "pw").await.unwrap();
    assert_eq!(resp.token.as_deref(), Some("tok-123"));
    assert_eq!(resp.user.username, "ada");
    mock.assert_async().await;
}

#[tokio::test]
async fn login_unverified_email() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/auth/login")
        .with_status(401)
        .with_body(
            json!({
                "error": "Please verify your email address before logging in",
                "email_verification_required": true,
                "email": "cy@example.com"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let err = client(&server).login("cy", "pw").await.unwrap_err();
    match err {
        GatewayError::EmailNotVerified { email } => assert_eq!(email, "cy@example.com"),
        other => panic!("expected EmailNotVerified, got {other:?}"),
    }
}

#[tokio::test]
async fn login_bad_credentials() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/auth/login")
        .with_status(401)
        .with_body(json!({"error": "Invalid credentials"}).to_string())
        .create_async()
        .await;

    let err = client(&server).login("ada@example.com", "nope").await.unwrap_err();
    match err {
        GatewayError::Auth(msg) => assert_eq!(msg, "Invalid credentials"),
        other => panic!("expected Auth, got {other:?}"),
    }
}

#[tokio::test]
async fn bearer_token_is_sent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/payment/subscription-status")
        .match_header("authorization", "Bearer tok-123")
        .with_status(200)
        .with_body(
            json!({"subscription_status": "premium", "is_premium": true, "expires_at": "2099-01-01T00:00:00"})
                .to_string(),
        )
        .create_async()
        .await;

    let status = client(&server)
        .with_token(Some("tok-123".into()))
        .subscription_status()
        .await
        .unwrap();
    assert!(status.is_premium);
    mock.assert_async().await;
}

#[tokio::test]
async fn expired_token_is_auth_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/auth/profile")
        .with_status(401)
        .with_body(json!({"msg": "Token has expired"}).to_string())
        .create_async()
        .await;

    let err = client(&server)
        .with_token(Some("old".into()))
        .profile()
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Auth(ref m) if m == "Token has expired"));
}

#[tokio::test]
async fn payment_rejection_points_to_support() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/payment/verify-payment")
        .with_status(400)
        .with_body(json!({"error": "Payment verification failed"}).to_string())
        .create_async()
        .await;

    let err = client(&server)
        .with_token(Some("tok".into()))
        .verify_payment("ref-42")
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::PaymentVerification { ref reference, .. } if reference == "ref-42"));
    assert!(err.to_string().contains("contact support"));
}

#[tokio::test]
async fn payment_verified() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/api/payment/verify-payment")
        .match_body(Matcher::Json(json!({"reference": "ref-1"})))
        .with_status(200)
        .with_body(
            json!({
                "message": "Payment verified successfully",
                "subscription_status": "premium",
                "expires_at": "2025-07-01T00:00:00"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let v = client(&server).verify_payment("ref-1").await.unwrap();
    assert_eq!(v.subscription_status, "premium");
    assert_eq!(v.expires_at.as_deref(), Some("2025-07-01T00:00:00"));
}

#[tokio::test]
async fn server_error_is_api_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/community/posts")
        .with_status(500)
        .with_body("oops")
        .create_async()
        .await;

    let err = client(&server).list_posts().await.unwrap_err();
    match err {
        GatewayError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "HTTP error! status: 500");
        }
        other => panic!("expected Api, got {other:?}"),
    }
}

#[tokio::test]
async fn journal_page_query() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/api/journal/entries")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("page".into(), "2".into()),
            Matcher::UrlEncoded("per_page".into(), "5".into()),
        ]))
        .with_status(200)
        .with_body(
            json!({
                "entries": [{"id": 3, "title": "Tuesday", "content": "Calm day", "sentiment": "positive", "created_at": "2025-06-03T08:00:00"}],
                "total": 6, "pages": 2, "current_page": 2
            })
            .to_string(),
        )
        .create_async()
        .await;

    let page = client(&server).fetch_journal_entries(2, 5).await.unwrap();
    assert_eq!(page.entries.len(), 1);
    assert_eq!(page.entries[0].sentiment.as_deref(), Some("positive"));
    assert_eq!(page.total, 6);
    mock.assert_async().await;
}

#[tokio::test]
async fn mood_history_converts_to_entries() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/api/mood/history")
        .match_query(Matcher::UrlEncoded("days".into(), "30".into()))
        .with_status(200)
        .with_body(
            json!({"moods": [
                {"id": 2, "mood": 5, "notes": "sunny", "created_at": "2025-06-02T10:00:00"},
                {"id": 1, "mood": 9, "notes": null, "created_at": "2025-06-01T10:00:00"}
            ]})
            .to_string(),
        )
        .create_async()
        .await;

    let remote = client(&server).fetch_mood_history(30).await.unwrap();
    let entries: Vec<_> = remote.iter().filter_map(|m| m.to_entry()).collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, "server-2");
}

#[tokio::test]
async fn unreachable_backend_is_transport_error() {
    // Nothing listens on port 9 (discard) on test machines.
    let client = ApiClient::new("http://127.0.0.1:9", 500).unwrap();
    let err = client.list_posts().await.unwrap_err();
    assert!(err.is_transport());
}
