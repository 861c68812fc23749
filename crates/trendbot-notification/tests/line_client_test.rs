//! LINE 클라이언트 HTTP 테스트.

use mockito::Matcher;
use trendbot_notification::{
    LineClient, LineClientConfig, NotificationError, PushTransport, ReplyTransport,
};

fn client_for(server: &mockito::ServerGuard) -> LineClient {
    LineClient::new(LineClientConfig::new(
        format!("{}/v2/bot", server.url()),
        "test-token",
    ))
    .unwrap()
}

#[tokio::test]
async fn test_reply_sends_text_messages() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/bot/message/reply")
        .match_header("authorization", "Bearer test-token")
        .match_body(Matcher::Json(serde_json::json!({
            "replyToken": "reply-1",
            "messages": [
                {"type": "text", "text": "first"},
                {"type": "text", "text": "second"}
            ]
        })))
        .with_status(200)
        .with_body("{}")
        .create_async()
        .await;

    let client = client_for(&server);
    client
        .reply("reply-1", &["first".to_string(), "second".to_string()])
        .await
        .unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_reply_truncates_to_five() {
    let mut server = mockito::Server::new_async().await;
    let expected: Vec<_> = (0..5)
        .map(|i| serde_json::json!({"type": "text", "text": format!("m{i}")}))
        .collect();
    let mock = server
        .mock("POST", "/v2/bot/message/reply")
        .match_body(Matcher::Json(serde_json::json!({
            "replyToken": "reply-1",
            "messages": expected
        })))
        .with_status(200)
        .create_async()
        .await;

    let messages: Vec<String> = (0..7).map(|i| format!("m{i}")).collect();
    client_for(&server).reply("reply-1", &messages).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_push_chunks_messages() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/bot/message/push")
        .match_body(Matcher::PartialJson(serde_json::json!({"to": "U1"})))
        .with_status(200)
        .expect(2)
        .create_async()
        .await;

    let messages: Vec<String> = (0..6).map(|i| format!("m{i}")).collect();
    client_for(&server).push("U1", &messages).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_expired_reply_token() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v2/bot/message/reply")
        .with_status(400)
        .with_body(r#"{"message":"Invalid reply token"}"#)
        .create_async()
        .await;

    let err = client_for(&server)
        .reply("expired", &["hi".to_string()])
        .await
        .unwrap_err();
    match err {
        NotificationError::ApiError { status, message } => {
            assert_eq!(status, 400);
            assert!(message.contains("Invalid reply token"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_rate_limited() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v2/bot/message/push")
        .with_status(429)
        .create_async()
        .await;

    let err = client_for(&server)
        .push("U1", &["hi".to_string()])
        .await
        .unwrap_err();
    assert!(matches!(err, NotificationError::RateLimited(_)));
}

#[tokio::test]
async fn test_profile_and_bot_info() {
    let mut server = mockito::Server::new_async().await;
    let _profile = server
        .mock("GET", "/v2/bot/profile/U42")
        .with_status(200)
        .with_body(
            serde_json::json!({
                "userId": "U42",
                "displayName": "Amy",
                "pictureUrl": "https://example.com/a.png"
            })
            .to_string(),
        )
        .create_async()
        .await;
    let _info = server
        .mock("GET", "/v2/bot/info")
        .with_status(200)
        .with_body(
            serde_json::json!({
                "userId": "Ubot",
                "basicId": "@123abc",
                "displayName": "Trend Bot",
                "chatMode": "bot"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let profile = client.get_profile("U42").await.unwrap();
    assert_eq!(profile.display_name, "Amy");
    assert_eq!(profile.status_message, None);

    let info = client.bot_info().await.unwrap();
    assert_eq!(info.display_name, "Trend Bot");
    assert_eq!(info.basic_id.as_deref(), Some("@123abc"));
}

#[tokio::test]
async fn test_unauthorized_bot_info() {
    let mut server = mockito::Server::new_async().await;
    let _info = server
        .mock("GET", "/v2/bot/info")
        .with_status(401)
        .with_body(r#"{"message":"Authentication failed"}"#)
        .create_async()
        .await;

    let err = client_for(&server).bot_info().await.unwrap_err();
    assert!(matches!(err, NotificationError::ApiError { status: 401, .. }));
}
