/// Request/response tests against a local mock endpoint.
#[cfg(test)]
mod unit {
    use crate::{ChatError, ChatMessage, Client, ClientConfig, Role};
    use std::time::Duration;

    fn client_for(server: &mockito::ServerGuard) -> Client {
        Client::new(ClientConfig {
            api_key: "test-key".into(),
            base_url: server.url(),
            timeout: Duration::from_secs(5),
            ..Default::default()
        })
        .expect("client")
    }

    const OK_BODY: &str = r#"{
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "created": 1700000000,
        "model": "gpt-4",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "You have 3 providers."}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    }"#;

    #[test]
    fn empty_api_key_is_rejected() {
        let err = Client::new(ClientConfig::default()).unwrap_err();
        assert!(matches!(err, ChatError::Config(_)));
    }

    #[test]
    fn request_serializes_role_tags() {
        let msg = ChatMessage::system("hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "system");
        assert_eq!(msg.role, Role::System);
    }

    #[tokio::test]
    async fn ask_returns_first_choice() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4",
                "max_tokens": 1000
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(OK_BODY)
            .create_async()
            .await;

        let text = client_for(&server).ask("how many providers?").await.unwrap();
        assert_eq!(text, "You have 3 providers.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .with_body("upstream unavailable")
            .create_async()
            .await;

        let err = client_for(&server).ask("anything").await.unwrap_err();
        match err {
            ChatError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let err = client_for(&server).ask("anything").await.unwrap_err();
        assert!(matches!(err, ChatError::Decode { .. }));
    }

    #[tokio::test]
    async fn empty_choices_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices": []}"#)
            .create_async()
            .await;

        let err = client_for(&server).ask("anything").await.unwrap_err();
        assert!(matches!(err, ChatError::EmptyResponse));
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_tolerated() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_body(OK_BODY)
            .create_async()
            .await;

        let client = Client::new(ClientConfig {
            api_key: "k".into(),
            base_url: format!("{}/", server.url()),
            ..Default::default()
        })
        .unwrap();
        assert!(client.ask("x").await.is_ok());
    }
}
