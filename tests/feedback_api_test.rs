use std::time::Duration;

use hcm202_bot::feedback::{Feedback, FeedbackError, FeedbackStore, SupabaseFeedbackStore};
use hcm202_bot::i18n::Language;
use mockito::Matcher;
use serde_json::json;

fn store(server: &mockito::ServerGuard) -> SupabaseFeedbackStore {
    SupabaseFeedbackStore::new(
        Some(format!("{}/", server.url())),
        Some("anon-key".to_string()),
        "feedback",
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn inserts_one_row() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/rest/v1/feedback")
        .match_header("apikey", "anon-key")
        .match_header("authorization", "Bearer anon-key")
        .match_header("prefer", "return=minimal")
        .match_body(Matcher::Json(json!([{
            "rating": 5,
            "feedback": "Rất hữu ích",
            "email": "sv@fpt.edu.vn",
            "language": "vi"
        }])))
        .with_status(201)
        .create_async()
        .await;

    let feedback = Feedback::new(5, "Rất hữu ích", Some("sv@fpt.edu.vn"), Language::Vietnamese)
        .unwrap();
    store(&server).submit(&feedback).await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn rejected_insert_surfaces_the_status() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/rest/v1/feedback")
        .with_status(401)
        .with_body(r#"{"message":"Invalid API key"}"#)
        .create_async()
        .await;

    let feedback = Feedback::new(3, "ok", None, Language::English).unwrap();
    match store(&server).submit(&feedback).await {
        Err(FeedbackError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("Invalid API key"));
        }
        other => panic!("unexpected result {other:?}"),
    }
}
