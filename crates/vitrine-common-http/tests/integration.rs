use vitrine_common_http::{HttpClient, HttpConfig, HttpError};

#[tokio::test]
async fn test_get_text_returns_body() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/templates/hero.hbs")
        .match_header("user-agent", "vitrine-tests")
        .with_status(200)
        .with_body("<h1>{{title}}</h1>")
        .create_async()
        .await;

    let client = HttpClient::with_config(HttpConfig {
        user_agent: "vitrine-tests".to_string(),
        ..HttpConfig::default()
    })
    .expect("Failed to create client");
    let body = client
        .get_text(&format!("{}/templates/hero.hbs", server.url()))
        .await
        .unwrap();

    assert_eq!(body, "<h1>{{title}}</h1>");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_statuses_are_errors() {
    let mut server = mockito::Server::new_async().await;
    for (path, status) in [("/missing.hbs", 404), ("/broken.hbs", 500), ("/limited.hbs", 429)] {
        server
            .mock("GET", path)
            .with_status(status)
            .with_body("ignored")
            .create_async()
            .await;
    }

    let client = HttpClient::new().unwrap();

    for (path, expected) in [("/missing.hbs", 404), ("/broken.hbs", 500), ("/limited.hbs", 429)] {
        match client.get_text(&format!("{}{}", server.url(), path)).await {
            Err(err @ HttpError::Status { .. }) => assert_eq!(err.status(), Some(expected)),
            other => panic!("expected status error for {}, got {:?}", path, other),
        }
    }
}
