use chrono::{Duration, Utc};

use newsbrief::ingestion::{FeedClient, FeedError};

fn rss_with_ages(day_offsets: &[i64]) -> String {
    let items: String = day_offsets
        .iter()
        .map(|days| {
            let published = (Utc::now() - Duration::days(*days)).to_rfc2822();
            format!(
                "<item><title>story-{days}d</title>\
                 <link>https://example.com/story-{days}d</link>\
                 <pubDate>{published}</pubDate></item>"
            )
        })
        .collect();
    format!("<rss version=\"2.0\"><channel><title>t</title>{items}</channel></rss>")
}

fn client_for(server: &mockito::Server) -> FeedClient {
    FeedClient::new(format!("{}/feed.xml", server.url()), 7, 3600, 10).expect("feed client")
}

#[tokio::test]
async fn test_recency_window_applied_end_to_end() {
    let mut server = mockito::Server::new_async().await;

    let mock = server
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_header("content-type", "application/rss+xml")
        .with_body(rss_with_ages(&[10, 5]))
        .create_async()
        .await;

    let client = client_for(&server);
    let headlines = client.recent_headlines().await.expect("headlines");

    // The 10-day-old item falls outside the 7-day window.
    assert_eq!(headlines.len(), 1);
    assert_eq!(headlines[0].title, "story-5d");

    mock.assert_async().await;
}

#[tokio::test]
async fn test_headlines_sorted_newest_first() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_body(rss_with_ages(&[5, 1, 3]))
        .create_async()
        .await;

    let client = client_for(&server);
    let headlines = client.recent_headlines().await.expect("headlines");

    let titles: Vec<&str> = headlines.iter().map(|h| h.title.as_str()).collect();
    assert_eq!(titles, vec!["story-1d", "story-3d", "story-5d"]);
}

#[tokio::test]
async fn test_cached_body_reused_within_freshness_window() {
    let mut server = mockito::Server::new_async().await;

    // Exactly one upstream hit expected for two requests.
    let mock = server
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_body(rss_with_ages(&[1]))
        .expect(1)
        .create_async()
        .await;

    let client = client_for(&server);
    let first = client.recent_headlines().await.expect("first fetch");
    let second = client.recent_headlines().await.expect("second fetch");
    assert_eq!(first, second);

    mock.assert_async().await;
}

#[tokio::test]
async fn test_non_success_status_surfaces_as_fetch_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/feed.xml")
        .with_status(503)
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.recent_headlines().await.unwrap_err();

    match err {
        FeedError::Fetch { status, .. } => assert_eq!(status, 503),
        other => panic!("expected fetch error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unrecognized_body_surfaces_as_format_error() {
    let mut server = mockito::Server::new_async().await;

    let _mock = server
        .mock("GET", "/feed.xml")
        .with_status(200)
        .with_body("<html><body>maintenance page</body></html>")
        .create_async()
        .await;

    let client = client_for(&server);
    let err = client.recent_headlines().await.unwrap_err();
    assert!(matches!(err, FeedError::Format(_)));
}
