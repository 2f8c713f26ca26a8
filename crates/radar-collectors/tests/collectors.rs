//! Integration tests for the platform collectors using wiremock HTTP mocks.

use radar_collectors::{
    Collector, ProductHuntCollector, RedditCollector, RedditCredentials, TwitterCollector,
};
use radar_core::Platform;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn keywords(terms: &[&str]) -> Vec<String> {
    terms.iter().map(|t| (*t).to_string()).collect()
}

fn reddit_collector(server: &MockServer) -> RedditCollector {
    RedditCollector::new(
        Some(RedditCredentials {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
        }),
        "radar-test/1.0",
        vec!["startups".to_string(), "SaaS".to_string()],
        5,
    )
    .expect("client construction should not fail")
    .with_base_urls(&server.uri(), &server.uri())
}

fn reddit_listing(urls: &[&str]) -> serde_json::Value {
    let children: Vec<serde_json::Value> = urls
        .iter()
        .map(|url| {
            serde_json::json!({
                "kind": "t3",
                "data": {
                    "title": format!("Post at {url}"),
                    "selftext": "We are stuck doing this by hand",
                    "score": 25,
                    "num_comments": 11,
                    "url": url,
                    "created_utc": 1_767_225_600.0
                }
            })
        })
        .collect();
    serde_json::json!({ "kind": "Listing", "data": { "children": children, "after": null } })
}

// ---------------------------------------------------------------------------
// Reddit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn reddit_searches_each_keyword_and_dedups_by_url() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "tok",
                "token_type": "bearer",
                "expires_in": 3600
            })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/startups+SaaS/search"))
        .and(query_param("q", "churn"))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reddit_listing(&[
            "https://www.reddit.com/r/SaaS/comments/1/",
            "https://www.reddit.com/r/SaaS/comments/2/",
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/r/startups+SaaS/search"))
        .and(query_param("q", "costly"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reddit_listing(&[
            "https://www.reddit.com/r/SaaS/comments/2/",
            "https://www.reddit.com/r/startups/comments/3/",
        ])))
        .mount(&server)
        .await;

    let collector = reddit_collector(&server);
    let posts = collector.fetch(&keywords(&["churn", "costly"]), 30).await;

    assert_eq!(posts.len(), 3);
    assert!(posts.iter().all(|p| p.platform == Platform::Reddit));
    assert_eq!(posts[0].upvotes, 25);
    assert_eq!(posts[0].comments, 11);
}

#[tokio::test]
async fn reddit_token_rejection_yields_empty_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/v1/access_token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let posts = reddit_collector(&server)
        .fetch(&keywords(&["churn"]), 30)
        .await;

    assert!(posts.is_empty());
}

#[tokio::test]
async fn reddit_without_credentials_never_calls_out() {
    let server = MockServer::start().await;
    let collector = RedditCollector::new(None, "radar-test/1.0", vec!["SaaS".to_string()], 5)
        .expect("client construction should not fail")
        .with_base_urls(&server.uri(), &server.uri());

    let posts = collector.fetch(&keywords(&["churn"]), 30).await;

    assert!(!collector.is_enabled());
    assert!(posts.is_empty());
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

// ---------------------------------------------------------------------------
// Product Hunt
// ---------------------------------------------------------------------------

#[tokio::test]
async fn producthunt_keeps_only_keyword_matches() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "data": {
            "posts": {
                "edges": [
                    { "node": {
                        "name": "ChurnGuard",
                        "tagline": "Stop losing customers",
                        "description": "Churn prediction for SaaS",
                        "votesCount": 410,
                        "commentsCount": 38,
                        "url": "https://www.producthunt.com/posts/churnguard",
                        "createdAt": "2026-03-01T08:00:00Z"
                    }},
                    { "node": {
                        "name": "PixelPal",
                        "tagline": "Photo filters",
                        "description": null,
                        "votesCount": 90,
                        "commentsCount": 4,
                        "url": "https://www.producthunt.com/posts/pixelpal",
                        "createdAt": "2026-03-01T09:00:00Z"
                    }}
                ]
            }
        }
    });

    Mock::given(method("POST"))
        .and(path("/graphql"))
        .and(header("authorization", "Bearer ph-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let collector = ProductHuntCollector::new(Some("ph-token".to_string()), 5)
        .expect("client construction should not fail")
        .with_endpoint(&format!("{}/graphql", server.uri()));

    let posts = collector.fetch(&keywords(&["Churn"]), 30).await;

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "ChurnGuard");
    assert_eq!(
        posts[0].content,
        "Stop losing customers\n\nChurn prediction for SaaS"
    );
    assert_eq!(posts[0].upvotes, 410);
}

#[tokio::test]
async fn producthunt_server_error_yields_empty_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let collector = ProductHuntCollector::new(Some("ph-token".to_string()), 5)
        .expect("client construction should not fail")
        .with_endpoint(&server.uri());

    assert!(collector.fetch(&keywords(&["churn"]), 30).await.is_empty());
}

// ---------------------------------------------------------------------------
// Twitter
// ---------------------------------------------------------------------------

#[tokio::test]
async fn twitter_skips_failing_keyword_and_dedups_ids() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("query", "\"bottleneck\" lang:en -is:retweet"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;

    let page = serde_json::json!({
        "data": [
            { "id": "1", "text": "Our manual process is costly",
              "created_at": "2026-03-03T10:00:00.000Z",
              "public_metrics": { "like_count": 40, "reply_count": 2 } },
            { "id": "1", "text": "Our manual process is costly",
              "created_at": "2026-03-03T10:00:00.000Z",
              "public_metrics": { "like_count": 40, "reply_count": 2 } },
            { "id": "2", "text": "Need help with payroll",
              "public_metrics": { "like_count": 1, "reply_count": 0 } }
        ],
        "meta": { "result_count": 3 }
    });

    Mock::given(method("GET"))
        .and(path("/2/tweets/search/recent"))
        .and(query_param("query", "\"manual process\" lang:en -is:retweet"))
        .and(query_param("max_results", "15"))
        .and(header("authorization", "Bearer tw-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page))
        .mount(&server)
        .await;

    let collector = TwitterCollector::new(Some("tw-token".to_string()), 5)
        .expect("client construction should not fail")
        .with_base_url(&server.uri());

    let posts = collector
        .fetch(&keywords(&["bottleneck", "manual process"]), 15)
        .await;

    assert_eq!(posts.len(), 2);
    assert_eq!(posts[0].url, "https://x.com/i/web/status/1");
    assert_eq!(posts[0].upvotes, 40);
    assert_eq!(posts[1].url, "https://x.com/i/web/status/2");
}

#[tokio::test]
async fn twitter_without_token_returns_empty() {
    let collector = TwitterCollector::new(None, 5).expect("client construction should not fail");

    assert_eq!(collector.platform(), Platform::Twitter);
    assert!(collector.fetch(&keywords(&["churn"]), 15).await.is_empty());
}
