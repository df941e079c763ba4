//! Content client tests against a mock content API.
//!
//! These tests use wiremock to simulate the API and check the client's
//! requests and error mapping without network access.

mod common;

use common::*;
use serde_json::json;
use spacetraveling::client::{ContentSource, PrismicClient};
use spacetraveling::content::Cursor;
use spacetraveling::error::ContentError;
use spacetraveling::pagination::{ListingController, LoadStatus, PaginationState};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEARCH: &str = "/api/v2/documents/search";

#[tokio::test]
async fn test_first_page_uses_master_ref_and_page_size() {
    let server = MockServer::start().await;
    mount_api_root(&server).await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("ref", MASTER_REF))
        .and(query_param("q", r#"[[at(document.type,"repeatable")]]"#))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
            vec![document("como-utilizar-hooks", "Como utilizar Hooks")],
            Some(search_url(&server, 2)),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = PrismicClient::new(&config(&server)).unwrap();
    let page = client.first_page(1).await.unwrap();

    assert_eq!(page.summaries.len(), 1);
    assert_eq!(page.summaries[0].uid, "como-utilizar-hooks");
    assert_eq!(page.summaries[0].author, "Joseph Oliveira");
    assert_eq!(
        page.next_cursor.unwrap().as_str(),
        search_url(&server, 2)
    );
}

#[tokio::test]
async fn test_access_token_sent_on_every_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .and(query_param("access_token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "refs": [{"ref": MASTER_REF, "isMasterRef": true}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("access_token", "secret"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(vec![], None)))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config(&server);
    config.access_token = Some("secret".to_string());
    let client = PrismicClient::new(&config).unwrap();

    let page = client.first_page(1).await.unwrap();
    assert!(page.summaries.is_empty());
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_next_page_fetches_cursor_directly() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
            vec![document("criando-um-app-cra-do-zero", "Criando um app CRA do zero")],
            None,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = PrismicClient::new(&config(&server)).unwrap();
    let cursor = Cursor::new(search_url(&server, 2)).unwrap();
    let page = client.next_page(&cursor).await.unwrap();

    assert_eq!(page.summaries[0].uid, "criando-um-app-cra-do-zero");
    assert!(page.next_cursor.is_none());
}

#[tokio::test]
async fn test_post_by_uid() {
    let server = MockServer::start().await;
    mount_api_root(&server).await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("q", r#"[[at(my.repeatable.uid,"como-utilizar-hooks")]]"#))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
            vec![document("como-utilizar-hooks", "Como utilizar Hooks")],
            None,
        )))
        .mount(&server)
        .await;

    let client = PrismicClient::new(&config(&server)).unwrap();
    let post = client.post_by_uid("como-utilizar-hooks").await.unwrap();

    assert_eq!(post.title, "Como utilizar Hooks");
    assert_eq!(post.banner_url, "https://images.prismic.io/banner.png");
    assert_eq!(post.sections.len(), 1);
    assert_eq!(post.sections[0].heading, "Proin et varius");
}

#[tokio::test]
async fn test_post_by_uid_not_found() {
    let server = MockServer::start().await;
    mount_api_root(&server).await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(vec![], None)))
        .mount(&server)
        .await;

    let client = PrismicClient::new(&config(&server)).unwrap();
    let err = client.post_by_uid("nope").await.unwrap_err();
    assert!(matches!(err, ContentError::NotFound { uid } if uid == "nope"));
}

#[tokio::test]
async fn test_post_uids_follows_every_page() {
    let server = MockServer::start().await;
    mount_api_root(&server).await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
            vec![document("c", "C")],
            None,
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("fetch", "repeatable.slug"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
            vec![document("a", "A"), document("b", "B")],
            Some(search_url(&server, 2)),
        )))
        .mount(&server)
        .await;

    let client = PrismicClient::new(&config(&server)).unwrap();
    let uids = client.post_uids().await.unwrap();
    assert_eq!(uids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_missing_master_ref() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"refs": []})))
        .mount(&server)
        .await;

    let client = PrismicClient::new(&config(&server)).unwrap();
    let err = client.first_page(1).await.unwrap_err();
    assert!(matches!(err, ContentError::NoMasterRef { .. }));
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = PrismicClient::new(&config(&server)).unwrap();
    let cursor = Cursor::new(search_url(&server, 2)).unwrap();
    let err = client.next_page(&cursor).await.unwrap_err();
    assert!(matches!(err, ContentError::Status { status: 500, .. }));
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_malformed_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = PrismicClient::new(&config(&server)).unwrap();
    let cursor = Cursor::new(search_url(&server, 2)).unwrap();
    let err = client.next_page(&cursor).await.unwrap_err();
    assert!(matches!(err, ContentError::Decode(_)));
}

#[tokio::test]
async fn test_load_more_against_api() {
    let server = MockServer::start().await;
    mount_api_root(&server).await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
            vec![document("b", "B")],
            Some(search_url(&server, 3)),
        )))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path(SEARCH))
        .and(query_param("pageSize", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_page(
            vec![document("a", "A")],
            Some(search_url(&server, 2)),
        )))
        .mount(&server)
        .await;

    let client = PrismicClient::new(&config(&server)).unwrap();

    let state = PaginationState::initialize(client.first_page(1).await.unwrap());
    let state = state.load_more(&client).await.unwrap();
    let uids: Vec<_> = state.summaries().iter().map(|s| s.uid.as_str()).collect();
    assert_eq!(uids, vec!["a", "b"]);

    let mut controller = ListingController::new(client.first_page(1).await.unwrap());
    controller.load_more(&client).await.unwrap();
    let before = controller.state().clone();

    let err = controller.load_more(&client).await.unwrap_err();
    assert!(matches!(err, ContentError::Status { status: 503, .. }));
    assert!(matches!(controller.status(), LoadStatus::Failed(_)));
    assert_eq!(controller.state(), &before);
}
