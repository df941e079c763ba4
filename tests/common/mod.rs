//! Shared helpers for the mock content API tests.

#![allow(dead_code)]

use serde_json::{json, Value};
use spacetraveling::config::SiteConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const MASTER_REF: &str = "YF0yhxEAACMAHxsl";

/// API root URL served by the mock server.
pub fn endpoint(server: &MockServer) -> String {
    format!("{}/api/v2", server.uri())
}

pub fn search_url(server: &MockServer, page: u32) -> String {
    format!("{}/api/v2/documents/search?page={}", server.uri(), page)
}

pub fn config(server: &MockServer) -> SiteConfig {
    SiteConfig {
        api_endpoint: endpoint(server),
        ..Default::default()
    }
}

/// Mount the API root advertising a master ref.
pub async fn mount_api_root(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "refs": [
                {"id": "preview", "ref": "preview-ref", "label": "Preview", "isMasterRef": false},
                {"id": "master", "ref": MASTER_REF, "label": "Master", "isMasterRef": true}
            ],
            "types": {"repeatable": "Post"}
        })))
        .mount(server)
        .await;
}

pub fn document(uid: &str, title: &str) -> Value {
    json!({
        "id": format!("id-{}", uid),
        "uid": uid,
        "type": "repeatable",
        "first_publication_date": "2021-03-15T19:25:28+0000",
        "data": {
            "title": title,
            "subtitle": format!("Subtitle of {}", title),
            "author": "Joseph Oliveira",
            "banner": {"url": "https://images.prismic.io/banner.png"},
            "content": [
                {
                    "heading": "Proin et varius",
                    "body": [
                        {"type": "paragraph", "text": "Lorem ipsum dolor sit amet", "spans": [
                            {"start": 0, "end": 5, "type": "strong"}
                        ]}
                    ]
                }
            ]
        }
    })
}

pub fn search_page(results: Vec<Value>, next_page: Option<String>) -> Value {
    json!({
        "page": 1,
        "results_per_page": results.len(),
        "results_size": results.len(),
        "total_results_size": results.len(),
        "next_page": next_page,
        "prev_page": null,
        "results": results
    })
}
