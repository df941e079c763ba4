//! HTTP client for a Prismic-style content API.
//!
//! Every query is made against a content release ("ref"); the client
//! looks up the current master ref from the API root before each
//! top-level operation so freshly published content is picked up on the
//! next regeneration. Pagination cursors returned by the API are full
//! URLs and are fetched as-is.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, instrument};
use url::Url;

use super::ContentSource;
use crate::config::SiteConfig;
use crate::content::document::{RawDocument, SearchResponse};
use crate::content::{Cursor, PostDetail, PostPage};
use crate::error::{ContentError, Result};

/// Search endpoint, relative to the API root.
const SEARCH_PATH: &str = "documents/search";

/// Page size used when enumerating uids.
const UID_PAGE_SIZE: u32 = 100;

/// Response from the API root.
#[derive(Debug, Deserialize)]
struct ApiRoot {
    #[serde(default)]
    refs: Vec<ApiRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiRef {
    #[serde(rename = "ref")]
    reference: String,
    #[serde(default)]
    is_master_ref: bool,
}

/// A network-backed content source.
#[derive(Debug, Clone)]
pub struct PrismicClient {
    http: reqwest::Client,
    endpoint: Url,
    access_token: Option<String>,
    document_type: String,
}

impl PrismicClient {
    /// Create a client from the site configuration.
    pub fn new(config: &SiteConfig) -> Result<Self> {
        let endpoint = config.api_endpoint.trim();
        if endpoint.is_empty() {
            return Err(ContentError::Config("api_endpoint is not set".to_string()));
        }
        let endpoint = Url::parse(endpoint.trim_end_matches('/'))?;

        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("spacetraveling/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            endpoint,
            access_token: config.access_token.clone().filter(|t| !t.is_empty()),
            document_type: config.document_type.clone(),
        })
    }

    /// Look up the current master ref.
    #[instrument(skip(self))]
    pub async fn master_ref(&self) -> Result<String> {
        let url = self.with_token(self.endpoint.clone());
        let root: ApiRoot = self.get_json(url).await?;

        root.refs
            .into_iter()
            .find(|r| r.is_master_ref)
            .map(|r| r.reference)
            .ok_or_else(|| ContentError::NoMasterRef {
                endpoint: self.endpoint.to_string(),
            })
    }

    fn with_token(&self, mut url: Url) -> Url {
        if let Some(token) = &self.access_token {
            let present = url.query_pairs().any(|(k, _)| k == "access_token");
            if !present {
                url.query_pairs_mut().append_pair("access_token", token);
            }
        }
        url
    }

    fn search_url(&self, reference: &str, predicate: &str, params: &[(&str, String)]) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            SEARCH_PATH
        ))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("ref", reference);
            query.append_pair("q", &format!("[{}]", predicate));
            for (key, value) in params {
                query.append_pair(key, value);
            }
        }
        Ok(self.with_token(url))
    }

    fn type_predicate(&self) -> String {
        format!(r#"[at(document.type,"{}")]"#, self.document_type)
    }

    fn uid_predicate(&self, uid: &str) -> String {
        format!(
            r#"[at(my.{}.uid,"{}")]"#,
            self.document_type,
            uid.replace('\\', "\\\\").replace('"', "\\\"")
        )
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(url = %url, "GET");

        let response = self.http.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ContentSource for PrismicClient {
    #[instrument(skip(self))]
    async fn first_page(&self, page_size: u32) -> Result<PostPage> {
        let reference = self.master_ref().await?;
        let url = self.search_url(
            &reference,
            &self.type_predicate(),
            &[("pageSize", page_size.max(1).to_string())],
        )?;
        let response: SearchResponse = self.get_json(url).await?;
        Ok(response.into_page())
    }

    #[instrument(skip(self, cursor), fields(cursor = %cursor))]
    async fn next_page(&self, cursor: &Cursor) -> Result<PostPage> {
        let url = Url::parse(cursor.as_str())
            .map_err(|e| ContentError::Decode(format!("invalid cursor {}: {}", cursor, e)))?;
        let response: SearchResponse = self.get_json(url).await?;
        Ok(response.into_page())
    }

    #[instrument(skip(self))]
    async fn post_by_uid(&self, uid: &str) -> Result<PostDetail> {
        let reference = self.master_ref().await?;
        let url = self.search_url(
            &reference,
            &self.uid_predicate(uid),
            &[("pageSize", "1".to_string())],
        )?;
        let response: SearchResponse = self.get_json(url).await?;

        response
            .results
            .into_iter()
            .next()
            .and_then(RawDocument::into_detail)
            .ok_or_else(|| ContentError::NotFound {
                uid: uid.to_string(),
            })
    }

    #[instrument(skip(self))]
    async fn post_uids(&self) -> Result<Vec<String>> {
        let reference = self.master_ref().await?;
        let mut url = self.search_url(
            &reference,
            &self.type_predicate(),
            &[
                ("pageSize", UID_PAGE_SIZE.to_string()),
                ("fetch", format!("{}.slug", self.document_type)),
            ],
        )?;

        let mut uids = Vec::new();
        loop {
            let response: SearchResponse = self.get_json(url).await?;
            uids.extend(
                response
                    .results
                    .into_iter()
                    .filter_map(|doc| doc.uid)
                    .filter(|uid| !uid.is_empty()),
            );

            match response.next_page.and_then(Cursor::new) {
                Some(next) => {
                    url = Url::parse(next.as_str()).map_err(|e| {
                        ContentError::Decode(format!("invalid next_page {}: {}", next, e))
                    })?;
                }
                None => break,
            }
        }

        debug!(count = uids.len(), "Enumerated post uids");
        Ok(uids)
    }
}
