//! Raw API documents and their conversion into post models
//!
//! The API nests post fields under `data` and leaves optional fields
//! `null`. Conversion flattens the document and degrades missing text
//! fields to empty strings.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::richtext::RichTextBlock;
use super::{Cursor, PostDetail, PostPage, PostSummary, Section};

/// Response body of a document search
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<RawDocument>,
    #[serde(default)]
    pub next_page: Option<String>,
}

impl SearchResponse {
    /// Convert to a listing page, skipping documents without a uid
    pub fn into_page(self) -> PostPage {
        let summaries = self
            .results
            .into_iter()
            .filter_map(|doc| {
                let summary = doc.into_summary();
                if summary.is_none() {
                    tracing::warn!("Skipping document without uid");
                }
                summary
            })
            .collect();
        PostPage::new(summaries, self.next_page.and_then(Cursor::new))
    }
}

/// A single document as returned by the API
#[derive(Debug, Deserialize)]
pub struct RawDocument {
    #[serde(default)]
    pub uid: Option<String>,
    #[serde(default)]
    pub first_publication_date: Option<String>,
    #[serde(default)]
    pub data: Option<RawData>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RawData {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub banner: Option<RawImage>,
    #[serde(default)]
    pub content: Option<Vec<RawSection>>,
}

#[derive(Debug, Deserialize)]
pub struct RawImage {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawSection {
    #[serde(default)]
    pub heading: Option<String>,
    #[serde(default)]
    pub body: Option<Vec<RichTextBlock>>,
}

impl RawDocument {
    pub fn into_summary(self) -> Option<PostSummary> {
        let uid = self.uid.filter(|u| !u.is_empty())?;
        let published_at = self
            .first_publication_date
            .as_deref()
            .and_then(parse_timestamp);
        let data = self.data.unwrap_or_default();

        Some(PostSummary {
            uid,
            published_at,
            title: data.title.unwrap_or_default(),
            subtitle: data.subtitle.unwrap_or_default(),
            author: data.author.unwrap_or_default(),
        })
    }

    pub fn into_detail(self) -> Option<PostDetail> {
        let uid = self.uid.filter(|u| !u.is_empty())?;
        let published_at = self
            .first_publication_date
            .as_deref()
            .and_then(parse_timestamp);
        let data = self.data.unwrap_or_default();

        let sections = data
            .content
            .unwrap_or_default()
            .into_iter()
            .map(|s| Section {
                heading: s.heading.unwrap_or_default(),
                body: s.body.unwrap_or_default(),
            })
            .collect();

        Some(PostDetail {
            uid,
            published_at,
            title: data.title.unwrap_or_default(),
            subtitle: data.subtitle.unwrap_or_default(),
            author: data.author.unwrap_or_default(),
            banner_url: data.banner.and_then(|b| b.url).unwrap_or_default(),
            sections,
        })
    }
}

/// Parse an API timestamp such as `2021-03-25T19:25:28+0000`
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| tracing::warn!("Unparsable publication date {:?}: {}", value, e))
        .ok()
}
