//! Post models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::richtext::RichTextBlock;

/// A post as shown in the listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostSummary {
    /// Unique, URL-safe identifier
    pub uid: String,

    /// First publication date
    pub published_at: Option<DateTime<Utc>>,

    pub title: String,
    pub subtitle: String,
    pub author: String,
}

/// A fully resolved post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostDetail {
    pub uid: String,
    pub published_at: Option<DateTime<Utc>>,
    pub title: String,
    pub subtitle: String,
    pub author: String,

    /// Banner image, empty when the post has none
    pub banner_url: String,

    /// Ordered content sections
    pub sections: Vec<Section>,
}

/// A heading followed by a rich text body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: Vec<RichTextBlock>,
}

/// Opaque, directly fetchable location of the next page of results
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    /// Wrap a cursor, treating an empty string as "no cursor"
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One page of listing results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostPage {
    pub summaries: Vec<PostSummary>,
    pub next_cursor: Option<Cursor>,
}

impl PostPage {
    pub fn new(summaries: Vec<PostSummary>, next_cursor: Option<Cursor>) -> Self {
        Self {
            summaries,
            next_cursor,
        }
    }
}
