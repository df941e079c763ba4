//! Content module - post models, rich text and reading time

pub mod document;
mod post;
pub mod reading_time;
pub mod richtext;

pub use post::{Cursor, PostDetail, PostPage, PostSummary, Section};
pub use reading_time::{estimate, ReadingTime};
pub use richtext::{RichTextBlock, RichTextRenderer, StructuredText};
