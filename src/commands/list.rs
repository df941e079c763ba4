//! List posts from the content API

use anyhow::Result;
use std::collections::HashSet;
use std::io::Write;

use crate::client::ContentSource;
use crate::content::PostSummary;
use crate::helpers::format_date;
use crate::i18n::Locale;
use crate::pagination::ListingController;
use crate::Site;

/// List the first page of posts, or every page with `all`
pub async fn run(site: &Site, all: bool) -> Result<()> {
    let client = site.client()?;
    let mut stdout = std::io::stdout().lock();
    list_posts(site, &client, all, &mut stdout).await
}

pub async fn list_posts<S, W>(site: &Site, source: &S, all: bool, out: &mut W) -> Result<()>
where
    S: ContentSource + ?Sized,
    W: Write,
{
    let locale = Locale::from_tag(&site.config.language);
    let first_page = source.first_page(site.config.page_size).await?;
    let mut controller = ListingController::new(first_page);

    if all {
        let mut followed = HashSet::new();
        while controller.can_load_more() {
            if let Some(cursor) = controller.state().next_cursor() {
                if !followed.insert(cursor.clone()) {
                    tracing::warn!("Cursor {} repeats, stopping", cursor);
                    break;
                }
            }
            controller.load_more(source).await?;
        }
    }

    writeln!(out, "Posts ({}):", controller.summaries().len())?;
    for summary in controller.summaries() {
        writeln!(out, "{}", format_summary(summary, locale))?;
    }
    if controller.can_load_more() && !all {
        writeln!(out, "  ... more posts available (use --all)")?;
    }

    Ok(())
}

/// One listing entry as printed on the terminal
pub(crate) fn format_summary(summary: &PostSummary, locale: Locale) -> String {
    let date = summary
        .published_at
        .map(|d| format_date(&d, locale))
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!("  {} - {} [{}]", date, summary.title, summary.uid);
    if !summary.subtitle.is_empty() {
        line.push_str(&format!("\n      {}", summary.subtitle));
    }
    if !summary.author.is_empty() {
        line.push_str(&format!("\n      by {}", summary.author));
    }
    line
}
