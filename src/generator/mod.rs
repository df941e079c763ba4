//! Generator module - renders the listing and post pages to disk

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};
use std::fs;
use std::sync::Arc;
use tera::Context;

use crate::cache::Manifest;
use crate::client::ContentSource;
use crate::content::{estimate, PostSummary, RichTextRenderer, StructuredText};
use crate::helpers::{date_xml, format_date, full_url_for, is_safe_uid, post_route, url_for};
use crate::i18n::Locale;
use crate::pagination::PaginationState;
use crate::templates::{
    PostData, SectionData, SiteData, StringsData, SummaryData, TemplateRenderer,
};
use crate::Site;

/// Route of the listing page
pub const INDEX_ROUTE: &str = "/";

/// Placeholder shown while a post is being resolved
pub const LOADING_FILE: &str = "loading.html";

/// Seconds before the placeholder reloads the page it stands in for
const LOADING_REFRESH_SECS: u32 = 1;

/// A page written to the public dir, not yet recorded in the manifest
#[derive(Debug, Clone, PartialEq)]
pub struct WrittenRoute {
    pub route: String,
    /// Output path relative to the public dir
    pub output_path: String,
    pub generated_at: DateTime<Utc>,
}

impl WrittenRoute {
    pub fn record(&self, manifest: &mut Manifest) {
        manifest.record(&self.route, &self.output_path, self.generated_at);
    }
}

/// What a generation run did
#[derive(Debug, Default)]
pub struct GenerateReport {
    /// Pages written
    pub written: Vec<WrittenRoute>,
    /// Routes still fresh and left alone
    pub skipped: usize,
    /// Routes that could not be generated, with the reason
    pub failed: Vec<(String, String)>,
}

impl GenerateReport {
    /// Routes written, in generation order
    pub fn written_routes(&self) -> Vec<&str> {
        self.written.iter().map(|w| w.route.as_str()).collect()
    }

    /// Record every written page in `manifest`
    pub fn record(&self, manifest: &mut Manifest) {
        for written in &self.written {
            written.record(manifest);
        }
    }

    pub fn summary(&self) -> String {
        format!(
            "{} written, {} fresh, {} failed",
            self.written.len(),
            self.skipped,
            self.failed.len()
        )
    }
}

/// Static site generator using Tera templates
pub struct Generator {
    site: Site,
    source: Arc<dyn ContentSource>,
    rich_text: Arc<dyn RichTextRenderer>,
    renderer: TemplateRenderer,
    locale: Locale,
}

impl Generator {
    /// Create a new generator reading from `source`
    pub fn new(site: &Site, source: Arc<dyn ContentSource>) -> Result<Self> {
        Ok(Self {
            site: site.clone(),
            source,
            rich_text: Arc::new(StructuredText),
            renderer: TemplateRenderer::new()?,
            locale: Locale::from_tag(&site.config.language),
        })
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    /// Regenerate every missing or stale route.
    ///
    /// `manifest` is only read to decide freshness; written pages are
    /// returned in the report for the caller to record. A post that fails
    /// to fetch or render is logged and reported; the remaining posts are
    /// still generated. Failing to build the listing or to enumerate posts
    /// aborts the run.
    pub async fn generate(&self, manifest: &Manifest, force: bool) -> Result<GenerateReport> {
        fs::create_dir_all(&self.site.public_dir)?;

        let now = Utc::now();
        let max_age = self.site.config.revalidate();
        let public_dir = &self.site.public_dir;
        let mut report = GenerateReport::default();

        let loading = self.render_loading()?;
        self.write_output(LOADING_FILE, &loading)?;

        if force || manifest.is_stale(INDEX_ROUTE, public_dir, now, max_age) {
            let html = self.render_index().await?;
            let output = index_output();
            self.write_output(&output, &html)?;
            report.written.push(WrittenRoute {
                route: INDEX_ROUTE.to_string(),
                output_path: output,
                generated_at: now,
            });
        } else {
            report.skipped += 1;
        }

        let uids = self.source.post_uids().await?;
        tracing::info!("Found {} posts", uids.len());

        for uid in uids {
            let route = post_route(&uid);
            if !is_safe_uid(&uid) {
                tracing::warn!("Skipping post with unusable uid {:?}", uid);
                report
                    .failed
                    .push((route, "uid cannot be used as a path".to_string()));
                continue;
            }

            if !force && !manifest.is_stale(&route, public_dir, now, max_age) {
                report.skipped += 1;
                continue;
            }

            match self.render_post(&uid).await {
                Ok(html) => {
                    let output = post_output(&uid);
                    self.write_output(&output, &html)?;
                    report.written.push(WrittenRoute {
                        route,
                        output_path: output,
                        generated_at: now,
                    });
                }
                Err(e) => {
                    tracing::warn!("Failed to generate {}: {}", route, e);
                    report.failed.push((route, e.to_string()));
                }
            }
        }

        Ok(report)
    }

    /// Fetch, render and write a single post. The caller records the
    /// returned route in its manifest.
    pub async fn generate_post(&self, uid: &str) -> Result<WrittenRoute> {
        if !is_safe_uid(uid) {
            bail!("uid cannot be used as a path: {:?}", uid);
        }

        let html = self.render_post(uid).await?;
        let output = post_output(uid);
        self.write_output(&output, &html)?;
        Ok(WrittenRoute {
            route: post_route(uid),
            output_path: output,
            generated_at: Utc::now(),
        })
    }

    /// Render the listing page from the first page of posts
    pub async fn render_index(&self) -> Result<String> {
        let config = &self.site.config;
        let first_page = self.source.first_page(config.page_size).await?;
        let state = PaginationState::initialize(first_page);

        let posts: Vec<SummaryData> = state
            .summaries()
            .iter()
            .map(|s| self.summary_data(s))
            .collect();

        let months: Vec<&str> = (1..=12).map(|m| self.locale.month_abbr(m)).collect();

        let mut context = self.base_context(INDEX_ROUTE);
        context.insert("posts", &posts);
        context.insert("next_page", &state.next_cursor().map(|c| c.as_str()));
        context.insert("months_json", &serde_json::to_string(&months)?);
        context.insert("root_json", &serde_json::to_string(&url_for(config, "/"))?);

        self.renderer.render("index.html", &context)
    }

    /// Render a post's detail page
    pub async fn render_post(&self, uid: &str) -> Result<String> {
        let post = self.source.post_by_uid(uid).await?;

        let reading_time = estimate(
            &post.sections,
            self.rich_text.as_ref(),
            self.site.config.words_per_minute,
        );

        let sections = post
            .sections
            .iter()
            .map(|s| SectionData {
                heading: s.heading.clone(),
                html: self.rich_text.as_html(&s.body),
            })
            .collect();

        let data = PostData {
            uid: post.uid.clone(),
            title: post.title.clone(),
            author: post.author.clone(),
            banner_url: post.banner_url.clone(),
            date: post.published_at.map(|d| format_date(&d, self.locale)),
            datetime: post.published_at.map(|d| date_xml(&d)),
            reading_time: self.locale.reading_time(reading_time),
            sections,
        };

        let mut context = self.base_context(&post_route(&post.uid));
        context.insert("post", &data);

        self.renderer.render("post.html", &context)
    }

    /// Render the placeholder shown while a post resolves
    ///
    /// The page reloads itself, so when served in place of a post it
    /// turns into the post once that has been generated.
    pub fn render_loading(&self) -> Result<String> {
        self.render_message(self.locale.loading(), Some(LOADING_REFRESH_SECS))
    }

    /// Render the page for a post that does not exist
    pub fn render_not_found(&self) -> Result<String> {
        self.render_message(self.locale.not_found(), None)
    }

    fn render_message(&self, message: &str, refresh: Option<u32>) -> Result<String> {
        let mut context = self.base_context(INDEX_ROUTE);
        context.insert("canonical", &None::<String>);
        context.insert("message", message);
        context.insert("refresh", &refresh);
        self.renderer.render("loading.html", &context)
    }

    fn base_context(&self, route: &str) -> Context {
        let config = &self.site.config;
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: config.title.clone(),
                description: config.description.clone(),
                language: self.locale.tag().to_string(),
                root: url_for(config, "/"),
            },
        );
        context.insert(
            "strings",
            &StringsData {
                load_more: self.locale.load_more().to_string(),
                loading: self.locale.loading().to_string(),
                not_found: self.locale.not_found().to_string(),
            },
        );
        context.insert("canonical", &Some(full_url_for(config, route)));
        context
    }

    fn summary_data(&self, summary: &PostSummary) -> SummaryData {
        SummaryData {
            uid: summary.uid.clone(),
            path: url_for(&self.site.config, &post_route(&summary.uid)),
            title: summary.title.clone(),
            subtitle: summary.subtitle.clone(),
            author: summary.author.clone(),
            date: summary.published_at.map(|d| format_date(&d, self.locale)),
            datetime: summary.published_at.map(|d| date_xml(&d)),
        }
    }

    fn write_output(&self, output: &str, html: &str) -> Result<()> {
        let path = self.site.public_dir.join(output);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, html)?;
        tracing::debug!("Generated: {:?}", path);
        Ok(())
    }
}

/// Output file of the listing, relative to the public dir
pub fn index_output() -> String {
    "index.html".to_string()
}

/// Output file of a post, relative to the public dir
pub fn post_output(uid: &str) -> String {
    format!("post/{}/index.html", uid)
}
