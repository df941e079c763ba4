//! Built-in theme templates using the Tera template engine
//!
//! All templates are embedded directly in the binary.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera, Value};

use crate::helpers::html_escape;

/// Template renderer with the embedded theme
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        // Rich text is already HTML; text fields are escaped in the
        // templates themselves
        tera.autoescape_on(vec![]);
        tera.register_filter("html", html_filter);

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("theme/layout.html")),
            ("index.html", include_str!("theme/index.html")),
            ("post.html", include_str!("theme/post.html")),
            ("loading.html", include_str!("theme/loading.html")),
            // Partials
            (
                "partials/header.html",
                include_str!("theme/partials/header.html"),
            ),
            (
                "partials/style.html",
                include_str!("theme/partials/style.html"),
            ),
        ])?;

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Escape a text field; unlike `escape`, `/` is left as is
fn html_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };
    Ok(Value::String(html_escape(&text)))
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct SiteData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub root: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StringsData {
    pub load_more: String,
    pub loading: String,
    pub not_found: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SummaryData {
    pub uid: String,
    pub path: String,
    pub title: String,
    pub subtitle: String,
    pub author: String,
    pub date: Option<String>,
    pub datetime: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostData {
    pub uid: String,
    pub title: String,
    pub author: String,
    pub banner_url: String,
    pub date: Option<String>,
    pub datetime: Option<String>,
    pub reading_time: String,
    pub sections: Vec<SectionData>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionData {
    pub heading: String,
    /// Rendered rich text, emitted verbatim
    pub html: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_context() -> Context {
        let mut context = Context::new();
        context.insert(
            "site",
            &SiteData {
                title: "Spacetraveling".into(),
                description: String::new(),
                language: "pt-BR".into(),
                root: "/".into(),
            },
        );
        context.insert(
            "strings",
            &StringsData {
                load_more: "Carregar mais posts".into(),
                loading: "Carregando...".into(),
                not_found: "Post não encontrado".into(),
            },
        );
        context.insert("canonical", &None::<String>);
        context
    }

    #[test]
    fn test_post_template_escapes_text_but_not_body() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = base_context();
        context.insert(
            "post",
            &PostData {
                uid: "a".into(),
                title: "Tom & Jerry".into(),
                author: "<b>".into(),
                banner_url: String::new(),
                date: Some("15 mar 2021".into()),
                datetime: Some("2021-03-15T00:00:00.000Z".into()),
                reading_time: "4 min".into(),
                sections: vec![SectionData {
                    heading: "Intro".into(),
                    html: "<p><strong>hi</strong></p>".into(),
                }],
            },
        );

        let html = renderer.render("post.html", &context).unwrap();
        assert!(html.contains("<title>Tom &amp; Jerry | Spacetraveling</title>"));
        assert!(html.contains("&lt;b&gt;"));
        assert!(html.contains("<p><strong>hi</strong></p>"));
        assert!(html.contains("15 mar 2021"));
        assert!(html.contains("4 min"));
        assert!(!html.contains("class=\"banner\""));
    }

    #[test]
    fn test_index_hides_button_without_next_page() {
        let renderer = TemplateRenderer::new().unwrap();
        let mut context = base_context();
        context.insert("posts", &Vec::<SummaryData>::new());
        context.insert("next_page", &None::<String>);
        context.insert("months_json", "[]");
        context.insert("root_json", "\"/\"");

        let html = renderer.render("index.html", &context).unwrap();
        assert!(!html.contains("load-more\""));
        assert!(!html.contains("<script>"));
    }
}
