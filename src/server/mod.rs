//! Site server with on-demand rendering and periodic revalidation
//!
//! A post missing from disk is answered with the loading page while a
//! background task fetches and writes it; the loading page reloads until
//! the generated file is served. The manifest lock is only taken to read
//! an entry or to record finished pages, never across a fetch.

use anyhow::Result;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Request, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::cache::Manifest;
use crate::error::ContentError;
use crate::generator::{post_output, Generator, WrittenRoute, LOADING_FILE};
use crate::helpers::{is_safe_uid, post_route};

/// State of a post being rendered on demand
#[derive(Debug, Clone, PartialEq)]
enum Resolution {
    /// Render in progress
    Pending,
    /// The CMS has no such post
    Missing,
    /// The render failed; answered once with this status, then retried
    Failed(StatusCode),
}

/// Server state
struct ServerState {
    public_dir: PathBuf,
    cache_dir: PathBuf,
    generator: Generator,
    manifest: Mutex<Manifest>,
    resolving: Mutex<HashMap<String, Resolution>>,
}

impl ServerState {
    fn new(generator: Generator, manifest: Manifest) -> Self {
        let site = generator.site();
        Self {
            public_dir: site.public_dir.clone(),
            cache_dir: site.cache_dir.clone(),
            manifest: Mutex::new(manifest),
            resolving: Mutex::new(HashMap::new()),
            generator,
        }
    }

    /// Record finished pages and persist the manifest
    async fn record(&self, written: &[WrittenRoute]) {
        if written.is_empty() {
            return;
        }
        let mut manifest = self.manifest.lock().await;
        for page in written {
            page.record(&mut manifest);
        }
        if let Err(e) = manifest.save(&self.cache_dir) {
            tracing::warn!("Failed to save manifest: {}", e);
        }
    }

    /// The generated page of a post, if it is on disk
    async fn generated_page(&self, uid: &str) -> Option<String> {
        let output = self
            .manifest
            .lock()
            .await
            .get(&post_route(uid))
            .map(|entry| entry.output_path.clone())
            .unwrap_or_else(|| post_output(uid));
        tokio::fs::read_to_string(self.public_dir.join(output))
            .await
            .ok()
    }

    async fn loading_page(&self) -> String {
        match tokio::fs::read_to_string(self.public_dir.join(LOADING_FILE)).await {
            Ok(html) => html,
            Err(_) => self
                .generator
                .render_loading()
                .unwrap_or_else(|_| "Loading...".to_string()),
        }
    }
}

/// Build the router serving an already generated site
fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/post/:uid", get(post_handler))
        .route("/post/:uid/", get(post_handler))
        .fallback(fallback_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(generator: Generator, ip: &str, port: u16, revalidate: bool) -> Result<()> {
    let site = generator.site().clone();
    let state = Arc::new(ServerState::new(generator, Manifest::load(&site.cache_dir)));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    let shutdown = CancellationToken::new();

    if revalidate {
        let every = site.config.revalidate();
        let state = state.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            revalidate_loop(state, every, shutdown).await;
        });
    }

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
            shutdown.cancel();
        })
        .await?;

    Ok(())
}

/// Regenerate stale routes every `every` until shut down
async fn revalidate_loop(state: Arc<ServerState>, every: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(every);
    // the first tick completes immediately; the site was just generated
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                tracing::info!("Revalidating stale pages...");
                let snapshot = state.manifest.lock().await.clone();
                match state.generator.generate(&snapshot, false).await {
                    Ok(report) => {
                        state.record(&report.written).await;
                        tracing::info!("Revalidated: {}", report.summary());
                    }
                    Err(e) => tracing::error!("Revalidation failed: {}", e),
                }
            }
        }
    }
}

/// Serve a post, or the loading page while it is rendered on demand
async fn post_handler(
    State(state): State<Arc<ServerState>>,
    Path(uid): Path<String>,
) -> Response {
    if !is_safe_uid(&uid) {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }

    if let Some(html) = state.generated_page(&uid).await {
        return Html(html).into_response();
    }

    let mut resolving = state.resolving.lock().await;
    match resolving.get(&uid).cloned() {
        Some(Resolution::Pending) => {}
        Some(Resolution::Missing) => {
            resolving.remove(&uid);
            drop(resolving);
            let body = state
                .generator
                .render_not_found()
                .unwrap_or_else(|_| "Not found".to_string());
            return (StatusCode::NOT_FOUND, Html(body)).into_response();
        }
        Some(Resolution::Failed(status)) => {
            resolving.remove(&uid);
            return (status, "Content unavailable").into_response();
        }
        None => {
            resolving.insert(uid.clone(), Resolution::Pending);
            tracing::info!("Rendering {} on demand", uid);
            tokio::spawn(resolve_post(state.clone(), uid));
        }
    }
    drop(resolving);

    (
        [(header::CACHE_CONTROL, "no-store")],
        Html(state.loading_page().await),
    )
        .into_response()
}

/// Fetch and write one post, then settle its resolution
async fn resolve_post(state: Arc<ServerState>, uid: String) {
    let outcome = match state.generator.generate_post(&uid).await {
        Ok(written) => {
            state.record(&[written]).await;
            None
        }
        Err(e) => match e.downcast_ref::<ContentError>() {
            Some(ContentError::NotFound { .. }) => {
                tracing::info!("No post {} in the CMS", uid);
                Some(Resolution::Missing)
            }
            Some(err) if err.is_transient() => {
                tracing::warn!("Failed to render {}: {}", uid, e);
                Some(Resolution::Failed(StatusCode::SERVICE_UNAVAILABLE))
            }
            _ => {
                tracing::error!("Failed to render {}: {}", uid, e);
                Some(Resolution::Failed(StatusCode::BAD_GATEWAY))
            }
        },
    };

    let mut resolving = state.resolving.lock().await;
    match outcome {
        Some(resolution) => {
            resolving.insert(uid, resolution);
        }
        None => {
            resolving.remove(&uid);
        }
    }
}

/// Serve generated files
async fn fallback_handler(
    State(state): State<Arc<ServerState>>,
    request: Request<Body>,
) -> Response {
    let mut service = ServeDir::new(&state.public_dir).append_index_html_on_directories(true);
    match service.try_call(request).await {
        Ok(response) => response.into_response(),
        Err(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Server error").into_response(),
    }
}
