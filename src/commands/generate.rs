//! Generate static files

use anyhow::Result;
use std::sync::Arc;

use crate::cache::Manifest;
use crate::generator::Generator;
use crate::Site;

/// Generate the site, regenerating only stale routes unless `force`
pub async fn run(site: &Site, force: bool) -> Result<()> {
    let start = std::time::Instant::now();

    let generator = Generator::new(site, Arc::new(site.client()?))?;
    let mut manifest = if force {
        tracing::info!("Full generation (force)");
        Manifest::new()
    } else {
        Manifest::load(&site.cache_dir)
    };

    let report = generator.generate(&manifest, force).await?;
    report.record(&mut manifest);
    manifest.save(&site.cache_dir)?;

    for (route, reason) in &report.failed {
        tracing::warn!("Not generated: {} ({})", route, reason);
    }

    let duration = start.elapsed();
    tracing::info!(
        "Generated in {:.2}s: {}",
        duration.as_secs_f64(),
        report.summary()
    );

    Ok(())
}
