//! Build manifest for incremental regeneration
//!
//! Records when each route was last generated and where its page was
//! written. A route older than the revalidation window, or whose page is
//! gone from disk, is stale and gets regenerated on the next run; fresh
//! routes are left alone.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

/// Manifest file name inside the cache directory
const MANIFEST_FILE: &str = "manifest.json";

/// A generated route
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    /// When the page was written
    pub generated_at: DateTime<Utc>,
    /// Output path relative to the public dir
    pub output_path: String,
}

/// Generated routes keyed by route path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Version of the manifest format
    pub version: u32,
    pub routes: BTreeMap<String, RouteEntry>,
}

impl Manifest {
    /// Current manifest format version
    const VERSION: u32 = 1;

    pub fn new() -> Self {
        Self {
            version: Self::VERSION,
            ..Default::default()
        }
    }

    /// Load the manifest from disk, or start empty
    pub fn load(cache_dir: &Path) -> Self {
        let path = cache_dir.join(MANIFEST_FILE);
        if let Ok(content) = fs::read_to_string(&path) {
            match serde_json::from_str::<Manifest>(&content) {
                Ok(manifest) if manifest.version == Self::VERSION => return manifest,
                Ok(_) => tracing::info!("Manifest version mismatch, regenerating everything"),
                Err(e) => tracing::warn!("Ignoring unreadable manifest {:?}: {}", path, e),
            }
        }
        Self::new()
    }

    /// Save the manifest to disk
    pub fn save(&self, cache_dir: &Path) -> Result<()> {
        fs::create_dir_all(cache_dir)?;
        let content = serde_json::to_string_pretty(self)?;
        fs::write(cache_dir.join(MANIFEST_FILE), content)?;
        Ok(())
    }

    pub fn record(&mut self, route: &str, output_path: &str, at: DateTime<Utc>) {
        self.routes.insert(
            route.to_string(),
            RouteEntry {
                generated_at: at,
                output_path: output_path.to_string(),
            },
        );
    }

    pub fn get(&self, route: &str) -> Option<&RouteEntry> {
        self.routes.get(route)
    }

    /// Whether a route must be regenerated: never recorded, its output
    /// file is missing under `public_dir`, or it is older than `max_age`
    pub fn is_stale(
        &self,
        route: &str,
        public_dir: &Path,
        now: DateTime<Utc>,
        max_age: Duration,
    ) -> bool {
        let Some(entry) = self.routes.get(route) else {
            return true;
        };
        if !public_dir.join(&entry.output_path).is_file() {
            return true;
        }

        let age = now.signed_duration_since(entry.generated_at);
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => age >= max_age,
            Err(_) => false,
        }
    }
}

/// Remove the cache directory
pub fn clear(cache_dir: &Path) -> Result<()> {
    if cache_dir.exists() {
        fs::remove_dir_all(cache_dir)?;
        tracing::info!("Deleted: {:?}", cache_dir);
    }
    Ok(())
}
