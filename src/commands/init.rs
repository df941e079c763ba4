//! Initialize a new site

use anyhow::{bail, Result};
use std::fs;
use std::path::Path;

/// Default configuration written by `init`
const CONFIG_TEMPLATE: &str = r#"# Spacetraveling configuration

# Site
title: Spacetraveling
description: ''
language: pt-BR

# URL
url: http://localhost:4000
root: /

# Directory
public_dir: public
cache_dir: .spacetraveling

# Content API
## The access token can also be set with SPACETRAVELING_ACCESS_TOKEN
api_endpoint: https://your-repository.cdn.prismic.io/api/v2
access_token:
document_type: repeatable
page_size: 1
request_timeout_secs: 30

# Rendering
words_per_minute: 200

# Regeneration (seconds)
revalidate_secs: 86400
"#;

/// Initialize a new site in the given directory
pub fn init_site(target_dir: &Path) -> Result<()> {
    let config_path = target_dir.join("_config.yml");
    if config_path.exists() {
        bail!("{:?} already exists", config_path);
    }

    fs::create_dir_all(target_dir)?;
    fs::write(&config_path, CONFIG_TEMPLATE)?;
    tracing::debug!("Wrote {:?}", config_path);

    Ok(())
}
