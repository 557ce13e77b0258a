//! Static site.
//!
//! Files are served from the site directory; any path that does not match a
//! file gets `index.html`, so client-side anchors and stale links still land
//! on the page.

use std::path::Path;

use tower_http::services::{ServeDir, ServeFile};

/// Service answering every non-API path from `site_dir`.
pub fn service(site_dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(site_dir).fallback(ServeFile::new(site_dir.join("index.html")))
}
