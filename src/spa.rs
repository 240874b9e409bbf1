use std::path::Path;

use tower_http::services::{ServeDir, ServeFile};

/// Static assets from the built client. Unknown paths get `index.html` so the
/// client-side router can take over.
pub fn spa_service(static_dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(static_dir)
        .append_index_html_on_directories(true)
        .fallback(ServeFile::new(static_dir.join("index.html")))
}
