use std::path::Path;

use roadutil::Result;

/// If `path` already exists, just read it. Otherwise download `url` into that location first.
/// Returns the file's contents as text.
pub fn fetch_if_missing<P: AsRef<Path>, I: AsRef<str>>(
    path: P,
    url: I,
    quiet: bool,
) -> Result<String> {
    let path = path.as_ref();
    if crate::file_exists(path) {
        info!("- {} already exists", path.display());
    } else {
        info!("- Missing {}, so downloading {}", path.display(), url.as_ref());
        crate::download_to_file(url, path, quiet)?;
    }
    crate::slurp_string(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn existing_file_skips_download() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("boundaries").join("b.geojson");
        crate::write_file(&path, b"{\"type\": \"FeatureCollection\", \"features\": []}").unwrap();
        // The URL is unreachable, so this only passes if nothing is fetched
        let text = fetch_if_missing(&path, "http://127.0.0.1:9/b.geojson", true).unwrap();
        assert!(text.contains("FeatureCollection"));
    }

    #[test]
    fn missing_file_and_unreachable_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("b.geojson");
        assert!(fetch_if_missing(&path, "http://127.0.0.1:9/b.geojson", true).is_err());
        assert!(!path.exists());
    }
}
