use std::path::PathBuf;

use roadutil::Result;

/// Where one run of the pipeline reads and writes. Everything hangs off a root directory:
///
/// - `Maps/<date>/` holds the rendered maps for the run
/// - `geojson/<date>_rd_construction.geojson` is the construction snapshot downloaded that day
/// - `ottawa_boundaries/ottawa_boundaries.geojson` is the cached reference layer
#[derive(Clone, Debug)]
pub struct RunPaths {
    root: PathBuf,
    date: String,
}

impl RunPaths {
    pub fn new<P: Into<PathBuf>, I: Into<String>>(root: P, date: I) -> RunPaths {
        RunPaths {
            root: root.into(),
            date: date.into(),
        }
    }

    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn maps_dir(&self) -> PathBuf {
        self.root.join("Maps")
    }

    pub fn maps_day_dir(&self) -> PathBuf {
        self.maps_dir().join(&self.date)
    }

    pub fn geojson_dir(&self) -> PathBuf {
        self.root.join("geojson")
    }

    pub fn construction_snapshot(&self) -> PathBuf {
        self.geojson_dir()
            .join(format!("{}_rd_construction.geojson", self.date))
    }

    pub fn reference_dir(&self) -> PathBuf {
        self.root.join("ottawa_boundaries")
    }

    pub fn reference_file(&self) -> PathBuf {
        self.reference_dir().join("ottawa_boundaries.geojson")
    }

    /// Create the output and download directories if they don't exist yet. The reference
    /// directory is created lazily by the download that fills it.
    pub fn prepare(&self) -> Result<()> {
        for dir in [self.maps_dir(), self.maps_day_dir(), self.geojson_dir()] {
            if !dir.is_dir() {
                debug!("Creating {}", dir.display());
                fs_err::create_dir_all(&dir)?;
            }
        }
        Ok(())
    }
}
