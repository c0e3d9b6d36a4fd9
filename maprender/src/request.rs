use std::path::{Path, PathBuf};

use mapgeom::Layer;

/// Appended to every displayed title.
pub const TITLE_SUFFIX: &str = "Road Construction";

/// One map to draw. The layers are borrowed, since a run draws the same reference layer several
/// times.
pub struct RenderRequest<'a> {
    /// Drawn as a translucent backdrop. Only its geometry and CRS matter.
    pub reference: &'a Layer,
    /// The line features to color by category and measure. Its CRS becomes the map's CRS.
    pub features: &'a Layer,
    /// Underscores become spaces in the displayed title. The raw title prefixes the file name.
    pub title: &'a str,
    /// Suffixes the file name.
    pub date_label: &'a str,
    /// Must already exist.
    pub output_dir: &'a Path,
}

impl<'a> RenderRequest<'a> {
    pub fn display_title(&self) -> String {
        display_title(self.title)
    }

    pub fn output_path(&self, extension: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}{}.{}", self.title, self.date_label, extension))
    }
}

/// What a successful render produced.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedMap {
    pub path: PathBuf,
    pub title: String,
    pub annotation: String,
    pub total_length_meters: f64,
}

pub fn display_title(title: &str) -> String {
    format!("{}{}", title.replace('_', " "), TITLE_SUFFIX)
}

pub fn annotation_text(total_length_meters: f64) -> String {
    format!("Road Work (m): {:.0}", total_length_meters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles() {
        assert_eq!(display_title("This_Year_"), "This Year Road Construction");
        assert_eq!(display_title("1-2_Years_"), "1-2 Years Road Construction");
        assert_eq!(display_title(""), "Road Construction");
    }

    #[test]
    fn annotations_round_to_whole_meters() {
        assert_eq!(annotation_text(0.0), "Road Work (m): 0");
        assert_eq!(annotation_text(999.6), "Road Work (m): 1000");
        assert_eq!(annotation_text(12345.4), "Road Work (m): 12345");
    }

    #[test]
    fn file_names_keep_the_raw_title() {
        let layer = Layer::new(None, Vec::new());
        let req = RenderRequest {
            reference: &layer,
            features: &layer,
            title: "3-5_Years_",
            date_label: "2024-05-01",
            output_dir: Path::new("Maps/2024-05-01"),
        };
        assert_eq!(
            req.output_path("png"),
            Path::new("Maps/2024-05-01/3-5_Years_2024-05-01.png")
        );
        assert_eq!(req.display_title(), "3-5 Years Road Construction");
    }
}
