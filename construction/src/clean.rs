use mapgeom::Layer;
use roadutil::{plain_list_names, prettyprint_usize, Error, Result};

use crate::{FEATURE_TYPE, STATUS, TARGETED_START};

/// French translations and contact details aren't used for mapping. Dropping them before the
/// null check means a record missing, say, a project web page is still kept.
pub const DROPPED_COLUMNS: [&str; 6] = [
    "FEATURE_TYPE_FR",
    "STATUS_FR",
    "TARGETED_START_FR",
    "PROJECT_MANAGER",
    "PROJECTWEBPAGE",
    "PROJECTWEBPAGE_FR",
];

pub const REQUIRED_COLUMNS: [&str; 3] = [FEATURE_TYPE, STATUS, TARGETED_START];

const NOT_AVAILABLE: &str = "NOTAVAIL";

/// Prepare a raw construction snapshot for mapping:
///
/// 1. drop the unused columns
/// 2. insist the columns used later on exist somewhere in the data
/// 3. drop records with no geometry or a null value in any remaining column
/// 4. drop records whose status is `NOTAVAIL`
/// 5. drop records whose geometry has no coordinates
pub fn clean(mut layer: Layer) -> Result<Layer> {
    let before = layer.len();
    for column in DROPPED_COLUMNS {
        layer.drop_column(column);
    }

    let columns = layer.columns();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|c| !columns.contains(*c))
        .collect();
    if !missing.is_empty() && !layer.is_empty() {
        return Err(Error::schema(format!(
            "construction data is missing the columns {}",
            plain_list_names(missing.into_iter().map(|c| c.to_string()).collect())
        )));
    }

    let complete =
        layer.filter(|f| f.geometry.is_some() && columns.iter().all(|c| !f.is_null(c)));
    debug!(
        "{} of {} records have every value",
        prettyprint_usize(complete.len()),
        prettyprint_usize(before)
    );

    let available = complete.try_filter(|f| Ok(f.get_str(STATUS)? != Some(NOT_AVAILABLE)))?;
    let result = available.filter(|f| !f.is_empty());

    info!(
        "Cleaning kept {} of {} records",
        prettyprint_usize(result.len()),
        prettyprint_usize(before)
    );
    Ok(result)
}

/// Just the road work: records whose `FEATURE_TYPE` starts with `RD`.
pub fn roads(layer: &Layer) -> Result<Layer> {
    let result = layer.try_filter(|f| Ok(f.require_str(FEATURE_TYPE)?.starts_with("RD")))?;
    info!(
        "{} of {} records are road work",
        prettyprint_usize(result.len()),
        prettyprint_usize(layer.len())
    );
    Ok(result)
}
