use std::fmt;

use mapgeom::Layer;
use roadutil::{prettyprint_usize, Result};

use crate::TARGETED_START;

/// How soon work is expected to start. The city describes this in free text; the first word is
/// enough to tell the buckets apart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Horizon {
    ThisYear,
    OneToTwoYears,
    ThreeToFiveYears,
    FourToSevenYears,
}

impl Horizon {
    /// In the order maps are produced.
    pub const ALL: [Horizon; 4] = [
        Horizon::ThisYear,
        Horizon::OneToTwoYears,
        Horizon::ThreeToFiveYears,
        Horizon::FourToSevenYears,
    ];

    /// What `TARGETED_START` begins with for records in this bucket.
    pub fn prefix(self) -> &'static str {
        match self {
            Horizon::ThisYear => "This",
            Horizon::OneToTwoYears => "1",
            Horizon::ThreeToFiveYears => "3",
            Horizon::FourToSevenYears => "4",
        }
    }

    /// Used both as the start of the map title and the output file name. Underscores become
    /// spaces in the title.
    pub fn title(self) -> &'static str {
        match self {
            Horizon::ThisYear => "This_Year_",
            Horizon::OneToTwoYears => "1-2_Years_",
            Horizon::ThreeToFiveYears => "3-5_Years_",
            Horizon::FourToSevenYears => "4-7_Years_",
        }
    }

    pub fn matches(self, targeted_start: &str) -> bool {
        targeted_start.starts_with(self.prefix())
    }

    /// The records of a layer falling into this bucket.
    pub fn select(self, layer: &Layer) -> Result<Layer> {
        let result = layer.try_filter(|f| Ok(self.matches(f.require_str(TARGETED_START)?)))?;
        info!(
            "{}: {} records",
            self,
            prettyprint_usize(result.len())
        );
        Ok(result)
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.title().replace('_', " ").trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mapgeom::{Crs, Feature};
    use roadutil::Error;

    fn starting(when: &str) -> Feature {
        Feature::new(geo::Point::new(-75.7, 45.4)).with(TARGETED_START, when)
    }

    #[test]
    fn buckets() {
        let layer = Layer::new(
            Some(Crs::Wgs84),
            vec![
                starting("This year"),
                starting("1 - 2 years"),
                starting("3 - 5 years"),
                starting("4 - 7 years"),
                starting("This year"),
                starting("Unknown"),
            ],
        );
        let counts: Vec<usize> = Horizon::ALL
            .iter()
            .map(|h| h.select(&layer).unwrap().len())
            .collect();
        assert_eq!(counts, vec![2, 1, 1, 1]);
    }

    #[test]
    fn titles() {
        assert_eq!(Horizon::ThisYear.title(), "This_Year_");
        assert_eq!(Horizon::OneToTwoYears.to_string(), "1-2 Years");
        assert!(Horizon::FourToSevenYears.matches("4 - 7 years"));
        assert!(!Horizon::ThreeToFiveYears.matches("13 years"));
    }

    #[test]
    fn missing_start_is_a_schema_error() {
        let layer = Layer::new(Some(Crs::Wgs84), vec![Feature::new(geo::Point::new(0.0, 0.0))]);
        assert!(matches!(
            Horizon::ThisYear.select(&layer),
            Err(Error::DataSchema(_))
        ));
    }
}
