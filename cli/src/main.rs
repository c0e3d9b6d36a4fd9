//! Maps planned road construction in Ottawa. Each run downloads the city's current construction
//! data and writes one map per start horizon into `Maps/<date>/`.

#[macro_use]
extern crate log;

mod pipeline;

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use structopt::StructOpt;

use roadutil::Timer;

#[derive(StructOpt)]
#[structopt(name = "roadwork", about = "Maps planned road construction in Ottawa")]
struct Args {
    /// The directory holding Maps/, geojson/ and the cached city boundaries
    #[structopt(long, default_value = ".")]
    root: PathBuf,
    /// Labels this run's files, as YYYY-MM-DD. Defaults to today.
    #[structopt(long)]
    date: Option<String>,
    /// A TOML file overriding parts of the render configuration
    #[structopt(long)]
    config: Option<PathBuf>,
    /// Don't print download progress
    #[structopt(long)]
    quiet: bool,
}

impl Args {
    fn date_label(&self) -> Result<String> {
        match self.date {
            Some(ref raw) => {
                let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                    .with_context(|| format!("--date {} isn't YYYY-MM-DD", raw))?;
                Ok(date.format("%Y-%m-%d").to_string())
            }
            None => Ok(chrono::Local::now().format("%Y-%m-%d").to_string()),
        }
    }
}

fn main() -> Result<()> {
    let args = Args::from_args();
    roadutil::logger::setup();

    let date = args.date_label()?;
    let mut timer = Timer::new(format!("map road construction for {}", date));
    let maps = pipeline::run(&args.root, &date, args.config.as_deref(), args.quiet, &mut timer)?;
    for map in maps {
        info!("{}: {}", map.path.display(), map.annotation);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::from_iter(vec!["roadwork"]);
        assert_eq!(args.root, PathBuf::from("."));
        assert!(args.config.is_none());
        assert!(!args.quiet);
        // Today, whatever that is
        let today = args.date_label().unwrap();
        assert!(NaiveDate::parse_from_str(&today, "%Y-%m-%d").is_ok());
    }

    #[test]
    fn explicit_flags() {
        let args = Args::from_iter(vec![
            "roadwork",
            "--root",
            "/tmp/roadwork",
            "--date",
            "2021-03-07",
            "--config",
            "render.toml",
            "--quiet",
        ]);
        assert_eq!(args.root, PathBuf::from("/tmp/roadwork"));
        assert_eq!(args.date_label().unwrap(), "2021-03-07");
        assert_eq!(args.config, Some(PathBuf::from("render.toml")));
        assert!(args.quiet);
    }

    #[test]
    fn bad_date() {
        let args = Args::from_iter(vec!["roadwork", "--date", "March 7"]);
        assert!(args.date_label().is_err());
    }
}
