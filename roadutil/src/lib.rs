//! Small things shared by every crate in the roadwork pipeline: the error type, logging setup,
//! a hierarchical timer, and some formatting helpers.

#[macro_use]
extern crate log;

mod error;
pub mod logger;
mod time;
mod utils;

pub use crate::error::{Error, Result};
pub use crate::time::{elapsed_seconds, prettyprint_time, Timer};
pub use crate::utils::{clear_current_line, plain_list_names, prettyprint_usize};

const PROGRESS_FREQUENCY_SECONDS: f64 = 0.2;
