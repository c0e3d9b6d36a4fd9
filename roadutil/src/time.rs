use std::time::Instant;

use crate::{prettyprint_usize, PROGRESS_FREQUENCY_SECONDS};

pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

pub fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}

struct Progress {
    label: String,
    processed_items: usize,
    total_items: usize,
    started_at: Instant,
    last_printed_at: Instant,
}

impl Progress {
    fn new(label: &str, total_items: usize) -> Progress {
        Progress {
            label: label.to_string(),
            processed_items: 0,
            total_items,
            started_at: Instant::now(),
            last_printed_at: Instant::now(),
        }
    }

    // Returns when done
    fn next(&mut self) -> Option<(f64, String)> {
        self.processed_items += 1;
        if self.processed_items > self.total_items {
            panic!(
                "{} is too few items for {} progress",
                prettyprint_usize(self.total_items),
                self.label
            );
        }

        if self.processed_items == self.total_items {
            let elapsed = elapsed_seconds(self.started_at);
            let line = format!(
                "{} ({})... {}",
                self.label,
                prettyprint_usize(self.total_items),
                prettyprint_time(elapsed)
            );
            info!("{}", line);
            return Some((elapsed, line));
        } else if elapsed_seconds(self.last_printed_at) >= PROGRESS_FREQUENCY_SECONDS {
            self.last_printed_at = Instant::now();
            debug!(
                "{}: {}/{}... {}",
                self.label,
                prettyprint_usize(self.processed_items),
                prettyprint_usize(self.total_items),
                prettyprint_time(elapsed_seconds(self.started_at))
            );
        }
        None
    }
}

enum StackEntry {
    TimerSpan(TimerSpan),
    Progress(Progress),
}

struct TimerSpan {
    name: String,
    started_at: Instant,
    nested_results: Vec<String>,
}

/// Hierarchical timing of a run. Spans nest; when the outermost `Timer` is dropped, the whole
/// tree of timings is logged, followed by any notes and warnings collected along the way.
pub struct Timer {
    results: Vec<String>,
    stack: Vec<StackEntry>,

    outermost_name: String,

    notes: Vec<String>,
    warnings: Vec<String>,
}

impl Timer {
    pub fn new<I: Into<String>>(name: I) -> Timer {
        let name = name.into();
        let mut t = Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: name.clone(),
            notes: Vec::new(),
            warnings: Vec::new(),
        };
        t.start(name);
        t
    }

    /// For tests and one-off calls that don't care about timing output.
    pub fn throwaway() -> Timer {
        Timer::new("throwaway")
    }

    /// Log immediately, but also repeat at the end, to avoid having to scroll up and find
    /// interesting debug stuff.
    pub fn note<I: Into<String>>(&mut self, line: I) {
        let line = line.into();
        info!("{}", line);
        self.notes.push(line);
    }

    pub fn warn<I: Into<String>>(&mut self, line: I) {
        let line = line.into();
        warn!("{}", line);
        self.warnings.push(line);
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn start<I: Into<String>>(&mut self, name: I) {
        let name = name.into();
        info!("{}...", name);
        self.stack.push(StackEntry::TimerSpan(TimerSpan {
            name,
            started_at: Instant::now(),
            nested_results: Vec::new(),
        }));
    }

    pub fn stop<I: Into<String>>(&mut self, name: I) {
        let name = name.into();
        let span = match self.stack.pop() {
            Some(StackEntry::TimerSpan(s)) => s,
            _ => panic!("Timer::stop({}) without a matching start", name),
        };
        assert_eq!(span.name, name);
        let elapsed = elapsed_seconds(span.started_at);
        let line = format!("{} took {}", name, prettyprint_time(elapsed));

        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(StackEntry::TimerSpan(ref mut s)) => {
                s.nested_results.push(format!("{}- {}", padding, line));
                s.nested_results.extend(span.nested_results);
            }
            Some(StackEntry::Progress(_)) => {
                panic!("Timer::stop({}) while a progress counter is running", name)
            }
            None => {
                self.results.push(format!("{}- {}", padding, line));
                self.results.extend(span.nested_results);
            }
        }

        info!("{}", line);
    }

    /// Count through a known number of items, logging progress periodically. Call `next` once per
    /// item; the counter pops itself after the last one.
    pub fn start_iter<I: Into<String>>(&mut self, name: I, total_items: usize) {
        if total_items == 0 {
            return;
        }
        let name = name.into();
        if let Some(StackEntry::Progress(p)) = self.stack.last() {
            panic!(
                "Can't start_iter({}) while Progress({}) is top of the stack",
                name, p.label
            );
        }

        self.stack
            .push(StackEntry::Progress(Progress::new(&name, total_items)));
    }

    pub fn next(&mut self) {
        let maybe_result =
            if let Some(StackEntry::Progress(ref mut progress)) = self.stack.last_mut() {
                progress.next()
            } else {
                panic!("Can't next() while a TimerSpan is top of the stack");
            };
        if let Some((_, result)) = maybe_result {
            self.stack.pop();
            let padding = "  ".repeat(self.stack.len());
            match self.stack.last_mut() {
                Some(StackEntry::TimerSpan(ref mut s)) => {
                    s.nested_results.push(format!("{}- {}", padding, result));
                }
                Some(StackEntry::Progress(_)) => unreachable!(),
                None => {
                    self.results.push(format!("{}- {}", padding, result));
                }
            }
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let stop_name = self.outermost_name.clone();

        // If we're unwinding from an error, some spans are still open. Don't blow up further.
        match self.stack.last() {
            Some(StackEntry::TimerSpan(ref s)) if s.name == stop_name && self.stack.len() == 1 => {}
            _ => {
                debug!("dropping Timer {} with unfinished spans", stop_name);
                return;
            }
        }

        self.stop(stop_name);
        for line in &self.results {
            info!("{}", line);
        }

        if !self.notes.is_empty() {
            info!("{} notes:", self.notes.len());
            for line in &self.notes {
                info!("{}", line);
            }
        }

        if !self.warnings.is_empty() {
            warn!("{} warnings:", self.warnings.len());
            for line in &self.warnings {
                warn!("{}", line);
            }
        }
    }
}
