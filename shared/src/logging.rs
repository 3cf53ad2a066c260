use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use log::{debug, trace, warn, SetLoggerError};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

use crate::config::PARALLEL;

/// Nesting depth of the sequential tracers
static TRACE_DEPTH: AtomicUsize = AtomicUsize::new(0);

/// Timed scope of one unit of work, e.g., verifying one operator
///
/// Entry and events are traced with indentation by nesting depth when running
/// sequentially. Parallel scopes are not nested, so they prefix events with
/// their title instead. Leaving the scope reports the elapsed time.
pub struct Tracer {
    title: String,
    depth: Option<usize>,
    started: Instant,
}

impl Tracer {
    pub fn new(title: impl Into<String>) -> Self {
        let title = title.into();
        let depth = if *PARALLEL {
            None
        } else {
            let level = TRACE_DEPTH.fetch_add(1, Ordering::SeqCst);
            trace!("{}-> {}", "  ".repeat(level), title);
            Some(level)
        };
        Self {
            title,
            depth,
            started: Instant::now(),
        }
    }

    /// Record an event within the scope
    pub fn log(&self, event: &str) {
        match self.depth {
            None => trace!("[{}] {}", self.title, event),
            Some(level) => trace!("{}   {}", "  ".repeat(level), event),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

impl Drop for Tracer {
    fn drop(&mut self) {
        let elapsed = self.elapsed();
        match self.depth {
            None => debug!("{} done in {:.2?}", self.title, elapsed),
            Some(level) => {
                debug!("{}<- {} ({:.2?})", "  ".repeat(level), self.title, elapsed);
                if TRACE_DEPTH
                    .compare_exchange(level + 1, level, Ordering::SeqCst, Ordering::SeqCst)
                    .is_err()
                {
                    warn!("tracer '{}' closed out of order", self.title);
                }
            }
        }
    }
}

/// Map the number of `-v` occurrences to a log level
pub fn verbosity(verbose: usize) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Setup the logging globally
pub fn setup(verbose: usize) -> Result<(), SetLoggerError> {
    TermLogger::init(
        verbosity(verbose),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
}
