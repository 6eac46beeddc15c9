// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Per-run search context.
//!
//! A [`SearchContext`] is created for each search call and threaded through
//! every stage. It carries:
//! - the verbose flag and an injectable [`TraceSink`] that receives progress
//!   lines (discriminating-path traces, BOSS pass summaries, ...);
//! - run [`Statistics`].
//!
//! Nothing here is process-wide: two searches with two contexts share no
//! mutable state.
//!
//! ```
//! use causal_search::context::{MemorySink, SearchContext};
//!
//! let sink = MemorySink::new();
//! let mut ctx = SearchContext::with_sink(Box::new(sink.clone()));
//! ctx.set_verbose(true);
//! ctx.trace(format_args!("pass {}", 1));
//! assert_eq!(sink.lines(), vec!["pass 1".to_string()]);
//! ```

mod statistics;

pub use statistics::{Counter, Statistics};

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Destination for verbose progress lines.
pub trait TraceSink: Send {
    fn line(&mut self, line: &str);
}

/// Forwards trace lines to `tracing::info!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn line(&mut self, line: &str) {
        tracing::info!(target: "causal_search::trace", "{line}");
    }
}

/// Collects trace lines in a shared buffer.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the lines received so far.
    pub fn lines(&self) -> Vec<String> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl TraceSink for MemorySink {
    fn line(&mut self, line: &str) {
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line.to_string()),
            Err(poisoned) => poisoned.into_inner().push(line.to_string()),
        }
    }
}

/// Writes trace lines to any writer, one per line.
#[derive(Debug)]
pub struct WriterSink<W: Write + Send> {
    writer: W,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> TraceSink for WriterSink<W> {
    fn line(&mut self, line: &str) {
        if let Err(e) = writeln!(self.writer, "{line}") {
            tracing::warn!(error = %e, "trace sink write failed");
        }
    }
}

pub struct SearchContext {
    verbose: bool,
    sink: Box<dyn TraceSink>,
    pub statistics: Statistics,
}

impl SearchContext {
    /// A quiet context tracing to `tracing`.
    pub fn new() -> Self {
        Self::with_sink(Box::new(TracingSink))
    }

    pub fn with_sink(sink: Box<dyn TraceSink>) -> Self {
        Self {
            verbose: false,
            sink,
            statistics: Statistics::new(),
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    /// Emit a progress line when verbose.
    pub fn trace(&mut self, args: fmt::Arguments<'_>) {
        if self.verbose {
            self.sink.line(&args.to_string());
        }
    }

    /// Shorthand for `statistics.increment(counter)`.
    pub fn count(&mut self, counter: Counter) {
        self.statistics.increment(counter);
    }
}

impl Default for SearchContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SearchContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchContext")
            .field("verbose", &self.verbose)
            .field("statistics", &self.statistics)
            .finish_non_exhaustive()
    }
}
