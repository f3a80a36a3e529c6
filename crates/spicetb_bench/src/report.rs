//! Textual report stream.
//!
//! The [`ReportSink`] trait abstracts where snapshots and debounce events go.
//! [`TextReporter`] writes them as space-separated `name=value` lines, one
//! line per snapshot or per debounce transition.

use std::fmt;
use std::io::Write;

use crate::debounce::DebounceEvent;
use crate::error::BenchError;

/// One line of `name=value` pairs describing the state at a sample.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    fields: Vec<(String, String)>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    /// Returns the value recorded for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Returns the fields in emission order.
    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    /// Returns true if no field has been recorded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.fields.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Formats a raw sample in C `%e` style, e.g. `1.000000e-09`.
pub fn format_raw(value: f64) -> String {
    let s = format!("{value:.6e}");
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{digits:0>2}")
        }
        None => s,
    }
}

/// Destination for snapshots and debounce events.
pub trait ReportSink {
    /// Writes one snapshot line.
    fn snapshot(&mut self, snapshot: &Snapshot) -> Result<(), BenchError>;

    /// Writes one debounce transition line.
    fn event(&mut self, event: &DebounceEvent) -> Result<(), BenchError>;

    /// Flushes buffered output.
    fn flush(&mut self) -> Result<(), BenchError>;
}

/// Line-oriented text reporter.
pub struct TextReporter<W: Write> {
    writer: W,
    lines: u64,
}

impl<W: Write> TextReporter<W> {
    /// Creates a reporter writing to the given output.
    pub fn new(writer: W) -> Self {
        Self { writer, lines: 0 }
    }

    /// Returns the number of lines written so far.
    pub fn lines(&self) -> u64 {
        self.lines
    }

    /// Consumes the reporter and returns the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for TextReporter<W> {
    fn snapshot(&mut self, snapshot: &Snapshot) -> Result<(), BenchError> {
        writeln!(self.writer, "{snapshot}")?;
        self.lines += 1;
        Ok(())
    }

    fn event(&mut self, event: &DebounceEvent) -> Result<(), BenchError> {
        writeln!(self.writer, "{event}")?;
        self.lines += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), BenchError> {
        self.writer.flush()?;
        Ok(())
    }
}
