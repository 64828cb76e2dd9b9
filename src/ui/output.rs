//! ui::output
//!
//! Output formatting and display.
//!
//! # Design
//!
//! Two channels:
//!
//! - **Data** (ids, names, listings, config values) goes to stdout, one
//!   item per line, and is printed even in quiet mode so scripts can rely
//!   on it. Write failures such as a closed pipe are returned, not panicked on.
//! - **Notes** (confirmations, config file locations) go to stderr and are
//!   dropped in quiet mode.
//!
//! Errors are always shown on stderr.

use std::fmt::Display;
use std::io::{self, Write};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - data and errors only
    Quiet,
    /// Normal mode - data, notes and errors
    Normal,
    /// Debug mode - as normal, with debug logging enabled
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    pub fn shows_notes(self) -> bool {
        self != Verbosity::Quiet
    }
}

/// Write each item on its own line.
pub fn write_lines<W, T>(out: &mut W, items: impl IntoIterator<Item = T>) -> io::Result<()>
where
    W: Write,
    T: Display,
{
    for item in items {
        writeln!(out, "{}", item)?;
    }
    out.flush()
}

/// Print data items to stdout, one per line.
pub fn lines<T: Display>(items: impl IntoIterator<Item = T>) -> io::Result<()> {
    write_lines(&mut io::stdout().lock(), items)
}

/// Print a single data value to stdout.
pub fn data(value: impl Display) -> io::Result<()> {
    lines([value])
}

/// Print a note to stderr unless quiet.
pub fn note(message: impl Display, verbosity: Verbosity) {
    if verbosity.shows_notes() {
        eprintln!("{}", message);
    }
}

/// Print an error message (always shown).
pub fn error(message: impl Display) {
    eprintln!("error: {}", message);
}
