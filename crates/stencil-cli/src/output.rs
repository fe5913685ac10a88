//! Output management and formatting.

use std::io::{self, IsTerminal};

use console::Term;
use owo_colors::OwoColorize;
use serde::Serialize;

use crate::cli::global::{GlobalArgs, OutputFormat};
use crate::error::CliResult;

/// Writes command results to stdout in the selected format.
pub struct OutputManager {
    format: OutputFormat,
    quiet: bool,
    no_color: bool,
    term: Term,
    notes: Term,
}

impl OutputManager {
    /// Colour is off when `--no-color` is set or stdout is not a terminal.
    pub fn new(args: &GlobalArgs) -> Self {
        Self {
            format: args.format,
            quiet: args.quiet,
            no_color: args.no_color || !io::stdout().is_terminal(),
            term: Term::stdout(),
            notes: Term::stderr(),
        }
    }

    // ── Public write methods ───────────────────────────────────────────────

    /// Pretty JSON document. Written even in quiet mode: it *is* the result.
    pub fn json<T: Serialize + ?Sized>(&self, value: &T) -> CliResult<()> {
        let rendered = serde_json::to_string_pretty(value)?;
        self.term.write_line(&rendered)?;
        Ok(())
    }

    /// Command payload (a generated prompt, a path). Never suppressed.
    pub fn result(&self, text: &str) -> io::Result<()> {
        self.term.write_str(text)?;
        if !text.ends_with('\n') {
            self.term.write_line("")?;
        }
        Ok(())
    }

    /// Success indicator: `✓ <msg>`.
    pub fn success(&self, msg: &str) -> io::Result<()> {
        self.decorated(msg, "\u{2713}", |s| s.green().bold().to_string())
    }

    /// Warning indicator: `⚠ <msg>`, on stderr so stdout stays the payload.
    pub fn warning(&self, msg: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("\u{26a0} {msg}")
        } else {
            format!("{} {}", "\u{26a0}".yellow().bold(), msg.yellow())
        };
        self.notes.write_line(&line)
    }

    /// Failure line inside an otherwise successful report: `✗ <msg>`.
    pub fn failure(&self, msg: &str) -> io::Result<()> {
        self.decorated(msg, "\u{2717}", |s| s.red().bold().to_string())
    }

    /// Bold cyan header line.
    pub fn header(&self, text: &str) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            text.to_owned()
        } else {
            text.cyan().bold().to_string()
        };
        self.term.write_line(&line)
    }

    fn decorated(&self, msg: &str, symbol: &str, paint: fn(&str) -> String) -> io::Result<()> {
        if self.quiet {
            return Ok(());
        }
        let line = if self.no_color {
            format!("{symbol} {msg}")
        } else {
            format!("{} {msg}", paint(symbol))
        };
        self.term.write_line(&line)
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
