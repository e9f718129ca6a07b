//! Console output for the chat loop.
//!
//! This module provides a trait-based rendering abstraction so the dispatcher never
//! writes to stdout directly.  The default implementation uses ANSI escape codes for
//! errors and statistics, and can be pointed at any pair of writers.

use std::io::{self, Stderr, Stdout, Write};

/// ANSI escape code for dim text (used for section rules).
const ANSI_DIM: &str = "\x1b[2m";

/// ANSI escape code to reset all styling.
const ANSI_RESET: &str = "\x1b[0m";

/// ANSI escape code for cyan text (used for statistics).
const ANSI_CYAN: &str = "\x1b[36m";

/// ANSI escape code for yellow text (used for informational notices).
const ANSI_YELLOW: &str = "\x1b[33m";

/// ANSI escape code for red text (used for errors).
const ANSI_RED: &str = "\x1b[31m";

const RULE: &str = "─────────────────────────────────────";

/// Trait for rendering chat output.
///
/// This abstraction allows for different rendering strategies:
/// - Plain text with ANSI styling
/// - Plain text without styling (for piping/redirecting)
/// - In-memory capture for tests
pub trait Renderer: Send {
    /// Print text without a trailing newline.
    fn print_text(&mut self, text: &str);

    /// Print one line of text.
    fn print_line(&mut self, line: &str) {
        self.print_text(line);
        self.print_text("\n");
    }

    /// Print a section header such as `────────┤ Available models ├─────────`.
    fn print_header(&mut self, title: &str);

    /// Print a horizontal rule closing a section.
    fn print_rule(&mut self);

    /// Print a model answer.
    fn print_response(&mut self, content: &str);

    /// Print the statistics line for one exchange.
    fn print_stats(&mut self, total_tokens: u64, seconds: f64, tokens_per_second: f64);

    /// Print an informational message.
    fn print_info(&mut self, info: &str);

    /// Print an error message.
    fn print_error(&mut self, error: &str);
}

/// Plain text renderer with optional ANSI styling.
///
/// Regular output goes to `out` (stdout by default) and errors to `err` (stderr by
/// default).
pub struct PlainTextRenderer<O: Write + Send = Stdout, E: Write + Send = Stderr> {
    out: O,
    err: E,
    use_color: bool,
}

impl PlainTextRenderer {
    /// Creates a new PlainTextRenderer with ANSI colors enabled.
    pub fn new() -> Self {
        Self::with_color(true)
    }

    /// Creates a new PlainTextRenderer with specified color setting.
    pub fn with_color(use_color: bool) -> Self {
        Self::with_writers(io::stdout(), io::stderr(), use_color)
    }
}

impl Default for PlainTextRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: Write + Send, E: Write + Send> PlainTextRenderer<O, E> {
    /// Creates a renderer writing to arbitrary destinations.
    pub fn with_writers(out: O, err: E, use_color: bool) -> Self {
        Self {
            out,
            err,
            use_color,
        }
    }

    /// The regular output destination.
    pub fn out(&self) -> &O {
        &self.out
    }

    /// The error output destination.
    pub fn err(&self) -> &E {
        &self.err
    }

    fn styled(&self, style: &str, text: &str) -> String {
        if self.use_color {
            format!("{style}{text}{ANSI_RESET}")
        } else {
            text.to_string()
        }
    }

    fn flush(&mut self) {
        let _ = self.out.flush();
    }
}

impl<O: Write + Send, E: Write + Send> Renderer for PlainTextRenderer<O, E> {
    fn print_text(&mut self, text: &str) {
        let _ = write!(self.out, "{text}");
        self.flush();
    }

    fn print_header(&mut self, title: &str) {
        let line = self.styled(ANSI_DIM, &format!("────────┤ {title} ├─────────"));
        let _ = writeln!(self.out, "{line}");
    }

    fn print_rule(&mut self) {
        let line = self.styled(ANSI_DIM, RULE);
        let _ = writeln!(self.out, "{line}");
    }

    fn print_response(&mut self, content: &str) {
        let _ = writeln!(self.out, "{content}");
        self.flush();
    }

    fn print_stats(&mut self, total_tokens: u64, seconds: f64, tokens_per_second: f64) {
        let line = self.styled(
            ANSI_CYAN,
            &format_stats(total_tokens, seconds, tokens_per_second),
        );
        let _ = writeln!(self.out, "{line}\n");
        self.flush();
    }

    fn print_info(&mut self, info: &str) {
        let line = self.styled(ANSI_YELLOW, info);
        let _ = writeln!(self.out, "{line}");
        self.flush();
    }

    fn print_error(&mut self, error: &str) {
        let line = self.styled(ANSI_RED, error);
        let _ = writeln!(self.err, "{line}\n");
        let _ = self.err.flush();
    }
}

/// `───┤ Stats: 10 tokens | 2.00 sec | 5.00 tok/sec ├───`
pub fn format_stats(total_tokens: u64, seconds: f64, tokens_per_second: f64) -> String {
    format!(
        "───┤ Stats: {total_tokens} tokens | {seconds:.2} sec | {tokens_per_second:.2} tok/sec ├───"
    )
}
