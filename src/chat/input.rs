//! Line-oriented input for the chat loop.

use std::io;

use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::error::{Error, Result};

/// A source of input lines.
///
/// `Ok(None)` means the input is exhausted.
pub trait LineSource {
    /// Show `prompt` and read one line.
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;

    /// Record a line typed at the main prompt.
    fn remember(&mut self, _line: &str) {}
}

impl LineSource for DefaultEditor {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.readline(prompt) {
            Ok(line) => Ok(Some(line)),
            // Ctrl+C at a prompt abandons the line.
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(ReadlineError::Io(err)) => Err(Error::io("failed to read input", err)),
            Err(err) => Err(Error::io(
                "failed to read input",
                io::Error::other(err.to_string()),
            )),
        }
    }

    fn remember(&mut self, line: &str) {
        if let Err(err) = self.add_history_entry(line) {
            tracing::debug!(error = %err, "failed to record input history");
        }
    }
}

#[cfg(test)]
mod tests {
    use rustyline::history::History;

    use super::*;

    #[test]
    fn remembered_lines_land_in_editor_history() {
        let mut editor = DefaultEditor::new().unwrap();
        editor.remember("hello");
        editor.remember("m");
        assert_eq!(editor.history().len(), 2);
    }
}
